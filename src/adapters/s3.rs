use crate::domain::ports::Storage;
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::Client as S3Client;

#[derive(Debug, Clone)]
pub struct S3Storage {
    client: S3Client,
}

impl S3Storage {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn read_file(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        tracing::debug!("Reading s3://{}/{}", bucket, key);

        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let message = e
                    .as_service_error()
                    .and_then(|se| se.message())
                    .map(str::to_string)
                    .unwrap_or_else(|| e.to_string());
                AppError::StorageError {
                    message: format!("Failed to read s3://{}/{}: {}", bucket, key, message),
                }
            })?;

        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| AppError::StorageError {
                message: format!("Failed to collect S3 data: {}", e),
            })?;

        Ok(data.into_bytes().to_vec())
    }
}
