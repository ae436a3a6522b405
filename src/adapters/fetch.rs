use crate::config::FetchConfig;
use crate::domain::ports::{FileFetcher, Storage};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const MAX_BACKOFF: Duration = Duration::from_secs(20);

/// Downloads spreadsheets over http(s), and from an object store for
/// `s3://bucket/key` URLs when one is attached.
#[derive(Clone)]
pub struct UrlFetcher {
    client: Client,
    retry_attempts: u32,
    retry_delay: Duration,
    storage: Option<Arc<dyn Storage>>,
}

impl UrlFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            retry_attempts: config.retry_attempts.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            storage: None,
        })
    }

    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    async fn fetch_http(&self, url: &str) -> Result<Vec<u8>> {
        let mut attempt = 1;
        loop {
            match self.try_fetch(url).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) if attempt < self.retry_attempts && is_retryable(&e) => {
                    let delay = backoff(self.retry_delay, attempt);
                    tracing::warn!(
                        "Download attempt {}/{} failed: {}; retrying in {:?}",
                        attempt,
                        self.retry_attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        tracing::debug!("Download response status: {}", status);
        if !status.is_success() {
            return Err(AppError::FetchStatusError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    async fn fetch_object(&self, url: &Url) -> Result<Vec<u8>> {
        let storage = self.storage.as_ref().ok_or_else(|| AppError::StorageError {
            message: "s3 URLs are not enabled on this server".to_string(),
        })?;

        let bucket = url.host_str().ok_or_else(|| AppError::StorageError {
            message: format!("missing bucket in {}", url),
        })?;
        // Url keeps the path percent-encoded; object keys are raw
        let key = percent_decode_str(url.path().trim_start_matches('/'))
            .decode_utf8()
            .map_err(|e| AppError::StorageError {
                message: format!("object key in {} is not valid UTF-8: {}", url, e),
            })?;
        if key.is_empty() {
            return Err(AppError::StorageError {
                message: format!("missing object key in {}", url),
            });
        }

        storage.read_file(bucket, &key).await
    }
}

#[async_trait]
impl FileFetcher for UrlFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let parsed = Url::parse(url).map_err(|e| AppError::ValidationError {
            message: format!("invalid fileUrl '{}': {}", url, e),
        })?;

        match parsed.scheme() {
            "http" | "https" => self.fetch_http(url).await,
            "s3" => self.fetch_object(&parsed).await,
            scheme => Err(AppError::ValidationError {
                message: format!("unsupported fileUrl scheme: {}", scheme),
            }),
        }
    }
}

fn is_retryable(error: &AppError) -> bool {
    match error {
        AppError::FetchError(e) => e.is_timeout() || e.is_connect(),
        AppError::FetchStatusError { status, .. } => *status >= 500 || *status == 429,
        _ => false,
    }
}

fn backoff(base: Duration, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    base.saturating_mul(factor).min(MAX_BACKOFF)
}
