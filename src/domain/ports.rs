use crate::utils::error::Result;
use async_trait::async_trait;

/// Hosted text-generation model.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the raw completion text for `prompt`.
    async fn generate_text(&self, prompt: &str) -> Result<String>;
}

/// Hosted text-to-image model.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Returns the decoded bytes of the first generated image.
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>>;
}

/// Downloads the spreadsheet a client points us at.
#[async_trait]
pub trait FileFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Object store reachable through `s3://bucket/key` URLs.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn read_file(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
}
