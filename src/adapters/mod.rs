// Adapters layer: concrete implementations of the domain ports.

pub mod fetch;

#[cfg(feature = "bedrock")]
pub mod bedrock;
#[cfg(feature = "bedrock")]
pub mod s3;

pub use fetch::UrlFetcher;

#[cfg(feature = "bedrock")]
pub use bedrock::BedrockClient;
#[cfg(feature = "bedrock")]
pub use s3::S3Storage;
