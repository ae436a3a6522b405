pub mod adapters;
pub mod api;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::UrlFetcher;
pub use api::{build_router, AppState};
pub use config::{CliConfig, TomlConfig};
pub use utils::error::{AppError, Result};

#[cfg(feature = "bedrock")]
pub use adapters::{BedrockClient, S3Storage};
