pub mod toml_config;

pub use toml_config::{
    AwsConfig, FetchConfig, ImageConfig, InferenceConfig, ServerConfig, TextGenerationConfig,
    TomlConfig,
};

use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "aircargo-enrich")]
#[command(about = "Enriches product spreadsheets with shipping attributes and renders cargo images")]
pub struct CliConfig {
    #[arg(long, env = "AIRCARGO_CONFIG", help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Address to listen on, overrides server.bind")]
    pub bind: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl CliConfig {
    /// Resolves the effective configuration: file (or defaults), then
    /// environment overrides, then command-line flags.
    pub fn load(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };

        config.apply_env_overrides();

        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }

        Ok(config)
    }
}
