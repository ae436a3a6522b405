use crate::utils::error::{AppError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, validate_resolved,
    Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR_PATTERN: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub aws: AwsConfig,
    pub inference: InferenceConfig,
    pub text_generation: TextGenerationConfig,
    pub image: ImageConfig,
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    pub region: String,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: "us-west-2".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub text_model_id: String,
    pub image_model_id: String,
    /// Applied to both connect and read timeouts.
    pub timeout_seconds: u64,
    pub max_attempts: u32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            text_model_id: "amazon.titan-text-express-v1".to_string(),
            image_model_id: "amazon.titan-image-generator-v1".to_string(),
            timeout_seconds: 60,
            max_attempts: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextGenerationConfig {
    pub max_token_count: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for TextGenerationConfig {
    fn default() -> Self {
        Self {
            max_token_count: 3072,
            temperature: 0.7,
            top_p: 0.9,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Upper bound on the assembled cargo prompt, in characters.
    pub max_prompt_chars: usize,
    pub width: u32,
    pub height: u32,
    pub cfg_scale: f32,
    pub seed: u32,
    pub render_schematic: bool,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_prompt_chars: 512,
            width: 1024,
            height: 1024,
            cfg_scale: 8.0,
            seed: 0,
            render_schematic: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 60,
            retry_attempts: 10,
            retry_delay_ms: 250,
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AppError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| AppError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${AWS_REGION})
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    /// Environment values win over the file: `BIND_ADDR`, `AWS_REGION`.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(bind) = std::env::var("BIND_ADDR") {
            self.server.bind = bind;
        }
        if let Ok(region) = std::env::var("AWS_REGION") {
            self.aws.region = region;
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        let strings = [
            ("server.bind", &self.server.bind),
            ("aws.region", &self.aws.region),
            ("inference.text_model_id", &self.inference.text_model_id),
            ("inference.image_model_id", &self.inference.image_model_id),
        ];
        for (field, value) in strings {
            validate_non_empty_string(field, value)?;
            validate_resolved(field, value)?;
        }
        validate_positive_number(
            "inference.timeout_seconds",
            self.inference.timeout_seconds as usize,
            1,
        )?;
        validate_positive_number("inference.max_attempts", self.inference.max_attempts as usize, 1)?;

        validate_positive_number(
            "text_generation.max_token_count",
            self.text_generation.max_token_count as usize,
            1,
        )?;
        validate_range("text_generation.temperature", self.text_generation.temperature, 0.0, 1.0)?;
        validate_range("text_generation.top_p", self.text_generation.top_p, 0.0, 1.0)?;

        validate_positive_number("image.max_prompt_chars", self.image.max_prompt_chars, 1)?;
        validate_range("image.width", self.image.width, 256, 2048)?;
        validate_range("image.height", self.image.height, 256, 2048)?;
        validate_range("image.cfg_scale", self.image.cfg_scale, 1.1, 10.0)?;

        validate_positive_number("fetch.timeout_seconds", self.fetch.timeout_seconds as usize, 1)?;
        validate_positive_number("fetch.retry_attempts", self.fetch.retry_attempts as usize, 1)?;

        Ok(())
    }
}
