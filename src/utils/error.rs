use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("File download failed: {0}")]
    FetchError(#[from] reqwest::Error),

    #[error("File download from {url} returned HTTP {status}")]
    FetchStatusError { url: String, status: u16 },

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Spreadsheet error: {message}")]
    SpreadsheetError { message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Inference request failed: {message}")]
    InferenceError { message: String },

    #[error("Image generation error. Error is {message}")]
    GenerationError { message: String },

    #[error("Prompt is {length} characters long, the limit is {limit}")]
    PromptTooLong { length: usize, limit: usize },

    #[error("Image processing error: {message}")]
    ImageError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

impl AppError {
    /// Errors caused by the caller's input rather than by a collaborator.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::PromptTooLong { .. } | AppError::ValidationError { .. }
        )
    }
}

impl From<calamine::Error> for AppError {
    fn from(e: calamine::Error) -> Self {
        AppError::SpreadsheetError {
            message: e.to_string(),
        }
    }
}

impl From<image::ImageError> for AppError {
    fn from(e: image::ImageError) -> Self {
        AppError::ImageError {
            message: e.to_string(),
        }
    }
}

impl From<base64::DecodeError> for AppError {
    fn from(e: base64::DecodeError) -> Self {
        AppError::ImageError {
            message: format!("invalid base64 image payload: {}", e),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
