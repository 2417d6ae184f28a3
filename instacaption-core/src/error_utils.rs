use crate::error::*;
use tracing::{error, info};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::Generation(e) => {
                error!("Generation error details: {:?}", e);
            }
            CoreError::Classification(e) => {
                error!("Classification error details: {:?}", e);
            }
            CoreError::Model(e) => {
                error!("Model error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::EmptyPrompt => "No prompt entered.".to_string(),
            CoreError::Generation(e) => e.user_friendly_message(),
            CoreError::Classification(e) => e.user_friendly_message(),
            CoreError::Model(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Io(e) => format!("Could not write the generated post: {}", e),
            CoreError::Network(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::EmptyPrompt => "EMPTY_PROMPT".to_string(),
            CoreError::Generation(_) => "GENERATION".to_string(),
            CoreError::Classification(_) => "CLASSIFICATION".to_string(),
            CoreError::Model(_) => "MODEL".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
        }
    }
}

impl ErrorExt for GenerationError {
    fn log_error(&self) -> &Self {
        error!("GenerationError: {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            GenerationError::AuthenticationFailed { provider } => format!(
                "Authentication failed for {}. Please check your access token.",
                provider
            ),
            GenerationError::RateLimitExceeded { provider } => format!(
                "Rate limit exceeded for {}. Please wait before trying again.",
                provider
            ),
            GenerationError::ModelNotAvailable { model } => format!(
                "Text generation model '{}' is not available right now.",
                model
            ),
            GenerationError::PromptTooLong { max_length, .. } => format!(
                "Prompt is too long. The model accepts at most {} tokens.",
                max_length
            ),
            _ => "Caption generation failed. Please try again.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            GenerationError::AuthenticationFailed { .. } => "GEN_AUTH_FAILED".to_string(),
            GenerationError::RateLimitExceeded { .. } => "GEN_RATE_LIMIT".to_string(),
            GenerationError::ModelNotAvailable { .. } => "GEN_MODEL_UNAVAILABLE".to_string(),
            GenerationError::PromptTooLong { .. } => "GEN_PROMPT_TOO_LONG".to_string(),
            GenerationError::TokenizationFailed { .. } => "GEN_TOKENIZATION".to_string(),
            GenerationError::InferenceFailed { .. } => "GEN_INFERENCE".to_string(),
            GenerationError::RequestFailed { .. } => "GEN_REQUEST_FAILED".to_string(),
            GenerationError::InvalidResponseFormat { .. } => "GEN_INVALID_RESPONSE".to_string(),
        }
    }
}

impl ErrorExt for ClassificationError {
    fn log_error(&self) -> &Self {
        error!("ClassificationError: {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ClassificationError::AuthenticationFailed { provider } => format!(
                "Authentication failed for {}. Please check your access token.",
                provider
            ),
            ClassificationError::RateLimitExceeded { provider } => format!(
                "Rate limit exceeded for {}. Please wait before trying again.",
                provider
            ),
            ClassificationError::ModelNotAvailable { model } => format!(
                "Sentiment model '{}' is not available right now.",
                model
            ),
            _ => "Sentiment analysis failed. Please try again.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            ClassificationError::AuthenticationFailed { .. } => "CLS_AUTH_FAILED".to_string(),
            ClassificationError::RateLimitExceeded { .. } => "CLS_RATE_LIMIT".to_string(),
            ClassificationError::ModelNotAvailable { .. } => "CLS_MODEL_UNAVAILABLE".to_string(),
            ClassificationError::TokenizationFailed { .. } => "CLS_TOKENIZATION".to_string(),
            ClassificationError::InferenceFailed { .. } => "CLS_INFERENCE".to_string(),
            ClassificationError::NoLabels => "CLS_NO_LABELS".to_string(),
            ClassificationError::UnknownClass { .. } => "CLS_UNKNOWN_CLASS".to_string(),
            ClassificationError::RequestFailed { .. } => "CLS_REQUEST_FAILED".to_string(),
            ClassificationError::InvalidResponseFormat { .. } => {
                "CLS_INVALID_RESPONSE".to_string()
            }
        }
    }
}

impl ErrorExt for ModelError {
    fn log_error(&self) -> &Self {
        error!("ModelError: {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ModelError::LoadingFailed { model_path } => format!(
                "Failed to load the model at {}. Please check the model files.",
                model_path
            ),
            ModelError::FileNotFound { path } => format!("Model file not found: {}", path),
            ModelError::DownloadFailed { .. } => {
                "Model download failed. Please check your internet connection.".to_string()
            }
            ModelError::InvalidConfig { path, .. } => {
                format!("Model configuration {} is invalid.", path)
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            ModelError::LoadingFailed { .. } => "MODEL_LOADING_FAILED".to_string(),
            ModelError::FileNotFound { .. } => "MODEL_FILE_NOT_FOUND".to_string(),
            ModelError::DownloadFailed { .. } => "MODEL_DOWNLOAD_FAILED".to_string(),
            ModelError::InvalidConfig { .. } => "MODEL_INVALID_CONFIG".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => {
                format!("Configuration file not found at: {}", path)
            }
            ConfigError::InvalidValue { field, value } => {
                format!("Invalid value '{}' for configuration field '{}'.", value, field)
            }
            ConfigError::Parse(_) => {
                "Configuration file could not be parsed. Please check the syntax.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}

/// Logs a failure with its code and the message shown to the user.
#[derive(Debug, Default)]
pub struct ErrorReporter;

impl ErrorReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report_error(&self, error: &CoreError) {
        error.log_error();
        info!("Error code: {}", error.error_code());
        info!("User message: {}", error.user_friendly_message());
    }
}
