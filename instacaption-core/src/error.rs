use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("No prompt entered")]
    EmptyPrompt,

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Classification error: {0}")]
    Classification(#[from] ClassificationError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Provider authentication failed: {provider}")]
    AuthenticationFailed { provider: String },

    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded { provider: String },

    #[error("Model not available: {model}")]
    ModelNotAvailable { model: String },

    #[error("Prompt too long: {prompt_tokens} tokens, max length: {max_length}")]
    PromptTooLong {
        prompt_tokens: usize,
        max_length: usize,
    },

    #[error("Tokenization failed: {reason}")]
    TokenizationFailed { reason: String },

    #[error("Model inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("Request to {provider} failed with status {status_code}")]
    RequestFailed { provider: String, status_code: u16 },

    #[error("Invalid response format from {provider}")]
    InvalidResponseFormat { provider: String },
}

#[derive(Error, Debug)]
pub enum ClassificationError {
    #[error("Provider authentication failed: {provider}")]
    AuthenticationFailed { provider: String },

    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded { provider: String },

    #[error("Model not available: {model}")]
    ModelNotAvailable { model: String },

    #[error("Tokenization failed: {text_length} characters")]
    TokenizationFailed { text_length: usize },

    #[error("Model inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("Classifier returned no labels")]
    NoLabels,

    #[error("Unknown class index {index}")]
    UnknownClass { index: usize },

    #[error("Request to {provider} failed with status {status_code}")]
    RequestFailed { provider: String, status_code: u16 },

    #[error("Invalid response format from {provider}")]
    InvalidResponseFormat { provider: String },
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model loading failed: {model_path}")]
    LoadingFailed { model_path: String },

    #[error("Model file not found: {path}")]
    FileNotFound { path: String },

    #[error("Model download failed: {url}")]
    DownloadFailed { url: String },

    #[error("Invalid model config {path}: {details}")]
    InvalidConfig { path: String, details: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}
