use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::{
    CaptionLimit, ConfigError, CoreError, GenerationParams, LabelMapping, TagExtraction,
    FALLBACK_CAPTION,
};

pub const DEFAULT_CONFIG_FILE: &str = "instacaption.toml";
pub const DEFAULT_OUTPUT_DIR: &str = "GeneratedInstagramPosts";

/// Words removed from captions by the web profile. A placeholder list;
/// deployments are expected to set their own via `[profile] banned_words`.
pub const DEFAULT_BANNED_WORDS: &[&str] = &[
    "hate", "kill", "stupid", "ugly", "damn", "hell", "violence", "drugs",
];

/// Front end whose post-processing rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Cli,
    Web,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSettings {
    pub caption_limit: CaptionLimit,
    pub banned_words: Vec<String>,
    pub tag_extraction: TagExtraction,
    pub label_mapping: LabelMapping,
    pub stamp_generated_at: bool,
}

impl ProfileSettings {
    pub fn for_profile(profile: Profile) -> Self {
        match profile {
            Profile::Cli => Self {
                caption_limit: CaptionLimit::Characters(500),
                banned_words: Vec::new(),
                tag_extraction: TagExtraction::AnyWord,
                label_mapping: LabelMapping::Exact,
                stamp_generated_at: true,
            },
            Profile::Web => Self {
                caption_limit: CaptionLimit::Words(8),
                banned_words: DEFAULT_BANNED_WORDS.iter().map(|w| w.to_string()).collect(),
                tag_extraction: TagExtraction::AlphabeticOnly,
                label_mapping: LabelMapping::Substring,
                stamp_generated_at: false,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Local,
    Hosted,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub output: OutputConfig,
    pub generation: GenerationConfig,
    pub classifier: ClassifierConfig,
    pub hosted: HostedConfig,
    pub models: ModelsConfig,
    pub web: WebConfig,
    pub profile: ProfileOverrides,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub backend: Backend,
    pub model_dir: PathBuf,
    /// Hub repository used when model files have to be fetched.
    pub repo: String,
    pub params: GenerationParams,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Local,
            model_dir: PathBuf::from("models/gpt2"),
            repo: "gpt2".to_string(),
            params: GenerationParams::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub backend: Backend,
    pub model_dir: PathBuf,
    pub repo: String,
    /// Overrides `id2label` for checkpoints that only ship `LABEL_n` names.
    pub labels: Option<Vec<String>>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Local,
            model_dir: PathBuf::from("models/sentiment"),
            repo: "textattack/bert-base-uncased-SST-2".to_string(),
            labels: Some(vec!["negative".to_string(), "positive".to_string()]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostedConfig {
    pub base_url: String,
    pub generation_model: String,
    pub classifier_model: String,
    /// Environment variable holding the bearer token, if any.
    pub token_env: String,
}

impl Default for HostedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api-inference.huggingface.co".to_string(),
            generation_model: "gpt2".to_string(),
            classifier_model: "distilbert-base-uncased-finetuned-sst-2-english".to_string(),
            token_env: "HF_TOKEN".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub fetch_missing: bool,
    pub hub_url: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            fetch_missing: true,
            hub_url: "https://huggingface.co".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:7860".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileOverrides {
    pub caption_limit: Option<CaptionLimit>,
    pub banned_words: Option<Vec<String>>,
    pub tag_extraction: Option<TagExtraction>,
    pub label_mapping: Option<LabelMapping>,
    pub stamp_generated_at: Option<bool>,
}

impl AppConfig {
    /// Reads `path` if it exists, otherwise returns the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::Config(ConfigError::FileNotFound {
                path: path.display().to_string(),
            }),
            _ => CoreError::Io(e),
        })?;
        let config = Self::from_toml(&raw)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, CoreError> {
        let config: Self = toml::from_str(raw).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let params = &self.generation.params;
        if params.max_length == 0 {
            return Err(invalid("generation.params.max_length", params.max_length));
        }
        if params.num_return_sequences != 1 {
            return Err(invalid(
                "generation.params.num_return_sequences",
                params.num_return_sequences,
            ));
        }
        if let Some(temperature) = params.temperature {
            if temperature <= 0.0 {
                return Err(invalid("generation.params.temperature", temperature));
            }
        }
        if let Some(top_p) = params.top_p {
            if top_p <= 0.0 || top_p > 1.0 {
                return Err(invalid("generation.params.top_p", top_p));
            }
        }
        if let Some(labels) = &self.classifier.labels {
            if labels.is_empty() {
                return Err(invalid("classifier.labels", "[]"));
            }
        }
        match self.profile.caption_limit {
            Some(CaptionLimit::Characters(0)) | Some(CaptionLimit::Words(0)) => {
                return Err(invalid("profile.caption_limit", 0));
            }
            // "..." needs three characters of room
            Some(CaptionLimit::Characters(n)) if n < 4 => {
                return Err(invalid("profile.caption_limit", n));
            }
            _ => {}
        }
        // the fallback caption is emitted unfiltered
        if let Some(banned) = &self.profile.banned_words {
            let fallback: Vec<String> = FALLBACK_CAPTION
                .split_whitespace()
                .map(normalize_word)
                .collect();
            if let Some(word) = banned.iter().find(|w| fallback.contains(&normalize_word(w))) {
                return Err(invalid("profile.banned_words", word));
            }
        }
        Ok(())
    }

    /// Profile defaults with any `[profile]` overrides applied.
    pub fn profile_settings(&self, profile: Profile) -> ProfileSettings {
        let mut settings = ProfileSettings::for_profile(profile);
        let overrides = &self.profile;
        if let Some(limit) = overrides.caption_limit {
            settings.caption_limit = limit;
        }
        if let Some(words) = &overrides.banned_words {
            settings.banned_words = words.clone();
        }
        if let Some(extraction) = overrides.tag_extraction {
            settings.tag_extraction = extraction;
        }
        if let Some(mapping) = overrides.label_mapping {
            settings.label_mapping = mapping;
        }
        if let Some(stamp) = overrides.stamp_generated_at {
            settings.stamp_generated_at = stamp;
        }
        settings
    }
}

fn normalize_word(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase()
}

fn invalid(field: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}
