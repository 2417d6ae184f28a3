//! Hosted inference over the Hugging Face style HTTP API.
//!
//! Both tasks post `{"inputs", "parameters"}` to `{base_url}/models/{model}`.
//! Text generation answers with `[{"generated_text": ...}]`; classification
//! answers with a (possibly nested) list of `{"label", "score"}` entries.

use instacaption_core::{
    Classification, ClassificationError, ConfigError, CoreError, GenerationError,
    GenerationParams, HostedConfig,
};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::{SentimentClassifier, TextGenerator};

pub const PROVIDER: &str = "huggingface";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Failure {
    Authentication,
    RateLimited,
    Unavailable,
    Other(u16),
}

pub(crate) fn failure_for_status(status: StatusCode) -> Option<Failure> {
    if status.is_success() {
        return None;
    }
    Some(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Failure::Authentication,
        StatusCode::TOO_MANY_REQUESTS => Failure::RateLimited,
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::NOT_FOUND => Failure::Unavailable,
        other => Failure::Other(other.as_u16()),
    })
}

impl Failure {
    fn into_generation_error(self, model: &str) -> GenerationError {
        match self {
            Failure::Authentication => GenerationError::AuthenticationFailed {
                provider: PROVIDER.to_string(),
            },
            Failure::RateLimited => GenerationError::RateLimitExceeded {
                provider: PROVIDER.to_string(),
            },
            Failure::Unavailable => GenerationError::ModelNotAvailable {
                model: model.to_string(),
            },
            Failure::Other(status_code) => GenerationError::RequestFailed {
                provider: PROVIDER.to_string(),
                status_code,
            },
        }
    }

    fn into_classification_error(self, model: &str) -> ClassificationError {
        match self {
            Failure::Authentication => ClassificationError::AuthenticationFailed {
                provider: PROVIDER.to_string(),
            },
            Failure::RateLimited => ClassificationError::RateLimitExceeded {
                provider: PROVIDER.to_string(),
            },
            Failure::Unavailable => ClassificationError::ModelNotAvailable {
                model: model.to_string(),
            },
            Failure::Other(status_code) => ClassificationError::RequestFailed {
                provider: PROVIDER.to_string(),
                status_code,
            },
        }
    }
}

pub(crate) fn model_endpoint(base_url: &str, model: &str) -> Result<Url, CoreError> {
    let invalid = || {
        CoreError::Config(ConfigError::InvalidValue {
            field: "hosted.base_url".to_string(),
            value: base_url.to_string(),
        })
    };
    let mut base = Url::parse(base_url).map_err(|_| invalid())?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(&format!("models/{model}")).map_err(|_| invalid())
}

fn token_from_env(var_name: &str) -> Option<String> {
    std::env::var(var_name).ok().filter(|token| !token.trim().is_empty())
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerationRequest<'a> {
    pub inputs: &'a str,
    pub parameters: GenerationParameters,
    pub options: RequestOptions,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerationParameters {
    pub max_length: usize,
    pub num_return_sequences: usize,
    pub no_repeat_ngram_size: usize,
    pub do_sample: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub return_full_text: bool,
}

impl From<&GenerationParams> for GenerationParameters {
    fn from(params: &GenerationParams) -> Self {
        Self {
            max_length: params.max_length,
            num_return_sequences: params.num_return_sequences,
            no_repeat_ngram_size: params.no_repeat_ngram_size,
            do_sample: params.temperature.is_some(),
            temperature: params.temperature,
            top_p: params.top_p,
            seed: params.seed,
            return_full_text: true,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RequestOptions {
    pub wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeneratedSequence {
    pub generated_text: String,
}

#[derive(Debug, Serialize)]
struct ClassificationRequest<'a> {
    inputs: &'a str,
    options: RequestOptions,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LabelScore {
    pub label: String,
    pub score: f32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ClassificationResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl ClassificationResponse {
    /// Highest-scoring label for the single input that was sent.
    pub(crate) fn top(self) -> Result<Classification, ClassificationError> {
        let scores = match self {
            ClassificationResponse::Nested(batches) => {
                batches.into_iter().next().unwrap_or_default()
            }
            ClassificationResponse::Flat(scores) => scores,
        };
        scores
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .map(|best| Classification {
                label: best.label,
                score: best.score,
            })
            .ok_or(ClassificationError::NoLabels)
    }
}

pub struct HostedGenerator {
    client: Client,
    endpoint: Url,
    model: String,
    token: Option<String>,
}

impl HostedGenerator {
    pub fn new(base_url: &str, model: String, token: Option<String>) -> Result<Self, CoreError> {
        let endpoint = model_endpoint(base_url, &model)?;
        Ok(Self {
            client: Client::new(),
            endpoint,
            model,
            token,
        })
    }

    pub fn from_config(config: &HostedConfig) -> Result<Self, CoreError> {
        Self::new(
            &config.base_url,
            config.generation_model.clone(),
            token_from_env(&config.token_env),
        )
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl TextGenerator for HostedGenerator {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, CoreError> {
        let body = GenerationRequest {
            inputs: prompt,
            parameters: GenerationParameters::from(params),
            options: RequestOptions {
                wait_for_model: true,
            },
        };

        debug!("Requesting generation from {}", self.endpoint);
        let mut request = self.client.post(self.endpoint.clone()).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;

        if let Some(failure) = failure_for_status(response.status()) {
            warn!(
                "Generation request to {} failed with {}",
                self.endpoint,
                response.status()
            );
            return Err(failure.into_generation_error(&self.model).into());
        }

        let sequences: Vec<GeneratedSequence> =
            response
                .json()
                .await
                .map_err(|_| GenerationError::InvalidResponseFormat {
                    provider: PROVIDER.to_string(),
                })?;

        sequences
            .into_iter()
            .next()
            .map(|sequence| sequence.generated_text)
            .ok_or_else(|| {
                GenerationError::InvalidResponseFormat {
                    provider: PROVIDER.to_string(),
                }
                .into()
            })
    }
}

pub struct HostedClassifier {
    client: Client,
    endpoint: Url,
    model: String,
    token: Option<String>,
}

impl HostedClassifier {
    pub fn new(base_url: &str, model: String, token: Option<String>) -> Result<Self, CoreError> {
        let endpoint = model_endpoint(base_url, &model)?;
        Ok(Self {
            client: Client::new(),
            endpoint,
            model,
            token,
        })
    }

    pub fn from_config(config: &HostedConfig) -> Result<Self, CoreError> {
        Self::new(
            &config.base_url,
            config.classifier_model.clone(),
            token_from_env(&config.token_env),
        )
    }
}

impl SentimentClassifier for HostedClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, CoreError> {
        let body = ClassificationRequest {
            inputs: text,
            options: RequestOptions {
                wait_for_model: true,
            },
        };

        debug!("Requesting classification from {}", self.endpoint);
        let mut request = self.client.post(self.endpoint.clone()).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;

        if let Some(failure) = failure_for_status(response.status()) {
            warn!(
                "Classification request to {} failed with {}",
                self.endpoint,
                response.status()
            );
            return Err(failure.into_classification_error(&self.model).into());
        }

        let parsed: ClassificationResponse =
            response
                .json()
                .await
                .map_err(|_| ClassificationError::InvalidResponseFormat {
                    provider: PROVIDER.to_string(),
                })?;

        Ok(parsed.top()?)
    }
}
