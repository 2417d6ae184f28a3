use candle_core::{Device, Tensor};
use candle_transformers::generation::LogitsProcessor;
use instacaption_core::{CoreError, GenerationError, GenerationParams, ModelError};
use llm_interface::TextGenerator;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use crate::gpt2::{Gpt2, Gpt2Config};
use crate::loader::{load_tokenizer, load_weights, read_json_config};

const END_OF_TEXT: &str = "<|endoftext|>";

/// Tokens that would complete an n-gram already present in `tokens`.
pub fn banned_ngram_tokens(tokens: &[u32], ngram_size: usize) -> Vec<u32> {
    if ngram_size == 0 || tokens.len() + 1 < ngram_size {
        return Vec::new();
    }
    let prefix = &tokens[tokens.len() + 1 - ngram_size..];
    let mut banned: Vec<u32> = tokens
        .windows(ngram_size)
        .filter(|window| &window[..ngram_size - 1] == prefix)
        .map(|window| window[ngram_size - 1])
        .collect();
    banned.sort_unstable();
    banned.dedup();
    banned
}

fn inference_failed(error: candle_core::Error) -> CoreError {
    GenerationError::InferenceFailed {
        reason: error.to_string(),
    }
    .into()
}

fn next_token_logits(
    model: &Gpt2,
    device: &Device,
    tokens: &[u32],
    banned: &[u32],
) -> candle_core::Result<Tensor> {
    let input = Tensor::new(tokens, device)?.unsqueeze(0)?;
    let logits = model.forward(&input)?.squeeze(0)?;
    if banned.is_empty() {
        return Ok(logits);
    }
    let mut values = logits.to_vec1::<f32>()?;
    for &token in banned {
        if let Some(value) = values.get_mut(token as usize) {
            *value = f32::NEG_INFINITY;
        }
    }
    Tensor::new(values.as_slice(), device)
}

/// Samples onto `tokens` until `max_length` (capped by the model's context)
/// or, with `early_stopping`, until `eos_token_id` is produced.
pub(crate) fn extend_tokens(
    model: &Gpt2,
    device: &Device,
    eos_token_id: Option<u32>,
    mut tokens: Vec<u32>,
    params: &GenerationParams,
) -> Result<Vec<u32>, CoreError> {
    let max_length = params.max_length.min(model.max_positions());
    if tokens.len() >= max_length {
        warn!(
            "Prompt already has {} tokens, max_length is {}; nothing generated",
            tokens.len(),
            max_length
        );
    }

    let seed = params.seed.unwrap_or_else(|| fastrand::u64(..));
    let mut processor = LogitsProcessor::new(seed, params.temperature, params.top_p);

    while tokens.len() < max_length {
        let banned = banned_ngram_tokens(&tokens, params.no_repeat_ngram_size);
        let logits = next_token_logits(model, device, &tokens, &banned).map_err(inference_failed)?;
        let next = processor.sample(&logits).map_err(inference_failed)?;
        tokens.push(next);

        if params.early_stopping && Some(next) == eos_token_id {
            debug!("End of text after {} tokens", tokens.len());
            break;
        }
    }
    Ok(tokens)
}

/// GPT-2 text generation on the CPU. Clones share the loaded weights.
#[derive(Clone)]
pub struct Gpt2Generator {
    model: Arc<Gpt2>,
    tokenizer: Arc<Tokenizer>,
    device: Device,
    eos_token_id: Option<u32>,
    model_dir: PathBuf,
}

impl Gpt2Generator {
    pub fn load(model_dir: impl AsRef<Path>) -> Result<Self, CoreError> {
        let model_dir = model_dir.as_ref();
        let device = Device::Cpu;

        let config: Gpt2Config = read_json_config(&model_dir.join("config.json"))?;
        let tokenizer = load_tokenizer(model_dir)?;
        let vb = load_weights(model_dir, &device)?;
        let model = Gpt2::load(vb, &config).map_err(|_| ModelError::LoadingFailed {
            model_path: model_dir.display().to_string(),
        })?;
        let eos_token_id = tokenizer.token_to_id(END_OF_TEXT);

        info!(
            "Loaded GPT-2 from {} ({} layers, {} heads)",
            model_dir.display(),
            config.n_layer,
            config.n_head
        );

        Ok(Self {
            model: Arc::new(model),
            tokenizer: Arc::new(tokenizer),
            device,
            eos_token_id,
            model_dir: model_dir.to_path_buf(),
        })
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    pub fn generate_blocking(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, CoreError> {
        let encoding = self.tokenizer.encode(prompt, false).map_err(|e| {
            GenerationError::TokenizationFailed {
                reason: e.to_string(),
            }
        })?;
        let tokens = encoding.get_ids().to_vec();
        if tokens.is_empty() {
            return Err(GenerationError::TokenizationFailed {
                reason: "prompt produced no tokens".to_string(),
            }
            .into());
        }
        if tokens.len() > self.model.max_positions() {
            return Err(GenerationError::PromptTooLong {
                prompt_tokens: tokens.len(),
                max_length: self.model.max_positions(),
            }
            .into());
        }

        let tokens = extend_tokens(&self.model, &self.device, self.eos_token_id, tokens, params)?;

        self.tokenizer.decode(&tokens, true).map_err(|e| {
            GenerationError::TokenizationFailed {
                reason: e.to_string(),
            }
            .into()
        })
    }
}

impl TextGenerator for Gpt2Generator {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, CoreError> {
        let generator = self.clone();
        let prompt = prompt.to_string();
        let params = params.clone();
        tokio::task::spawn_blocking(move || generator.generate_blocking(&prompt, &params))
            .await
            .map_err(|e| GenerationError::InferenceFailed {
                reason: e.to_string(),
            })?
    }
}
