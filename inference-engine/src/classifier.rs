use candle_core::{Device, IndexOp, Tensor, D};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use instacaption_core::{Classification, ClassificationError, CoreError, ModelError};
use llm_interface::SentimentClassifier;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::loader::{load_tokenizer, load_weights, read_json_config};

/// The parts of a sequence-classification `config.json` the head needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierHeadConfig {
    pub hidden_size: usize,
    pub max_position_embeddings: usize,
    #[serde(default)]
    pub id2label: HashMap<String, String>,
}

/// Orders `id2label` by class index. Gaps or non-numeric keys are rejected.
pub fn labels_from_id2label(id2label: &HashMap<String, String>) -> Option<Vec<String>> {
    let mut indexed = id2label
        .iter()
        .map(|(id, label)| id.parse::<usize>().ok().map(|id| (id, label.clone())))
        .collect::<Option<Vec<_>>>()?;
    indexed.sort_by_key(|(id, _)| *id);
    let contiguous = indexed.iter().enumerate().all(|(i, (id, _))| i == *id);
    if indexed.is_empty() || !contiguous {
        return None;
    }
    Some(indexed.into_iter().map(|(_, label)| label).collect())
}

/// Picks the most probable class.
pub fn pick_label(probabilities: &[f32], labels: &[String]) -> Result<Classification, ClassificationError> {
    let (index, score) = probabilities
        .iter()
        .copied()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .ok_or(ClassificationError::NoLabels)?;
    let label = labels
        .get(index)
        .ok_or(ClassificationError::UnknownClass { index })?;
    Ok(Classification {
        label: label.clone(),
        score,
    })
}

fn inference_failed(error: candle_core::Error) -> CoreError {
    ClassificationError::InferenceFailed {
        reason: error.to_string(),
    }
    .into()
}

/// BERT encoder with the pooler and linear head of a
/// `BertForSequenceClassification` checkpoint.
pub struct SequenceClassifier {
    bert: BertModel,
    pooler: Linear,
    classifier: Linear,
}

impl SequenceClassifier {
    pub fn load(
        vb: VarBuilder,
        bert_config: &BertConfig,
        hidden_size: usize,
        num_labels: usize,
    ) -> candle_core::Result<Self> {
        Ok(Self {
            bert: BertModel::load(vb.pp("bert"), bert_config)?,
            pooler: candle_nn::linear(hidden_size, hidden_size, vb.pp("bert.pooler.dense"))?,
            classifier: candle_nn::linear(hidden_size, num_labels, vb.pp("classifier"))?,
        })
    }

    /// Softmax over the labels for one sequence.
    pub fn probabilities(
        &self,
        ids: &[u32],
        type_ids: &[u32],
        device: &Device,
    ) -> candle_core::Result<Vec<f32>> {
        let input_ids = Tensor::new(ids, device)?.unsqueeze(0)?;
        let token_type_ids = Tensor::new(type_ids, device)?.unsqueeze(0)?;

        let hidden = self.bert.forward(&input_ids, &token_type_ids)?;
        let cls = hidden.i((.., 0))?;
        let pooled = self.pooler.forward(&cls)?.tanh()?;
        let logits = self.classifier.forward(&pooled)?;

        candle_nn::ops::softmax(&logits, D::Minus1)?
            .squeeze(0)?
            .to_vec1::<f32>()
    }
}

/// Sentiment classifier on the CPU. Clones share the loaded weights.
#[derive(Clone)]
pub struct BertSentimentClassifier {
    model: Arc<SequenceClassifier>,
    tokenizer: Arc<Tokenizer>,
    labels: Vec<String>,
    max_positions: usize,
    device: Device,
}

impl BertSentimentClassifier {
    /// `labels` replaces the checkpoint's `id2label` when given.
    pub fn load(model_dir: impl AsRef<Path>, labels: Option<Vec<String>>) -> Result<Self, CoreError> {
        let model_dir = model_dir.as_ref();
        let device = Device::Cpu;
        let config_path = model_dir.join("config.json");

        let bert_config: BertConfig = read_json_config(&config_path)?;
        let head: ClassifierHeadConfig = read_json_config(&config_path)?;
        let labels = match labels {
            Some(labels) => labels,
            None => labels_from_id2label(&head.id2label).ok_or_else(|| ModelError::InvalidConfig {
                path: config_path.display().to_string(),
                details: "id2label is missing or not indexed 0..n".to_string(),
            })?,
        };

        let tokenizer = load_tokenizer(model_dir)?;
        let vb = load_weights(model_dir, &device)?;
        let model = SequenceClassifier::load(vb, &bert_config, head.hidden_size, labels.len())
            .map_err(|_| ModelError::LoadingFailed {
                model_path: model_dir.display().to_string(),
            })?;

        info!(
            "Loaded sentiment classifier from {} with labels {:?}",
            model_dir.display(),
            labels
        );

        Ok(Self {
            model: Arc::new(model),
            tokenizer: Arc::new(tokenizer),
            labels,
            max_positions: head.max_position_embeddings,
            device,
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn classify_blocking(&self, text: &str) -> Result<Classification, CoreError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|_| ClassificationError::TokenizationFailed {
                text_length: text.chars().count(),
            })?;

        let mut ids = encoding.get_ids().to_vec();
        let mut type_ids = encoding.get_type_ids().to_vec();
        if ids.len() > self.max_positions {
            debug!(
                "Truncating classifier input from {} to {} tokens",
                ids.len(),
                self.max_positions
            );
            ids.truncate(self.max_positions);
            type_ids.truncate(self.max_positions);
        }

        let probabilities = self
            .model
            .probabilities(&ids, &type_ids, &self.device)
            .map_err(inference_failed)?;
        Ok(pick_label(&probabilities, &self.labels)?)
    }
}

impl SentimentClassifier for BertSentimentClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, CoreError> {
        let classifier = self.clone();
        let text = text.to_string();
        tokio::task::spawn_blocking(move || classifier.classify_blocking(&text))
            .await
            .map_err(|e| ClassificationError::InferenceFailed {
                reason: e.to_string(),
            })?
    }
}
