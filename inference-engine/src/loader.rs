use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use instacaption_core::{CoreError, ModelError};
use std::path::Path;
use tokenizers::models::wordpiece::WordPiece;
use tokenizers::models::ModelWrapper;
use tokenizers::normalizers::bert::BertNormalizer;
use tokenizers::normalizers::NormalizerWrapper;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::pre_tokenizers::PreTokenizerWrapper;
use tokenizers::processors::bert::BertProcessing;
use tokenizers::processors::PostProcessorWrapper;
use tokenizers::Tokenizer;
use tracing::debug;

pub(crate) fn read_json_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CoreError> {
    let raw = std::fs::read_to_string(path).map_err(|_| ModelError::FileNotFound {
        path: path.display().to_string(),
    })?;
    serde_json::from_str(&raw).map_err(|e| {
        ModelError::InvalidConfig {
            path: path.display().to_string(),
            details: e.to_string(),
        }
        .into()
    })
}

/// Uncased BERT tokenizer built from a WordPiece `vocab.txt`.
pub(crate) fn wordpiece_tokenizer(vocab_path: &Path) -> tokenizers::Result<Tokenizer> {
    let vocab = vocab_path.to_str().ok_or("vocab path is not valid UTF-8")?;
    let wordpiece = WordPiece::from_file(vocab)
        .unk_token("[UNK]".to_string())
        .build()?;

    let mut tokenizer = Tokenizer::new(ModelWrapper::from(wordpiece));
    let cls = tokenizer.token_to_id("[CLS]").ok_or("vocab has no [CLS] token")?;
    let sep = tokenizer.token_to_id("[SEP]").ok_or("vocab has no [SEP] token")?;
    tokenizer
        .with_normalizer(NormalizerWrapper::from(BertNormalizer::new(
            true, true, None, true,
        )))
        .with_pre_tokenizer(PreTokenizerWrapper::from(BertPreTokenizer))
        .with_post_processor(PostProcessorWrapper::from(BertProcessing::new(
            ("[SEP]".to_string(), sep),
            ("[CLS]".to_string(), cls),
        )));
    Ok(tokenizer)
}

/// `tokenizer.json` when present, otherwise a WordPiece tokenizer from `vocab.txt`.
pub(crate) fn load_tokenizer(model_dir: &Path) -> Result<Tokenizer, CoreError> {
    let json_path = model_dir.join("tokenizer.json");
    let vocab_path = model_dir.join("vocab.txt");
    let (path, tokenizer) = if json_path.exists() || !vocab_path.exists() {
        let tokenizer = Tokenizer::from_file(&json_path);
        (json_path, tokenizer)
    } else {
        debug!("No tokenizer.json in {}, using vocab.txt", model_dir.display());
        let tokenizer = wordpiece_tokenizer(&vocab_path);
        (vocab_path, tokenizer)
    };
    tokenizer.map_err(|_| {
        ModelError::LoadingFailed {
            model_path: path.display().to_string(),
        }
        .into()
    })
}

/// `model.safetensors` when present, otherwise the pickled `pytorch_model.bin`.
pub(crate) fn load_weights(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>, CoreError> {
    let safetensors = model_dir.join("model.safetensors");
    let (path, vb) = if safetensors.exists() {
        // SAFETY: the file is only read and is not modified while mapped
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[&safetensors], DType::F32, device) };
        (safetensors, vb)
    } else {
        let pth = model_dir.join("pytorch_model.bin");
        let vb = VarBuilder::from_pth(&pth, DType::F32, device);
        (pth, vb)
    };
    vb.map_err(|_| {
        ModelError::LoadingFailed {
            model_path: path.display().to_string(),
        }
        .into()
    })
}
