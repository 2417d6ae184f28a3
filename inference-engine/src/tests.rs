#[cfg(test)]
mod tests {
    use crate::classifier::{
        labels_from_id2label, pick_label, ClassifierHeadConfig, SequenceClassifier,
    };
    use crate::fetch::{missing_model_files, require_model_files, resolve_url};
    use crate::generator::{banned_ngram_tokens, extend_tokens};
    use crate::gpt2::{Gpt2, Gpt2Config};
    use crate::loader::load_tokenizer;
    use crate::Gpt2Generator;
    use candle_core::{DType, Device, Tensor};
    use candle_nn::VarBuilder;
    use candle_transformers::models::bert::Config as BertConfig;
    use instacaption_core::{ClassificationError, CoreError, GenerationParams, ModelError};
    use llm_interface::TextGenerator;
    use std::collections::HashMap;
    use std::env;
    use std::path::PathBuf;

    fn scratch_dir() -> PathBuf {
        let dir = env::temp_dir().join(format!("instacaption_model_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn tiny_gpt2(vocab_size: usize) -> Gpt2 {
        let config = Gpt2Config {
            vocab_size,
            n_positions: 8,
            n_embd: 8,
            n_layer: 2,
            n_head: 2,
            layer_norm_epsilon: 1e-5,
        };
        Gpt2::load(VarBuilder::zeros(DType::F32, &Device::Cpu), &config).unwrap()
    }

    fn greedy_params(max_length: usize, early_stopping: bool) -> GenerationParams {
        GenerationParams {
            max_length,
            no_repeat_ngram_size: 0,
            early_stopping,
            temperature: None,
            top_p: None,
            seed: Some(7),
            ..GenerationParams::default()
        }
    }

    #[test]
    fn test_bigram_ban_after_repeat_prefix() {
        // "a b c a" -> the next token may not be "b" again
        let tokens = [1, 2, 3, 1];
        assert_eq!(banned_ngram_tokens(&tokens, 2), vec![2]);
    }

    #[test]
    fn test_bigram_ban_collects_every_continuation() {
        let tokens = [5, 7, 5, 9, 5];
        assert_eq!(banned_ngram_tokens(&tokens, 2), vec![7, 9]);
    }

    #[test]
    fn test_trigram_ban() {
        let tokens = [1, 2, 3, 4, 1, 2];
        assert_eq!(banned_ngram_tokens(&tokens, 3), vec![3]);
        assert!(banned_ngram_tokens(&tokens[..5], 3).is_empty());
    }

    #[test]
    fn test_ngram_ban_edge_cases() {
        assert!(banned_ngram_tokens(&[1, 2, 3], 0).is_empty());
        assert!(banned_ngram_tokens(&[], 2).is_empty());
        assert!(banned_ngram_tokens(&[4], 2).is_empty());
        // unigram ban forbids every token seen so far
        assert_eq!(banned_ngram_tokens(&[3, 1, 3], 1), vec![1, 3]);
    }

    #[test]
    fn test_gpt2_config_parsing() {
        let raw = r#"{
            "activation_function": "gelu_new",
            "n_ctx": 1024,
            "n_embd": 768,
            "n_head": 12,
            "n_layer": 12,
            "n_positions": 1024,
            "vocab_size": 50257
        }"#;
        let config: Gpt2Config = serde_json::from_str(raw).unwrap();
        assert_eq!(config.n_embd, 768);
        assert_eq!(config.n_positions, 1024);
        assert!((config.layer_norm_epsilon - 1e-5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_head_config_parsing() {
        let raw = r#"{
            "hidden_size": 768,
            "max_position_embeddings": 512,
            "id2label": {"0": "NEGATIVE", "1": "POSITIVE"}
        }"#;
        let config: ClassifierHeadConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(
            labels_from_id2label(&config.id2label),
            Some(vec!["NEGATIVE".to_string(), "POSITIVE".to_string()])
        );
    }

    #[test]
    fn test_id2label_rejects_gaps() {
        let mut id2label = HashMap::new();
        id2label.insert("0".to_string(), "negative".to_string());
        id2label.insert("2".to_string(), "positive".to_string());
        assert_eq!(labels_from_id2label(&id2label), None);

        id2label.insert("one".to_string(), "neutral".to_string());
        assert_eq!(labels_from_id2label(&id2label), None);
        assert_eq!(labels_from_id2label(&HashMap::new()), None);
    }

    #[test]
    fn test_pick_label() {
        let labels = vec!["negative".to_string(), "positive".to_string()];
        let classification = pick_label(&[0.1, 0.9], &labels).unwrap();
        assert_eq!(classification.label, "positive");
        assert!((classification.score - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_pick_label_errors() {
        let labels = vec!["negative".to_string()];
        assert!(matches!(
            pick_label(&[], &labels),
            Err(ClassificationError::NoLabels)
        ));
        assert!(matches!(
            pick_label(&[0.2, 0.8], &labels),
            Err(ClassificationError::UnknownClass { index: 1 })
        ));
    }

    #[test]
    fn test_resolve_url() {
        assert_eq!(
            resolve_url("https://huggingface.co/", "gpt2", "config.json"),
            "https://huggingface.co/gpt2/resolve/main/config.json"
        );
    }

    #[test]
    fn test_missing_model_files() {
        let dir = scratch_dir();
        std::fs::write(dir.join("config.json"), "{}").unwrap();

        let roles: Vec<_> = missing_model_files(&dir).iter().map(|f| f.role).collect();
        assert_eq!(roles, vec!["tokenizer", "weights"]);
        assert!(matches!(
            require_model_files(&dir),
            Err(CoreError::Model(ModelError::FileNotFound { ref path })) if path.ends_with("tokenizer.json")
        ));

        std::fs::write(dir.join("tokenizer.json"), "").unwrap();
        std::fs::write(dir.join("model.safetensors"), "").unwrap();
        assert!(missing_model_files(&dir).is_empty());
        assert!(require_model_files(&dir).is_ok());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_bert_era_files_satisfy_requirements() {
        let dir = scratch_dir();
        for file in ["config.json", "vocab.txt", "pytorch_model.bin"] {
            std::fs::write(dir.join(file), "").unwrap();
        }

        assert!(missing_model_files(&dir).is_empty());
        assert!(require_model_files(&dir).is_ok());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_tokenizer_from_vocab_txt() {
        let dir = scratch_dir();
        std::fs::write(
            dir.join("vocab.txt"),
            "[PAD]\n[UNK]\n[CLS]\n[SEP]\nhello\nworld\n##s\n",
        )
        .unwrap();

        let tokenizer = load_tokenizer(&dir).unwrap();
        let encoding = tokenizer.encode("Hello worlds", true).unwrap();
        assert_eq!(encoding.get_ids(), &[2, 4, 5, 6, 3]);
        assert_eq!(encoding.get_type_ids().len(), 5);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_tokenizer_fails_to_load() {
        let dir = scratch_dir();
        assert!(matches!(
            load_tokenizer(&dir),
            Err(CoreError::Model(ModelError::LoadingFailed { .. }))
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_gpt2_forward_returns_last_position_logits() {
        let model = tiny_gpt2(16);
        let input = Tensor::new(&[1u32, 2, 3], &Device::Cpu)
            .unwrap()
            .unsqueeze(0)
            .unwrap();

        let logits = model.forward(&input).unwrap();
        assert_eq!(logits.dims(), &[1, 16]);
        assert_eq!(logits.dtype(), DType::F32);
    }

    #[test]
    fn test_generation_stops_at_end_of_text() {
        // a one-token vocabulary always samples token 0
        let model = tiny_gpt2(1);
        let tokens = extend_tokens(&model, &Device::Cpu, Some(0), vec![0], &greedy_params(6, true))
            .unwrap();
        assert_eq!(tokens, vec![0, 0]);
    }

    #[test]
    fn test_generation_runs_to_max_length_without_early_stopping() {
        let model = tiny_gpt2(1);
        let tokens = extend_tokens(&model, &Device::Cpu, Some(0), vec![0], &greedy_params(6, false))
            .unwrap();
        assert_eq!(tokens.len(), 6);
    }

    #[test]
    fn test_generation_is_capped_by_context_size() {
        let model = tiny_gpt2(4);
        let tokens = extend_tokens(&model, &Device::Cpu, None, vec![1, 2], &greedy_params(100, true))
            .unwrap();
        assert_eq!(tokens.len(), model.max_positions());
    }

    #[test]
    fn test_classifier_head_returns_label_probabilities() {
        let config: BertConfig = serde_json::from_value(serde_json::json!({
            "vocab_size": 10,
            "hidden_size": 8,
            "num_hidden_layers": 1,
            "num_attention_heads": 2,
            "intermediate_size": 16,
            "hidden_act": "gelu",
            "hidden_dropout_prob": 0.1,
            "max_position_embeddings": 16,
            "type_vocab_size": 2,
            "initializer_range": 0.02,
            "layer_norm_eps": 1e-12,
            "pad_token_id": 0,
            "position_embedding_type": "absolute",
            "use_cache": false,
            "classifier_dropout": null,
            "model_type": "bert"
        }))
        .unwrap();
        let head =
            SequenceClassifier::load(VarBuilder::zeros(DType::F32, &Device::Cpu), &config, 8, 3)
                .unwrap();

        let probabilities = head.probabilities(&[2, 5, 3], &[0, 0, 0], &Device::Cpu).unwrap();
        assert_eq!(probabilities.len(), 3);
        assert!((probabilities.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        // zero weights give a uniform distribution
        assert!(probabilities.iter().all(|p| (p - 1.0 / 3.0).abs() < 1e-5));
    }

    /// A layer-less GPT-2 checkpoint on disk: embeddings and final norm only.
    fn write_tiny_checkpoint(dir: &std::path::Path) {
        let vocab = "[PAD]\n[UNK]\n[CLS]\n[SEP]\nhello\nworld\n";
        std::fs::write(dir.join("vocab.txt"), vocab).unwrap();
        std::fs::write(
            dir.join("config.json"),
            r#"{"vocab_size": 6, "n_positions": 8, "n_embd": 4, "n_layer": 0, "n_head": 1}"#,
        )
        .unwrap();

        let device = Device::Cpu;
        let tensors: HashMap<String, Tensor> = [
            ("wte.weight", Tensor::zeros((6, 4), DType::F32, &device)),
            ("wpe.weight", Tensor::zeros((8, 4), DType::F32, &device)),
            ("ln_f.weight", Tensor::ones(4, DType::F32, &device)),
            ("ln_f.bias", Tensor::zeros(4, DType::F32, &device)),
        ]
        .into_iter()
        .map(|(name, tensor)| (name.to_string(), tensor.unwrap()))
        .collect();
        candle_core::safetensors::save(&tensors, dir.join("model.safetensors")).unwrap();
    }

    #[tokio::test]
    async fn test_generator_runs_on_current_thread_runtime() {
        let dir = scratch_dir();
        write_tiny_checkpoint(&dir);

        let generator = Gpt2Generator::load(&dir).unwrap();
        let text = generator
            .generate("hello", &greedy_params(4, true))
            .await
            .unwrap();
        assert!(text.starts_with("hello"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
