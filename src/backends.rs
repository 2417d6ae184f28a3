//! Runtime choice between the local candle models and the hosted endpoint.

use inference_engine::{ensure_model_files, require_model_files};
use inference_engine::{BertSentimentClassifier, Gpt2Generator};
use instacaption_core::{
    AppConfig, Backend, Classification, CoreError, GenerationParams, ModelsConfig,
};
use llm_interface::{HostedClassifier, HostedGenerator, SentimentClassifier, TextGenerator};
use std::path::Path;
use tracing::info;

pub enum Generator {
    Local(Gpt2Generator),
    Hosted(HostedGenerator),
}

impl TextGenerator for Generator {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, CoreError> {
        match self {
            Generator::Local(generator) => generator.generate(prompt, params).await,
            Generator::Hosted(generator) => generator.generate(prompt, params).await,
        }
    }
}

pub enum Classifier {
    Local(BertSentimentClassifier),
    Hosted(HostedClassifier),
}

impl SentimentClassifier for Classifier {
    async fn classify(&self, text: &str) -> Result<Classification, CoreError> {
        match self {
            Classifier::Local(classifier) => classifier.classify(text).await,
            Classifier::Hosted(classifier) => classifier.classify(text).await,
        }
    }
}

async fn prepare_model_dir(models: &ModelsConfig, repo: &str, dir: &Path) -> Result<(), CoreError> {
    if models.fetch_missing {
        ensure_model_files(&models.hub_url, repo, dir).await?;
    } else {
        require_model_files(dir)?;
    }
    Ok(())
}

pub async fn load_generator(config: &AppConfig) -> Result<Generator, CoreError> {
    let generation = &config.generation;
    match generation.backend {
        Backend::Local => {
            prepare_model_dir(&config.models, &generation.repo, &generation.model_dir).await?;
            info!("Loading text generation model from {}", generation.model_dir.display());
            Ok(Generator::Local(Gpt2Generator::load(&generation.model_dir)?))
        }
        Backend::Hosted => {
            info!("Using hosted text generation model {}", config.hosted.generation_model);
            Ok(Generator::Hosted(HostedGenerator::from_config(&config.hosted)?))
        }
    }
}

pub async fn load_classifier(config: &AppConfig) -> Result<Classifier, CoreError> {
    let classifier = &config.classifier;
    match classifier.backend {
        Backend::Local => {
            prepare_model_dir(&config.models, &classifier.repo, &classifier.model_dir).await?;
            info!("Loading sentiment model from {}", classifier.model_dir.display());
            Ok(Classifier::Local(BertSentimentClassifier::load(
                &classifier.model_dir,
                classifier.labels.clone(),
            )?))
        }
        Backend::Hosted => {
            info!("Using hosted sentiment model {}", config.hosted.classifier_model);
            Ok(Classifier::Hosted(HostedClassifier::from_config(&config.hosted)?))
        }
    }
}
