use chrono::Local;
use fastrand::Rng;
use instacaption_core::{CoreError, GenerationParams, PostRecord, ProfileSettings, Prompt};
use llm_interface::{SentimentClassifier, TextGenerator};
use post_store::PostStore;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::caption::CaptionPolicy;
use crate::emoji::select_emojis;
use crate::hashtags::select_hashtags;

#[derive(Debug, Clone)]
pub struct PostOutcome {
    pub record: PostRecord,
    pub path: PathBuf,
}

/// Prompt in, post file out. Models are injected so both front ends share
/// the same loaded instances.
pub struct PostPipeline<G, C> {
    generator: G,
    classifier: C,
    store: PostStore,
    settings: ProfileSettings,
    caption_policy: CaptionPolicy,
    params: GenerationParams,
    rng: Mutex<Rng>,
}

impl<G, C> PostPipeline<G, C>
where
    G: TextGenerator,
    C: SentimentClassifier,
{
    pub fn new(
        generator: G,
        classifier: C,
        store: PostStore,
        settings: ProfileSettings,
        params: GenerationParams,
    ) -> Self {
        let rng = match params.seed {
            Some(seed) => Rng::with_seed(seed),
            None => Rng::new(),
        };
        Self {
            generator,
            classifier,
            store,
            caption_policy: CaptionPolicy::from_settings(&settings),
            settings,
            params,
            rng: Mutex::new(rng),
        }
    }

    pub fn settings(&self) -> &ProfileSettings {
        &self.settings
    }

    pub fn store(&self) -> &PostStore {
        &self.store
    }

    fn rng(&self) -> MutexGuard<'_, Rng> {
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Builds the post without writing it.
    pub async fn compose(&self, prompt_text: &str) -> Result<PostRecord, CoreError> {
        let prompt = Prompt::new(prompt_text)?;
        info!("Generating post for prompt '{}'", prompt);

        let generated = self
            .generator
            .generate(prompt.as_str(), &self.params)
            .await?;
        debug!("Raw generation: {:?}", generated);

        let caption = self.caption_policy.clean(&generated, prompt.as_str());
        let classification = self.classifier.classify(&caption).await?;
        let sentiment = self.settings.label_mapping.map(&classification.label);
        debug!(
            "Classified caption as {} ({:.3}) -> {:?}",
            classification.label, classification.score, sentiment
        );

        let (emojis, hashtags) = {
            let mut rng = self.rng();
            let emojis = select_emojis(sentiment, &mut rng);
            let hashtags = select_hashtags(prompt.as_str(), self.settings.tag_extraction, &mut rng);
            (emojis, hashtags)
        };

        Ok(PostRecord {
            prompt,
            caption,
            emojis,
            hashtags,
            sentiment,
            generated_at: Local::now(),
        })
    }

    /// Builds the post and writes it to the store.
    pub async fn run(&self, prompt_text: &str) -> Result<PostOutcome, CoreError> {
        let record = self.compose(prompt_text).await?;
        let path = self
            .store
            .save(&record, self.settings.stamp_generated_at)
            .await?;
        Ok(PostOutcome { record, path })
    }
}
