use caption_engine::PostPipeline;
use instacaption_core::{AppConfig, CoreError, Profile};
use post_store::PostStore;
use tracing_subscriber::EnvFilter;

use crate::backends::{load_classifier, load_generator, Classifier, Generator};

/// Quiet by default so log lines do not interleave with the interactive prompt.
pub const CLI_LOG_FILTER: &str = "warn";
pub const WEB_LOG_FILTER: &str =
    "instacaption=info,caption_engine=info,inference_engine=info,llm_interface=info,post_store=info,web_form=info";

pub type AppPipeline = PostPipeline<Generator, Classifier>;

/// `RUST_LOG` wins over `default_filter`. Logs go to stderr.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads both models and wires them into a pipeline for `profile`.
pub async fn build_pipeline(config: &AppConfig, profile: Profile) -> Result<AppPipeline, CoreError> {
    let generator = load_generator(config).await?;
    let classifier = load_classifier(config).await?;
    Ok(PostPipeline::new(
        generator,
        classifier,
        PostStore::new(&config.output.dir),
        config.profile_settings(profile),
        config.generation.params.clone(),
    ))
}
