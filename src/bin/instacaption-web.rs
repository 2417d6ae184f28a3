use anyhow::Context;
use instacaption::app::WEB_LOG_FILTER;
use instacaption::{build_pipeline, init_tracing};
use instacaption_core::{AppConfig, Profile, DEFAULT_CONFIG_FILE};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use web_form::FormState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(WEB_LOG_FILTER);

    let config = AppConfig::load_or_default(DEFAULT_CONFIG_FILE)
        .with_context(|| format!("failed to load {DEFAULT_CONFIG_FILE}"))?;
    let pipeline = build_pipeline(&config, Profile::Web)
        .await
        .context("failed to load models")?;

    let listener = TcpListener::bind(&config.web.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.web.bind))?;
    info!("Instagram post generator listening on http://{}", config.web.bind);

    web_form::serve(listener, Arc::new(FormState::new(pipeline))).await?;
    Ok(())
}
