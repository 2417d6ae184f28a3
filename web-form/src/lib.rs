use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::{Form, Router};
use caption_engine::PostPipeline;
use instacaption_core::{CoreError, ErrorExt, ErrorReporter};
use llm_interface::{SentimentClassifier, TextGenerator};
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{info, info_span, Instrument};

pub mod view;

pub const EMPTY_PROMPT_MESSAGE: &str = "Please enter a prompt to generate an Instagram post.";

pub struct FormState<G, C> {
    pipeline: PostPipeline<G, C>,
    // one generation at a time, like a single-worker form server
    busy: Mutex<()>,
    reporter: ErrorReporter,
}

impl<G, C> FormState<G, C> {
    pub fn new(pipeline: PostPipeline<G, C>) -> Self {
        Self {
            pipeline,
            busy: Mutex::new(()),
            reporter: ErrorReporter::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PromptForm {
    #[serde(default)]
    pub prompt: String,
}

pub fn router<G, C>(state: Arc<FormState<G, C>>) -> Router
where
    G: TextGenerator + Send + Sync + 'static,
    C: SentimentClassifier + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(show_form).post(submit::<G, C>))
        .with_state(state)
}

async fn show_form() -> Html<String> {
    Html(view::render_page("", None))
}

async fn submit<G, C>(
    State(state): State<Arc<FormState<G, C>>>,
    Form(form): Form<PromptForm>,
) -> Html<String>
where
    G: TextGenerator + Send + Sync + 'static,
    C: SentimentClassifier + Send + Sync + 'static,
{
    let request_id = uuid::Uuid::new_v4();
    let output = generate_output(&state, &form.prompt)
        .instrument(info_span!("form_request", %request_id))
        .await;
    Html(view::render_page(&form.prompt, Some(&output)))
}

/// Runs the pipeline and turns the result, good or bad, into output-box text.
pub async fn generate_output<G, C>(state: &FormState<G, C>, prompt: &str) -> String
where
    G: TextGenerator + Send + Sync,
    C: SentimentClassifier + Send + Sync,
{
    let _guard = state.busy.lock().await;
    match state.pipeline.run(prompt).await {
        Ok(outcome) => {
            info!("Post saved to {}", outcome.path.display());
            view::result_text(&outcome)
        }
        Err(CoreError::EmptyPrompt) => {
            info!("Rejected empty prompt");
            EMPTY_PROMPT_MESSAGE.to_string()
        }
        Err(error) => {
            state.reporter.report_error(&error);
            format!("❌ An error occurred: {}", error.user_friendly_message())
        }
    }
}

pub async fn serve<G, C>(listener: TcpListener, state: Arc<FormState<G, C>>) -> Result<(), CoreError>
where
    G: TextGenerator + Send + Sync + 'static,
    C: SentimentClassifier + Send + Sync + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("Serving the caption form on http://{}", addr);
    }
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests;
