use instacaption_core::{Classification, CoreError, GenerationParams};
use std::future::Future;

pub mod hosted;

pub use hosted::{HostedClassifier, HostedGenerator};

/// Produces a text continuation for a prompt. The returned text includes the
/// prompt when the model echoes it.
pub trait TextGenerator {
    fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> impl Future<Output = Result<String, CoreError>> + Send;
}

pub trait SentimentClassifier {
    fn classify(&self, text: &str) -> impl Future<Output = Result<Classification, CoreError>> + Send;
}

#[cfg(test)]
mod tests;
