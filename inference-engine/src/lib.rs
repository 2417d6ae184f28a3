pub mod classifier;
pub mod fetch;
pub mod generator;
pub mod gpt2;
mod loader;

pub use classifier::{BertSentimentClassifier, SequenceClassifier};
pub use fetch::{ensure_model_files, require_model_files};
pub use generator::Gpt2Generator;

#[cfg(test)]
mod tests;
