use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::CoreError;

/// Fallback caption used when the cleaned model output is empty.
pub const FALLBACK_CAPTION: &str = "A beautiful moment captured.";

/// A trimmed, non-empty user prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    pub fn new(text: &str) -> Result<Self, CoreError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(CoreError::EmptyPrompt);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    /// Total token budget, prompt included.
    pub max_length: usize,
    pub num_return_sequences: usize,
    pub no_repeat_ngram_size: usize,
    /// Stop at the end-of-text token instead of filling `max_length`.
    pub early_stopping: bool,
    /// `None` means greedy decoding.
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub seed: Option<u64>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_length: 80,
            num_return_sequences: 1,
            no_repeat_ngram_size: 2,
            early_stopping: true,
            temperature: Some(1.0),
            top_p: Some(0.9),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    pub score: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a raw classifier label is turned into a [`SentimentLabel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelMapping {
    /// Lower-cased label must name a bucket exactly; anything else is unknown.
    Exact,
    /// "pos" and "neg" substrings pick a bucket, everything else is neutral.
    Substring,
}

impl LabelMapping {
    pub fn map(&self, raw_label: &str) -> Option<SentimentLabel> {
        let label = raw_label.to_lowercase();
        match self {
            LabelMapping::Exact => match label.as_str() {
                "positive" => Some(SentimentLabel::Positive),
                "negative" => Some(SentimentLabel::Negative),
                "neutral" => Some(SentimentLabel::Neutral),
                _ => None,
            },
            LabelMapping::Substring => {
                if label.contains("pos") {
                    Some(SentimentLabel::Positive)
                } else if label.contains("neg") {
                    Some(SentimentLabel::Negative)
                } else {
                    Some(SentimentLabel::Neutral)
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptionLimit {
    Characters(usize),
    Words(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagExtraction {
    /// Every prompt word longer than three characters.
    AnyWord,
    /// Same, but tokens with non-alphabetic characters are dropped.
    AlphabeticOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmojiSet(pub Vec<&'static str>);

impl EmojiSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &&'static str> {
        self.0.iter()
    }
}

impl fmt::Display for EmojiSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.concat())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashtagSet(pub Vec<String>);

impl HashtagSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

impl fmt::Display for HashtagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

#[derive(Debug, Clone)]
pub struct PostRecord {
    pub prompt: Prompt,
    pub caption: String,
    pub emojis: EmojiSet,
    pub hashtags: HashtagSet,
    /// `None` when the classifier label matched no bucket.
    pub sentiment: Option<SentimentLabel>,
    pub generated_at: DateTime<Local>,
}
