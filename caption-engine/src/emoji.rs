use fastrand::Rng;
use instacaption_core::{EmojiSet, SentimentLabel};

use crate::sample::sample;

pub const MAX_EMOJIS: usize = 3;

pub const POSITIVE_EMOJIS: &[&str] = &["😊", "🌟", "🔥", "💪", "🚀", "✨", "❤️", "👍", "😁", "🎉"];
pub const NEGATIVE_EMOJIS: &[&str] = &["😢", "😞", "💔", "😠", "😓", "👎", "😟", "😭", "🤦‍♀️"];
pub const NEUTRAL_EMOJIS: &[&str] = &["🙂", "😐", "🧐", "🤔", "😶", "👀", "🤷‍♀️", "👌"];
/// Used when the classifier label maps to no bucket.
pub const FALLBACK_EMOJIS: &[&str] = &["🙂"];

pub fn bucket(sentiment: Option<SentimentLabel>) -> &'static [&'static str] {
    match sentiment {
        Some(SentimentLabel::Positive) => POSITIVE_EMOJIS,
        Some(SentimentLabel::Negative) => NEGATIVE_EMOJIS,
        Some(SentimentLabel::Neutral) => NEUTRAL_EMOJIS,
        None => FALLBACK_EMOJIS,
    }
}

pub fn select_emojis(sentiment: Option<SentimentLabel>, rng: &mut Rng) -> EmojiSet {
    EmojiSet(
        sample(bucket(sentiment), MAX_EMOJIS, rng)
            .into_iter()
            .copied()
            .collect(),
    )
}
