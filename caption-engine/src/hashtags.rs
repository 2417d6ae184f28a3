use fastrand::Rng;
use instacaption_core::{HashtagSet, TagExtraction};
use std::collections::HashSet;

use crate::sample::sample;

pub const MAX_HASHTAGS: usize = 10;

pub const INSTAGRAM_HASHTAGS: &[&str] = &[
    "#instadaily",
    "#igers",
    "#picoftheday",
    "#photooftheday",
    "#love",
    "#instagood",
    "#travelgram",
    "#foodie",
    "#fashion",
    "#lifestyle",
    "#beautiful",
    "#happy",
    "#art",
    "#nature",
    "#inspiration",
    "#motivation",
    "#explore",
    "#discover",
];

/// Tags made from prompt words longer than three characters.
pub fn derive_tags(prompt: &str, extraction: TagExtraction) -> Vec<String> {
    prompt
        .to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() > 3)
        .filter(|word| match extraction {
            TagExtraction::AnyWord => true,
            TagExtraction::AlphabeticOnly => word.chars().all(char::is_alphabetic),
        })
        .map(|word| format!("#{word}"))
        .collect()
}

/// Derived tags followed by the static list, first occurrence kept.
pub fn candidate_tags(prompt: &str, extraction: TagExtraction) -> Vec<String> {
    let mut seen = HashSet::new();
    derive_tags(prompt, extraction)
        .into_iter()
        .chain(INSTAGRAM_HASHTAGS.iter().map(|tag| tag.to_string()))
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

pub fn select_hashtags(prompt: &str, extraction: TagExtraction, rng: &mut Rng) -> HashtagSet {
    let candidates = candidate_tags(prompt, extraction);
    HashtagSet(
        sample(&candidates, MAX_HASHTAGS, rng)
            .into_iter()
            .cloned()
            .collect(),
    )
}
