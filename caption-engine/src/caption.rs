use instacaption_core::{CaptionLimit, ProfileSettings, FALLBACK_CAPTION};
use std::collections::HashSet;

/// Characters stripped from the front of a caption once the echoed prompt is gone.
const ECHO_TRIM_CHARS: &[char] = &['.', ',', ';', '!', '?', '-', ' '];

/// Case-insensitive `strip_prefix`.
pub fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let mut chars = text.char_indices();
    let mut end = 0;
    for expected in prefix.chars() {
        match chars.next() {
            Some((i, c)) if c.to_lowercase().eq(expected.to_lowercase()) => {
                end = i + c.len_utf8();
            }
            _ => return None,
        }
    }
    Some(&text[end..])
}

/// Removes the prompt when the model repeated it at the start.
pub fn strip_echo<'a>(generated: &'a str, prompt: &str) -> &'a str {
    let text = generated.trim();
    match strip_prefix_ignore_case(text, prompt) {
        Some(rest) => rest.trim().trim_start_matches(ECHO_TRIM_CHARS).trim(),
        None => text,
    }
}

pub fn truncate(text: &str, limit: CaptionLimit) -> String {
    match limit {
        CaptionLimit::Characters(max) => {
            if text.chars().count() > max {
                let kept: String = text.chars().take(max.saturating_sub(3)).collect();
                format!("{kept}...")
            } else {
                text.to_string()
            }
        }
        CaptionLimit::Words(max) => text.split_whitespace().take(max).collect::<Vec<_>>().join(" "),
    }
}

fn normalize_word(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase()
}

/// Turns raw model output into the caption for one profile.
#[derive(Debug, Clone)]
pub struct CaptionPolicy {
    limit: CaptionLimit,
    banned_words: HashSet<String>,
}

impl CaptionPolicy {
    pub fn new(limit: CaptionLimit, banned_words: &[String]) -> Self {
        Self {
            limit,
            banned_words: banned_words.iter().map(|w| normalize_word(w)).collect(),
        }
    }

    pub fn from_settings(settings: &ProfileSettings) -> Self {
        Self::new(settings.caption_limit, &settings.banned_words)
    }

    pub fn limit(&self) -> CaptionLimit {
        self.limit
    }

    pub fn is_banned(&self, word: &str) -> bool {
        self.banned_words.contains(&normalize_word(word))
    }

    pub fn filter_banned(&self, text: &str) -> String {
        if self.banned_words.is_empty() {
            return text.to_string();
        }
        text.split_whitespace()
            .filter(|word| !self.is_banned(word))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The fallback caption is never filtered; config validation keeps banned
    /// words out of it.
    pub fn clean(&self, generated: &str, prompt: &str) -> String {
        let caption = self.filter_banned(strip_echo(generated, prompt));
        if caption.is_empty() {
            return truncate(FALLBACK_CAPTION, self.limit);
        }

        let truncated = truncate(&caption, self.limit);
        if truncated == caption {
            return truncated;
        }
        match truncated.strip_suffix("...") {
            // a character cut can shorten a word into a banned one
            Some(kept) => {
                let kept = self.filter_banned(kept);
                if kept.is_empty() {
                    truncate(FALLBACK_CAPTION, self.limit)
                } else {
                    format!("{kept}...")
                }
            }
            None => truncated,
        }
    }
}
