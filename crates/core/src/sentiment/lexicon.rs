//! Keyword-count fallback classifier.
//!
//! Cues are matched as plain substrings of the lower-cased text, not as words, so
//! "up" also fires inside "upset" and "beats" fires both "beat" and "beats".
//! Changing that changes labels for existing data.

use crate::domain::Sentiment;

pub const POSITIVE_CUES: &[&str] = &[
    "good",
    "great",
    "positive",
    "gain",
    "up",
    "rise",
    "bull",
    "beat",
    "beats",
    "surge",
    "record",
    "strong",
    "growth",
    "increase",
    "outperform",
];

pub const NEGATIVE_CUES: &[&str] = &[
    "bad",
    "poor",
    "negative",
    "loss",
    "down",
    "drop",
    "fall",
    "bear",
    "miss",
    "missed",
    "decline",
    "weak",
    "decrease",
    "cut",
];

/// Positive cues present minus negative cues present. Each cue counts once.
pub fn score(text: &str) -> i32 {
    let lower = text.to_lowercase();
    let hits = |cues: &[&str]| cues.iter().filter(|cue| lower.contains(**cue)).count() as i32;
    hits(POSITIVE_CUES) - hits(NEGATIVE_CUES)
}

pub fn classify(text: &str) -> Sentiment {
    match score(text) {
        s if s > 0 => Sentiment::Positive,
        s if s < 0 => Sentiment::Negative,
        _ => Sentiment::Neutral,
    }
}
