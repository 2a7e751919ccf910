//! Level assignment
//!
//! A key found verbatim in the CEFR index takes that level. Otherwise the
//! key is split into word tokens, stop-words are skipped, and the lowest
//! level among the remaining indexed tokens wins. Keys with no indexed token
//! fall back to the caller's default level.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::model::Level;
use crate::wordlist::CefrIndex;

/// Tokens ignored when estimating a multi-word key's level
pub const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "so", "to", "of", "in", "on", "at", "by", "for", "with",
    "from", "as", "that", "this", "these", "those", "it", "its", "is", "am", "are", "was", "were",
    "be", "been", "being", "i", "you", "he", "she", "we", "they",
];

static STOP_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| STOP_WORDS.iter().copied().collect());

/// Latin letters (including Latin-1 accented) and apostrophes
static WORD_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zÀ-ÖØ-öø-ÿ']+").expect("valid word token regex"));

/// Level for a canonical key, or `None` when nothing in the index matches
pub fn detect_level(key: &str, index: &CefrIndex) -> Option<Level> {
    let lower = key.trim().to_lowercase();
    if let Some(level) = index.level_of(&lower) {
        return Some(level);
    }

    WORD_TOKEN
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|token| !STOP_SET.contains(*token))
        .filter_map(|token| index.level_of(token))
        .min()
}

/// Level for a canonical key, falling back to `default_level`
pub fn assign_level(key: &str, index: &CefrIndex, default_level: Level) -> Level {
    detect_level(key, index).unwrap_or(default_level)
}
