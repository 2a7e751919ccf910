//! CEFR reference wordlists
//!
//! Four raw lists (A1, A2, B1, B2) are normalized into disjoint, ordered
//! tiers: entries are lower-cased and trimmed, blanks dropped, duplicates
//! removed within a list, and any word already claimed by a lower tier is
//! removed from the higher ones. The union is exposed as a word → level map.
//!
//! Loading never fails: a missing or corrupt list is logged and treated as
//! empty.

use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, warn};

use crate::model::{CefrTier, Level};
use crate::Error;

/// Immutable CEFR reference data, built once and shared across a batch
#[derive(Debug, Clone, Default)]
pub struct CefrIndex {
    tiers: [Vec<String>; 4],
    canonical: HashMap<String, Level>,
}

impl CefrIndex {
    /// Build from raw lists in tier order A1, A2, B1, B2
    pub fn from_raw_lists<S: AsRef<str>>(raw: [Vec<S>; 4]) -> Self {
        let mut canonical = HashMap::new();
        let mut tiers: [Vec<String>; 4] = Default::default();

        for (slot, (tier, list)) in CefrTier::ALL.iter().zip(raw.iter()).enumerate() {
            let level = tier.level();
            tiers[slot] = normalize_unique(list.iter().map(|w| w.as_ref()))
                .into_iter()
                .filter(|word| {
                    if canonical.contains_key(word) {
                        return false;
                    }
                    canonical.insert(word.clone(), level);
                    true
                })
                .collect();
        }

        Self { tiers, canonical }
    }

    /// Load `a1.json` .. `b2.json` from `dir`
    ///
    /// Each file is a JSON array of strings; non-string entries are ignored.
    pub fn load(dir: &Path) -> Self {
        let raw = CefrTier::ALL.map(|tier| match read_list(&dir.join(tier.file_name())) {
            Ok(words) => {
                debug!(tier = tier.label(), count = words.len(), "Loaded CEFR wordlist");
                words
            }
            Err(e) => {
                warn!(tier = tier.label(), error = %e, "CEFR wordlist unavailable, using empty list");
                Vec::new()
            }
        });
        Self::from_raw_lists(raw)
    }

    /// Level of an exact (already lower-cased) word
    pub fn level_of(&self, word: &str) -> Option<Level> {
        self.canonical.get(word).copied()
    }

    /// Normalized words claimed by `tier`, in first-seen order
    pub fn tier(&self, tier: CefrTier) -> &[String] {
        let slot = CefrTier::ALL
            .iter()
            .position(|t| *t == tier)
            .unwrap_or_default();
        &self.tiers[slot]
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }
}

/// Lower-case, trim, drop blanks, dedupe preserving first-seen order
fn normalize_unique<'a>(words: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    words
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty() && seen.insert(w.clone()))
        .collect()
}

fn read_list(path: &Path) -> crate::Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::ReferenceDataUnavailable(format!("{}: {}", path.display(), e))
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|e| {
        Error::ReferenceDataUnavailable(format!("{}: {}", path.display(), e))
    })?;
    match value {
        Value::Array(entries) => Ok(entries
            .into_iter()
            .filter_map(|entry| match entry {
                Value::String(word) => Some(word),
                _ => None,
            })
            .collect()),
        _ => Err(Error::ReferenceDataUnavailable(format!(
            "{}: not a JSON array",
            path.display()
        ))),
    }
}
