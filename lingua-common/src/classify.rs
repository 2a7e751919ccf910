//! Key/module inference and reclassification
//!
//! An item's *declared* module comes from which key field is populated.
//! The declared module is often wrong when the key's shape does not fit the
//! module, so [`route`] re-routes it before storage:
//!
//! - a multi-word "word" becomes a tense drill, a phrase, or a sentence
//! - a single-token "phrase" becomes a word
//!
//! Routing is pure: the same item always lands in the same module with the
//! same key, which is what lets a dry-run preview agree with the commit.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{Headword, Item, Module};

/// Multi-word phrases are at most this many tokens; longer ones are sentences
pub const MAX_PHRASE_TOKENS: usize = 3;

/// Characters that mark a key as a sentence rather than a phrase
const SENTENCE_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

/// Exercise prompts like "She ___ (to go) home" mark a tense drill
static TENSE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\(\s*to\s+\w+").expect("valid tense marker regex"));

/// Verb-tense shapes recognised at the start of a lower-cased key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensePattern {
    PastPerfect,
    ConditionalPerfect,
    FutureSimple,
    PresentContinuous,
}

static TENSE_PATTERNS: Lazy<Vec<(TensePattern, Regex)>> = Lazy::new(|| {
    [
        (TensePattern::PastPerfect, r"^had\s+\w+"),
        (TensePattern::ConditionalPerfect, r"^(would|could|should)\s+have\s+\w+"),
        (TensePattern::FutureSimple, r"^will\s+\w+"),
        (TensePattern::PresentContinuous, r"^(am|is|are)\s+\w+ing"),
    ]
    .into_iter()
    .map(|(pattern, re)| (pattern, Regex::new(re).expect("valid tense regex")))
    .collect()
});

impl TensePattern {
    /// Tag stored in the item's `tense` field
    pub fn tag(&self) -> &'static str {
        match self {
            TensePattern::PastPerfect => "past-perfect",
            TensePattern::ConditionalPerfect => "conditional-perfect",
            TensePattern::FutureSimple => "future-simple",
            TensePattern::PresentContinuous => "present-continuous",
        }
    }

    /// First matching pattern for an already lower-cased, trimmed key
    pub fn detect(lower: &str) -> Option<TensePattern> {
        TENSE_PATTERNS
            .iter()
            .find(|(_, re)| re.is_match(lower))
            .map(|(pattern, _)| *pattern)
    }
}

/// Module implied by the populated fields, before any reclassification
///
/// `phrase` → phrases, `connector` → conectors (even with a sentence),
/// `sentence` → structures, a tense tag or tense-marker prompt → tenses,
/// anything else → vocabulary. A `word` beside any of these fields keys the
/// item but does not decide its module.
pub fn declared_module(item: &Item) -> Module {
    if item.has_phrase() {
        return Module::Phrases;
    }
    if item.has_connector() {
        return Module::Conectors;
    }
    if item.has_sentence() {
        return Module::Structures;
    }
    let marked = item
        .first_exercise()
        .is_some_and(|ex| TENSE_MARKER.is_match(&ex.question));
    if item.tense.is_some() || marked {
        Module::Tenses
    } else {
        Module::Vocabulary
    }
}

/// Outcome of routing one submitted item
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedItem {
    /// Item with key fields rewritten for its final module
    pub item: Item,
    /// Lower-cased, trimmed canonical key after rewriting
    pub key: String,
    /// Module the submission implied
    pub declared: Module,
    /// Module the item will be stored under
    pub module: Module,
}

impl RoutedItem {
    pub fn rerouted(&self) -> bool {
        self.declared != self.module
    }
}

/// Infer, reclassify and normalize one item
///
/// Returns `None` when the item has no derivable key (no key field, no
/// example, no exercise answer); such items are skipped by callers.
pub fn route(item: Item) -> Option<RoutedItem> {
    let declared = declared_module(&item);
    let original = item.canonical_key()?.to_string();
    let lower = original.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }
    let multi_word = lower.contains(char::is_whitespace);

    let (item, module) = match declared {
        Module::Vocabulary if multi_word => {
            if let Some(pattern) = TensePattern::detect(&lower) {
                (item.into_tense_drill(pattern.tag(), original), Module::Tenses)
            } else if is_short_phrase(&lower, &original) {
                (item.into_phrase(original), Module::Phrases)
            } else {
                (item.into_sentence(original), Module::Structures)
            }
        }
        Module::Phrases if !multi_word => (item.into_word(lower), Module::Vocabulary),
        other => (item, other),
    };

    let item = normalize_key_field(item, module);
    let key = item.lookup_key()?;
    Some(RoutedItem {
        item,
        key,
        declared,
        module,
    })
}

/// At most [`MAX_PHRASE_TOKENS`] tokens and no sentence punctuation
fn is_short_phrase(lower: &str, original: &str) -> bool {
    lower.split_whitespace().count() <= MAX_PHRASE_TOKENS
        && !original.contains(SENTENCE_PUNCTUATION)
}

fn normalize_key_field(mut item: Item, module: Module) -> Item {
    item.head = match (module, item.head) {
        (Module::Conectors, Headword::Connector { connector, sentence }) => Headword::Connector {
            connector: connector.trim().to_lowercase(),
            sentence,
        },
        (Module::Phrases, Headword::Phrase(phrase)) => Headword::Phrase(phrase.trim().to_string()),
        (Module::Vocabulary, Headword::Word(word)) => Headword::Word(word.trim().to_lowercase()),
        (_, head) => head,
    };
    let shadowed = &mut item.shadowed;
    match module {
        Module::Conectors => {
            shadowed.connector = shadowed.connector.take().map(|c| c.trim().to_lowercase());
        }
        Module::Phrases => {
            shadowed.phrase = shadowed.phrase.take().map(|p| p.trim().to_string());
        }
        _ => {}
    }
    item
}
