//! Learning item data model
//!
//! Items arrive as loosely-shaped JSON objects where exactly one key field
//! (`word`, `phrase`, `connector`, `sentence`) is expected to be populated.
//! Internally the key field is a closed [`Headword`] variant so routing
//! transitions are explicit conversions instead of field deletions.
//!
//! Unknown item and exercise fields are carried through a flattened map and
//! written back unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

// ========================================
// Module
// ========================================

/// Exercise module an item is stored under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Module {
    /// Single tokens
    Vocabulary,
    /// Short multi-word phrases
    Phrases,
    /// Full sentences
    Structures,
    /// Discourse connectors (directory name keeps the historical spelling)
    Conectors,
    /// Tense-pattern drills
    Tenses,
}

impl Module {
    pub const ALL: [Module; 5] = [
        Module::Vocabulary,
        Module::Phrases,
        Module::Structures,
        Module::Conectors,
        Module::Tenses,
    ];

    /// Storage directory / wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Vocabulary => "vocabulary",
            Module::Phrases => "phrases",
            Module::Structures => "structures",
            Module::Conectors => "conectors",
            Module::Tenses => "tenses",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Module {
    type Err = Error;

    /// Accepts the storage names plus `connectors` as an alias for `conectors`
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "vocabulary" => Ok(Module::Vocabulary),
            "phrases" => Ok(Module::Phrases),
            "structures" => Ok(Module::Structures),
            "conectors" | "connectors" => Ok(Module::Conectors),
            "tenses" => Ok(Module::Tenses),
            other => Err(Error::InvalidInput(format!("Unknown module: {}", other))),
        }
    }
}

// ========================================
// Level
// ========================================

/// Proficiency level 1..=4 (A1, A2, B1, B2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Level(u8);

impl Level {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    pub const ALL: [Level; 4] = [Level(1), Level(2), Level(3), Level(4)];

    /// Returns `None` outside 1..=4
    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Level(value))
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// File stem used for the partition (`lvl3`)
    pub fn file_stem(&self) -> String {
        format!("lvl{}", self.0)
    }
}

impl Default for Level {
    fn default() -> Self {
        Level(1)
    }
}

impl TryFrom<u8> for Level {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Level::new(value).ok_or_else(|| {
            Error::InvalidInput(format!(
                "Level must be between {} and {}, got {}",
                Level::MIN,
                Level::MAX,
                value
            ))
        })
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> u8 {
        level.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// CEFR reference tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CefrTier {
    A1,
    A2,
    B1,
    B2,
}

impl CefrTier {
    /// Claim order: lower tiers claim shared words first
    pub const ALL: [CefrTier; 4] = [CefrTier::A1, CefrTier::A2, CefrTier::B1, CefrTier::B2];

    pub fn level(&self) -> Level {
        match self {
            CefrTier::A1 => Level(1),
            CefrTier::A2 => Level(2),
            CefrTier::B1 => Level(3),
            CefrTier::B2 => Level(4),
        }
    }

    /// Reference list file name (`a1.json`)
    pub fn file_name(&self) -> &'static str {
        match self {
            CefrTier::A1 => "a1.json",
            CefrTier::A2 => "a2.json",
            CefrTier::B1 => "b1.json",
            CefrTier::B2 => "b2.json",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CefrTier::A1 => "A1",
            CefrTier::A2 => "A2",
            CefrTier::B1 => "B1",
            CefrTier::B2 => "B2",
        }
    }
}

/// One persisted `(module, level)` collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionId {
    pub module: Module,
    pub level: Level,
}

impl PartitionId {
    pub fn new(module: Module, level: Level) -> Self {
        Self { module, level }
    }

    /// Relative storage path, `<module>/lvl<level>.json`
    pub fn file_path(&self) -> String {
        format!("{}/{}.json", self.module, self.level.file_stem())
    }

    /// Same module, every other level
    pub fn siblings(&self) -> impl Iterator<Item = PartitionId> + '_ {
        Level::ALL
            .into_iter()
            .filter(move |level| *level != self.level)
            .map(move |level| PartitionId::new(self.module, level))
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.level.file_stem())
    }
}

// ========================================
// Exercise
// ========================================

/// Exercise type tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExerciseKind {
    MultipleChoice,
    Reorder,
    Translate,
    /// Any tag this crate does not interpret (kept verbatim)
    Other(String),
}

impl ExerciseKind {
    pub fn as_str(&self) -> &str {
        match self {
            ExerciseKind::MultipleChoice => "multiple-choice",
            ExerciseKind::Reorder => "reorder",
            ExerciseKind::Translate => "translate",
            ExerciseKind::Other(tag) => tag,
        }
    }

    fn is_unspecified(&self) -> bool {
        self.as_str().is_empty()
    }
}

impl Default for ExerciseKind {
    fn default() -> Self {
        ExerciseKind::Other(String::new())
    }
}

impl From<String> for ExerciseKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "multiple-choice" => ExerciseKind::MultipleChoice,
            "reorder" => ExerciseKind::Reorder,
            "translate" => ExerciseKind::Translate,
            _ => ExerciseKind::Other(tag),
        }
    }
}

impl From<ExerciseKind> for String {
    fn from(kind: ExerciseKind) -> String {
        match kind {
            ExerciseKind::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

/// Words an exercise targets
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExerciseTargets {
    #[serde(default, deserialize_with = "lenient::strings")]
    pub words: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One drill attached to an item
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Exercise {
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient::kind",
        skip_serializing_if = "ExerciseKind::is_unspecified"
    )]
    pub kind: ExerciseKind,
    #[serde(default, deserialize_with = "lenient::text")]
    pub question: String,
    #[serde(
        default,
        deserialize_with = "lenient::opt_strings",
        skip_serializing_if = "Option::is_none"
    )]
    pub options: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub correct: String,
    #[serde(
        default,
        deserialize_with = "lenient::targets",
        skip_serializing_if = "Option::is_none"
    )]
    pub targets: Option<ExerciseTargets>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Exercise {
    /// Composite identity used when unioning exercise lists
    pub fn identity(&self) -> (&str, &str, &str) {
        (self.kind.as_str(), &self.question, &self.correct)
    }
}

// ========================================
// Item
// ========================================

/// The populated key field of an item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Headword {
    Word(String),
    Phrase(String),
    /// A connector may carry its example sentence
    Connector {
        connector: String,
        sentence: Option<String>,
    },
    Sentence(String),
    /// No key field; the item is keyed by its example or first exercise
    None,
}

impl Headword {
    /// Text of the key field, if any
    pub fn text(&self) -> Option<&str> {
        match self {
            Headword::Word(text) | Headword::Phrase(text) | Headword::Sentence(text) => Some(text),
            Headword::Connector { connector, .. } => Some(connector),
            Headword::None => None,
        }
    }
}

/// Key fields present beside a higher-priority headword
///
/// They never change the canonical key but still decide the declared
/// module and are written back with the item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShadowedKeys {
    pub phrase: Option<String>,
    pub connector: Option<String>,
    pub sentence: Option<String>,
}

impl ShadowedKeys {
    pub fn is_empty(&self) -> bool {
        self.phrase.is_none() && self.connector.is_none() && self.sentence.is_none()
    }
}

/// One learning unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ItemRecord", into = "ItemRecord")]
pub struct Item {
    pub head: Headword,
    pub shadowed: ShadowedKeys,
    pub tense: Option<String>,
    pub example: Option<String>,
    pub translations: Vec<String>,
    pub exercises: Vec<Exercise>,
    pub extra: Map<String, Value>,
}

impl Item {
    /// Bare item with the given key field and nothing else
    pub fn new(head: Headword) -> Self {
        Self {
            head,
            shadowed: ShadowedKeys::default(),
            tense: None,
            example: None,
            translations: Vec::new(),
            exercises: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn word(text: impl Into<String>) -> Self {
        Self::new(Headword::Word(text.into()))
    }

    pub fn phrase(text: impl Into<String>) -> Self {
        Self::new(Headword::Phrase(text.into()))
    }

    pub fn sentence(text: impl Into<String>) -> Self {
        Self::new(Headword::Sentence(text.into()))
    }

    pub fn connector(text: impl Into<String>) -> Self {
        Self::new(Headword::Connector {
            connector: text.into(),
            sentence: None,
        })
    }

    pub fn with_translations<I, S>(mut self, translations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.translations = translations.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_exercise(mut self, exercise: Exercise) -> Self {
        self.exercises.push(exercise);
        self
    }

    pub fn first_exercise(&self) -> Option<&Exercise> {
        self.exercises.first()
    }

    pub fn has_phrase(&self) -> bool {
        matches!(self.head, Headword::Phrase(_)) || self.shadowed.phrase.is_some()
    }

    pub fn has_connector(&self) -> bool {
        matches!(self.head, Headword::Connector { .. }) || self.shadowed.connector.is_some()
    }

    pub fn has_sentence(&self) -> bool {
        matches!(
            self.head,
            Headword::Sentence(_)
                | Headword::Connector {
                    sentence: Some(_),
                    ..
                }
        ) || self.shadowed.sentence.is_some()
    }

    /// Canonical key as written, by priority:
    /// key field > `example` > first exercise's `correct`
    pub fn canonical_key(&self) -> Option<&str> {
        self.head
            .text()
            .filter(|text| !text.is_empty())
            .or_else(|| self.example.as_deref().filter(|text| !text.is_empty()))
            .or_else(|| {
                self.first_exercise()
                    .map(|ex| ex.correct.as_str())
                    .filter(|text| !text.is_empty())
            })
    }

    /// Lower-cased, trimmed canonical key used for every comparison
    pub fn lookup_key(&self) -> Option<String> {
        self.canonical_key()
            .map(|key| key.trim().to_lowercase())
            .filter(|key| !key.is_empty())
    }

    /// Re-key as a tense drill; the original key text becomes the example
    pub fn into_tense_drill(mut self, tense: &str, example: String) -> Self {
        self.head = Headword::None;
        self.tense = Some(tense.to_string());
        self.example = Some(example);
        self
    }

    pub fn into_phrase(mut self, text: String) -> Self {
        self.head = Headword::Phrase(text);
        self
    }

    pub fn into_sentence(mut self, text: String) -> Self {
        self.head = Headword::Sentence(text);
        self
    }

    /// Re-key as a word; any phrase field is dropped with the old head
    pub fn into_word(mut self, text: String) -> Self {
        self.head = Headword::Word(text);
        self.shadowed.phrase = None;
        self
    }
}

/// Wire shape of an item
///
/// Fields are decoded leniently: `null` reads as absent, scalar values read
/// as text, and array entries that cannot be text are dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ItemRecord {
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    word: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    phrase: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    connector: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    sentence: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    tense: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
    example: Option<String>,
    #[serde(default, deserialize_with = "lenient::strings", skip_serializing_if = "Vec::is_empty")]
    translations: Vec<String>,
    #[serde(default, deserialize_with = "lenient::exercises", skip_serializing_if = "Vec::is_empty")]
    exercises: Vec<Exercise>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|text| !text.is_empty())
}

impl From<ItemRecord> for Item {
    fn from(record: ItemRecord) -> Self {
        let word = non_empty(record.word);
        let phrase = non_empty(record.phrase);
        let connector = non_empty(record.connector);
        let sentence = non_empty(record.sentence);

        let (head, shadowed) = if let Some(word) = word {
            let shadowed = ShadowedKeys {
                phrase,
                connector,
                sentence,
            };
            (Headword::Word(word), shadowed)
        } else if let Some(phrase) = phrase {
            let shadowed = ShadowedKeys {
                phrase: None,
                connector,
                sentence,
            };
            (Headword::Phrase(phrase), shadowed)
        } else if let Some(connector) = connector {
            (Headword::Connector { connector, sentence }, ShadowedKeys::default())
        } else if let Some(sentence) = sentence {
            (Headword::Sentence(sentence), ShadowedKeys::default())
        } else {
            (Headword::None, ShadowedKeys::default())
        };

        Item {
            head,
            shadowed,
            tense: non_empty(record.tense),
            example: non_empty(record.example),
            translations: record.translations,
            exercises: record.exercises,
            extra: record.extra,
        }
    }
}

impl From<Item> for ItemRecord {
    fn from(item: Item) -> Self {
        let mut record = ItemRecord {
            tense: item.tense,
            example: item.example,
            translations: item.translations,
            exercises: item.exercises,
            extra: item.extra,
            ..ItemRecord::default()
        };
        match item.head {
            Headword::Word(text) => record.word = Some(text),
            Headword::Phrase(text) => record.phrase = Some(text),
            Headword::Connector { connector, sentence } => {
                record.connector = Some(connector);
                record.sentence = sentence;
            }
            Headword::Sentence(text) => record.sentence = Some(text),
            Headword::None => {}
        }
        let ShadowedKeys {
            phrase,
            connector,
            sentence,
        } = item.shadowed;
        record.phrase = record.phrase.or(phrase);
        record.connector = record.connector.or(connector);
        record.sentence = record.sentence.or(sentence);
        record
    }
}

// ========================================
// Stored partition entries
// ========================================

/// One element of a stored partition
///
/// Elements that are not item objects are kept verbatim so a rewrite never
/// loses hand-edited data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PartitionEntry {
    Item(Item),
    Opaque(Value),
}

impl PartitionEntry {
    pub fn as_item(&self) -> Option<&Item> {
        match self {
            PartitionEntry::Item(item) => Some(item),
            PartitionEntry::Opaque(_) => None,
        }
    }

    pub fn as_item_mut(&mut self) -> Option<&mut Item> {
        match self {
            PartitionEntry::Item(item) => Some(item),
            PartitionEntry::Opaque(_) => None,
        }
    }

    /// Opaque entries have no key and are never matched or purged
    pub fn lookup_key(&self) -> Option<String> {
        self.as_item().and_then(Item::lookup_key)
    }
}

impl From<Item> for PartitionEntry {
    fn from(item: Item) -> Self {
        PartitionEntry::Item(item)
    }
}

/// Tolerant field decoders for hand-edited JSON
mod lenient {
    use super::{Exercise, ExerciseKind, ExerciseTargets};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn scalar_text(value: Value) -> Option<String> {
        match value {
            Value::String(text) => Some(text),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(scalar_text(Value::deserialize(d)?))
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(opt_text(d)?.unwrap_or_default())
    }

    pub fn kind<'de, D: Deserializer<'de>>(d: D) -> Result<ExerciseKind, D::Error> {
        Ok(opt_text(d)?.map(ExerciseKind::from).unwrap_or_default())
    }

    fn text_list(value: Value) -> Vec<String> {
        match value {
            Value::Array(values) => values.into_iter().filter_map(scalar_text).collect(),
            other => scalar_text(other).into_iter().collect(),
        }
    }

    pub fn strings<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(text_list(Value::deserialize(d)?))
    }

    pub fn opt_strings<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<String>>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Null => None,
            value => Some(text_list(value)),
        })
    }

    pub fn targets<'de, D: Deserializer<'de>>(d: D) -> Result<Option<ExerciseTargets>, D::Error> {
        Ok(serde_json::from_value(Value::deserialize(d)?).ok())
    }

    pub fn exercises<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Exercise>, D::Error> {
        let values = match Value::deserialize(d)? {
            Value::Array(values) => values,
            object @ Value::Object(_) => vec![object],
            _ => Vec::new(),
        };
        Ok(values
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(exercise) => Some(exercise),
                Err(e) => {
                    tracing::debug!(error = %e, "Dropping exercise that is not an object");
                    None
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_deserializes_word_with_exercises() {
        let item: Item = serde_json::from_value(json!({
            "word": "Cat",
            "translations": ["gato"],
            "exercises": [{
                "type": "multiple-choice",
                "question": "¿Qué significa cat?",
                "options": ["gato", "perro"],
                "correct": "gato"
            }]
        }))
        .unwrap();

        assert_eq!(item.head, Headword::Word("Cat".to_string()));
        assert_eq!(item.translations, vec!["gato"]);
        assert_eq!(item.exercises[0].kind, ExerciseKind::MultipleChoice);
        assert_eq!(item.canonical_key(), Some("Cat"));
        assert_eq!(item.lookup_key().as_deref(), Some("cat"));
    }

    #[test]
    fn test_connector_keeps_sentence() {
        let item: Item = serde_json::from_value(json!({
            "connector": "However",
            "sentence": "However, it rained."
        }))
        .unwrap();

        assert_eq!(
            item.head,
            Headword::Connector {
                connector: "However".to_string(),
                sentence: Some("However, it rained.".to_string()),
            }
        );

        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["connector"], "However");
        assert_eq!(back["sentence"], "However, it rained.");
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let raw = json!({
            "phrase": "good night",
            "image": "night.png",
            "exercises": [{ "type": "match", "question": "q", "correct": "c", "hint": "h" }]
        });
        let item: Item = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(item.exercises[0].kind, ExerciseKind::Other("match".to_string()));

        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn test_canonical_key_falls_back_to_example_then_exercise() {
        let mut item = Item::new(Headword::None).with_exercise(Exercise {
            correct: "had gone".to_string(),
            ..Exercise::default()
        });
        assert_eq!(item.canonical_key(), Some("had gone"));

        item.example = Some("Had Eaten".to_string());
        assert_eq!(item.canonical_key(), Some("Had Eaten"));
        assert_eq!(item.lookup_key().as_deref(), Some("had eaten"));
    }

    #[test]
    fn test_empty_key_fields_are_ignored() {
        let item: Item = serde_json::from_value(json!({ "word": "", "phrase": "hi there" })).unwrap();
        assert_eq!(item.head, Headword::Phrase("hi there".to_string()));

        let bare: Item = serde_json::from_value(json!({ "word": "   " })).unwrap();
        assert_eq!(bare.lookup_key(), None);
    }

    #[test]
    fn test_level_bounds() {
        assert!(Level::new(0).is_none());
        assert!(Level::new(5).is_none());
        assert_eq!(Level::new(4).map(|l| l.get()), Some(4));
        assert!(serde_json::from_value::<Level>(json!(7)).is_err());
    }

    #[test]
    fn test_partition_paths() {
        let id = PartitionId::new(Module::Conectors, Level::new(2).unwrap());
        assert_eq!(id.file_path(), "conectors/lvl2.json");
        assert_eq!(id.to_string(), "conectors:lvl2");

        let siblings: Vec<u8> = id.siblings().map(|p| p.level.get()).collect();
        assert_eq!(siblings, vec![1, 3, 4]);
    }

    #[test]
    fn test_module_aliases() {
        assert_eq!("connectors".parse::<Module>().unwrap(), Module::Conectors);
        assert_eq!("tenses".parse::<Module>().unwrap(), Module::Tenses);
        assert!("grammar".parse::<Module>().is_err());
    }

    #[test]
    fn test_irregular_fields_decode_leniently() {
        let item: Item = serde_json::from_value(json!({
            "word": "cat",
            "translations": ["gato", null, 7],
            "tense": null,
            "exercises": [
                {
                    "type": "multiple-choice",
                    "question": null,
                    "options": ["gato", 3, { "x": 1 }],
                    "correct": 42,
                    "targets": { "words": null }
                },
                "not an exercise"
            ]
        }))
        .unwrap();

        assert_eq!(item.translations, vec!["gato", "7"]);
        assert_eq!(item.tense, None);
        assert_eq!(item.exercises.len(), 1);
        let ex = &item.exercises[0];
        assert_eq!(ex.question, "");
        assert_eq!(ex.options, Some(vec!["gato".to_string(), "3".to_string()]));
        assert_eq!(ex.correct, "42");
        assert_eq!(ex.targets.as_ref().map(|t| t.words.len()), Some(0));

        let bare: Item = serde_json::from_value(json!({ "word": "dog", "translations": null })).unwrap();
        assert!(bare.translations.is_empty());
        assert_eq!(bare.lookup_key().as_deref(), Some("dog"));
    }

    #[test]
    fn test_shadowed_key_fields_round_trip() {
        let raw = json!({
            "word": "cat",
            "phrase": "the cat",
            "connector": "however",
            "sentence": "However, the cat slept."
        });
        let item: Item = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(item.head, Headword::Word("cat".to_string()));
        assert_eq!(item.shadowed.phrase.as_deref(), Some("the cat"));
        assert!(item.has_phrase() && item.has_connector() && item.has_sentence());
        assert_eq!(item.lookup_key().as_deref(), Some("cat"));

        assert_eq!(serde_json::to_value(&item).unwrap(), raw);
    }

    #[test]
    fn test_partition_entries_keep_non_items() {
        let raw = json!([{ "word": "dog" }, "stray note", 12, null]);
        let entries: Vec<PartitionEntry> = serde_json::from_value(raw.clone()).unwrap();

        assert!(matches!(entries[0], PartitionEntry::Item(_)));
        assert_eq!(entries[0].lookup_key().as_deref(), Some("dog"));
        assert!(entries[1..].iter().all(|e| e.lookup_key().is_none()));
        assert_eq!(serde_json::to_value(&entries).unwrap(), raw);

        assert!(serde_json::from_value::<Vec<PartitionEntry>>(json!({ "word": "dog" })).is_err());
    }
}
