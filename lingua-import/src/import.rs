//! Import orchestrator
//!
//! Validates a submitted batch, routes every item (key/module inference,
//! reclassification, level assignment), groups items into `module:level`
//! buckets in first-seen order, and merges each bucket into its partition.
//!
//! [`Classifier::preview`] runs the exact same routing without touching
//! storage, so a dry run always matches the eventual commit.

use lingua_common::classify::{route, RoutedItem};
use lingua_common::level::detect_level;
use lingua_common::{CefrIndex, Error, Item, Level, Module, PartitionId, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info};

use crate::merge::{ImportMode, PartitionMerger, PartitionSummary};
use crate::store::PartitionStore;

/// Validated import request
#[derive(Debug, Clone)]
pub struct ImportRequest {
    /// Raw submitted items (each normally a JSON object)
    pub items: Vec<Value>,
    pub mode: ImportMode,
    /// Level used when no CEFR match is found
    pub default_level: Level,
}

impl ImportRequest {
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            items,
            mode: ImportMode::default(),
            default_level: Level::default(),
        }
    }

    pub fn with_mode(mut self, mode: ImportMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_default_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    /// Parse a submission body
    ///
    /// Accepts a bare array of items or `{ items, mode?, defaultLevel? }`.
    /// Fails with `InvalidInput` when `items` is missing, not an array, or
    /// empty, or when `mode`/`defaultLevel` are not valid.
    pub fn from_json(body: Value) -> Result<Self> {
        match body {
            Value::Array(items) => Self::validated(items, ImportMode::default(), Level::default()),
            Value::Object(mut fields) => {
                let items = match fields.remove("items") {
                    Some(Value::Array(items)) => items,
                    Some(Value::Null) | None => {
                        return Err(Error::InvalidInput("items array required".to_string()))
                    }
                    Some(_) => return Err(Error::InvalidInput("items must be an array".to_string())),
                };
                let mode = parse_mode(&fields)?;
                let default_level = parse_default_level(&fields)?;
                Self::validated(items, mode, default_level)
            }
            _ => Err(Error::InvalidInput(
                "request body must be an array of items or an object with items".to_string(),
            )),
        }
    }

    fn validated(items: Vec<Value>, mode: ImportMode, default_level: Level) -> Result<Self> {
        if items.is_empty() {
            return Err(Error::InvalidInput("items array required".to_string()));
        }
        Ok(Self {
            items,
            mode,
            default_level,
        })
    }
}

fn parse_mode(fields: &Map<String, Value>) -> Result<ImportMode> {
    match fields.get("mode") {
        None | Some(Value::Null) => Ok(ImportMode::default()),
        Some(Value::String(mode)) if mode == "append" => Ok(ImportMode::Append),
        Some(Value::String(mode)) if mode == "replace" => Ok(ImportMode::Replace),
        Some(other) => Err(Error::InvalidInput(format!(
            "mode must be 'append' or 'replace', got {}",
            other
        ))),
    }
}

fn parse_default_level(fields: &Map<String, Value>) -> Result<Level> {
    let raw = match fields.get("defaultLevel") {
        None | Some(Value::Null) => return Ok(Level::default()),
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        Some(_) => None,
    };
    raw.and_then(|n| u8::try_from(n).ok())
        .and_then(Level::new)
        .ok_or_else(|| {
            Error::InvalidInput(format!(
                "defaultLevel must be an integer between {} and {}",
                Level::MIN,
                Level::MAX
            ))
        })
}

/// Successful import response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    pub ok: bool,
    /// One entry per touched partition, in first-seen bucket order
    pub summary: Vec<PartitionSummary>,
}

/// One routed, levelled item
#[derive(Debug, Clone)]
pub struct Placement {
    pub routed: RoutedItem,
    pub level: Level,
    /// False when `level` came from the default level
    pub detected: bool,
}

impl Placement {
    pub fn partition(&self) -> PartitionId {
        PartitionId::new(self.routed.module, self.level)
    }
}

/// Routing result for a whole batch
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// Buckets in first-seen order
    pub buckets: Vec<(PartitionId, Vec<Placement>)>,
    /// Items with no derivable key
    pub skipped: usize,
}

/// Bucket line in a preview
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketPreview {
    /// `module:lvl<n>`
    pub partition: String,
    pub count: usize,
}

/// An item whose final module differs from the submitted one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reroute {
    pub key: String,
    pub from: Module,
    pub to: Module,
}

/// Dry-run report: what an import would do
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PreviewReport {
    pub buckets: Vec<BucketPreview>,
    /// Keys per module that fell back to the default level, sorted
    pub unassigned: BTreeMap<Module, Vec<String>>,
    pub reroutes: Vec<Reroute>,
    pub skipped: usize,
}

/// Routes and levels batches against one set of reference data
///
/// Never touches storage; [`Importer`] commits what it produces.
pub struct Classifier<'a> {
    wordlists: &'a CefrIndex,
}

impl<'a> Classifier<'a> {
    pub fn new(wordlists: &'a CefrIndex) -> Self {
        Self { wordlists }
    }

    /// Route and level every item, grouping by partition
    pub fn classify(&self, request: &ImportRequest) -> Classification {
        let mut classification = Classification::default();
        let mut index: HashMap<PartitionId, usize> = HashMap::new();

        for raw in &request.items {
            let Some(routed) = decode(raw).and_then(route) else {
                debug!("Skipping item with no derivable key");
                classification.skipped += 1;
                continue;
            };

            if routed.rerouted() {
                debug!(
                    key = %routed.key,
                    from = %routed.declared,
                    to = %routed.module,
                    "Item rerouted"
                );
            }

            let detected = detect_level(&routed.key, self.wordlists);
            let placement = Placement {
                level: detected.unwrap_or(request.default_level),
                detected: detected.is_some(),
                routed,
            };

            let partition = placement.partition();
            let slot = *index.entry(partition).or_insert_with(|| {
                classification.buckets.push((partition, Vec::new()));
                classification.buckets.len() - 1
            });
            classification.buckets[slot].1.push(placement);
        }

        classification
    }

    /// Report what [`Importer::run`] would do with the same reference data
    pub fn preview(&self, request: &ImportRequest) -> PreviewReport {
        let classification = self.classify(request);
        let mut unassigned: BTreeMap<Module, BTreeSet<String>> = BTreeMap::new();
        let mut reroutes = Vec::new();
        let mut buckets = Vec::with_capacity(classification.buckets.len());

        for (partition, placements) in &classification.buckets {
            buckets.push(BucketPreview {
                partition: partition.to_string(),
                count: placements.len(),
            });
            for placement in placements {
                let routed = &placement.routed;
                if !placement.detected {
                    unassigned
                        .entry(routed.module)
                        .or_default()
                        .insert(routed.key.clone());
                }
                if routed.rerouted() {
                    reroutes.push(Reroute {
                        key: routed.key.clone(),
                        from: routed.declared,
                        to: routed.module,
                    });
                }
            }
        }

        PreviewReport {
            buckets,
            unassigned: unassigned
                .into_iter()
                .map(|(module, keys)| (module, keys.into_iter().collect()))
                .collect(),
            reroutes,
            skipped: classification.skipped,
        }
    }
}

/// Runs imports against one store with one set of reference data
pub struct Importer<'a> {
    store: &'a dyn PartitionStore,
    classifier: Classifier<'a>,
}

impl<'a> Importer<'a> {
    pub fn new(store: &'a dyn PartitionStore, wordlists: &'a CefrIndex) -> Self {
        Self {
            store,
            classifier: Classifier::new(wordlists),
        }
    }

    /// Commit a batch
    ///
    /// Buckets are merged one at a time. A write failure aborts the import;
    /// partitions already written by earlier buckets stay on disk.
    pub fn run(&self, request: ImportRequest) -> Result<ImportOutcome> {
        let classification = self.classifier.classify(&request);
        let merger = PartitionMerger::new(self.store);
        let mut summary = Vec::with_capacity(classification.buckets.len());

        for (partition, placements) in classification.buckets {
            let batch: Vec<Item> = placements.into_iter().map(|p| p.routed.item).collect();
            summary.push(merger.merge(partition, batch, request.mode)?);
        }

        info!(
            items = request.items.len(),
            skipped = classification.skipped,
            partitions = summary.len(),
            added = summary.iter().map(|s| s.added).sum::<usize>(),
            "Import complete"
        );

        Ok(ImportOutcome { ok: true, summary })
    }
}

/// Raw JSON → item
///
/// Item fields decode leniently, so only entries that are not JSON objects
/// fail here; they are unresolvable.
fn decode(raw: &Value) -> Option<Item> {
    match serde_json::from_value::<Item>(raw.clone()) {
        Ok(item) => Some(item),
        Err(e) => {
            debug!(error = %e, "Submitted entry is not a valid item");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_array_body() {
        let request = ImportRequest::from_json(json!([{ "word": "cat" }])).unwrap();
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.mode, ImportMode::Append);
        assert_eq!(request.default_level, Level::default());
    }

    #[test]
    fn test_object_body_with_options() {
        let request = ImportRequest::from_json(json!({
            "items": [{ "word": "cat" }],
            "mode": "replace",
            "defaultLevel": 3
        }))
        .unwrap();
        assert_eq!(request.mode, ImportMode::Replace);
        assert_eq!(request.default_level.get(), 3);

        let request = ImportRequest::from_json(json!({
            "items": [{ "word": "cat" }],
            "defaultLevel": "2"
        }))
        .unwrap();
        assert_eq!(request.default_level.get(), 2);
    }

    #[test]
    fn test_invalid_bodies() {
        let cases = [
            json!({}),
            json!({ "items": null }),
            json!({ "items": "cat" }),
            json!({ "items": [] }),
            json!([]),
            json!("cat"),
            json!({ "items": [{ "word": "cat" }], "mode": "merge" }),
            json!({ "items": [{ "word": "cat" }], "defaultLevel": 9 }),
            json!({ "items": [{ "word": "cat" }], "defaultLevel": 1.5 }),
        ];
        for body in cases {
            let result = ImportRequest::from_json(body.clone());
            assert!(
                matches!(result, Err(Error::InvalidInput(_))),
                "expected InvalidInput for {}",
                body
            );
        }
    }

    #[test]
    fn test_irregular_submissions_still_classify() {
        let index = CefrIndex::from_raw_lists([vec!["cat", "dog"], vec![], vec![], vec![]]);
        let request = ImportRequest::from_json(json!([
            { "word": "cat", "translations": null },
            { "word": "dog", "exercises": [{ "type": "multiple-choice", "options": ["perro", 3], "correct": "perro" }] },
            42
        ]))
        .unwrap();

        let classification = Classifier::new(&index).classify(&request);
        assert_eq!(classification.skipped, 1);
        assert_eq!(classification.buckets.len(), 1);
        let (partition, placements) = &classification.buckets[0];
        assert_eq!(partition.file_path(), "vocabulary/lvl1.json");
        let keys: Vec<&str> = placements.iter().map(|p| p.routed.key.as_str()).collect();
        assert_eq!(keys, vec!["cat", "dog"]);
    }
}
