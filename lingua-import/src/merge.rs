//! Merge & dedupe engine
//!
//! Merges one `(module, level)` batch into its stored partition:
//! 1. Start from the stored items (or empty in replace mode / when the
//!    stored partition is unreadable)
//! 2. Items whose key is already present are unioned into the existing
//!    entry (translations, then exercises by `(type, question, correct)`)
//! 3. New keys are appended
//! 4. The partition is written back
//! 5. Newly added keys are purged from the module's other levels
//!
//! Step 5 keeps each key in at most one level per module even when a
//! re-import moves an item to a different level.

use lingua_common::{Item, PartitionEntry, PartitionId, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, warn};

use crate::store::PartitionStore;

/// How a batch combines with stored data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Merge into the stored partition
    #[default]
    Append,
    /// Discard the stored partition first
    Replace,
}

/// Per-partition import result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionSummary {
    /// Storage identifier, `<module>/lvl<n>.json`
    pub file: String,
    /// Keys appended by this batch
    pub added: usize,
    /// Entries in the partition after the merge
    pub total: usize,
}

/// Union `incoming` into `target`
///
/// Translations: existing first, then new ones, no blanks or duplicates.
/// Exercises: appended when their `(type, question, correct)` is new.
pub fn merge_into(target: &mut Item, incoming: Item) {
    let mut seen = HashSet::new();
    let translations: Vec<String> = std::mem::take(&mut target.translations)
        .into_iter()
        .chain(incoming.translations)
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect();
    target.translations = translations;

    let mut identities: HashSet<(String, String, String)> = target
        .exercises
        .iter()
        .map(|ex| owned_identity(ex.identity()))
        .collect();
    for exercise in incoming.exercises {
        if identities.insert(owned_identity(exercise.identity())) {
            target.exercises.push(exercise);
        }
    }
}

fn owned_identity((kind, question, correct): (&str, &str, &str)) -> (String, String, String) {
    (kind.to_string(), question.to_string(), correct.to_string())
}

/// Merges batches into partitions of one store
pub struct PartitionMerger<'a> {
    store: &'a dyn PartitionStore,
}

impl<'a> PartitionMerger<'a> {
    pub fn new(store: &'a dyn PartitionStore) -> Self {
        Self { store }
    }

    /// Merge `batch` (already routed to `partition`) and purge sibling levels
    ///
    /// Read failures are recovered as empty partitions. Write failures on
    /// this partition or on a purged sibling are returned.
    pub fn merge(
        &self,
        partition: PartitionId,
        batch: Vec<Item>,
        mode: ImportMode,
    ) -> Result<PartitionSummary> {
        let file = self.store.identifier(partition);

        let mut existing = match mode {
            ImportMode::Replace => Vec::new(),
            ImportMode::Append => self.load_or_empty(partition),
        };

        let mut seen: HashSet<String> = existing
            .iter()
            .filter_map(PartitionEntry::lookup_key)
            .collect();
        let mut added: Vec<String> = Vec::new();

        for item in batch {
            let Some(key) = item.lookup_key() else {
                continue;
            };
            if seen.contains(&key) {
                if let Some(target) = existing
                    .iter_mut()
                    .filter_map(PartitionEntry::as_item_mut)
                    .find(|e| e.lookup_key().as_deref() == Some(key.as_str()))
                {
                    merge_into(target, item);
                }
            } else {
                existing.push(PartitionEntry::Item(item));
                seen.insert(key.clone());
                added.push(key);
            }
        }

        self.store.write(partition, &existing)?;
        info!(
            partition = %partition,
            added = added.len(),
            total = existing.len(),
            "Partition merged"
        );

        let added_keys: HashSet<String> = added.iter().cloned().collect();
        self.purge_siblings(partition, &added_keys)?;

        Ok(PartitionSummary {
            file,
            added: added.len(),
            total: existing.len(),
        })
    }

    fn load_or_empty(&self, partition: PartitionId) -> Vec<PartitionEntry> {
        match self.store.read(partition) {
            Ok(Some(items)) => items,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(partition = %partition, error = %e, "Stored partition unreadable, starting empty");
                Vec::new()
            }
        }
    }

    /// Remove `keys` from every other level of the same module
    fn purge_siblings(&self, partition: PartitionId, keys: &HashSet<String>) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }

        for sibling in partition.siblings() {
            let items = match self.store.read(sibling) {
                Ok(Some(items)) if !items.is_empty() => items,
                Ok(_) => continue,
                Err(e) => {
                    warn!(partition = %sibling, error = %e, "Skipping unreadable sibling partition");
                    continue;
                }
            };

            let before = items.len();
            let kept: Vec<PartitionEntry> = items
                .into_iter()
                .filter(|entry| {
                    entry
                        .lookup_key()
                        .map_or(true, |key| !keys.contains(&key))
                })
                .collect();

            if kept.len() != before {
                self.store.write(sibling, &kept)?;
                info!(
                    partition = %sibling,
                    removed = before - kept.len(),
                    moved_to = %partition,
                    "Purged keys now stored at another level"
                );
            }
        }
        Ok(())
    }
}
