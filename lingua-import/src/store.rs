//! Partition storage
//!
//! Each `(module, level)` pair is one collection of entries. The merge engine
//! only talks to [`PartitionStore`], so it runs the same against the JSON
//! file layout used in production and the in-memory double used in tests.
//!
//! A partition is unreadable only when it is not a JSON array. Irregular
//! elements inside the array are decoded leniently or kept verbatim.

use lingua_common::{Error, Item, PartitionEntry, PartitionId, Result};
use std::collections::{HashMap, HashSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Key-value access to persisted partitions
pub trait PartitionStore: Send + Sync {
    /// Load a partition
    ///
    /// `Ok(None)` when the partition does not exist yet; `Err` when it
    /// exists but cannot be read or is not a JSON array.
    fn read(&self, partition: PartitionId) -> Result<Option<Vec<PartitionEntry>>>;

    /// Replace a partition's contents
    fn write(&self, partition: PartitionId, entries: &[PartitionEntry]) -> Result<()>;

    /// Identifier reported in import summaries
    fn identifier(&self, partition: PartitionId) -> String {
        partition.file_path()
    }
}

// ========================================
// JSON files
// ========================================

/// One pretty-printed JSON array per partition: `<root>/<module>/lvl<n>.json`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, partition: PartitionId) -> PathBuf {
        self.root.join(partition.file_path())
    }
}

impl PartitionStore for JsonFileStore {
    fn read(&self, partition: PartitionId) -> Result<Option<Vec<PartitionEntry>>> {
        let path = self.path_of(partition);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::ReferenceDataUnavailable(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| Error::ReferenceDataUnavailable(format!("{}: {}", path.display(), e)))
    }

    /// Writes to a temp file beside the target, then renames it into place
    fn write(&self, partition: PartitionId, entries: &[PartitionEntry]) -> Result<()> {
        let path = self.path_of(partition);
        let id = partition.file_path();

        let write = || -> Result<()> {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            let json = serde_json::to_string_pretty(entries)?;
            let tmp = path.with_extension("json.tmp");
            std::fs::write(&tmp, json)?;
            std::fs::rename(&tmp, &path)?;
            Ok(())
        };

        write().map_err(|e| Error::partition_write(id, e))
    }
}

// ========================================
// In-memory
// ========================================

#[derive(Debug, Clone)]
enum Slot {
    Entries(Vec<PartitionEntry>),
    Corrupt,
}

/// In-memory store for tests and previews
///
/// Can simulate corrupt partitions and failing writes, and records every
/// write in order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    partitions: Mutex<HashMap<PartitionId, Slot>>,
    failing: Mutex<HashSet<PartitionId>>,
    writes: Mutex<Vec<PartitionId>>,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a partition
    pub fn insert(&self, partition: PartitionId, items: Vec<Item>) {
        let entries = items.into_iter().map(PartitionEntry::from).collect();
        self.insert_entries(partition, entries);
    }

    /// Seed a partition, including non-item elements
    pub fn insert_entries(&self, partition: PartitionId, entries: Vec<PartitionEntry>) {
        locked(&self.partitions).insert(partition, Slot::Entries(entries));
    }

    /// Make a partition unreadable until it is written again
    pub fn mark_corrupt(&self, partition: PartitionId) {
        locked(&self.partitions).insert(partition, Slot::Corrupt);
    }

    /// Make every write to `partition` fail
    pub fn fail_writes_to(&self, partition: PartitionId) {
        locked(&self.failing).insert(partition);
    }

    /// Current item entries, `None` if absent or corrupt
    pub fn get(&self, partition: PartitionId) -> Option<Vec<Item>> {
        self.entries(partition).map(|entries| {
            entries
                .into_iter()
                .filter_map(|entry| match entry {
                    PartitionEntry::Item(item) => Some(item),
                    PartitionEntry::Opaque(_) => None,
                })
                .collect()
        })
    }

    /// Current contents including non-item elements
    pub fn entries(&self, partition: PartitionId) -> Option<Vec<PartitionEntry>> {
        match locked(&self.partitions).get(&partition) {
            Some(Slot::Entries(entries)) => Some(entries.clone()),
            _ => None,
        }
    }

    /// Partitions written so far, in write order
    pub fn writes(&self) -> Vec<PartitionId> {
        locked(&self.writes).clone()
    }
}

impl PartitionStore for MemoryStore {
    fn read(&self, partition: PartitionId) -> Result<Option<Vec<PartitionEntry>>> {
        match locked(&self.partitions).get(&partition) {
            None => Ok(None),
            Some(Slot::Entries(entries)) => Ok(Some(entries.clone())),
            Some(Slot::Corrupt) => Err(Error::ReferenceDataUnavailable(format!(
                "{} is corrupt",
                partition.file_path()
            ))),
        }
    }

    fn write(&self, partition: PartitionId, entries: &[PartitionEntry]) -> Result<()> {
        if locked(&self.failing).contains(&partition) {
            return Err(Error::partition_write(
                partition.file_path(),
                Error::Io(std::io::Error::new(ErrorKind::Other, "simulated write failure")),
            ));
        }
        locked(&self.partitions).insert(partition, Slot::Entries(entries.to_vec()));
        locked(&self.writes).push(partition);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingua_common::{Level, Module};

    fn vocab(level: u8) -> PartitionId {
        PartitionId::new(Module::Vocabulary, Level::new(level).unwrap())
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        assert!(store.read(vocab(1)).unwrap().is_none());

        let entries = vec![PartitionEntry::from(Item::word("cat").with_translations(["gato"]))];
        store.write(vocab(1), &entries).unwrap();

        let path = dir.path().join("vocabulary").join("lvl1.json");
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("[\n  {"), "pretty-printed with two spaces");

        assert_eq!(store.read(vocab(1)).unwrap(), Some(entries));
    }

    #[test]
    fn test_file_store_keeps_irregular_entries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("vocabulary")).unwrap();
        std::fs::write(
            dir.path().join("vocabulary/lvl1.json"),
            r#"[{"word":"dog","translations":["perro"]},{"word":"cat","translations":["gato",null]},"note"]"#,
        )
        .unwrap();

        let store = JsonFileStore::new(dir.path());
        let entries = store.read(vocab(1)).unwrap().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].lookup_key().as_deref(), Some("cat"));
        assert_eq!(
            entries[1].as_item().map(|item| item.translations.clone()),
            Some(vec!["gato".to_string()])
        );
        assert_eq!(entries[2], PartitionEntry::Opaque(serde_json::json!("note")));
    }

    #[test]
    fn test_file_store_corrupt_partition() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("vocabulary")).unwrap();
        std::fs::write(dir.path().join("vocabulary/lvl2.json"), r#"{"word": "cat"}"#).unwrap();

        let store = JsonFileStore::new(dir.path());
        assert!(matches!(
            store.read(vocab(2)),
            Err(Error::ReferenceDataUnavailable(_))
        ));
    }

    #[test]
    fn test_file_store_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the module directory should be
        std::fs::write(dir.path().join("vocabulary"), "").unwrap();

        let store = JsonFileStore::new(dir.path());
        let err = store.write(vocab(1), &[]).unwrap_err();
        assert!(matches!(err, Error::PartitionWrite { ref partition, .. } if partition == "vocabulary/lvl1.json"));
    }

    #[test]
    fn test_memory_store_simulations() {
        let store = MemoryStore::new();
        store.mark_corrupt(vocab(3));
        assert!(store.read(vocab(3)).is_err());

        store.fail_writes_to(vocab(4));
        assert!(store.write(vocab(4), &[]).is_err());

        store.write(vocab(3), &[PartitionEntry::from(Item::word("dog"))]).unwrap();
        assert_eq!(store.get(vocab(3)).map(|items| items.len()), Some(1));
        assert_eq!(store.writes(), vec![vocab(3)]);
    }
}
