use crate::index::IncrementalIndex;
use sled::Db;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sled(#[from] sled::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("Invalid snapshot: {0}")]
    Snapshot(#[from] affinity_core::Error),
}

/// Persists index snapshots in a sled database.
pub struct IndexStore {
    db: Db,
}

impl IndexStore {
    /// Opens or creates an index store at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Saves the entire index to the store.
    ///
    /// The snapshot is encoded with bincode and stored under a fixed key "main_index".
    pub fn save_index(&self, index: &IncrementalIndex) -> Result<(), StoreError> {
        let bytes = index.to_bytes()?;
        let len = bytes.len();
        self.db.insert("main_index", bytes)?;
        self.db.flush()?;
        info!("Saved index with {} items ({} bytes)", index.len(), len);
        Ok(())
    }

    /// Loads the index from the store.
    pub fn load_index(&self) -> Result<Option<IncrementalIndex>, StoreError> {
        if let Some(bytes) = self.db.get("main_index")? {
            let index = IncrementalIndex::from_bytes(&bytes)?;
            info!("Loaded index with {} items", index.len());
            Ok(Some(index))
        } else {
            Ok(None)
        }
    }

    /// Clears the stored index.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.db.remove("main_index")?;
        self.db.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission::AdmitAll;
    use crate::weight::JaccardDistance;
    use affinity_core::{Item, ItemKey};
    use tempfile::tempdir;

    #[test]
    fn test_save_load_index() {
        let dir = tempdir().unwrap();
        let store = IndexStore::open(dir.path()).unwrap();

        let mut index = IncrementalIndex::new();
        index.add_item(Item::new("a").with_tags(["x"]), &JaccardDistance, &AdmitAll).unwrap();
        index.add_item(Item::new("b").with_tags(["x", "y"]), &JaccardDistance, &AdmitAll).unwrap();

        store.save_index(&index).unwrap();

        let loaded = store.load_index().unwrap().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(
            loaded.graph().weight_between(&ItemKey::new("a"), &ItemKey::new("b")),
            Some(0.5)
        );
    }

    #[test]
    fn test_load_empty_store() {
        let dir = tempdir().unwrap();
        let store = IndexStore::open(dir.path()).unwrap();
        assert!(store.load_index().unwrap().is_none());
    }

    #[test]
    fn test_clear() {
        let dir = tempdir().unwrap();
        let store = IndexStore::open(dir.path()).unwrap();
        store.save_index(&IncrementalIndex::new()).unwrap();
        assert!(store.load_index().unwrap().is_some());

        store.clear().unwrap();
        assert!(store.load_index().unwrap().is_none());
    }
}
