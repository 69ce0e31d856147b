//! Snapshot encoding for the index.
//!
//! A snapshot lists items sorted by key and relations sorted by endpoint
//! pair, so encoding is deterministic: the same index always produces the
//! same bytes, and `to_bytes(from_bytes(to_bytes(x))) == to_bytes(x)`.

use crate::index::IncrementalIndex;
use crate::store::StoreError;
use affinity_core::{Error, Item, Relation};
use serde::{Deserialize, Serialize};

/// Canonical, serializable form of an [`IncrementalIndex`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub items: Vec<Item>,
    pub relations: Vec<Relation>,
}

impl IncrementalIndex {
    /// Captures the index in canonical order.
    pub fn snapshot(&self) -> IndexSnapshot {
        let mut items: Vec<Item> = self.items.values().cloned().collect();
        items.sort_by(|a, b| a.key.cmp(&b.key));

        let mut relations = self.graph.relations();
        relations.sort_by(|a, b| a.endpoints().cmp(&b.endpoints()));

        IndexSnapshot { items, relations }
    }

    /// Rebuilds an index from a snapshot.
    ///
    /// Fails with [`Error::AlreadyExists`] on a repeated key and
    /// [`Error::NotFound`] on a relation naming an unknown item.
    pub fn from_snapshot(snapshot: IndexSnapshot) -> Result<Self, Error> {
        let mut index = IncrementalIndex::new();
        for item in snapshot.items {
            if index.items.contains_key(&item.key) {
                return Err(Error::AlreadyExists(item.key.to_string()));
            }
            index.graph.add_vertex(&item.key);
            index.tags.insert(&item);
            index.names.insert(&item.key);
            index.items.insert(item.key.clone(), item);
        }
        for relation in snapshot.relations {
            let (a, b) = relation.endpoints();
            if let Some(missing) = [a, b].into_iter().find(|key| !index.items.contains_key(*key)) {
                return Err(Error::NotFound(missing.to_string()));
            }
            index.graph.add(relation);
        }
        Ok(index)
    }

    /// Encodes the index with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        Ok(bincode::serialize(&self.snapshot())?)
    }

    /// Decodes an index produced by [`IncrementalIndex::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        let snapshot: IndexSnapshot = bincode::deserialize(bytes)?;
        Ok(Self::from_snapshot(snapshot)?)
    }
}
