//! Tag lookup for indexed items.

use affinity_core::{normalize, Item, ItemKey};
use std::collections::{BTreeSet, HashMap};

/// Maps normalized tags to the keys of items carrying them.
#[derive(Debug, Default, Clone)]
pub struct TagIndex {
    by_tag: HashMap<String, BTreeSet<ItemKey>>,
}

impl TagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every tag of `item`.
    pub fn insert(&mut self, item: &Item) {
        for tag in &item.tags {
            self.by_tag
                .entry(normalize(tag))
                .or_default()
                .insert(item.key.clone());
        }
    }

    /// Unregisters every tag of `item`, dropping buckets that become empty.
    pub fn remove(&mut self, item: &Item) {
        for tag in &item.tags {
            let tag = normalize(tag);
            if let Some(keys) = self.by_tag.get_mut(&tag) {
                keys.remove(&item.key);
                if keys.is_empty() {
                    self.by_tag.remove(&tag);
                }
            }
        }
    }

    /// Keys of items carrying `tag`, in key order.
    pub fn keys_with(&self, tag: &str) -> impl Iterator<Item = &ItemKey> {
        self.by_tag.get(&normalize(tag)).into_iter().flatten()
    }

    /// Number of distinct tags.
    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut index = TagIndex::new();
        index.insert(&Item::new("Trigun").with_tags(["Space", "Western"]));
        index.insert(&Item::new("Bebop").with_tags(["space"]));

        let keys: Vec<_> = index.keys_with("SPACE").map(ItemKey::as_str).collect();
        assert_eq!(keys, vec!["bebop", "trigun"]);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_remove_drops_empty_buckets() {
        let mut index = TagIndex::new();
        let item = Item::new("Trigun").with_tags(["space", "western"]);
        index.insert(&item);
        index.remove(&item);
        assert!(index.is_empty());
        assert_eq!(index.keys_with("space").count(), 0);
    }
}
