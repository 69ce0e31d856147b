//! Incremental similarity index.
//!
//! Items are inserted one at a time. Each new item is scored against every
//! item already indexed and the admission policy decides which of those
//! pairs become relations. Queries resolve free text to a key and rank the
//! graph from there.

use crate::admission::AdmissionPolicy;
use crate::graph::SimilarityGraph;
use crate::ranking::{Ranked, RankingEngine, RankingResult};
use crate::resolver::{NameIndex, Resolver};
use crate::tag_index::TagIndex;
use crate::weight::WeightFunction;
use affinity_core::{Error, Item, ItemKey, Relation, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// What `add_item` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The item was indexed with this many relations.
    Inserted { admitted: usize },
    /// An item with the same key was already indexed; nothing changed.
    AlreadyIndexed,
}

/// Index statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub item_count: usize,
    pub relation_count: usize,
    pub tag_count: usize,
}

/// The similarity index. Owns the graph and the lookup structures that
/// follow it.
#[derive(Debug, Clone, Default)]
pub struct IncrementalIndex {
    pub(crate) graph: SimilarityGraph,
    pub(crate) items: HashMap<ItemKey, Item>,
    pub(crate) tags: TagIndex,
    pub(crate) names: NameIndex,
}

impl IncrementalIndex {
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes `item`, relating it to every admitted existing item.
    ///
    /// Adding a key that is already indexed is a no-op. A negative or NaN
    /// weight fails with [`Error::InvariantViolation`] before
    /// anything is modified.
    pub fn add_item<W, P>(&mut self, mut item: Item, weight_fn: &W, policy: &P) -> Result<AddOutcome>
    where
        W: WeightFunction + ?Sized,
        P: AdmissionPolicy + ?Sized,
    {
        item.key = ItemKey::new(item.key.as_str());
        if self.items.contains_key(&item.key) {
            debug!("Skipping `{}`: already indexed", item.key);
            return Ok(AddOutcome::AlreadyIndexed);
        }

        let relations = self.score(&item, weight_fn, policy)?;
        Ok(self.insert_scored(item, relations))
    }

    /// Replaces an item and recomputes all of its relations.
    ///
    /// Behaves as [`IncrementalIndex::remove_item`] followed by
    /// [`IncrementalIndex::add_item`], so an absent key is simply inserted.
    /// Weights are validated before the old item is removed, so a failed
    /// update leaves the index untouched.
    pub fn update_item<W, P>(&mut self, mut item: Item, weight_fn: &W, policy: &P) -> Result<AddOutcome>
    where
        W: WeightFunction + ?Sized,
        P: AdmissionPolicy + ?Sized,
    {
        item.key = ItemKey::new(item.key.as_str());

        let relations = self.score(&item, weight_fn, policy)?;
        self.remove_item(&item.key);
        Ok(self.insert_scored(item, relations))
    }

    /// Removes an item and every relation touching it.
    pub fn remove_item(&mut self, key: &ItemKey) -> Option<Item> {
        let item = self.items.remove(key)?;
        self.graph.remove([key]);
        self.tags.remove(&item);
        self.names.remove(key);
        debug!("Removed `{}`", key);
        Some(item)
    }

    /// Resolves `query` and ranks everything reachable from it.
    ///
    /// The source item itself leads the result at distance 0.
    pub fn search<R>(&self, query: &str, resolver: &R, limit: Option<usize>) -> Result<Vec<Ranked>>
    where
        R: Resolver + ?Sized,
    {
        let source = Self::resolve(query, resolver)?;
        let result = RankingEngine::run(&self.graph, &source)?;
        Ok(truncated(result, limit))
    }

    /// Like [`IncrementalIndex::search`], abandoning the traversal once
    /// `cancel` fires.
    pub fn search_with<R>(
        &self,
        query: &str,
        resolver: &R,
        limit: Option<usize>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Ranked>>
    where
        R: Resolver + ?Sized,
    {
        let source = Self::resolve(query, resolver)?;
        let result = RankingEngine::run_with(&self.graph, &source, cancel)?;
        Ok(truncated(result, limit))
    }

    /// Ranks from an already canonical key.
    pub fn rank(&self, key: &ItemKey) -> Result<RankingResult> {
        RankingEngine::run(&self.graph, key)
    }

    pub fn get(&self, key: &ItemKey) -> Option<&Item> {
        self.items.get(key)
    }

    pub fn contains(&self, key: &ItemKey) -> bool {
        self.items.contains_key(key)
    }

    /// Returns the number of indexed items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over all items.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Items carrying `tag`, in key order.
    pub fn items_with_tag(&self, tag: &str) -> Vec<&Item> {
        self.tags
            .keys_with(tag)
            .filter_map(|key| self.items.get(key))
            .collect()
    }

    /// Picks an indexed item uniformly at random.
    pub fn random_item(&self) -> Option<&Item> {
        self.graph
            .sample_vertex()
            .and_then(|key| self.items.get(key))
    }

    pub fn graph(&self) -> &SimilarityGraph {
        &self.graph
    }

    /// The name index, usable as the resolver for [`IncrementalIndex::search`].
    pub fn names(&self) -> &NameIndex {
        &self.names
    }

    /// Deep, independent copy of the whole index.
    pub fn duplicate(&self) -> IncrementalIndex {
        self.clone()
    }

    /// Returns index statistics.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            item_count: self.items.len(),
            relation_count: self.graph.edge_count(),
            tag_count: self.tags.len(),
        }
    }

    /// Scores `item` against every other indexed item and keeps the
    /// relations the policy admits.
    fn score<W, P>(&self, item: &Item, weight_fn: &W, policy: &P) -> Result<Vec<Relation>>
    where
        W: WeightFunction + ?Sized,
        P: AdmissionPolicy + ?Sized,
    {
        let mut admitted = Vec::new();
        for other in self.items.values().filter(|other| other.key != item.key) {
            let weight = weight_fn.weight(item, other);
            let relation = Relation::new(item.key.clone(), other.key.clone(), weight)?;
            if policy.admits(weight) {
                admitted.push(relation);
            }
        }
        Ok(admitted)
    }

    fn insert_scored(&mut self, item: Item, relations: Vec<Relation>) -> AddOutcome {
        let admitted = relations.len();
        self.graph.add_vertex(&item.key);
        for relation in relations {
            self.graph.add(relation);
        }
        self.tags.insert(&item);
        self.names.insert(&item.key);
        debug!(
            "Indexed `{}` with {} of {} candidate relations",
            item.key,
            admitted,
            self.items.len()
        );
        self.items.insert(item.key.clone(), item);
        AddOutcome::Inserted { admitted }
    }

    fn resolve<R: Resolver + ?Sized>(query: &str, resolver: &R) -> Result<ItemKey> {
        resolver
            .resolve(query)
            .ok_or_else(|| Error::NotFound(format!("no item matches `{query}`")))
    }
}

fn truncated(result: RankingResult, limit: Option<usize>) -> Vec<Ranked> {
    match limit {
        Some(k) => result.top(k),
        None => result.ordered(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission::{AdmitAll, Below};
    use crate::resolver::ExactResolver;
    use crate::weight::SharedTagDistance;

    fn key(s: &str) -> ItemKey {
        ItemKey::new(s)
    }

    fn constant_one(_: &Item, _: &Item) -> f64 {
        1.0
    }

    fn unrelated(_: &Item, _: &Item) -> f64 {
        f64::INFINITY
    }

    fn sample_items() -> Vec<Item> {
        vec![
            Item::new("Nate").with_tags(["tag1", "tag2", "tag3", "tag4"]),
            Item::new("Nathan").with_tags(["tag1", "tag2", "tag3", "tag4"]),
            Item::new("nathank").with_tags(["tag1", "tag7", "tag2", "tag4"]),
            Item::new("Haosen").with_tags(["tag6", "tag5", "tag3", "tag4"]),
            Item::new("haoli").with_tags(["tag1", "tag5", "tag6", "tag4"]),
        ]
    }

    fn complete_index() -> IncrementalIndex {
        let mut index = IncrementalIndex::new();
        for item in sample_items() {
            index
                .add_item(item, &SharedTagDistance::new(10.0), &AdmitAll)
                .unwrap();
        }
        index
    }

    #[test]
    fn test_complete_graph_without_threshold() {
        let index = complete_index();
        let n = index.len();
        assert_eq!(n, 5);
        assert_eq!(index.graph().edge_count(), n * (n - 1) / 2);
        for item in index.items() {
            assert_eq!(index.graph().edges_of(&item.key).len(), n - 1);
        }
    }

    #[test]
    fn test_threshold_admission() {
        let weight = |a: &Item, b: &Item| (a.score.unwrap_or(0.0) - b.score.unwrap_or(0.0)).abs();
        let policy = Below::new(2.0);
        let mut index = IncrementalIndex::new();
        index.add_item(Item::new("y").with_score(1.0), &weight, &policy).unwrap();
        index.add_item(Item::new("z").with_score(5.0), &weight, &policy).unwrap();

        let outcome = index
            .add_item(Item::new("x").with_score(2.0), &weight, &policy)
            .unwrap();
        assert_eq!(outcome, AddOutcome::Inserted { admitted: 1 });
        assert_eq!(index.graph().weight_between(&key("x"), &key("y")), Some(1.0));
        assert_eq!(index.graph().weight_between(&key("x"), &key("z")), None);

        // w == threshold is not admitted
        index.add_item(Item::new("w").with_score(3.0), &weight, &policy).unwrap();
        assert_eq!(index.graph().weight_between(&key("w"), &key("y")), None);
        assert_eq!(index.graph().weight_between(&key("w"), &key("x")), Some(1.0));
    }

    #[test]
    fn test_isolated_item_still_indexed() {
        let mut index = IncrementalIndex::new();
        let weight = |_: &Item, _: &Item| 100.0;
        index.add_item(Item::new("a"), &weight, &Below::new(1.0)).unwrap();
        index.add_item(Item::new("b"), &weight, &Below::new(1.0)).unwrap();

        assert_eq!(index.graph().size(), 2);
        assert_eq!(index.graph().edge_count(), 0);
        let ranked = index.search("b", index.names(), None).unwrap();
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn test_idempotent_add() {
        let mut index = complete_index();
        let before = index.stats();
        let outcome = index
            .add_item(
                Item::new("  NATE ").with_tags(["other"]),
                &SharedTagDistance::new(10.0),
                &AdmitAll,
            )
            .unwrap();
        assert_eq!(outcome, AddOutcome::AlreadyIndexed);
        assert_eq!(index.stats(), before);
        assert!(index.get(&key("nate")).unwrap().tags.contains("tag1"));
    }

    #[test]
    fn test_negative_weight_rejected_without_mutation() {
        let mut index = complete_index();
        let before = index.stats();
        let err = index
            .add_item(
                Item::new("greedy").with_tags(["tag1", "tag2", "tag3"]),
                &SharedTagDistance::new(2.0),
                &AdmitAll,
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvariantViolation(_)));
        assert_eq!(index.stats(), before);
        assert!(!index.contains(&key("greedy")));
        assert!(index.names().resolve("greedy").is_none());
    }

    #[test]
    fn test_remove_item_cascades() {
        let mut index = complete_index();
        let removed = index.remove_item(&key("haosen")).unwrap();
        assert_eq!(removed.name, "Haosen");

        assert!(!index.graph().contains(&key("haosen")));
        for item in index.items() {
            assert!(index
                .graph()
                .edges_of(&item.key)
                .iter()
                .all(|rel| !rel.touches(&key("haosen"))));
        }
        // tag6 was shared with haoli only
        let tag6: Vec<_> = index.items_with_tag("tag6").iter().map(|i| i.key.clone()).collect();
        assert_eq!(tag6, vec![key("haoli")]);
        assert_eq!(index.names().resolve("haosen"), None);
        assert_eq!(index.remove_item(&key("haosen")), None);
    }

    #[test]
    fn test_update_recomputes_edges() {
        let mut index = complete_index();
        let weight = SharedTagDistance::new(10.0);
        assert_eq!(index.graph().weight_between(&key("nate"), &key("haosen")), Some(8.0));

        index
            .update_item(
                Item::new("Haosen").with_tags(["tag1", "tag2", "tag3", "tag4"]),
                &weight,
                &AdmitAll,
            )
            .unwrap();
        assert_eq!(index.graph().weight_between(&key("nate"), &key("haosen")), Some(6.0));
        assert_eq!(index.len(), 5);
        assert_eq!(index.items_with_tag("tag6").len(), 1);
    }

    #[test]
    fn test_update_absent_item_inserts() {
        let mut index = complete_index();
        let outcome = index
            .update_item(Item::new("Fresh"), &constant_one, &AdmitAll)
            .unwrap();
        assert_eq!(outcome, AddOutcome::Inserted { admitted: 5 });
        assert!(index.contains(&key("fresh")));
        assert_eq!(index.len(), 6);
        assert_eq!(index.graph().weight_between(&key("fresh"), &key("nate")), Some(1.0));
    }

    #[test]
    fn test_infinite_weight_not_admitted_below_threshold() {
        let mut index = IncrementalIndex::new();
        for name in ["a", "b"] {
            let outcome = index
                .add_item(Item::new(name), &unrelated, &Below::new(1.0))
                .unwrap();
            assert_eq!(outcome, AddOutcome::Inserted { admitted: 0 });
        }
        assert_eq!(index.len(), 2);
        assert_eq!(index.stats().relation_count, 0);
    }

    #[test]
    fn test_infinite_weight_admitted_ranks_last() {
        let mut index = IncrementalIndex::new();
        index.add_item(Item::new("a"), &constant_one, &AdmitAll).unwrap();
        index.add_item(Item::new("b"), &constant_one, &AdmitAll).unwrap();
        index.add_item(Item::new("far"), &unrelated, &AdmitAll).unwrap();
        assert_eq!(
            index.graph().weight_between(&key("a"), &key("far")),
            Some(f64::INFINITY)
        );

        let ranked = index.search("a", index.names(), None).unwrap();
        let keys: Vec<&str> = ranked.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "far"]);
        assert_eq!(ranked[2].distance, f64::INFINITY);
    }

    #[test]
    fn test_search_orders_by_distance() {
        let index = complete_index();
        let ranked = index.search("nat", index.names(), None).unwrap();
        let keys: Vec<&str> = ranked.iter().map(|r| r.key.as_str()).collect();

        assert_eq!(keys[0], "nate");
        assert_eq!(ranked[0].distance, 0.0);
        assert_eq!(keys[1], "nathan");
        assert_eq!(ranked[1].distance, 6.0);
        assert!(ranked.windows(2).all(|w| w[0].distance <= w[1].distance));
        assert_eq!(ranked.len(), 5);
    }

    #[test]
    fn test_search_limit() {
        let index = complete_index();
        let ranked = index.search("nate", index.names(), Some(2)).unwrap();
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_search_unresolved() {
        let index = complete_index();
        let err = index.search("zzz", index.names(), None).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let exact = ExactResolver::new(index.items().map(|i| i.key.clone()));
        assert!(index.search("nat", &exact, None).is_err());
        assert!(index.search("Nate", &exact, None).is_ok());
    }

    #[test]
    fn test_search_with_cancelled_token() {
        let index = complete_index();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = index
            .search_with("nate", index.names(), None, &cancel)
            .unwrap_err();
        assert_eq!(err, Error::Cancelled);
    }

    #[test]
    fn test_random_item() {
        let mut index = IncrementalIndex::new();
        assert!(index.random_item().is_none());
        index.add_item(Item::new("only"), &SharedTagDistance::new(1.0), &AdmitAll).unwrap();
        assert_eq!(index.random_item().unwrap().name, "only");
    }

    #[test]
    fn test_duplicate_is_independent() {
        let index = complete_index();
        let mut copy = index.duplicate();
        copy.remove_item(&key("nate"));
        assert!(index.contains(&key("nate")));
        assert_eq!(index.len(), 5);
        assert_eq!(copy.len(), 4);
    }
}
