//! Distance ranking over the similarity graph.
//!
//! Single-source shortest paths over non-negative weights. Everything
//! reachable from the source ends up in the result with its cumulative
//! distance; vertices in other components are simply absent.
//!
//! The result is itself a priority queue so an entry recorded when its
//! vertex was popped can still be revised later. Relaxation is strict and
//! weights are non-negative, so a popped vertex never re-enters the
//! frontier and the revision path is kept structurally but never fires.
//! Admission rejects negative weights and the traversal treats one as an
//! invariant violation.
//!
//! An infinite weight is a valid relation: its far end is reached at
//! distance infinity and ranks after every finite distance.

use crate::graph::SimilarityGraph;
use affinity_core::{Error, ItemKey, PriorityQueue, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// One ranked item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranked {
    pub key: ItemKey,
    /// Cumulative weight of the shortest path from the source.
    pub distance: f64,
}

/// Output of one traversal.
#[derive(Debug, Clone)]
pub struct RankingResult {
    /// Where the traversal started.
    pub source: ItemKey,
    /// Finalized distances, revisable in place.
    queue: PriorityQueue<ItemKey, f64>,
    /// Time taken in milliseconds.
    pub query_time_ms: u64,
}

impl RankingResult {
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn contains(&self, key: &ItemKey) -> bool {
        self.queue.contains(key)
    }

    /// Shortest distance from the source, or `None` if unreachable.
    pub fn distance_of(&self, key: &ItemKey) -> Option<f64> {
        self.queue.priority_of(key)
    }

    /// Closest remaining entry (the source itself until popped).
    pub fn peek(&self) -> Result<(&ItemKey, f64)> {
        self.queue.peek()
    }

    pub fn pop(&mut self) -> Result<Ranked> {
        self.queue
            .pop()
            .map(|(key, distance)| Ranked { key, distance })
    }

    /// Every entry in ascending distance. Ties are broken by key.
    pub fn ordered(&self) -> Vec<Ranked> {
        let mut entries = self.queue.ordered_view();
        entries.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        entries
            .into_iter()
            .map(|(key, distance)| Ranked { key, distance })
            .collect()
    }

    /// The `k` closest entries, source included.
    pub fn top(&self, k: usize) -> Vec<Ranked> {
        let mut ordered = self.ordered();
        ordered.truncate(k);
        ordered
    }

    pub fn into_queue(self) -> PriorityQueue<ItemKey, f64> {
        self.queue
    }
}

/// Runs distance rankings over a [`SimilarityGraph`].
///
/// Traversal state is local to each call; the graph is only read, so any
/// number of rankings may run over an unchanging graph at once.
pub struct RankingEngine;

impl RankingEngine {
    /// Ranks every vertex reachable from `source`.
    pub fn run(graph: &SimilarityGraph, source: &ItemKey) -> Result<RankingResult> {
        Self::traverse(graph, source, None)
    }

    /// Like [`RankingEngine::run`], checking `cancel` once per frontier pop.
    pub fn run_with(
        graph: &SimilarityGraph,
        source: &ItemKey,
        cancel: &CancellationToken,
    ) -> Result<RankingResult> {
        Self::traverse(graph, source, Some(cancel))
    }

    fn traverse(
        graph: &SimilarityGraph,
        source: &ItemKey,
        cancel: Option<&CancellationToken>,
    ) -> Result<RankingResult> {
        let start = Instant::now();

        if !graph.contains(source) {
            return Err(Error::NotFound(source.to_string()));
        }

        let mut dist_to: HashMap<&ItemKey, f64> = HashMap::new();
        let mut frontier: PriorityQueue<&ItemKey, f64> = PriorityQueue::new();
        let mut result: PriorityQueue<ItemKey, f64> = PriorityQueue::new();

        dist_to.insert(source, 0.0);
        frontier.insert(source, 0.0)?;

        let mut pops = 0usize;
        while let Ok((u, _)) = frontier.pop() {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                return Err(Error::Cancelled);
            }
            pops += 1;

            let du = dist_to.get(u).copied().unwrap_or(f64::INFINITY);
            if result.contains(u) {
                result.change_priority(u, du)?;
            } else {
                result.insert(u.clone(), du)?;
            }

            for (v, weight) in graph.neighbors(u) {
                if weight < 0.0 {
                    return Err(Error::InvariantViolation(format!(
                        "negative weight {weight} between `{u}` and `{v}`"
                    )));
                }
                let candidate = du + weight;
                // Strict: re-opening on ties never terminates with zero weights.
                let improves = dist_to.get(v).map_or(true, |&current| candidate < current);
                if improves {
                    dist_to.insert(v, candidate);
                    frontier.insert_or_decrease(v, candidate);
                }
            }
        }

        let query_time_ms = start.elapsed().as_millis() as u64;
        debug!(
            "Ranked {} items from `{}` in {} pops ({} ms)",
            result.len(),
            source,
            pops,
            query_time_ms
        );

        Ok(RankingResult {
            source: source.clone(),
            queue: result,
            query_time_ms,
        })
    }
}

impl SimilarityGraph {
    /// Ranks every vertex reachable from `source` by distance.
    pub fn rank(&self, source: &ItemKey) -> Result<RankingResult> {
        RankingEngine::run(self, source)
    }
}
