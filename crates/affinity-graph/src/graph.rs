//! Core similarity graph.
//!
//! The SimilarityGraph wraps a petgraph stable undirected graph and keeps a
//! key index beside it. Stable indices matter here: removing a vertex must
//! not invalidate the index entries of every other vertex.
//!
//! petgraph stores each undirected edge once and lists it from both
//! endpoints, so symmetry holds by construction, and `remove_node` drops
//! every incident edge from both sides.

use affinity_core::{ItemKey, Relation};
use petgraph::stable_graph::{NodeIndex, StableUnGraph};
use petgraph::visit::EdgeRef;
use rand::seq::IteratorRandom;
use std::collections::HashMap;

/// Adjacency store mapping each item key to its incident relations.
#[derive(Debug, Clone)]
pub struct SimilarityGraph {
    /// Vertices carry their key, edges their weight.
    graph: StableUnGraph<ItemKey, f64>,

    /// Maps keys to graph node indexes.
    id_index: HashMap<ItemKey, NodeIndex>,
}

impl Default for SimilarityGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SimilarityGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self {
            graph: StableUnGraph::default(),
            id_index: HashMap::new(),
        }
    }

    /// Registers an isolated vertex. No-op if the key is already present.
    pub fn add_vertex(&mut self, key: &ItemKey) {
        self.ensure_vertex(key);
    }

    /// Adds a relation, registering both endpoints as needed.
    ///
    /// If the pair is already connected the weight is replaced and the
    /// previous weight returned.
    pub fn add(&mut self, relation: Relation) -> Option<f64> {
        let (a, b) = relation.endpoints();
        let ia = self.ensure_vertex(a);
        let ib = self.ensure_vertex(b);

        let previous = self
            .graph
            .find_edge(ia, ib)
            .and_then(|edge| self.graph.edge_weight(edge).copied());
        self.graph.update_edge(ia, ib, relation.weight());
        previous
    }

    /// Removes vertices and every relation touching them.
    ///
    /// Absent keys are ignored. Returns how many vertices were removed.
    pub fn remove<'a, I>(&mut self, keys: I) -> usize
    where
        I: IntoIterator<Item = &'a ItemKey>,
    {
        let mut removed = 0;
        for key in keys {
            if let Some(index) = self.id_index.remove(key) {
                self.graph.remove_node(index);
                removed += 1;
            }
        }
        removed
    }

    /// Relations incident to `key`. Empty if the key is absent.
    pub fn edges_of(&self, key: &ItemKey) -> Vec<Relation> {
        self.neighbors(key)
            .filter_map(|(other, weight)| Relation::new(key.clone(), other.clone(), weight).ok())
            .collect()
    }

    /// Neighbors of `key` with the weight of the connecting relation.
    pub fn neighbors<'a>(&'a self, key: &ItemKey) -> impl Iterator<Item = (&'a ItemKey, f64)> + 'a {
        let graph = &self.graph;
        self.id_index
            .get(key)
            .copied()
            .into_iter()
            .flat_map(move |index| {
                graph.edges(index).map(move |edge| {
                    let other = if edge.source() == index {
                        edge.target()
                    } else {
                        edge.source()
                    };
                    (&graph[other], *edge.weight())
                })
            })
    }

    /// Weight of the relation between `a` and `b`, if any.
    pub fn weight_between(&self, a: &ItemKey, b: &ItemKey) -> Option<f64> {
        let ia = *self.id_index.get(a)?;
        let ib = *self.id_index.get(b)?;
        let edge = self.graph.find_edge(ia, ib)?;
        self.graph.edge_weight(edge).copied()
    }

    pub fn contains(&self, key: &ItemKey) -> bool {
        self.id_index.contains_key(key)
    }

    /// Returns the number of vertices.
    pub fn size(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Returns the number of relations.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Iterates over all vertex keys.
    pub fn keys(&self) -> impl Iterator<Item = &ItemKey> + '_ {
        self.graph
            .node_indices()
            .filter_map(|index| self.graph.node_weight(index))
    }

    /// Every relation in the graph, each reported once.
    pub fn relations(&self) -> Vec<Relation> {
        self.graph
            .edge_indices()
            .filter_map(|edge| {
                let (ia, ib) = self.graph.edge_endpoints(edge)?;
                let weight = *self.graph.edge_weight(edge)?;
                let a = self.graph.node_weight(ia)?;
                let b = self.graph.node_weight(ib)?;
                Relation::new(a.clone(), b.clone(), weight).ok()
            })
            .collect()
    }

    /// Picks a vertex uniformly at random.
    pub fn sample_vertex(&self) -> Option<&ItemKey> {
        self.keys().choose(&mut rand::thread_rng())
    }

    /// Deep, independent copy of the graph.
    pub fn duplicate(&self) -> SimilarityGraph {
        self.clone()
    }

    /// Removes every vertex and relation.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.id_index.clear();
    }

    fn ensure_vertex(&mut self, key: &ItemKey) -> NodeIndex {
        if let Some(&index) = self.id_index.get(key) {
            return index;
        }
        let index = self.graph.add_node(key.clone());
        self.id_index.insert(key.clone(), index);
        index
    }
}

/// Structural equality: same vertices, same relations, same weights.
impl PartialEq for SimilarityGraph {
    fn eq(&self, other: &Self) -> bool {
        self.size() == other.size()
            && self.edge_count() == other.edge_count()
            && self.keys().all(|key| other.contains(key))
            && self
                .relations()
                .iter()
                .all(|rel| {
                    let (a, b) = rel.endpoints();
                    other.weight_between(a, b) == Some(rel.weight())
                })
    }
}
