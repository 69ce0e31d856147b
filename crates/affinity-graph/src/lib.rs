//! Affinity Graph - Similarity indexing and distance ranking
//!
//! This crate builds a weighted undirected graph over items, where each
//! relation's weight is the dissimilarity of its endpoints, and ranks
//! everything reachable from a query item by cumulative distance.
//!
//! # Architecture
//!
//! The graph uses petgraph internally, with a key index beside it. On top
//! of it sit:
//! - Incremental insertion with a pluggable admission policy
//! - Name resolution (n-gram index) and tag lookup
//! - Deterministic snapshots, persisted with sled
//!
//! # Example
//!
//! ```
//! use affinity_graph::{Below, IncrementalIndex, JaccardDistance};
//! use affinity_core::Item;
//!
//! let mut index = IncrementalIndex::new();
//! for item in [
//!     Item::new("Cowboy Bebop").with_tags(["space", "noir", "jazz"]),
//!     Item::new("Trigun").with_tags(["space", "western"]),
//!     Item::new("Samurai Champloo").with_tags(["jazz", "samurai"]),
//! ] {
//!     index.add_item(item, &JaccardDistance, &Below::new(1.0)).unwrap();
//! }
//!
//! let ranked = index.search("trigun", index.names(), Some(3)).unwrap();
//! assert_eq!(ranked[0].key.as_str(), "trigun");
//! assert_eq!(ranked[1].key.as_str(), "cowboy bebop");
//! ```

mod admission;
mod graph;
mod index;
mod ranking;
mod resolver;
mod snapshot;
mod store;
mod tag_index;
mod weight;

pub use admission::{AdmissionConfig, AdmissionPolicy, AdmitAll, Below};
pub use graph::SimilarityGraph;
pub use index::{AddOutcome, IncrementalIndex, IndexStats};
pub use ranking::{Ranked, RankingEngine, RankingResult};
pub use resolver::{ExactResolver, NameIndex, Resolver};
pub use snapshot::IndexSnapshot;
pub use store::{IndexStore, StoreError};
pub use tag_index::TagIndex;
pub use weight::{JaccardDistance, SharedTagDistance, WeightFunction};

pub use tokio_util::sync::CancellationToken;
