//! Affinity Core - Entities and the ranking priority queue
//!
//! This crate holds the leaf types everything else is built from:
//!
//! - [`ItemKey`] and [`Item`]: canonical identity plus mutable attributes
//! - [`Relation`]: a weighted, unordered pair of items
//! - [`PriorityQueue`]: a binary min-heap with a position map, supporting
//!   membership tests and re-prioritization in both directions
//!
//! # Example
//!
//! ```
//! use affinity_core::{Item, PriorityQueue, Relation};
//!
//! let a = Item::new("Cowboy Bebop").with_tags(["space", "noir"]);
//! let b = Item::new("Trigun").with_tags(["space", "western"]);
//! let relation = Relation::new(a.key.clone(), b.key.clone(), 1.5).unwrap();
//! assert_eq!(relation.other(&a.key), Some(&b.key));
//!
//! let mut queue = PriorityQueue::new();
//! queue.insert("b", 2.0).unwrap();
//! queue.insert("a", 1.0).unwrap();
//! assert_eq!(queue.pop().unwrap(), ("a", 1.0));
//! ```

mod error;
mod item;
mod queue;
mod relation;

pub use error::{Error, Result};
pub use item::{normalize, Item, ItemKey, Payload};
pub use queue::PriorityQueue;
pub use relation::Relation;
