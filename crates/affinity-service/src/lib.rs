//! Affinity Service - async access to a shared index
//!
//! This crate wraps an [`IncrementalIndex`] for use from async code:
//! - Writers (add, update, remove) take an exclusive lock
//! - Queries share a read lock and run on the blocking pool, so a long
//!   traversal never stalls the async scheduler
//! - Queries accept a cancellation token checked once per traversal step

use affinity_graph::IncrementalIndex;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared index state across tasks.
pub type SharedIndex = Arc<RwLock<IncrementalIndex>>;

mod config;
mod service;

pub use config::ServiceConfig;
pub use service::{SearchService, ServiceError};
