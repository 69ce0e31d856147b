//! Async query and mutation front end.

use crate::config::ServiceConfig;
use crate::SharedIndex;
use affinity_core::{Item, ItemKey};
use affinity_graph::{AddOutcome, IncrementalIndex, IndexStats, Ranked, WeightFunction};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Index(#[from] affinity_core::Error),
    #[error("Query task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Shared weight function handle.
type SharedWeight = Arc<dyn WeightFunction>;

/// Serializes writers and lets readers query concurrently.
pub struct SearchService {
    config: ServiceConfig,
    index: SharedIndex,
    weight_fn: SharedWeight,
}

impl SearchService {
    /// Creates a service over `index`, scoring new items with `weight_fn`.
    pub fn new<W>(index: IncrementalIndex, weight_fn: W, config: ServiceConfig) -> Self
    where
        W: WeightFunction + 'static,
    {
        info!(
            "Search service started with {} items, admission {:?}",
            index.len(),
            config.admission
        );
        Self {
            config,
            index: Arc::new(RwLock::new(index)),
            weight_fn: Arc::new(weight_fn),
        }
    }

    /// Returns a handle to the shared index.
    pub fn index(&self) -> SharedIndex {
        self.index.clone()
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub async fn add_item(&self, item: Item) -> Result<AddOutcome, ServiceError> {
        let mut index = self.index.write().await;
        Ok(index.add_item(item, self.weight_fn.as_ref(), &self.config.admission)?)
    }

    pub async fn update_item(&self, item: Item) -> Result<AddOutcome, ServiceError> {
        let mut index = self.index.write().await;
        Ok(index.update_item(item, self.weight_fn.as_ref(), &self.config.admission)?)
    }

    pub async fn remove_item(&self, key: &ItemKey) -> Option<Item> {
        self.index.write().await.remove_item(key)
    }

    /// Resolves `query` with the index's name resolver and ranks from it.
    pub async fn search(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Ranked>, ServiceError> {
        self.search_with(query, limit, CancellationToken::new()).await
    }

    /// Like [`SearchService::search`], stopping early once `cancel` fires.
    ///
    /// The read lock is held for the whole traversal, so writers wait until
    /// it completes or is cancelled.
    pub async fn search_with(
        &self,
        query: &str,
        limit: Option<usize>,
        cancel: CancellationToken,
    ) -> Result<Vec<Ranked>, ServiceError> {
        let limit = limit.or(self.config.default_limit);
        let index = self.index.clone().read_owned().await;
        let query = query.to_string();

        debug!("Search query: {}", query);
        let result = tokio::task::spawn_blocking(move || {
            index.search_with(&query, index.names(), limit, &cancel)
        })
        .await?;

        if let Err(affinity_core::Error::Cancelled) = &result {
            warn!("Search cancelled");
        }
        Ok(result?)
    }

    pub async fn stats(&self) -> IndexStats {
        self.index.read().await.stats()
    }
}
