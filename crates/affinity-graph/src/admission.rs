//! Edge admission policies.
//!
//! Admitting every candidate relation yields a complete graph: O(n) new
//! relations per insert and O(n²) overall. A policy bounds degree by
//! refusing distant pairs, at the cost of recall through those pairs.

use serde::{Deserialize, Serialize};

/// Decides whether a scored candidate relation enters the graph.
pub trait AdmissionPolicy: Send + Sync {
    fn admits(&self, weight: f64) -> bool;
}

/// Admits every relation.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdmitAll;

impl AdmissionPolicy for AdmitAll {
    fn admits(&self, _weight: f64) -> bool {
        true
    }
}

/// Admits relations strictly lighter than `threshold`.
#[derive(Debug, Clone, Copy)]
pub struct Below {
    pub threshold: f64,
}

impl Below {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl AdmissionPolicy for Below {
    fn admits(&self, weight: f64) -> bool {
        weight < self.threshold
    }
}

/// Serializable form of the bundled policies.
///
/// ```
/// use affinity_graph::{AdmissionConfig, AdmissionPolicy};
///
/// let config: AdmissionConfig =
///     serde_json::from_str(r#"{"policy": "below", "threshold": 3.5}"#).unwrap();
/// assert!(config.admits(3.0));
/// assert!(!config.admits(3.5));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum AdmissionConfig {
    #[default]
    All,
    Below { threshold: f64 },
}

impl AdmissionPolicy for AdmissionConfig {
    fn admits(&self, weight: f64) -> bool {
        match *self {
            AdmissionConfig::All => AdmitAll.admits(weight),
            AdmissionConfig::Below { threshold } => Below::new(threshold).admits(weight),
        }
    }
}
