//! Service configuration.

use affinity_graph::AdmissionConfig;
use serde::{Deserialize, Serialize};

/// Configuration for a [`SearchService`](crate::SearchService).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Which candidate relations enter the graph on insert.
    pub admission: AdmissionConfig,
    /// Result cap applied when a query does not give its own.
    pub default_limit: Option<usize>,
}

impl ServiceConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.admission, AdmissionConfig::All);
        assert_eq!(config.default_limit, None);
    }

    #[test]
    fn test_from_json() {
        let config = ServiceConfig::from_json(
            r#"{"admission": {"policy": "below", "threshold": 0.8}, "default_limit": 10}"#,
        )
        .unwrap();
        assert_eq!(config.admission, AdmissionConfig::Below { threshold: 0.8 });
        assert_eq!(config.default_limit, Some(10));
    }

    #[test]
    fn test_partial_json() {
        let config = ServiceConfig::from_json(r#"{"default_limit": 3}"#).unwrap();
        assert_eq!(config.admission, AdmissionConfig::All);
    }
}
