//! Index health detection
//!
//! Probes the search backend and classifies how usable it currently is.

use serde::{Deserialize, Serialize};

use crate::IndexClient;

/// Health tier based on cluster state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum IndexHealth {
    /// Cluster green, all shards allocated
    Green,
    /// Cluster yellow or red; queries work but may be incomplete or slow
    Degraded,
    /// Backend not responding
    Unreachable,
}

impl IndexHealth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "Green",
            Self::Degraded => "Degraded",
            Self::Unreachable => "Unreachable",
        }
    }
}

/// Index status detected through probing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStatus {
    /// Backend is reachable and responding
    pub is_online: bool,

    /// Raw cluster status string reported by the backend
    pub cluster_status: Option<String>,

    /// Session document count (if the index exists)
    pub doc_count: Option<u64>,

    /// Health tier
    pub health: IndexHealth,
}

/// Classify a cluster status string into a health tier
pub fn classify(cluster_status: &str) -> IndexHealth {
    match cluster_status {
        "green" => IndexHealth::Green,
        _ => IndexHealth::Degraded,
    }
}

/// Detect index status by probing the backend
pub async fn detect_status(client: &IndexClient) -> IndexStatus {
    let cluster_status = match client.cluster_health().await {
        Ok(status) => status,
        Err(e) => {
            tracing::warn!(error = %e, "Index health probe failed");
            return IndexStatus {
                is_online: false,
                cluster_status: None,
                doc_count: None,
                health: IndexHealth::Unreachable,
            };
        }
    };

    let health = classify(&cluster_status);
    if health == IndexHealth::Degraded {
        tracing::warn!(
            cluster_status = %cluster_status,
            "Index cluster degraded; session queries may be incomplete"
        );
    }

    // Count failure is non-fatal: the index may simply not exist yet
    let doc_count = client.doc_count().await.ok();

    IndexStatus {
        is_online: true,
        cluster_status: Some(cluster_status),
        doc_count,
        health,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_serialization() {
        assert_eq!(IndexHealth::Green.as_str(), "Green");
        assert_eq!(IndexHealth::Degraded.as_str(), "Degraded");
        assert_eq!(IndexHealth::Unreachable.as_str(), "Unreachable");
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("green"), IndexHealth::Green);
        assert_eq!(classify("yellow"), IndexHealth::Degraded);
        assert_eq!(classify("red"), IndexHealth::Degraded);
        assert_eq!(classify("weird"), IndexHealth::Degraded);
    }
}
