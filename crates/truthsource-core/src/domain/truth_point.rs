use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::data_source::DataResponse;

/// Record wrapped with provenance and quality metadata, as tracked by the
/// Gateway once an adapter response has been accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruthPoint<T> {
    pub value: T,
    pub metadata: DataMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataMetadata {
    /// Source identifier (e.g. `binance.spot.btcusdt`).
    pub source: String,
    /// Unix milliseconds.
    pub timestamp: i64,
    pub request_id: String,
    pub lineage: DataLineage,
    pub quality: QualityMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sla: Option<SlaMetrics>,
    /// Hash of the normalized payload, filled in by the consensus layer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verifiable_hash: Option<String>,
    /// Free-form extras (tags, snippets, geo).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataLineage {
    pub adapter: String,
    pub fetched_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_at: Option<i64>,
    pub cache_hit: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transformed_by: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circuit_breaker_state: Option<CircuitBreakerState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitBreakerState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Milliseconds between the as-of time and the fetch.
    pub freshness: i64,
    pub validated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaMetrics {
    pub met: bool,
    pub latency: u64,
    pub availability: f64,
    pub freshness_requirement_met: bool,
}

impl<T> TruthPoint<T> {
    /// Seeds lineage and an unvalidated quality block from an adapter response.
    pub fn from_response(response: DataResponse<T>, request_id: impl Into<String>) -> Self {
        let meta = response.metadata;
        let freshness = meta.fetched_at.saturating_sub(meta.timestamp).max(0);

        Self {
            value: response.data,
            metadata: DataMetadata {
                source: meta.source.clone(),
                timestamp: meta.timestamp,
                request_id: request_id.into(),
                lineage: DataLineage {
                    adapter: meta.source,
                    fetched_at: meta.fetched_at,
                    cached_at: None,
                    cache_hit: meta.cache_hit,
                    transformed_by: Vec::new(),
                    retry_attempts: meta.retry_attempt,
                    circuit_breaker_state: None,
                },
                quality: QualityMetrics {
                    confidence: 1.0,
                    freshness,
                    validated: false,
                    sample_size: None,
                    variance: None,
                },
                sla: None,
                verifiable_hash: meta.verifiable_hash,
                extra: meta.extra.unwrap_or_default(),
            },
        }
    }
}
