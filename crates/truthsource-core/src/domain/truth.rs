use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Normalized record every adapter produces, whatever the upstream API shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruthData {
    /// Identifier of this data point (e.g. a ticker or match id).
    pub id: String,
    /// Unconstrained value; scalar, object or array. Left to schema validation.
    pub value: Value,
    /// Routing tag.
    pub category: String,
    /// Id of the adapter that produced the record.
    pub source: String,
    /// Unix seconds at which the value was valid.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl TruthData {
    pub fn new(
        id: impl Into<String>,
        value: Value,
        category: impl Into<String>,
        source: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            id: id.into(),
            value,
            category: category.into(),
            source: source.into(),
            timestamp,
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}
