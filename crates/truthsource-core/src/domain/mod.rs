//! # Domain Models
//!
//! Canonical data types shared by every adapter and the Gateway.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TruthData`] | Normalized record every adapter produces |
//! | [`TruthPoint`] | Record wrapped with lineage and quality metadata |
//! | [`DataCategory`] | Routing category of a source |
//!
//! Record values are carried as [`serde_json::Value`] so that scalar, object
//! and array payloads keep their runtime type tag until the Gateway's schema
//! validation inspects them.

mod category;
mod timestamp;
mod truth;
mod truth_point;

pub use category::DataCategory;
pub use timestamp::{unix_millis_now, unix_seconds_now};
pub use truth::TruthData;
pub use truth_point::{
    CircuitBreakerState, DataLineage, DataMetadata, QualityMetrics, SlaMetrics, TruthPoint,
};
