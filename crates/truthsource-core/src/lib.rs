//! # Truthsource Core
//!
//! Pluggable data-source adapters feeding the consensus Gateway.
//!
//! ## Overview
//!
//! - **Adapter contract** the Gateway calls through ([`DataSource`])
//! - **Base adapter lifecycle** with mock switching, as-of timestamping and
//!   response metadata ([`Adapter`])
//! - **Generic REST adapter** driven entirely by an endpoint table
//!   ([`GenericRestAdapter`])
//! - **Canonical record types** ([`TruthData`], [`TruthPoint`])
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapter`] | Base adapter lifecycle and producer trait |
//! | [`config`] | Adapter and REST schema configuration |
//! | [`data_source`] | Adapter contract and request/response types |
//! | [`domain`] | Records, categories and time helpers |
//! | [`error`] | Configuration validation errors |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`rest`] | Configuration-driven REST adapter |
//! | [`schema`] | Response validators exposed to the Gateway |
//! | [`source`] | Adapter identifiers |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │    Gateway      │
//! └────────┬────────┘
//!          │ fetch(DataRequest)
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Adapter<P>      │────▶│ P::mock_data     │
//! │ (DataSource)    │     └──────────────────┘
//! └────────┬────────┘
//!          │ live
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ P::fetch_data   │────▶│ HTTP Client      │
//! │ (e.g. REST)     │     │ (reqwest/double) │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ DataResponse    │
//! │ { data, meta }  │
//! └─────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use truthsource_core::{SourceError, SourceErrorKind};
//!
//! fn handle_error(error: SourceError) {
//!     match error.kind() {
//!         SourceErrorKind::Configuration => {
//!             // Fix the adapter config or request
//!         }
//!         SourceErrorKind::Transport | SourceErrorKind::UpstreamStatus if error.retryable() => {
//!             // Gateway may retry with the next attestation attempt
//!         }
//!         _ => {}
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - API keys are never serialized, logged or debug-printed
//! - Query strings are left out of log events

pub mod adapter;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod rest;
pub mod schema;
pub mod source;

// Base adapter
pub use adapter::{Adapter, AdapterCore, ConfigSecretResolver, SecretResolver, TruthProducer};

// Configuration
pub use config::{
    AdapterConfig, RestEndpointConfig, RuntimeOptions, SchemaAdapterConfig, MOCK_MODE_ENV,
};

// Data source trait and types
pub use data_source::{
    AttestationContext, DataRequest, DataResponse, DataSource, RequestParams, ResponseMetadata,
    SourceCapabilities, SourceError, SourceErrorKind, SourceFuture,
};

// Domain models
pub use domain::{
    unix_millis_now, unix_seconds_now, CircuitBreakerState, DataCategory, DataLineage,
    DataMetadata, QualityMetrics, SlaMetrics, TruthData, TruthPoint,
};

// Error types
pub use error::{CoreError, ValidationError};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, NoopHttpClient,
    ReqwestHttpClient, TransportOptions, DEFAULT_TIMEOUT_MS,
};

// REST adapter
pub use rest::{
    extract_data_path, interpolate_path, param_to_string, GenericRestAdapter, InterpolatedPath,
    MockFixture, RestPayload, RestSchema,
};

// Response validation
pub use schema::{JsonSchema, ResponseSchema, SchemaViolation, ValueKind};

// Source identifiers
pub use source::SourceId;
