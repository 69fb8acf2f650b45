//! Data source trait and request/response types.
//!
//! This module defines the adapter contract (`DataSource`) the Gateway calls
//! through, along with the request, response and error types shared by every
//! adapter.
//!
//! # Example
//!
//! ```rust,ignore
//! use truthsource_core::{DataRequest, DataSource, GenericRestAdapter, SourceError};
//! use serde_json::json;
//!
//! async fn fetch_price(adapter: &GenericRestAdapter) -> Result<(), SourceError> {
//!     let request = DataRequest::from_value(json!({ "endpoint": "ticker", "symbol": "BTC" }))?;
//!     let response = adapter.fetch(request).await?;
//!     println!("{} as of {}", response.metadata.source, response.metadata.timestamp);
//!     Ok(())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::http_client::HttpError;
use crate::schema::ResponseSchema;
use crate::{DataCategory, SourceId};

/// Open mapping of adapter-specific request parameters.
pub type RequestParams = Map<String, Value>;

/// Boxed future returned by adapter operations.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Context shared by every fetch of one attestation round.
///
/// `attestation_timestamp` is fixed when the round begins and is carried
/// unchanged through every retry, so all participants report the same as-of
/// time regardless of when their fetch completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationContext {
    pub request_id: String,
    /// Unix milliseconds.
    pub attestation_timestamp: i64,
    /// Absolute cutoff, unix seconds.
    pub deadline: i64,
    /// Zero-based attempt counter.
    pub attempt: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub previous_errors: Vec<Value>,
}

impl AttestationContext {
    /// Starts a new round with a fresh request id.
    pub fn begin(attestation_timestamp: i64, deadline: i64) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            attestation_timestamp,
            deadline,
            attempt: 0,
            previous_errors: Vec::new(),
        }
    }

    /// Context for the next attempt of the same round.
    pub fn next_attempt(&self, error: impl Into<Value>) -> Self {
        let mut next = self.clone();
        next.attempt = self.attempt.saturating_add(1);
        next.previous_errors.push(error.into());
        next
    }
}

/// Request for data from a source. Immutable per call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataRequest {
    #[serde(default)]
    pub params: RequestParams,
    /// Fixed point in time for historical fetches, unix milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, rename = "timeout", skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attestation_context: Option<AttestationContext>,
}

impl DataRequest {
    pub fn new(params: RequestParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// Builds a request from a JSON object of params.
    pub fn from_value(params: Value) -> Result<Self, SourceError> {
        match params {
            Value::Object(map) => Ok(Self::new(map)),
            other => Err(SourceError::configuration(format!(
                "request params must be an object, got {other}"
            ))),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_attestation(mut self, context: AttestationContext) -> Self {
        self.attestation_context = Some(context);
        self
    }
}

/// Metadata attached to every data response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub source: String,
    /// As-of time, unix milliseconds.
    pub timestamp: i64,
    /// Wall-clock completion time, unix milliseconds.
    pub fetched_at: i64,
    /// Always false at the adapter layer; the Gateway overwrites it.
    pub cache_hit: bool,
    /// Milliseconds; filled in by the Gateway.
    pub latency: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_attempt: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verifiable_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Map<String, Value>>,
}

impl ResponseMetadata {
    pub fn new(source: impl Into<String>, timestamp: i64, fetched_at: i64) -> Self {
        Self {
            source: source.into(),
            timestamp,
            fetched_at,
            cache_hit: false,
            latency: 0,
            retry_attempt: None,
            verifiable_hash: None,
            extra: None,
        }
    }
}

/// Response from a data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
    pub metadata: ResponseMetadata,
}

/// Capabilities an adapter declares. Declared, never measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCapabilities {
    pub supports_historical: bool,
    pub supports_realtime: bool,
    pub supports_batch: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_historical_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit_per_minute: Option<u32>,
    pub requires_auth: bool,
}

impl SourceCapabilities {
    /// Realtime-only, unbatched defaults.
    pub const fn realtime(requires_auth: bool) -> Self {
        Self {
            supports_historical: false,
            supports_realtime: true,
            supports_batch: false,
            max_historical_days: None,
            rate_limit_per_minute: None,
            requires_auth,
        }
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Configuration,
    Transport,
    UpstreamStatus,
    Decode,
    Disposed,
}

/// Structured adapter error. Propagated unchanged to the Gateway, which owns
/// every retry decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
    status: Option<u16>,
}

impl SourceError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Configuration,
            message: message.into(),
            retryable: false,
            status: None,
        }
    }

    pub fn missing_endpoint(endpoint: &str, adapter: &str) -> Self {
        Self::configuration(format!(
            "endpoint '{endpoint}' not defined in schema for {adapter}"
        ))
    }

    pub fn transport(error: &HttpError) -> Self {
        Self {
            kind: SourceErrorKind::Transport,
            message: format!("transport error: {}", error.message()),
            retryable: error.retryable(),
            status: None,
        }
    }

    pub fn upstream_status(status: u16, url: &str) -> Self {
        Self {
            kind: SourceErrorKind::UpstreamStatus,
            message: format!("upstream {url} returned status {status}"),
            retryable: status == 429 || status >= 500,
            status: Some(status),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Decode,
            message: message.into(),
            retryable: false,
            status: None,
        }
    }

    pub fn disposed(source: &SourceId) -> Self {
        Self {
            kind: SourceErrorKind::Disposed,
            message: format!("source '{source}' has been disposed"),
            retryable: false,
            status: None,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Configuration => "source.configuration",
            SourceErrorKind::Transport => "source.transport",
            SourceErrorKind::UpstreamStatus => "source.upstream_status",
            SourceErrorKind::Decode => "source.decode",
            SourceErrorKind::Disposed => "source.disposed",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<crate::ValidationError> for SourceError {
    fn from(error: crate::ValidationError) -> Self {
        Self::configuration(error.to_string())
    }
}

/// Source adapter contract.
///
/// Every adapter the Gateway routes to implements this trait. Introspection
/// methods (`id`, `name`, `category`, `capabilities`, `schema`) are read-only
/// and used for routing and validation, never for dispatch.
///
/// # Required Methods
///
/// | Method | Description |
/// |--------|-------------|
/// | [`id`](DataSource::id) | Stable adapter identifier |
/// | [`name`](DataSource::name) | Human-readable name |
/// | [`category`](DataSource::category) | Routing category |
/// | [`capabilities`](DataSource::capabilities) | Declared capabilities |
/// | [`fetch`](DataSource::fetch) | Fetch one data point |
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; overlapping `fetch` calls on one
/// instance are allowed and unordered.
pub trait DataSource: Send + Sync {
    type Output: Send;

    fn id(&self) -> &SourceId;

    fn name(&self) -> &str;

    fn category(&self) -> Option<DataCategory>;

    fn capabilities(&self) -> SourceCapabilities;

    /// Optional validator the Gateway applies to fetched values.
    fn schema(&self) -> Option<&dyn ResponseSchema> {
        None
    }

    /// Fetches one data point.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the request is misconfigured for this
    /// source, the transport fails, or the upstream answers with a
    /// non-success status. Errors are never retried here.
    fn fetch<'a>(&'a self, request: DataRequest) -> SourceFuture<'a, DataResponse<Self::Output>>;

    /// Fetches several data points one after another, failing on the first
    /// error. Sources with a native batch API override this.
    fn fetch_batch<'a>(
        &'a self,
        requests: Vec<DataRequest>,
    ) -> SourceFuture<'a, Vec<DataResponse<Self::Output>>> {
        Box::pin(async move {
            let mut responses = Vec::with_capacity(requests.len());
            for request in requests {
                responses.push(self.fetch(request).await?);
            }
            Ok(responses)
        })
    }

    /// Called once when the source is registered with the Gateway.
    fn initialize<'a>(&'a self) -> SourceFuture<'a, ()> {
        Box::pin(async { Ok(()) })
    }

    /// Releases held resources at shutdown.
    fn dispose<'a>(&'a self) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async {})
    }
}
