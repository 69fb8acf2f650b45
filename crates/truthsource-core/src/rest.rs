//! Configuration-driven REST adapter.
//!
//! A [`GenericRestAdapter`] is driven entirely by its endpoint table: adding
//! an endpoint is a config change, never a code change.
//!
//! # Fetch Pipeline
//!
//! | Step | Function | Failure |
//! |------|----------|---------|
//! | Endpoint lookup | `params.endpoint` in the table | configuration error, no network |
//! | Path interpolation | [`interpolate_path`] | never; unknown placeholders stay literal |
//! | Transport | `base_url + path`, params as query (GET) or JSON body (POST) | transport or status error |
//! | Extraction | [`extract_data_path`] | never; a short path yields no value |
//! | Normalization | [`TruthData`] record | never |
//!
//! # Example
//!
//! ```rust,ignore
//! use truthsource_core::{
//!     AdapterConfig, DataCategory, DataRequest, DataSource, GenericRestAdapter,
//!     RestEndpointConfig, RuntimeOptions, SchemaAdapterConfig,
//! };
//!
//! let config = SchemaAdapterConfig::new(
//!     AdapterConfig::new("Example Exchange", DataCategory::Crypto),
//!     "https://api.example.test",
//! )
//! .with_endpoint("ticker", RestEndpointConfig::get("/ticker/${symbol}").with_data_path("price"));
//!
//! let adapter = GenericRestAdapter::from_schema(config, RuntimeOptions::from_env())?;
//! let request = DataRequest::default()
//!     .with_param("endpoint", "ticker")
//!     .with_param("symbol", "BTC");
//! let response = adapter.fetch(request).await?;
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::adapter::{Adapter, AdapterCore, TruthProducer};
use crate::config::{RestEndpointConfig, RuntimeOptions, SchemaAdapterConfig};
use crate::data_source::{RequestParams, SourceError, SourceFuture};
use crate::domain::{unix_millis_now, unix_seconds_now};
use crate::http_client::{HttpClient, HttpMethod, HttpRequest};
use crate::schema::ValueKind;
use crate::TruthData;

/// Category reported by REST adapters configured without one.
pub const FALLBACK_CATEGORY: &str = "universal";

/// REST adapter: the base adapter composed with an endpoint table.
pub type GenericRestAdapter = Adapter<RestSchema>;

/// Endpoint table and base URL of a REST source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestSchema {
    base_url: String,
    endpoints: BTreeMap<String, RestEndpointConfig>,
}

impl RestSchema {
    pub fn new(base_url: impl Into<String>, endpoints: BTreeMap<String, RestEndpointConfig>) -> Self {
        Self {
            base_url: base_url.into(),
            endpoints,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, name: &str) -> Option<&RestEndpointConfig> {
        self.endpoints.get(name)
    }

    pub fn endpoint_names(&self) -> impl Iterator<Item = &str> {
        self.endpoints.keys().map(String::as_str)
    }

    fn build_request(
        &self,
        endpoint: &RestEndpointConfig,
        path: &str,
        params: &RequestParams,
    ) -> HttpRequest {
        let url = format!("{}{}", self.base_url, path);
        match endpoint.method {
            HttpMethod::Get => params
                .iter()
                .fold(HttpRequest::get(url), |request, (key, value)| {
                    request.with_query(key.as_str(), param_to_string(value))
                }),
            HttpMethod::Post => {
                HttpRequest::post(url).with_json_body(Value::Object(params.clone()))
            }
        }
    }
}

impl Adapter<RestSchema> {
    /// Builds a REST adapter with a reqwest transport.
    pub fn from_schema(
        config: SchemaAdapterConfig,
        runtime: RuntimeOptions,
    ) -> Result<Self, SourceError> {
        config.validate()?;
        let SchemaAdapterConfig {
            adapter,
            base_url,
            endpoints,
        } = config;
        Adapter::new(adapter, runtime, RestSchema::new(base_url, endpoints))
    }

    /// Builds a REST adapter around an existing transport.
    pub fn from_schema_with_http_client(
        config: SchemaAdapterConfig,
        runtime: RuntimeOptions,
        http_client: Arc<dyn HttpClient>,
    ) -> Result<Self, SourceError> {
        config.validate()?;
        let SchemaAdapterConfig {
            adapter,
            base_url,
            endpoints,
        } = config;
        Adapter::with_http_client(
            adapter,
            runtime,
            RestSchema::new(base_url, endpoints),
            http_client,
        )
    }
}

/// Fixture returned in mock mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockFixture {
    pub mocked: bool,
    #[serde(default)]
    pub endpoint: Value,
    /// Unix milliseconds.
    pub timestamp: i64,
}

/// Output of a REST adapter: the live record, or the mock fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RestPayload {
    Record(TruthData),
    Mocked(MockFixture),
}

impl RestPayload {
    pub fn record(&self) -> Option<&TruthData> {
        match self {
            Self::Record(record) => Some(record),
            Self::Mocked(_) => None,
        }
    }

    pub fn into_record(self) -> Option<TruthData> {
        match self {
            Self::Record(record) => Some(record),
            Self::Mocked(_) => None,
        }
    }

    pub fn is_mocked(&self) -> bool {
        matches!(self, Self::Mocked(_))
    }
}

impl TruthProducer for RestSchema {
    type Output = RestPayload;

    fn fetch_data<'a>(
        &'a self,
        core: &'a AdapterCore,
        params: &'a RequestParams,
    ) -> SourceFuture<'a, RestPayload> {
        Box::pin(async move {
            let endpoint_name = params
                .get("endpoint")
                .filter(|value| !value.is_null())
                .map(param_to_string);
            let endpoint = endpoint_name
                .as_deref()
                .and_then(|name| self.endpoints.get(name))
                .ok_or_else(|| {
                    SourceError::missing_endpoint(
                        endpoint_name.as_deref().unwrap_or("undefined"),
                        core.name(),
                    )
                })?;

            let interpolated = interpolate_path(&endpoint.path, params);
            if !interpolated.unresolved.is_empty() {
                warn!(
                    source = %core.id(),
                    endpoint = endpoint_name.as_deref().unwrap_or_default(),
                    placeholders = ?interpolated.unresolved,
                    "path placeholders without matching params were left as-is"
                );
            }

            let request = self.build_request(endpoint, &interpolated.path, params);
            debug!(
                source = %core.id(),
                method = %request.method,
                url = %request.url,
                "issuing rest call"
            );

            let response = core
                .http_client()
                .execute(request)
                .await
                .map_err(|error| SourceError::transport(&error))?;

            if !response.is_success() {
                return Err(SourceError::upstream_status(
                    response.status,
                    &format!("{}{}", self.base_url, interpolated.path),
                ));
            }

            let body = parse_body(response.body);
            let value = match endpoint.data_path.as_deref() {
                Some(data_path) => extract_data_path(&body, data_path)
                    .cloned()
                    .unwrap_or(Value::Null),
                None => body,
            };

            Ok(RestPayload::Record(normalize_record(core, params, value)))
        })
    }

    fn mock_data<'a>(
        &'a self,
        _core: &'a AdapterCore,
        params: &'a RequestParams,
    ) -> SourceFuture<'a, RestPayload> {
        Box::pin(async move {
            Ok(RestPayload::Mocked(MockFixture {
                mocked: true,
                endpoint: params.get("endpoint").cloned().unwrap_or(Value::Null),
                timestamp: unix_millis_now(),
            }))
        })
    }
}

/// Result of interpolating a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpolatedPath {
    pub path: String,
    /// Placeholder names with no matching param, kept literally in `path`.
    pub unresolved: Vec<String>,
}

/// Replaces every `${key}` placeholder whose key is present in `params` with
/// the param's string form.
///
/// Substitution is a single flat pass: substituted values are never
/// rescanned, so param order cannot change the result.
pub fn interpolate_path(template: &str, params: &RequestParams) -> InterpolatedPath {
    let mut path = String::with_capacity(template.len());
    let mut unresolved = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        path.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find('}') else {
            path.push_str(&rest[start..]);
            rest = "";
            break;
        };

        let key = &after[..end];
        match params.get(key) {
            Some(value) => path.push_str(&param_to_string(value)),
            None => {
                path.push_str(&rest[start..start + 2 + end + 1]);
                unresolved.push(key.to_owned());
            }
        }
        rest = &after[end + 1..];
    }

    path.push_str(rest);
    InterpolatedPath { path, unresolved }
}

/// Descends `value` one dotted segment at a time. Object segments are keys,
/// array segments are indexes. Returns `None` as soon as a segment is missing.
pub fn extract_data_path<'v>(value: &'v Value, data_path: &str) -> Option<&'v Value> {
    data_path
        .split('.')
        .try_fold(value, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index)),
            _ => None,
        })
}

/// String form of a param as used in paths and query strings.
///
/// Strings are used verbatim, arrays are joined with commas, objects are
/// rendered as compact JSON.
pub fn param_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(param_to_string)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

fn parse_body(body: String) -> Value {
    serde_json::from_str(&body).unwrap_or(Value::String(body))
}

fn normalize_record(core: &AdapterCore, params: &RequestParams, value: Value) -> TruthData {
    let id = ["id", "symbol", "endpoint"]
        .iter()
        .filter_map(|key| params.get(*key))
        .find(|value| is_truthy(value))
        .map(param_to_string)
        .unwrap_or_default();

    let category = core
        .category()
        .map(|category| category.as_str())
        .unwrap_or(FALLBACK_CATEGORY);

    let mut metadata = Map::new();
    metadata.insert(
        String::from("endpoint"),
        params.get("endpoint").cloned().unwrap_or(Value::Null),
    );
    if ValueKind::of(&value).is_structured() {
        metadata.insert(String::from("rawData"), value.clone());
    }

    TruthData {
        id,
        value,
        category: category.to_owned(),
        source: core.id().to_string(),
        timestamp: unix_seconds_now(),
        metadata,
    }
}

/// Empty strings, zero, `false` and `null` do not count as a present id.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
