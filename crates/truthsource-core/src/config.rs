//! Adapter configuration as handed over by the Gateway or deployment config.
//!
//! Configs deserialize from camelCase JSON. The response schema cannot be
//! expressed in JSON and is attached with
//! [`AdapterConfig::with_response_schema`].

use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::http_client::{HttpMethod, TransportOptions};
use crate::schema::ResponseSchema;
use crate::{CoreError, DataCategory, SourceId, ValidationError};

/// Environment variable that forces every adapter into its mock path.
pub const MOCK_MODE_ENV: &str = "USE_MOCKS";

/// Process-level options threaded through adapter construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuntimeOptions {
    /// Forces the mock path regardless of per-adapter `use_mocks`.
    pub force_mocks: bool,
}

impl RuntimeOptions {
    pub const fn with_force_mocks(force_mocks: bool) -> Self {
        Self { force_mocks }
    }

    /// Reads `USE_MOCKS` once.
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(MOCK_MODE_ENV).ok().as_deref())
    }

    /// Only the exact value `true` enables mocks.
    pub fn from_env_value(value: Option<&str>) -> Self {
        Self {
            force_mocks: value == Some("true"),
        }
    }
}

/// Configuration shared by every adapter.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterConfig {
    /// Explicit id; derived from `name` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Advisory only; surfaced through capabilities for the Gateway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit_request_per_minute: Option<u32>,
    #[serde(default)]
    pub use_mocks: bool,
    pub name: String,
    /// Routing category; adapters without one report a source-specific fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<DataCategory>,
    #[serde(skip)]
    pub response_schema: Option<Arc<dyn ResponseSchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    #[serde(default)]
    pub client_config: TransportOptions,
}

impl AdapterConfig {
    pub fn new(name: impl Into<String>, category: DataCategory) -> Self {
        Self {
            category: Some(category),
            ..Self::uncategorized(name)
        }
    }

    /// Config without a routing category.
    pub fn uncategorized(name: impl Into<String>) -> Self {
        Self {
            id: None,
            api_key: None,
            rate_limit_request_per_minute: None,
            use_mocks: false,
            name: name.into(),
            category: None,
            response_schema: None,
            proxy: None,
            client_config: TransportOptions::default(),
        }
    }

    pub fn from_json_str(input: &str) -> Result<Self, CoreError> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_rate_limit(mut self, requests_per_minute: u32) -> Self {
        self.rate_limit_request_per_minute = Some(requests_per_minute);
        self
    }

    pub fn with_mocks(mut self, use_mocks: bool) -> Self {
        self.use_mocks = use_mocks;
        self
    }

    pub fn with_response_schema(mut self, schema: Arc<dyn ResponseSchema>) -> Self {
        self.response_schema = Some(schema);
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn with_client_config(mut self, client_config: TransportOptions) -> Self {
        self.client_config = client_config;
        self
    }

    /// Id reported by the adapter built from this config. An empty
    /// explicit id counts as absent.
    pub fn source_id(&self) -> SourceId {
        SourceId::resolve(self.id.as_deref(), &self.name)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.client_config.validate()
    }
}

impl Debug for AdapterConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterConfig")
            .field("id", &self.id)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field(
                "rate_limit_request_per_minute",
                &self.rate_limit_request_per_minute,
            )
            .field("use_mocks", &self.use_mocks)
            .field("name", &self.name)
            .field("category", &self.category)
            .field("response_schema", &self.response_schema.is_some())
            .field("proxy", &self.proxy)
            .field("client_config", &self.client_config)
            .finish()
    }
}

/// One named REST call: path template, method and optional extraction path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestEndpointConfig {
    /// Path template with `${param}` placeholders, appended to the base URL.
    pub path: String,
    #[serde(default)]
    pub method: HttpMethod,
    /// Dotted path of the field to extract from the response body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_path: Option<String>,
}

impl RestEndpointConfig {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: HttpMethod::Get,
            data_path: None,
        }
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            ..Self::get(path)
        }
    }

    pub fn with_data_path(mut self, data_path: impl Into<String>) -> Self {
        self.data_path = Some(data_path.into());
        self
    }
}

/// Configuration of a generic REST adapter: the endpoint table is its whole
/// behavioral surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaAdapterConfig {
    #[serde(flatten)]
    pub adapter: AdapterConfig,
    pub base_url: String,
    #[serde(default)]
    pub endpoints: BTreeMap<String, RestEndpointConfig>,
}

impl SchemaAdapterConfig {
    pub fn new(adapter: AdapterConfig, base_url: impl Into<String>) -> Self {
        Self {
            adapter,
            base_url: base_url.into(),
            endpoints: BTreeMap::new(),
        }
    }

    pub fn from_json_str(input: &str) -> Result<Self, CoreError> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self, CoreError> {
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_endpoint(mut self, name: impl Into<String>, endpoint: RestEndpointConfig) -> Self {
        self.endpoints.insert(name.into(), endpoint);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.adapter.validate()?;

        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err(ValidationError::EmptyBaseUrl);
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ValidationError::BaseUrlScheme {
                value: self.base_url.clone(),
            });
        }

        for (name, endpoint) in &self.endpoints {
            if name.trim().is_empty() {
                return Err(ValidationError::EmptyEndpointName);
            }
            if let Some(data_path) = &endpoint.data_path {
                if data_path.split('.').any(str::is_empty) {
                    return Err(ValidationError::EmptyDataPathSegment {
                        endpoint: name.clone(),
                        data_path: data_path.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
