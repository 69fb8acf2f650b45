use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ValidationError;

/// Transport timeout applied when `clientConfig` does not override it.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

const DEFAULT_USER_AGENT: &str = concat!("truthsource/", env!("CARGO_PKG_VERSION"));

/// HTTP methods an endpoint template may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl HttpMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl Display for HttpMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            _ => Err(ValidationError::InvalidHttpMethod {
                value: value.to_owned(),
            }),
        }
    }
}

/// HTTP request envelope used by adapter transport calls.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn with_json_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// HTTP response envelope returned by an adapter transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok_json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport-level HTTP error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    message: String,
    retryable: bool,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }

    pub fn non_retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

/// Adapter transport contract. Implementations are shared across
/// overlapping fetches and must not mutate per call.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;
}

/// Offline transport answering every call with an empty JSON object.
#[derive(Debug, Default)]
pub struct NoopHttpClient;

impl HttpClient for NoopHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let _ = request;
        Box::pin(async move { Ok(HttpResponse::ok_json("{}")) })
    }
}

/// Typed passthrough transport options (`clientConfig`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransportOptions {
    #[serde(alias = "timeout")]
    pub timeout_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: None,
            headers: BTreeMap::new(),
        }
    }
}

impl TransportOptions {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_ms == 0 {
            return Err(ValidationError::ZeroTimeout);
        }
        Ok(())
    }
}

/// Production transport backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    /// Builds a client with the default 30 second timeout and no proxy.
    pub fn new() -> Self {
        Self {
            client: Arc::new(
                reqwest::Client::builder()
                    .user_agent(DEFAULT_USER_AGENT)
                    .timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
                    .build()
                    .unwrap_or_else(|_| reqwest::Client::new()),
            ),
        }
    }

    /// Builds a client from transport options.
    ///
    /// When `proxy` is set every outbound call is routed through it and the
    /// ambient proxy environment variables are ignored.
    pub fn from_options(
        options: &TransportOptions,
        proxy: Option<&str>,
    ) -> Result<Self, ValidationError> {
        options.validate()?;

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_millis(options.timeout_ms))
            .user_agent(options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT));

        if !options.headers.is_empty() {
            let mut headers = HeaderMap::with_capacity(options.headers.len());
            for (name, value) in &options.headers {
                let header_name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|_| ValidationError::InvalidHeader { name: name.clone() })?;
                let header_value = HeaderValue::from_str(value)
                    .map_err(|_| ValidationError::InvalidHeader { name: name.clone() })?;
                headers.insert(header_name, header_value);
            }
            builder = builder.default_headers(headers);
        }

        if let Some(proxy_url) = proxy {
            let proxy = reqwest::Proxy::all(proxy_url).map_err(|error| {
                ValidationError::InvalidProxy {
                    value: proxy_url.to_owned(),
                    reason: error.to_string(),
                }
            })?;
            builder = builder.no_proxy().proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|error| ValidationError::TransportBuild {
                reason: error.to_string(),
            })?;

        Ok(Self::with_client(client))
    }

    /// Wraps an already configured reqwest client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let mut builder = match request.method {
                HttpMethod::Get => self.client.get(&request.url),
                HttpMethod::Post => self.client.post(&request.url),
            };

            if !request.query.is_empty() {
                builder = builder.query(&request.query);
            }

            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            // Query strings may carry credentials; keep the url out of messages.
            let response = builder.send().await.map_err(|e| {
                let e = e.without_url();
                if e.is_timeout() {
                    HttpError::new(format!("request timeout: {}", e))
                } else if e.is_connect() {
                    HttpError::new(format!("connection failed: {}", e))
                } else if e.is_builder() {
                    HttpError::non_retryable(format!("invalid request: {}", e))
                } else {
                    HttpError::new(format!("request failed: {}", e))
                }
            })?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| {
                    HttpError::new(format!("failed to read response body: {}", e.without_url()))
                })?;

            Ok(HttpResponse { status, body })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_methods_case_insensitively() {
        assert_eq!("post".parse::<HttpMethod>(), Ok(HttpMethod::Post));
        assert!(matches!(
            "DELETE".parse::<HttpMethod>(),
            Err(ValidationError::InvalidHttpMethod { .. })
        ));
    }

    #[test]
    fn transport_options_default_to_thirty_seconds() {
        let options: TransportOptions = serde_json::from_str("{}").expect("valid options");
        assert_eq!(options.timeout_ms, DEFAULT_TIMEOUT_MS);

        let options: TransportOptions =
            serde_json::from_str(r#"{"timeout": 5000}"#).expect("valid options");
        assert_eq!(options.timeout_ms, 5_000);
    }

    #[test]
    fn rejects_zero_timeout() {
        let options = TransportOptions {
            timeout_ms: 0,
            ..TransportOptions::default()
        };
        let err = ReqwestHttpClient::from_options(&options, None).expect_err("must fail");
        assert_eq!(err, ValidationError::ZeroTimeout);
    }

    #[test]
    fn rejects_malformed_proxy() {
        let err = ReqwestHttpClient::from_options(&TransportOptions::default(), Some("http://bad host:3128"))
            .expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidProxy { .. }));
    }

    #[test]
    fn accepts_proxy_url() {
        let client = ReqwestHttpClient::from_options(
            &TransportOptions::default(),
            Some("http://proxy.internal:3128"),
        );
        assert!(client.is_ok());
    }
}
