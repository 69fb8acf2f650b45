//! Base adapter lifecycle.
//!
//! An [`Adapter`] pairs the shared [`AdapterCore`] (identity, capabilities,
//! transport, mock switch, secret lookup) with a [`TruthProducer`] that knows
//! how to turn one source's API into values. Producers implement only the two
//! data-producing operations; `fetch` dispatch, as-of timestamping and
//! response metadata are handled here for every adapter alike.
//!
//! ```text
//! Gateway ──fetch──▶ Adapter<P> ──mock?──▶ P::mock_data
//!                        │        └──live──▶ P::fetch_data ──▶ HttpClient
//!                        ▼
//!               DataResponse { data, metadata }
//! ```

use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::config::{AdapterConfig, RuntimeOptions};
use crate::data_source::{
    DataRequest, DataResponse, DataSource, RequestParams, ResponseMetadata, SourceCapabilities,
    SourceError, SourceFuture,
};
use crate::domain::unix_millis_now;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::schema::ResponseSchema;
use crate::{DataCategory, SourceId};

/// Source-specific half of an adapter.
///
/// `fetch_data` talks to the live source; `mock_data` returns a fixture
/// without touching the network. Both receive the adapter core for identity
/// and transport access.
pub trait TruthProducer: Send + Sync {
    type Output: Send;

    /// Fetches from the live source.
    ///
    /// # Errors
    ///
    /// Fails when the request cannot be served by this source's
    /// configuration, or when the upstream is unreachable or answers with an
    /// error.
    fn fetch_data<'a>(
        &'a self,
        core: &'a AdapterCore,
        params: &'a RequestParams,
    ) -> SourceFuture<'a, Self::Output>;

    /// Returns a deterministic or illustrative fixture.
    fn mock_data<'a>(
        &'a self,
        core: &'a AdapterCore,
        params: &'a RequestParams,
    ) -> SourceFuture<'a, Self::Output>;

    /// Releases producer-held resources.
    fn dispose<'a>(&'a self) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async {})
    }
}

/// Secret lookup hook. Host integrations swap in a vault or KMS backed
/// resolver.
pub trait SecretResolver: Send + Sync {
    fn resolve<'a>(&'a self, name: &'a str)
        -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>>;
}

/// Resolves any name containing `API_KEY` to the configured api key.
#[derive(Clone, Default)]
pub struct ConfigSecretResolver {
    api_key: Option<String>,
}

impl ConfigSecretResolver {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }
}

impl Debug for ConfigSecretResolver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigSecretResolver")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl SecretResolver for ConfigSecretResolver {
    fn resolve<'a>(
        &'a self,
        name: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async move {
            if name.contains("API_KEY") {
                self.api_key.clone()
            } else {
                None
            }
        })
    }
}

/// Identity, declared capabilities and transport shared by every adapter.
pub struct AdapterCore {
    id: SourceId,
    capabilities: SourceCapabilities,
    config: AdapterConfig,
    http_client: Arc<dyn HttpClient>,
    use_mocks: bool,
    secrets: Arc<dyn SecretResolver>,
    disposed: AtomicBool,
}

impl AdapterCore {
    /// Builds the core with a reqwest transport configured from
    /// `client_config` and `proxy`.
    pub fn new(config: AdapterConfig, runtime: RuntimeOptions) -> Result<Self, SourceError> {
        config.validate()?;
        let http_client =
            ReqwestHttpClient::from_options(&config.client_config, config.proxy.as_deref())?;
        Self::with_http_client(config, runtime, Arc::new(http_client))
    }

    /// Builds the core around an existing transport.
    pub fn with_http_client(
        config: AdapterConfig,
        runtime: RuntimeOptions,
        http_client: Arc<dyn HttpClient>,
    ) -> Result<Self, SourceError> {
        config.validate()?;
        let id = config.source_id();

        let capabilities = SourceCapabilities {
            rate_limit_per_minute: config.rate_limit_request_per_minute,
            ..SourceCapabilities::realtime(config.api_key.is_some())
        };

        Ok(Self {
            id,
            capabilities,
            use_mocks: config.use_mocks || runtime.force_mocks,
            secrets: Arc::new(ConfigSecretResolver::new(config.api_key.clone())),
            config,
            http_client,
            disposed: AtomicBool::new(false),
        })
    }

    pub fn id(&self) -> &SourceId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn category(&self) -> Option<DataCategory> {
        self.config.category
    }

    pub fn capabilities(&self) -> SourceCapabilities {
        self.capabilities
    }

    pub fn schema(&self) -> Option<&dyn ResponseSchema> {
        self.config.response_schema.as_deref()
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn http_client(&self) -> &Arc<dyn HttpClient> {
        &self.http_client
    }

    /// Whether `fetch` takes the mock path.
    pub fn mock_mode(&self) -> bool {
        self.use_mocks
    }

    /// Resolves a named secret through the configured resolver.
    pub async fn secret(&self, name: &str) -> Option<String> {
        self.secrets.resolve(name).await
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

impl Debug for AdapterCore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterCore")
            .field("id", &self.id)
            .field("capabilities", &self.capabilities)
            .field("config", &self.config)
            .field("use_mocks", &self.use_mocks)
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

/// A concrete adapter: shared core composed with a source-specific producer.
#[derive(Debug)]
pub struct Adapter<P> {
    core: AdapterCore,
    producer: P,
}

impl<P: TruthProducer> Adapter<P> {
    pub fn new(
        config: AdapterConfig,
        runtime: RuntimeOptions,
        producer: P,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            core: AdapterCore::new(config, runtime)?,
            producer,
        })
    }

    pub fn with_http_client(
        config: AdapterConfig,
        runtime: RuntimeOptions,
        producer: P,
        http_client: Arc<dyn HttpClient>,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            core: AdapterCore::with_http_client(config, runtime, http_client)?,
            producer,
        })
    }

    pub fn with_secret_resolver(mut self, resolver: Arc<dyn SecretResolver>) -> Self {
        self.core.secrets = resolver;
        self
    }

    pub fn core(&self) -> &AdapterCore {
        &self.core
    }

    pub fn producer(&self) -> &P {
        &self.producer
    }

    pub async fn secret(&self, name: &str) -> Option<String> {
        self.core.secret(name).await
    }
}

impl<P: TruthProducer> DataSource for Adapter<P> {
    type Output = P::Output;

    fn id(&self) -> &SourceId {
        self.core.id()
    }

    fn name(&self) -> &str {
        self.core.name()
    }

    fn category(&self) -> Option<DataCategory> {
        self.core.category()
    }

    fn capabilities(&self) -> SourceCapabilities {
        self.core.capabilities()
    }

    fn schema(&self) -> Option<&dyn ResponseSchema> {
        self.core.schema()
    }

    fn fetch<'a>(&'a self, request: DataRequest) -> SourceFuture<'a, DataResponse<P::Output>> {
        Box::pin(async move {
            if self.core.is_disposed() {
                return Err(SourceError::disposed(self.core.id()));
            }

            let mock = self.core.mock_mode();
            debug!(
                source = %self.core.id(),
                mock,
                attested = request.attestation_context.is_some(),
                "dispatching fetch"
            );

            let data = if mock {
                self.producer.mock_data(&self.core, &request.params).await?
            } else {
                self.producer.fetch_data(&self.core, &request.params).await?
            };

            let timestamp = request
                .attestation_context
                .as_ref()
                .map(|context| context.attestation_timestamp)
                .unwrap_or_else(unix_millis_now);

            Ok(DataResponse {
                data,
                metadata: ResponseMetadata::new(self.core.id().as_str(), timestamp, unix_millis_now()),
            })
        })
    }

    fn dispose<'a>(&'a self) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            if self.core.disposed.swap(true, Ordering::SeqCst) {
                debug!(source = %self.core.id(), "dispose called again; ignoring");
                return;
            }
            self.producer.dispose().await;
            debug!(source = %self.core.id(), "adapter disposed");
        })
    }
}
