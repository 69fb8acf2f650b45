#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use truthsource_core::{
    AdapterConfig, DataCategory, GenericRestAdapter, HttpClient, HttpError, HttpRequest,
    HttpResponse, RestEndpointConfig, RuntimeOptions, SchemaAdapterConfig,
};

pub const BASE_URL: &str = "https://api.example.test";

/// Transport double that records every request and replays queued answers.
#[derive(Debug)]
pub struct RecordingHttpClient {
    requests: Mutex<Vec<HttpRequest>>,
    queued: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    fallback: Result<HttpResponse, HttpError>,
    delay: Option<Duration>,
}

impl RecordingHttpClient {
    pub fn responding(status: u16, body: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            queued: Mutex::new(VecDeque::new()),
            fallback: Ok(HttpResponse {
                status,
                body: body.to_owned(),
            }),
            delay: None,
        }
    }

    pub fn failing(error: HttpError) -> Self {
        Self {
            fallback: Err(error),
            ..Self::responding(200, "{}")
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn queue(&self, answer: Result<HttpResponse, HttpError>) {
        self.queued.lock().expect("queue lock").push_back(answer);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests().pop().expect("at least one request")
    }
}

impl HttpClient for RecordingHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            self.requests.lock().expect("requests lock").push(request);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let queued = self.queued.lock().expect("queue lock").pop_front();
            queued.unwrap_or_else(|| self.fallback.clone())
        })
    }
}

/// Exchange-style REST config with one endpoint per response shape.
pub fn exchange_config() -> SchemaAdapterConfig {
    SchemaAdapterConfig::new(
        AdapterConfig::new("Example Exchange", DataCategory::Crypto),
        BASE_URL,
    )
    .with_endpoint(
        "ticker",
        RestEndpointConfig::get("/ticker/${symbol}").with_data_path("price"),
    )
    .with_endpoint(
        "book",
        RestEndpointConfig::get("/book/${symbol}").with_data_path("result.deep.value"),
    )
    .with_endpoint(
        "rates",
        RestEndpointConfig::get("/rates").with_data_path("data.rates.1"),
    )
    .with_endpoint("status", RestEndpointConfig::get("/status"))
    .with_endpoint("orders", RestEndpointConfig::post("/orders/${symbol}"))
}

pub fn rest_adapter(
    config: SchemaAdapterConfig,
    client: Arc<RecordingHttpClient>,
) -> GenericRestAdapter {
    GenericRestAdapter::from_schema_with_http_client(config, RuntimeOptions::default(), client)
        .expect("valid rest adapter")
}
