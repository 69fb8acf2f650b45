#[path = "../support/mod.rs"]
mod support;

use std::sync::Arc;

use serde_json::{json, Value};
use support::{exchange_config, rest_adapter, RecordingHttpClient};
use truthsource_core::{
    Adapter, AdapterConfig, AdapterCore, DataCategory, DataRequest, DataSource, HttpRequest,
    JsonSchema, RequestParams, RuntimeOptions, SourceError, SourceFuture, TruthData,
    TruthProducer, TruthPoint,
};

/// Hand-written adapter in the shape a source author would write one.
#[derive(Debug)]
struct WeatherProducer;

impl TruthProducer for WeatherProducer {
    type Output = TruthData;

    fn fetch_data<'a>(
        &'a self,
        core: &'a AdapterCore,
        params: &'a RequestParams,
    ) -> SourceFuture<'a, TruthData> {
        Box::pin(async move {
            let city = params
                .get("city")
                .and_then(Value::as_str)
                .ok_or_else(|| SourceError::configuration("city param is required"))?;
            let key = core.secret("WEATHER_API_KEY").await.unwrap_or_default();
            let response = core
                .http_client()
                .execute(
                    HttpRequest::get(format!("https://weather.test/current/{city}"))
                        .with_query("key", key),
                )
                .await
                .map_err(|error| SourceError::transport(&error))?;
            let body: Value = serde_json::from_str(&response.body)
                .map_err(|error| SourceError::decode(error.to_string()))?;

            Ok(TruthData::new(
                city,
                body["tempC"].clone(),
                "weather",
                core.id().as_str(),
                1_700_000_000,
            ))
        })
    }

    fn mock_data<'a>(
        &'a self,
        core: &'a AdapterCore,
        _params: &'a RequestParams,
    ) -> SourceFuture<'a, TruthData> {
        Box::pin(async move {
            Ok(TruthData::new("mock", json!(21.5), "weather", core.id().as_str(), 0))
        })
    }
}

async fn assert_contract<S: DataSource>(source: &S, request: DataRequest) {
    let id = source.id().as_str().to_owned();
    assert!(!id.is_empty(), "id must be non-empty");
    assert_eq!(id, id.to_lowercase(), "id must be lowercase");
    assert!(!id.contains(char::is_whitespace), "id must not contain whitespace");

    let caps = source.capabilities();
    assert!(caps.supports_realtime, "{id}: realtime");
    assert!(!caps.supports_historical, "{id}: historical");
    assert!(!caps.supports_batch, "{id}: batch");

    source.initialize().await.expect("initialize succeeds");

    let response = source.fetch(request).await.expect("fetch succeeds");
    assert_eq!(response.metadata.source, id, "{id}: metadata source");
    assert!(!response.metadata.cache_hit, "{id}: cache hit");
    assert_eq!(response.metadata.latency, 0, "{id}: latency");
    assert!(response.metadata.fetched_at >= response.metadata.timestamp);

    source.dispose().await;
    source.dispose().await;
}

#[tokio::test]
async fn rest_adapter_honors_contract() {
    let client = Arc::new(RecordingHttpClient::responding(200, r#"{"price":"42000"}"#));
    let adapter = rest_adapter(exchange_config(), client);

    assert_contract(
        &adapter,
        DataRequest::default()
            .with_param("endpoint", "ticker")
            .with_param("symbol", "BTC"),
    )
    .await;
}

#[tokio::test]
async fn hand_written_adapter_honors_contract() {
    let client = Arc::new(RecordingHttpClient::responding(200, r#"{"tempC":18.2}"#));
    let adapter = Adapter::with_http_client(
        AdapterConfig::new("Weather Station", DataCategory::Weather).with_api_key("wk-1"),
        RuntimeOptions::default(),
        WeatherProducer,
        client.clone(),
    )
    .expect("valid adapter");

    assert_contract(&adapter, DataRequest::default().with_param("city", "Oslo")).await;

    let request = client.last_request();
    assert_eq!(request.url, "https://weather.test/current/Oslo");
    assert_eq!(request.query, vec![("key".to_owned(), "wk-1".to_owned())]);
}

#[tokio::test]
async fn explicit_id_wins_over_name() {
    let client = Arc::new(RecordingHttpClient::responding(200, r#"{"tempC":1}"#));
    let adapter = Adapter::with_http_client(
        AdapterConfig::new("Weather Station", DataCategory::Weather).with_id("wx.primary"),
        RuntimeOptions::default(),
        WeatherProducer,
        client,
    )
    .expect("valid adapter");

    assert_eq!(adapter.id().as_str(), "wx.primary");
    assert_eq!(adapter.name(), "Weather Station");
}

#[tokio::test]
async fn sources_are_usable_as_trait_objects() {
    let client = Arc::new(RecordingHttpClient::responding(200, r#"{"tempC":9}"#));
    let adapter = Adapter::with_http_client(
        AdapterConfig::new("Weather Station", DataCategory::Weather).with_mocks(true),
        RuntimeOptions::default(),
        WeatherProducer,
        client.clone(),
    )
    .expect("valid adapter");
    let source: Arc<dyn DataSource<Output = TruthData>> = Arc::new(adapter);

    let response = source.fetch(DataRequest::default()).await.expect("mock fetch");

    assert_eq!(response.data.value, json!(21.5));
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn response_schema_is_exposed_not_enforced() {
    let schema = JsonSchema::new(json!({ "type": "string" })).expect("valid schema");
    let client = Arc::new(RecordingHttpClient::responding(200, r#"{"tempC":18.2}"#));
    let adapter = Adapter::with_http_client(
        AdapterConfig::new("Weather Station", DataCategory::Weather)
            .with_response_schema(Arc::new(schema)),
        RuntimeOptions::default(),
        WeatherProducer,
        client,
    )
    .expect("valid adapter");

    let response = adapter
        .fetch(DataRequest::default().with_param("city", "Lima"))
        .await
        .expect("adapter does not validate");

    let validator = adapter.schema().expect("schema is carried");
    assert!(validator.validate(&response.data.value).is_err());
}

#[tokio::test]
async fn producer_errors_reach_the_caller() {
    let client = Arc::new(RecordingHttpClient::responding(200, "not json"));
    let adapter = Adapter::with_http_client(
        AdapterConfig::new("Weather Station", DataCategory::Weather),
        RuntimeOptions::default(),
        WeatherProducer,
        client,
    )
    .expect("valid adapter");

    let missing = adapter
        .fetch(DataRequest::default())
        .await
        .expect_err("city is required");
    assert_eq!(missing.message(), "city param is required");

    let undecodable = adapter
        .fetch(DataRequest::default().with_param("city", "Rome"))
        .await
        .expect_err("body is not json");
    assert_eq!(undecodable.code(), "source.decode");
}

#[tokio::test]
async fn gateway_wraps_responses_with_lineage() {
    let client = Arc::new(RecordingHttpClient::responding(200, r#"{"price":"42000"}"#));
    let adapter = rest_adapter(exchange_config(), client);

    let response = adapter
        .fetch(
            DataRequest::default()
                .with_param("endpoint", "ticker")
                .with_param("symbol", "BTC"),
        )
        .await
        .expect("fetch succeeds");
    let point = TruthPoint::from_response(response, "round-1");

    assert_eq!(point.metadata.lineage.adapter, "example_exchange");
    assert_eq!(point.metadata.request_id, "round-1");
    assert!(point.metadata.quality.freshness >= 0);
    assert_eq!(
        point.value.record().map(|record| record.value.clone()),
        Some(json!("42000"))
    );
}
