//! HTTP surface served on an ephemeral port

mod common;

use reqwest::StatusCode;
use serde_json::Value;
use tokio::net::TcpListener;

use common::Harness;
use weather_gateway::web::create_app;

struct TestServer {
    base_url: String,
    client: reqwest::Client,
}

impl TestServer {
    async fn start(harness: &Harness) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let app = create_app(harness.state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{address}"),
            client: reqwest::Client::new(),
        }
    }

    async fn get(&self, path_and_query: &str) -> (StatusCode, Value) {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path_and_query))
            .send()
            .await
            .unwrap();
        let status = response.status();
        let body = response.json::<Value>().await.unwrap();
        (status, body)
    }
}

#[tokio::test]
async fn test_current_weather_endpoint() {
    let harness = Harness::new();
    let server = TestServer::start(&harness).await;

    let (status, body) = server
        .get("/api/weather/current?lat=51.5074&lon=-0.1278")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["location"]["name"], "London");
    assert_eq!(body["current"]["temperature"], 15);
    assert_eq!(body["sun"]["sunrise"], "07:00");
}

#[tokio::test]
async fn test_missing_coordinates_rejected() {
    let harness = Harness::new();
    let server = TestServer::start(&harness).await;

    let (status, body) = server.get("/api/weather/current?lat=51.5").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert_eq!(
        body["error"]["message"],
        "Latitude and longitude are required"
    );
}

#[tokio::test]
async fn test_unparseable_coordinates_rejected_as_json() {
    let harness = Harness::new();
    let server = TestServer::start(&harness).await;

    let (status, body) = server.get("/api/weather/current?lat=north&lon=0").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_out_of_range_coordinates_rejected() {
    let harness = Harness::new();
    let server = TestServer::start(&harness).await;

    let (status, _) = server.get("/api/weather/forecast?lat=95&lon=0").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(harness.upstream.total_data_calls(), 0);
}

#[tokio::test]
async fn test_forecast_defaults_to_five_days() {
    let harness = Harness::new();
    let server = TestServer::start(&harness).await;

    let (status, body) = server.get("/api/weather/forecast?lat=10&lon=10").await;

    assert_eq!(status, StatusCode::OK);
    let days = body["forecast"].as_array().unwrap();
    assert_eq!(days.len(), 5);
    assert_eq!(days[0]["date"], "2024-03-01");
}

#[tokio::test]
async fn test_forecast_days_out_of_range() {
    let harness = Harness::new();
    let server = TestServer::start(&harness).await;

    let (status, body) = server
        .get("/api/weather/forecast?lat=10&lon=10&days=8")
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Days must be between 1 and 7");
}

#[tokio::test]
async fn test_location_search_accepts_query_alias() {
    let harness = Harness::new();
    let server = TestServer::start(&harness).await;

    let (status, body) = server
        .get("/api/locations/search?query=Springfield&limit=3")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["locations"].as_array().unwrap().len(), 3);

    let (status, body) = server.get("/api/locations/search?q=Springfield").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["locations"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_location_search_requires_query() {
    let harness = Harness::new();
    let server = TestServer::start(&harness).await;

    let (status, body) = server.get("/api/locations/search").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Search query is required");
}

#[tokio::test]
async fn test_upstream_failure_is_500() {
    let harness = Harness::new();
    harness.upstream.fail_with_status(Some(502));
    let server = TestServer::start(&harness).await;

    let (status, body) = server.get("/api/weather/current?lat=1&lon=1").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
}

#[tokio::test]
async fn test_probe_endpoints_status_codes() {
    let harness = Harness::new();
    let server = TestServer::start(&harness).await;

    let (status, body) = server.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = server.get("/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"].as_array().unwrap().len(), 5);

    let (status, body) = server.get("/live").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");

    let (status, body) = server.get("/health/dependencies").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_failing_probes_status_codes() {
    let harness = Harness::new();
    harness.datastore.set_reachable(false);
    harness.sampler.set_memory_percent(97.0);
    let server = TestServer::start(&harness).await;

    let (status, body) = server.get("/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "not_ready");

    let (status, body) = server.get("/live").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], "Application resource exhausted");

    let (status, body) = server.get("/health/dependencies").await;
    assert_eq!(status.as_u16(), 207);
    assert_eq!(body["status"], "degraded");
}

#[tokio::test]
async fn test_metrics_summary_and_deep() {
    let harness = Harness::new();
    let server = TestServer::start(&harness).await;

    let (status, body) = server.get("/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("system_cpu_usage_percent").is_some());

    let (status, body) = server.get("/health/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready_for_traffic"], true);
    assert_eq!(body["health_endpoints"]["liveness"], "/live");

    let (status, body) = server.get("/health/deep").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["liveness"]["status"], "alive");
    assert!(body["metrics_sample"].is_object());
}

#[tokio::test]
async fn test_metrics_failure_is_500() {
    let harness = Harness::new();
    harness.sampler.set_failing(true);
    let server = TestServer::start(&harness).await;

    let (status, body) = server.get("/metrics").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
}

#[tokio::test]
async fn test_index_and_unknown_path() {
    let harness = Harness::new();
    let server = TestServer::start(&harness).await;

    let (status, body) = server.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "weather-gateway");
    assert!(body["endpoints"]["forecast"].is_string());

    let (status, body) = server.get("/api/weather/historical").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}
