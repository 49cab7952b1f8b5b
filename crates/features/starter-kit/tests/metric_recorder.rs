use initium_domain::config::MetricConfig;
use initium_domain::starter_kit::StarterKitType;
use initium_starter_kit::metric::{GenerationMetric, HttpMetricRecorder, MetricRecorder};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn metric() -> GenerationMetric {
    let config = MetricConfig { dds_prefix: "DDS-".to_owned(), ..MetricConfig::default() };
    GenerationMetric::component(&config, StarterKitType::Tonic, "Acme", "ACME_B", &["batch".to_owned()])
}

#[tokio::test]
async fn metric_is_put_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/modules"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "dds": "DDS-Acme",
            "codeModule": "ACME_B",
            "typeModule": "batch",
            "typeSK": "TONIC",
            "versionSK": "1.0.0",
            "usecases": "batch"
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let recorder = HttpMetricRecorder::new(Client::new(), &format!("{}/api", server.uri()), Duration::from_secs(5)).unwrap();
    recorder.record(&metric()).await.unwrap();
}

#[tokio::test]
async fn sink_errors_are_reported_to_the_caller() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let recorder = HttpMetricRecorder::new(Client::new(), &server.uri(), Duration::from_secs(5)).unwrap();
    let err = recorder.record(&metric()).await.unwrap_err();

    assert_eq!(err.cause(), "status");
}
