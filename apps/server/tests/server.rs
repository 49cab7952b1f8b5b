use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use initium::domain::config::ApiConfig;
use initium_server::Server;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(upstream: &MockServer, refresh_on_start: bool) -> ApiConfig {
    let mut config = ApiConfig::default();
    config.initializr.url = upstream.uri();
    config.catalog.refresh_on_start = refresh_on_start;
    config
}

async fn get(server: &Server, uri: &str) -> (StatusCode, Vec<u8>) {
    let response =
        server.app().oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap()).await.unwrap();
    let status = response.status();
    (status, to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec())
}

#[tokio::test]
async fn app_serves_system_and_starter_kit_routes() {
    let upstream = MockServer::start().await;
    let server = Server::builder().config(config(&upstream, false)).build().await.unwrap();

    let (status, body) = get(&server, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let health = serde_json::from_slice::<Value>(&body).unwrap();
    assert_eq!(health["status"], "up");
    assert_eq!(health["slices"], json!(["starter-kit"]));

    let (status, body) = get(&server, "/api/v1/starter-kits").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap()["starterKits"], json!(["TONIC", "STUMP", "HUMAN"]));

    let (status, body) = get(&server, "/api").await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8_lossy(&body).contains("/api/v1/components"));
}

#[tokio::test]
async fn warm_up_fills_the_catalog() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/metadata/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dependencies": { "content": [ { "name": "Web", "content": [ { "id": "web" } ] } ] }
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = Server::builder().config(config(&upstream, true)).build().await.unwrap();

    let snapshot = server.catalog().cached().expect("catalog should be warm");
    assert!(snapshot.general().contains("web"));
}

#[tokio::test]
async fn failed_warm_up_does_not_prevent_startup() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/metadata/config"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&upstream)
        .await;

    let server = Server::builder().config(config(&upstream, true)).build().await.unwrap();

    assert!(server.catalog().cached().is_none());
    assert_eq!(server.state().slice_names().collect::<Vec<_>>(), ["starter-kit"]);
}

#[tokio::test]
async fn missing_tls_files_are_rejected() {
    let upstream = MockServer::start().await;
    let mut config = config(&upstream, false);
    config.server.ssl = Some(initium::domain::config::SslConfig {
        cert: "/nonexistent/cert.pem".into(),
        key: "/nonexistent/key.pem".into(),
    });

    let err = Server::builder().config(config).build().await.unwrap_err();
    assert!(err.to_string().contains("SSL certificate not found"));
}
