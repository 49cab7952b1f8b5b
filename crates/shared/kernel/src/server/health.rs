use super::state::ApiState;
use axum::extract::State;
use axum::http::header;
use axum::{Json, response::IntoResponse};
use initium_derive::{api_handler, api_model};
use initium_domain::constants::TAG_SYSTEM;
use std::sync::LazyLock;
use std::time::Instant;

#[api_model]
/// Liveness report
pub(crate) struct HealthResponse {
    /// Always `up` while the process serves requests
    status: &'static str,
    version: &'static str,
    /// Seconds since the first health probe
    uptime: u64,
    /// Registered feature slices, e.g. `starter-kit`
    slices: Vec<String>,
}

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

#[api_handler(
    get,
    path = "/health",
    responses((status = OK, description = "Liveness probe", body = HealthResponse)),
    tag = TAG_SYSTEM,
)]
pub(super) async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let body = HealthResponse {
        status: "up",
        version: env!("CARGO_PKG_VERSION"),
        uptime: START_TIME.elapsed().as_secs(),
        slices: state.slice_names().map(str::to_owned).collect(),
    };

    ([(header::CACHE_CONTROL, "no-store, no-cache, must-revalidate")], Json(body))
}
