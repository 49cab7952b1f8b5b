//! HTTP surface of the slice, mounted under [`API_PREFIX`].

mod handlers;
pub mod models;
mod problem;

use initium_domain::constants::API_PREFIX;
use initium_kernel::server::state::ApiState;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Starter-kit routes; expects a [`crate::StarterKit`] slice in the state.
pub fn router() -> OpenApiRouter<ApiState> {
    let routes = OpenApiRouter::new()
        .routes(routes!(handlers::list_starter_kits))
        .routes(routes!(handlers::list_features))
        .routes(routes!(handlers::list_contract_types))
        .routes(routes!(handlers::generate_component))
        .routes(routes!(handlers::generate_contract))
        .routes(routes!(handlers::list_library_starter_kits))
        .routes(routes!(handlers::generate_library));

    OpenApiRouter::new().nest(API_PREFIX, routes)
}
