//! Starter-kit feature slice.
//!
//! Validates requested features against a cached catalog of what the upstream
//! generator supports, then forwards accepted requests to it and returns the
//! generated archive. [`orchestrator::RequestOrchestrator`] is the entry point;
//! the HTTP surface lives behind the `server` feature.

pub mod catalog;
pub mod dispatcher;
mod error;
pub mod metric;
pub mod orchestrator;
#[cfg(feature = "server")]
pub mod server;
pub mod upstream;
pub mod validator;

pub use crate::error::{
    CatalogError, CatalogErrorExt, DispatchError, DispatchErrorExt, Rejection, RejectionExt, StarterKitError,
    StarterKitErrorExt, UpstreamError, UpstreamErrorExt,
};

use crate::catalog::{FeatureCatalog, StalePolicy};
use crate::dispatcher::GenerationDispatcher;
use crate::orchestrator::RequestOrchestrator;
use crate::upstream::TonicClient;
use initium_domain::config::ApiConfig;
use initium_kernel::registry::InitializedSlice;
use std::sync::Arc;
use tracing::info;

/// Slice state shared with the request handlers.
#[initium_derive::initium_slice]
pub struct StarterKit {
    pub orchestrator: RequestOrchestrator,
}

/// Wires the upstream client, catalog, dispatcher and metric recorder from `config`.
pub fn build(config: &ApiConfig) -> Result<StarterKit, StarterKitError> {
    let tonic = Arc::new(StarterKitErrorExt::context(
        TonicClient::new(&config.initializr),
        "building the initializr client",
    )?);
    let recorder = StarterKitErrorExt::context(
        metric::recorder_from_config(tonic.http().clone(), &config.metric),
        "building the metric recorder",
    )?;

    let catalog = Arc::new(FeatureCatalog::new(
        Arc::clone(&tonic) as Arc<dyn upstream::DependencySource>,
        config.catalog.ttl(),
        StalePolicy::from_flag(config.catalog.serve_stale),
    ));
    let dispatcher = GenerationDispatcher::new(tonic, config.initializr.org_prefix.clone())
        .with_timeout(config.initializr.timeout());

    info!(
        upstream = %config.initializr.url,
        ttl_s = config.catalog.ttl_seconds,
        serve_stale = config.catalog.serve_stale,
        metrics = config.metric.url.is_some(),
        "Starter-kit slice initialized"
    );

    Ok(StarterKit::new(StarterKitInner {
        orchestrator: RequestOrchestrator::new(catalog, dispatcher, recorder, config.metric.clone()),
    }))
}

/// [`build`], type-erased for the slice registry.
pub fn init(config: &ApiConfig) -> Result<InitializedSlice, StarterKitError> {
    build(config).map(InitializedSlice::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use initium_kernel::registry::FeatureSlice;

    #[tokio::test]
    async fn slice_builds_from_default_config() {
        let slice = build(&ApiConfig::default()).unwrap();

        assert_eq!(slice.name(), "starter-kit");
        assert_eq!(slice.orchestrator.catalog().ttl().as_secs(), 3600);
        assert!(slice.orchestrator.catalog().cached().is_none());
    }

    #[test]
    fn invalid_upstream_url_fails_setup() {
        let mut config = ApiConfig::default();
        config.initializr.url = "::not a url::".to_owned();

        let err = init(&config).unwrap_err();
        assert!(matches!(err, StarterKitError::Setup { source: UpstreamError::Url { .. }, .. }));
    }
}
