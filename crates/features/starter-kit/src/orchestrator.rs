//! # Request orchestration
//!
//! Entry point of the slice. Every generation runs validate, then dispatch,
//! then hands a usage metric to a detached task. A rejection stops the flow
//! before any upstream generation call; a failed metric never fails the
//! request.

use crate::catalog::FeatureCatalog;
use crate::dispatcher::{Archive, GenerationDispatcher, GenerationRequest};
use crate::error::StarterKitError;
use crate::metric::{GenerationMetric, MetricRecorder};
use crate::validator::{FeatureValidator, ValidationOutcome, ensure_supported};
use initium_domain::FeatureId;
use initium_domain::config::MetricConfig;
use initium_domain::starter_kit::{ContractType, StarterKitType};
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRequest {
    pub starter_kit: StarterKitType,
    pub product_name: String,
    pub application_code: String,
    pub features: Vec<FeatureId>,
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractRequest {
    pub starter_kit: StarterKitType,
    pub contract_type: ContractType,
    pub product_name: String,
    pub application_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryRequest {
    pub starter_kit: StarterKitType,
    pub product_name: String,
    pub application_code: String,
}

#[derive(Debug, Clone)]
pub struct RequestOrchestrator {
    catalog: Arc<FeatureCatalog>,
    validator: FeatureValidator,
    dispatcher: GenerationDispatcher,
    recorder: Arc<dyn MetricRecorder>,
    metric: MetricConfig,
}

impl RequestOrchestrator {
    #[must_use]
    pub fn new(
        catalog: Arc<FeatureCatalog>,
        dispatcher: GenerationDispatcher,
        recorder: Arc<dyn MetricRecorder>,
        metric: MetricConfig,
    ) -> Self {
        Self { validator: FeatureValidator::new(Arc::clone(&catalog)), catalog, dispatcher, recorder, metric }
    }

    #[must_use]
    pub const fn catalog(&self) -> &Arc<FeatureCatalog> {
        &self.catalog
    }

    #[instrument(skip_all, fields(starter_kit = %request.starter_kit, application_code = %request.application_code))]
    pub async fn generate_component(&self, request: ComponentRequest) -> Result<Archive, StarterKitError> {
        require_identifiers(&request.product_name, &request.application_code)?;

        let features = self.accept(request.starter_kit, &request.features, false).await?;
        let generation = GenerationRequest {
            group_id: request.group_id,
            artifact_id: request.artifact_id,
            ..GenerationRequest::component(request.starter_kit, request.product_name, request.application_code, features)
        };
        let archive = self.dispatcher.generate(&generation).await?;

        self.record(GenerationMetric::component(
            &self.metric,
            generation.starter_kit,
            &generation.product_name,
            &generation.application_code,
            &generation.features,
        ));
        Ok(archive)
    }

    #[instrument(skip_all, fields(starter_kit = %request.starter_kit, contract = %request.contract_type))]
    pub async fn generate_contract(&self, request: ContractRequest) -> Result<Archive, StarterKitError> {
        require_identifiers(&request.product_name, &request.application_code)?;

        self.accept(request.starter_kit, &[request.contract_type.feature_id()], true).await?;
        let generation = GenerationRequest::contract(
            request.starter_kit,
            request.contract_type,
            request.product_name,
            request.application_code,
        );
        let archive = self.dispatcher.generate(&generation).await?;

        self.record(GenerationMetric::contract(
            &self.metric,
            generation.starter_kit,
            &generation.product_name,
            &generation.application_code,
            request.contract_type,
        ));
        Ok(archive)
    }

    /// The upstream has no library generator: supported kinds fail with
    /// [`StarterKitError::LibraryGenerationUnavailable`].
    pub fn generate_library(request: &LibraryRequest) -> Result<Archive, StarterKitError> {
        require_identifiers(&request.product_name, &request.application_code)?;
        ensure_supported(request.starter_kit)?;

        warn!(starter_kit = %request.starter_kit, "Library generation requested but not available");
        Err(StarterKitError::LibraryGenerationUnavailable { kind: request.starter_kit })
    }

    #[must_use]
    pub fn starter_kits() -> Vec<StarterKitType> {
        StarterKitType::ALL.to_vec()
    }

    #[must_use]
    pub fn library_starter_kits() -> Vec<StarterKitType> {
        StarterKitType::ALL.into_iter().filter(|kind| ensure_supported(*kind).is_ok()).collect()
    }

    /// General features of the current catalog snapshot, sorted.
    pub async fn component_features(&self, kind: StarterKitType) -> Result<Vec<FeatureId>, StarterKitError> {
        ensure_supported(kind)?;
        let snapshot = self.catalog.snapshot().await?;
        Ok(snapshot.general().iter().cloned().collect())
    }

    pub fn contract_types(kind: StarterKitType) -> Result<Vec<ContractType>, StarterKitError> {
        ensure_supported(kind)?;
        Ok(ContractType::ALL.to_vec())
    }

    async fn accept(
        &self,
        kind: StarterKitType,
        requested: &[FeatureId],
        allow_contract: bool,
    ) -> Result<Vec<FeatureId>, StarterKitError> {
        match self.validator.validate(kind, requested, allow_contract).await? {
            ValidationOutcome::Accepted(features) => {
                info!(features = ?features, "Request accepted");
                Ok(features)
            },
            ValidationOutcome::Rejected(rejection) => {
                warn!(code = rejection.code(), reason = %rejection, "Request rejected");
                Err(rejection.into())
            },
        }
    }

    fn record(&self, metric: GenerationMetric) {
        let recorder = Arc::clone(&self.recorder);
        tokio::spawn(async move {
            if let Err(err) = recorder.record(&metric).await {
                warn!(error = %err, code_module = %metric.code_module, "Failed to record usage metric");
            }
        });
    }
}

fn require_identifiers(product_name: &str, application_code: &str) -> Result<(), StarterKitError> {
    if product_name.trim().is_empty() {
        return Err(StarterKitError::invalid_request("productName must not be blank"));
    }
    if application_code.trim().is_empty() {
        return Err(StarterKitError::invalid_request("applicationCode must not be blank"));
    }
    if !application_code.chars().any(char::is_alphanumeric) {
        return Err(StarterKitError::invalid_request("applicationCode must contain a letter or digit"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StalePolicy;
    use crate::catalog::tests::{ScriptedSource, groups};
    use crate::dispatcher::tests::RecordingGenerator;
    use crate::error::{DispatchError, Rejection, UpstreamError};
    use crate::upstream::{DependencySource, ProjectGenerator};
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[derive(Debug)]
    struct ChannelRecorder(mpsc::UnboundedSender<GenerationMetric>);

    #[async_trait]
    impl MetricRecorder for ChannelRecorder {
        async fn record(&self, metric: &GenerationMetric) -> Result<(), UpstreamError> {
            let _ = self.0.send(metric.clone());
            Ok(())
        }
    }

    #[derive(Debug)]
    struct FailingRecorder;

    #[async_trait]
    impl MetricRecorder for FailingRecorder {
        async fn record(&self, _: &GenerationMetric) -> Result<(), UpstreamError> {
            Err(UpstreamError::Status { status: 500, body: "sink down".to_owned() })
        }
    }

    struct Harness {
        source: Arc<ScriptedSource>,
        generator: Arc<RecordingGenerator>,
        orchestrator: RequestOrchestrator,
    }

    fn harness(recorder: Arc<dyn MetricRecorder>) -> Harness {
        harness_with(RecordingGenerator::answering(b"PK\x03\x04archive"), recorder)
    }

    fn harness_with(generator: RecordingGenerator, recorder: Arc<dyn MetricRecorder>) -> Harness {
        let source = Arc::new(ScriptedSource::serving(groups()));
        let generator = Arc::new(generator);
        let catalog = Arc::new(FeatureCatalog::new(
            Arc::clone(&source) as Arc<dyn DependencySource>,
            Duration::from_secs(60),
            StalePolicy::ServeStale,
        ));
        let dispatcher = GenerationDispatcher::new(Arc::clone(&generator) as Arc<dyn ProjectGenerator>, "fr.cnam");
        let orchestrator = RequestOrchestrator::new(catalog, dispatcher, recorder, MetricConfig::default());
        Harness { source, generator, orchestrator }
    }

    fn component(features: &[&str]) -> ComponentRequest {
        ComponentRequest {
            starter_kit: StarterKitType::Tonic,
            product_name: "Acme".to_owned(),
            application_code: "ACME_J".to_owned(),
            features: features.iter().map(|f| (*f).to_owned()).collect(),
            group_id: None,
            artifact_id: None,
        }
    }

    #[tokio::test]
    async fn accepted_component_is_generated_and_measured() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let h = harness(Arc::new(ChannelRecorder(tx)));

        let archive = h.orchestrator.generate_component(component(&["web", "security"])).await.unwrap();

        assert_eq!(&archive.bytes[..], b"PK\x03\x04archive");
        assert_eq!(h.generator.last_query().unwrap().dependencies, "web,security");

        let metric = rx.recv().await.unwrap();
        assert_eq!(metric.code_module, "ACME_J");
        assert_eq!(metric.usecases.as_deref(), Some("web,security"));
    }

    #[tokio::test]
    async fn metric_failures_do_not_fail_the_request() {
        let h = harness(Arc::new(FailingRecorder));
        assert!(h.orchestrator.generate_component(component(&["web"])).await.is_ok());
    }

    #[tokio::test]
    async fn rejected_requests_never_reach_the_generator() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let h = harness(Arc::new(ChannelRecorder(tx)));

        let err = h.orchestrator.generate_component(component(&["web", "nonexistent"])).await.unwrap_err();

        assert!(matches!(
            err.rejection(),
            Some(Rejection::InvalidFeatures { ref invalid, .. }) if invalid == &["nonexistent".to_owned()]
        ));
        assert!(h.generator.last_query().is_none());
        drop(h);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn blank_identifiers_are_refused_before_validation() {
        let h = harness(Arc::new(FailingRecorder));
        let request = ComponentRequest { application_code: "  ".to_owned(), ..component(&["web"]) };

        let err = h.orchestrator.generate_component(request).await.unwrap_err();

        assert!(matches!(err, StarterKitError::InvalidRequest { .. }));
        assert_eq!(h.source.fetch_count(), 0);
    }

    #[tokio::test]
    async fn separator_only_application_codes_are_refused() {
        let h = harness(Arc::new(FailingRecorder));
        let request = ComponentRequest { application_code: "__".to_owned(), ..component(&["web"]) };

        let err = h.orchestrator.generate_component(request).await.unwrap_err();

        assert!(matches!(err, StarterKitError::InvalidRequest { .. }));
        assert!(h.generator.last_query().is_none());
        assert_eq!(h.source.fetch_count(), 0);
    }

    #[tokio::test]
    async fn contract_generation_forwards_only_the_contract_feature() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let h = harness(Arc::new(ChannelRecorder(tx)));
        let request = ContractRequest {
            starter_kit: StarterKitType::Tonic,
            contract_type: ContractType::OpenApi,
            product_name: "Acme".to_owned(),
            application_code: "ACME_J".to_owned(),
        };

        h.orchestrator.generate_contract(request).await.unwrap();

        assert_eq!(h.generator.last_query().unwrap().dependencies, "toni-contract-openapi");
        assert_eq!(rx.recv().await.unwrap().usecases.as_deref(), Some("openapi"));
    }

    #[tokio::test]
    async fn unsupported_kinds_are_rejected_everywhere() {
        let h = harness(Arc::new(FailingRecorder));
        let kind = StarterKitType::Human;
        let expected = Some(Rejection::UnsupportedType { kind });

        let request = ComponentRequest { starter_kit: kind, ..component(&["web"]) };
        assert_eq!(h.orchestrator.generate_component(request).await.unwrap_err().rejection(), expected);
        assert_eq!(h.orchestrator.component_features(kind).await.unwrap_err().rejection(), expected);
        assert_eq!(RequestOrchestrator::contract_types(kind).unwrap_err().rejection(), expected);
        assert_eq!(h.source.fetch_count(), 0);
    }

    #[tokio::test]
    async fn library_generation_is_unavailable() {
        let request = LibraryRequest {
            starter_kit: StarterKitType::Tonic,
            product_name: "Acme".to_owned(),
            application_code: "ACME_L".to_owned(),
        };

        let err = RequestOrchestrator::generate_library(&request).unwrap_err();
        assert!(matches!(err, StarterKitError::LibraryGenerationUnavailable { kind: StarterKitType::Tonic }));

        let stump = LibraryRequest { starter_kit: StarterKitType::Stump, ..request };
        assert!(RequestOrchestrator::generate_library(&stump).unwrap_err().rejection().is_some());
    }

    #[tokio::test]
    async fn listings_reflect_the_catalog_and_supported_kinds() {
        let h = harness(Arc::new(FailingRecorder));

        assert_eq!(RequestOrchestrator::starter_kits().len(), 3);
        assert_eq!(RequestOrchestrator::library_starter_kits(), vec![StarterKitType::Tonic]);
        assert_eq!(RequestOrchestrator::contract_types(StarterKitType::Tonic).unwrap(), ContractType::ALL.to_vec());
        assert_eq!(
            h.orchestrator.component_features(StarterKitType::Tonic).await.unwrap(),
            vec!["data-jpa".to_owned(), "security".to_owned(), "web".to_owned()]
        );
    }

    #[tokio::test]
    async fn upstream_failures_surface_as_generation_failures() {
        let h = harness_with(RecordingGenerator::answering(b""), Arc::new(FailingRecorder));

        let err = h.orchestrator.generate_component(component(&[])).await.unwrap_err();
        assert!(matches!(
            err,
            StarterKitError::GenerationFailed { source: DispatchError::Upstream { source: UpstreamError::EmptyBody, .. }, .. }
        ));
        assert_eq!(h.source.fetch_count(), 0);
    }
}
