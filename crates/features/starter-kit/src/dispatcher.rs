//! # Generation dispatch
//!
//! Turns an accepted request into one call against the generator backend of
//! its starter kit and hands back the archive bytes untouched.

use crate::error::{DispatchError, UpstreamError};
use crate::upstream::{ProjectGenerator, ProjectQuery};
use bytes::Bytes;
use initium_domain::FeatureId;
use initium_domain::starter_kit::{ContractType, StarterKitType};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, instrument};

/// Upper bound on one generation call unless configured otherwise.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// A request that already passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub starter_kit: StarterKitType,
    pub product_name: String,
    pub application_code: String,
    pub features: Vec<FeatureId>,
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    /// Set for contract generation; replaces `features` with the contract's id.
    pub contract: Option<ContractType>,
}

impl GenerationRequest {
    #[must_use]
    pub fn component(
        starter_kit: StarterKitType,
        product_name: impl Into<String>,
        application_code: impl Into<String>,
        features: Vec<FeatureId>,
    ) -> Self {
        Self {
            starter_kit,
            product_name: product_name.into(),
            application_code: application_code.into(),
            features,
            group_id: None,
            artifact_id: None,
            contract: None,
        }
    }

    #[must_use]
    pub fn contract(
        starter_kit: StarterKitType,
        contract: ContractType,
        product_name: impl Into<String>,
        application_code: impl Into<String>,
    ) -> Self {
        Self { contract: Some(contract), ..Self::component(starter_kit, product_name, application_code, Vec::new()) }
    }

    /// Features sent upstream. Contract requests never forward caller features.
    #[must_use]
    pub fn effective_features(&self) -> Vec<FeatureId> {
        match self.contract {
            Some(contract) => vec![contract.feature_id()],
            None => self.features.clone(),
        }
    }
}

/// A generated project, exactly as the upstream produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    pub bytes: Bytes,
    pub group_id: String,
    pub artifact_id: String,
}

impl Archive {
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.zip", self.artifact_id)
    }
}

#[derive(Debug, Clone)]
pub struct GenerationDispatcher {
    tonic: Arc<dyn ProjectGenerator>,
    org_prefix: String,
    timeout: Duration,
}

impl GenerationDispatcher {
    #[must_use]
    pub fn new(tonic: Arc<dyn ProjectGenerator>, org_prefix: impl Into<String>) -> Self {
        Self { tonic, org_prefix: org_prefix.into(), timeout: DEFAULT_GENERATION_TIMEOUT }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[instrument(skip_all, fields(starter_kit = %request.starter_kit, application_code = %request.application_code))]
    pub async fn generate(&self, request: &GenerationRequest) -> Result<Archive, DispatchError> {
        let generator = match request.starter_kit {
            StarterKitType::Tonic => &self.tonic,
            kind @ (StarterKitType::Stump | StarterKitType::Human) => {
                return Err(DispatchError::Unsupported { kind });
            },
        };

        let group_id = non_blank(request.group_id.as_deref())
            .map_or_else(|| default_group_id(&self.org_prefix, &request.product_name), str::to_owned);
        let artifact_id = non_blank(request.artifact_id.as_deref())
            .map_or_else(|| normalize_artifact_id(&request.application_code), str::to_owned);
        let features = request.effective_features();
        let query = ProjectQuery::new(request.product_name.trim(), &group_id, &artifact_id, &features);

        let started = Instant::now();
        let bytes = match tokio::time::timeout(self.timeout, generator.generate(&query)).await {
            Ok(Ok(bytes)) if bytes.is_empty() => Err(UpstreamError::EmptyBody),
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout { after: self.timeout }),
        }
        .map_err(|err| {
            error!(error = %err, cause = err.cause(), elapsed_ms = started.elapsed().as_millis(), "Generation failed");
            DispatchError::Upstream { source: err, context: Some(format!("generating {artifact_id}").into()) }
        })?;

        info!(
            %group_id,
            %artifact_id,
            features = ?features,
            size = bytes.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "Archive generated"
        );

        Ok(Archive { bytes, group_id, artifact_id })
    }
}

/// `<org-prefix>.<lowercased product name>`, or just the product name without a prefix.
#[must_use]
pub fn default_group_id(org_prefix: &str, product_name: &str) -> String {
    let product = product_name.trim().to_lowercase();
    let prefix = org_prefix.trim().trim_end_matches('.');
    if prefix.is_empty() { product } else { format!("{prefix}.{product}") }
}

/// Lowercases and collapses each run of `_`, `-` and whitespace into its
/// first separator (whitespace becomes `-`), so `ACME_J` gives `acme_j`.
/// Leading and trailing separators are dropped; a code made only of
/// separators falls back to its trimmed lowercase form.
#[must_use]
pub fn normalize_artifact_id(application_code: &str) -> String {
    let code = application_code.trim();
    let mut artifact = String::with_capacity(code.len());
    let mut pending_separator = None;

    for ch in code.chars() {
        if ch == '_' || ch == '-' || ch.is_whitespace() {
            pending_separator.get_or_insert(if ch == '_' { '_' } else { '-' });
            continue;
        }
        if let Some(separator) = pending_separator.take()
            && !artifact.is_empty()
        {
            artifact.push(separator);
        }
        artifact.extend(ch.to_lowercase());
    }

    if artifact.is_empty() { code.to_lowercase() } else { artifact }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Records every query and answers with a fixed archive after `delay`.
    #[derive(Debug)]
    pub(crate) struct RecordingGenerator {
        pub(crate) archive: Bytes,
        pub(crate) delay: Duration,
        pub(crate) queries: Mutex<Vec<ProjectQuery>>,
    }

    impl RecordingGenerator {
        pub(crate) fn answering(archive: &'static [u8]) -> Self {
            Self { archive: Bytes::from_static(archive), delay: Duration::ZERO, queries: Mutex::new(Vec::new()) }
        }

        pub(crate) fn last_query(&self) -> Option<ProjectQuery> {
            self.queries.lock().last().cloned()
        }
    }

    #[async_trait]
    impl ProjectGenerator for RecordingGenerator {
        async fn generate(&self, query: &ProjectQuery) -> Result<Bytes, UpstreamError> {
            self.queries.lock().push(query.clone());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(self.archive.clone())
        }
    }

    fn dispatcher(generator: &Arc<RecordingGenerator>) -> GenerationDispatcher {
        GenerationDispatcher::new(Arc::clone(generator) as Arc<dyn ProjectGenerator>, "fr.cnam")
    }

    #[test]
    fn artifact_ids_are_lowercased_and_separators_collapse() {
        assert_eq!(normalize_artifact_id("ACME_J"), "acme_j");
        assert_eq!(normalize_artifact_id("  My__App -_ Code_ "), "my_app-code");
        assert_eq!(normalize_artifact_id("_lead"), "lead");
        assert_eq!(normalize_artifact_id("plain"), "plain");
        assert_eq!(normalize_artifact_id(" __ "), "__");
    }

    #[test]
    fn group_ids_prefix_the_lowercased_product() {
        assert_eq!(default_group_id("fr.cnam", " Acme "), "fr.cnam.acme");
        assert_eq!(default_group_id("fr.cnam.", "Acme"), "fr.cnam.acme");
        assert_eq!(default_group_id("", "Acme"), "acme");
    }

    #[tokio::test]
    async fn component_query_uses_derived_identifiers() {
        let generator = Arc::new(RecordingGenerator::answering(b"PK\x03\x04zip"));
        let request = GenerationRequest::component(
            StarterKitType::Tonic,
            "Acme",
            "ACME_J",
            vec!["web".to_owned(), "security".to_owned()],
        );

        let archive = dispatcher(&generator).generate(&request).await.unwrap();

        assert_eq!(&archive.bytes[..], b"PK\x03\x04zip");
        assert_eq!(archive.file_name(), "acme_j.zip");
        let query = generator.last_query().unwrap();
        assert_eq!(query.dependencies, "web,security");
        assert_eq!(query.group_id, "fr.cnam.acme");
        assert_eq!(query.artifact_id, "acme_j");
        assert_eq!(query.name, "Acme");
    }

    #[tokio::test]
    async fn explicit_identifiers_win_over_defaults() {
        let generator = Arc::new(RecordingGenerator::answering(b"zip"));
        let request = GenerationRequest {
            group_id: Some("com.example".to_owned()),
            artifact_id: Some("custom".to_owned()),
            ..GenerationRequest::component(StarterKitType::Tonic, "Acme", "ACME_J", Vec::new())
        };

        let archive = dispatcher(&generator).generate(&request).await.unwrap();
        assert_eq!((archive.group_id.as_str(), archive.artifact_id.as_str()), ("com.example", "custom"));
    }

    #[tokio::test]
    async fn contract_requests_forward_only_the_contract_feature() {
        let generator = Arc::new(RecordingGenerator::answering(b"zip"));
        let request = GenerationRequest {
            features: vec!["web".to_owned(), "toni-contract-avro".to_owned()],
            ..GenerationRequest::contract(StarterKitType::Tonic, ContractType::OpenApi, "Acme", "ACME_J")
        };

        dispatcher(&generator).generate(&request).await.unwrap();
        assert_eq!(generator.last_query().unwrap().dependencies, "toni-contract-openapi");
    }

    #[tokio::test]
    async fn unsupported_kinds_never_reach_a_generator() {
        let generator = Arc::new(RecordingGenerator::answering(b"zip"));
        let request = GenerationRequest::component(StarterKitType::Stump, "Acme", "ACME_J", Vec::new());

        let err = dispatcher(&generator).generate(&request).await.unwrap_err();
        assert!(matches!(err, DispatchError::Unsupported { kind: StarterKitType::Stump }));
        assert!(generator.last_query().is_none());
    }

    #[tokio::test]
    async fn empty_archives_are_failures() {
        let generator = Arc::new(RecordingGenerator::answering(b""));
        let request = GenerationRequest::component(StarterKitType::Tonic, "Acme", "ACME_J", Vec::new());

        let err = dispatcher(&generator).generate(&request).await.unwrap_err();
        assert!(matches!(err, DispatchError::Upstream { source: UpstreamError::EmptyBody, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_generators_time_out() {
        let generator = Arc::new(RecordingGenerator {
            delay: Duration::from_secs(45),
            ..RecordingGenerator::answering(b"zip")
        });
        let request = GenerationRequest::component(StarterKitType::Tonic, "Acme", "ACME_J", Vec::new());

        let err = dispatcher(&generator).generate(&request).await.unwrap_err();
        let DispatchError::Upstream { source, .. } = err else { panic!("expected an upstream error") };
        assert_eq!(source.cause(), "timeout");
        assert!(matches!(source, UpstreamError::Timeout { after } if after == DEFAULT_GENERATION_TIMEOUT));
    }
}
