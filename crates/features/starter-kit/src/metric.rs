//! Usage metrics for generated modules.
//!
//! Recording is best-effort: callers hand a [`GenerationMetric`] to a
//! [`MetricRecorder`] on a detached task and only log failures.

use crate::error::{UpstreamError, UpstreamErrorExt};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use initium_domain::FeatureId;
use initium_domain::config::MetricConfig;
use initium_domain::starter_kit::{ContractType, StarterKitType};
use reqwest::Client;
use serde::Serialize;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleType {
    Service,
    Batch,
    Web,
    Doc,
    Resource,
    Other,
    Contract,
}

impl ModuleType {
    /// Classifies a component by the last two characters of its application code.
    #[must_use]
    pub fn from_application_code(code: &str) -> Self {
        let code = code.trim();
        let suffix = code.get(code.len().saturating_sub(2)..).unwrap_or_default().to_ascii_uppercase();

        match suffix.as_str() {
            "_J" => Self::Service,
            "_B" => Self::Batch,
            "_M" => Self::Web,
            "_A" => Self::Doc,
            "_Z" => Self::Resource,
            _ => Self::Other,
        }
    }
}

/// One generated module, in the shape the metric sink expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetric {
    pub dds: String,
    pub code_module: String,
    pub date_instanciation: NaiveDate,
    pub type_module: ModuleType,
    #[serde(rename = "typeSK")]
    pub type_sk: StarterKitType,
    #[serde(rename = "versionSK")]
    pub version_sk: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usecases: Option<String>,
}

impl GenerationMetric {
    #[must_use]
    pub fn component(config: &MetricConfig, kind: StarterKitType, product: &str, code: &str, features: &[FeatureId]) -> Self {
        let usecases = (!features.is_empty()).then(|| features.join(","));
        Self::build(config, kind, product, code, ModuleType::from_application_code(code), usecases)
    }

    #[must_use]
    pub fn contract(config: &MetricConfig, kind: StarterKitType, product: &str, code: &str, contract: ContractType) -> Self {
        Self::build(config, kind, product, code, ModuleType::Contract, Some(contract.slug().to_owned()))
    }

    fn build(
        config: &MetricConfig,
        kind: StarterKitType,
        product: &str,
        code: &str,
        type_module: ModuleType,
        usecases: Option<String>,
    ) -> Self {
        Self {
            dds: format!("{}{}", config.dds_prefix, product.trim()),
            code_module: code.trim().to_owned(),
            date_instanciation: Utc::now().date_naive(),
            type_module,
            type_sk: kind,
            version_sk: config.versions.for_kind(kind).to_owned(),
            usecases,
        }
    }
}

#[async_trait]
pub trait MetricRecorder: Debug + Send + Sync {
    async fn record(&self, metric: &GenerationMetric) -> Result<(), UpstreamError>;
}

/// Sends metrics with `PUT {base}/modules`.
#[derive(Debug, Clone)]
pub struct HttpMetricRecorder {
    http: Client,
    endpoint: Url,
    timeout: Duration,
}

impl HttpMetricRecorder {
    pub fn new(http: Client, base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let mut base = Url::parse(base_url.trim()).context("parsing metric url")?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self { http, endpoint: base.join("modules").context("joining metric endpoint")?, timeout })
    }

    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl MetricRecorder for HttpMetricRecorder {
    async fn record(&self, metric: &GenerationMetric) -> Result<(), UpstreamError> {
        let response = self
            .http
            .put(self.endpoint.clone())
            .json(metric)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, self.timeout, "sending the metric"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status: status.as_u16(), body });
        }

        debug!(code_module = %metric.code_module, "Metric recorded");
        Ok(())
    }
}

/// Used when no metric sink is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetricRecorder;

#[async_trait]
impl MetricRecorder for NoopMetricRecorder {
    async fn record(&self, metric: &GenerationMetric) -> Result<(), UpstreamError> {
        debug!(?metric, "No metric sink configured, dropping metric");
        Ok(())
    }
}

/// The HTTP recorder when `config.url` is set, the no-op one otherwise.
pub fn recorder_from_config(http: Client, config: &MetricConfig) -> Result<Arc<dyn MetricRecorder>, UpstreamError> {
    match config.url.as_deref().map(str::trim).filter(|url| !url.is_empty()) {
        Some(url) => Ok(Arc::new(HttpMetricRecorder::new(http, url, config.timeout())?)),
        None => Ok(Arc::new(NoopMetricRecorder)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> MetricConfig {
        MetricConfig { dds_prefix: "DDS-".to_owned(), ..MetricConfig::default() }
    }

    #[test]
    fn module_type_follows_the_code_suffix() {
        assert_eq!(ModuleType::from_application_code("ACME_J"), ModuleType::Service);
        assert_eq!(ModuleType::from_application_code("acme_b"), ModuleType::Batch);
        assert_eq!(ModuleType::from_application_code("ACME_M "), ModuleType::Web);
        assert_eq!(ModuleType::from_application_code("ACME_A"), ModuleType::Doc);
        assert_eq!(ModuleType::from_application_code("ACME_Z"), ModuleType::Resource);
        assert_eq!(ModuleType::from_application_code("ACME"), ModuleType::Other);
        assert_eq!(ModuleType::from_application_code("J"), ModuleType::Other);
        assert_eq!(ModuleType::from_application_code("ACMÉ"), ModuleType::Other);
    }

    #[test]
    fn component_metric_serializes_in_the_sink_shape() {
        let metric = GenerationMetric::component(
            &config(),
            StarterKitType::Tonic,
            "Acme",
            "ACME_J",
            &["web".to_owned(), "security".to_owned()],
        );
        let value = serde_json::to_value(&metric).unwrap();

        assert_eq!(value["dds"], json!("DDS-Acme"));
        assert_eq!(value["codeModule"], json!("ACME_J"));
        assert_eq!(value["typeModule"], json!("service"));
        assert_eq!(value["typeSK"], json!("TONIC"));
        assert_eq!(value["versionSK"], json!("1.0.0"));
        assert_eq!(value["usecases"], json!("web,security"));
        assert_eq!(value["dateInstanciation"].as_str().map(str::len), Some(10));
    }

    #[test]
    fn empty_feature_lists_omit_usecases() {
        let metric = GenerationMetric::component(&config(), StarterKitType::Tonic, "Acme", "ACME", &[]);
        let value = serde_json::to_value(&metric).unwrap();
        assert!(value.get("usecases").is_none());
    }

    #[test]
    fn contract_metric_names_the_format() {
        let metric = GenerationMetric::contract(&config(), StarterKitType::Tonic, "Acme", "ACME_J", ContractType::Avro);
        assert_eq!(metric.type_module, ModuleType::Contract);
        assert_eq!(metric.usecases.as_deref(), Some("avro"));
    }

    #[test]
    fn recorder_choice_follows_the_url() {
        let noop = recorder_from_config(Client::new(), &MetricConfig::default()).unwrap();
        assert!(format!("{noop:?}").contains("Noop"));

        let config = MetricConfig { url: Some("http://metrics:9000/api".to_owned()), ..MetricConfig::default() };
        let http = HttpMetricRecorder::new(Client::new(), config.url.as_deref().unwrap(), config.timeout()).unwrap();
        assert_eq!(http.endpoint().as_str(), "http://metrics:9000/api/modules");
        assert!(recorder_from_config(Client::new(), &config).is_ok());
    }
}
