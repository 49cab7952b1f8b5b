//! Seams to the upstream project generator.
//!
//! The catalog and the dispatcher only see these traits; [`TonicClient`]
//! implements both over HTTP.

mod tonic;

pub use tonic::TonicClient;

use crate::error::UpstreamError;
use async_trait::async_trait;
use bytes::Bytes;
use initium_domain::FeatureId;
use serde::Serialize;
use std::fmt::Debug;

/// A named group of features as advertised by the upstream catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGroup {
    pub name: String,
    pub ids: Vec<FeatureId>,
}

impl DependencyGroup {
    pub fn new<I, S>(name: impl Into<String>, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<FeatureId>,
    {
        Self { name: name.into(), ids: ids.into_iter().map(Into::into).collect() }
    }
}

#[async_trait]
pub trait DependencySource: Debug + Send + Sync {
    /// One attempt, no retries.
    async fn fetch_dependencies(&self) -> Result<Vec<DependencyGroup>, UpstreamError>;
}

#[async_trait]
pub trait ProjectGenerator: Debug + Send + Sync {
    /// Returns the archive body untouched.
    async fn generate(&self, query: &ProjectQuery) -> Result<Bytes, UpstreamError>;
}

/// Query string of the upstream archive endpoint.
///
/// Only the four primary fields are ever filled; the optional ones are part of
/// the upstream contract and are left out of the query when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectQuery {
    /// Comma-joined feature ids.
    pub dependencies: String,
    pub group_id: String,
    pub artifact_id: String,
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boot_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packaging: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub java_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<String>,
}

impl ProjectQuery {
    #[must_use]
    pub fn new(name: &str, group_id: &str, artifact_id: &str, features: &[FeatureId]) -> Self {
        Self {
            dependencies: features.join(","),
            group_id: group_id.to_owned(),
            artifact_id: artifact_id.to_owned(),
            name: name.to_owned(),
            ..Self::default()
        }
    }
}
