use super::{DependencyGroup, DependencySource, ProjectGenerator, ProjectQuery};
use crate::error::{UpstreamError, UpstreamErrorExt};
use async_trait::async_trait;
use bytes::Bytes;
use initium_domain::config::InitializrConfig;
use reqwest::{Client, Response, header};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Longest upstream error body kept in [`UpstreamError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// HTTP client for the TONIC generator, a Spring Initializr compatible service.
#[derive(Debug, Clone)]
pub struct TonicClient {
    http: Client,
    catalog_url: Url,
    archive_url: Url,
    timeout: Duration,
}

impl TonicClient {
    /// Builds a client with its own connection pool.
    pub fn new(config: &InitializrConfig) -> Result<Self, UpstreamError> {
        let http = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.timeout())
            .user_agent(concat!("initium/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building the initializr client")?;

        Self::with_client(http, config)
    }

    /// Reuses an existing client; request timeouts still come from `config`.
    pub fn with_client(http: Client, config: &InitializrConfig) -> Result<Self, UpstreamError> {
        let base = base_url(&config.url)?;

        Ok(Self {
            http,
            catalog_url: base.join(&config.catalog_path).context("joining catalog_path")?,
            archive_url: base.join(&config.archive_path).context("joining archive_path")?,
            timeout: config.timeout(),
        })
    }

    /// The underlying client, for sharing its pool with other callers.
    #[must_use]
    pub const fn http(&self) -> &Client {
        &self.http
    }

    #[must_use]
    pub const fn catalog_url(&self) -> &Url {
        &self.catalog_url
    }

    #[must_use]
    pub const fn archive_url(&self) -> &Url {
        &self.archive_url
    }
}

#[async_trait]
impl DependencySource for TonicClient {
    #[instrument(skip(self), fields(url = %self.catalog_url))]
    async fn fetch_dependencies(&self) -> Result<Vec<DependencyGroup>, UpstreamError> {
        let response = self
            .http
            .get(self.catalog_url.clone())
            .header(header::ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, self.timeout, "fetching the catalog"))?;

        let body = success_body(response, self.timeout).await?;
        let groups = parse_metadata(&body)?;
        debug!(groups = groups.len(), "Fetched upstream dependency groups");
        Ok(groups)
    }
}

#[async_trait]
impl ProjectGenerator for TonicClient {
    #[instrument(skip(self, query), fields(artifact_id = %query.artifact_id))]
    async fn generate(&self, query: &ProjectQuery) -> Result<Bytes, UpstreamError> {
        let response = self
            .http
            .get(self.archive_url.clone())
            .query(query)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, self.timeout, "requesting the archive"))?;

        success_body(response, self.timeout).await
    }
}

fn base_url(raw: &str) -> Result<Url, UpstreamError> {
    let mut base = Url::parse(raw.trim()).context("parsing initializr url")?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

async fn success_body(response: Response, timeout: Duration) -> Result<Bytes, UpstreamError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(UpstreamError::Status {
            status: status.as_u16(),
            body: body.chars().take(MAX_ERROR_BODY).collect(),
        });
    }

    response.bytes().await.map_err(|e| UpstreamError::from_reqwest(e, timeout, "reading the body"))
}

#[derive(Deserialize)]
struct Metadata {
    dependencies: Option<GroupList>,
}

#[derive(Deserialize)]
struct GroupList {
    content: Option<Vec<Option<RawGroup>>>,
}

#[derive(Deserialize)]
struct RawGroup {
    name: Option<String>,
    content: Option<Vec<Option<RawDependency>>>,
}

#[derive(Deserialize)]
struct RawDependency {
    id: Option<String>,
}

/// Reads Initializr metadata, skipping groups and entries with missing parts.
fn parse_metadata(body: &[u8]) -> Result<Vec<DependencyGroup>, UpstreamError> {
    let metadata: Metadata = serde_json::from_slice(body).context("parsing catalog metadata")?;

    let groups = metadata
        .dependencies
        .and_then(|list| list.content)
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .filter_map(|group| {
            let name = group.name?;
            let ids = group.content?.into_iter().flatten().filter_map(|dep| dep.id).collect();
            Some(DependencyGroup { name, ids })
        })
        .collect();

    Ok(groups)
}
