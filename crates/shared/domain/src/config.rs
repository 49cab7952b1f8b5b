use crate::starter_kit::StarterKitType;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Top-level configuration tree.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub initializr: InitializrConfig,
    pub catalog: CatalogConfig,
    pub metric: MetricConfig,
    pub logging: LoggingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Upstream project generator (a Spring Initializr compatible service).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InitializrConfig {
    pub url: String,
    /// Prepended to the lowercased product name to form default group ids.
    pub org_prefix: String,
    pub timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
    pub catalog_path: String,
    pub archive_path: String,
}

impl InitializrConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

/// Feature catalog cache policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub ttl_seconds: u64,
    /// Serve the previous snapshot when a refresh fails.
    pub serve_stale: bool,
    pub refresh_on_start: bool,
}

impl CatalogConfig {
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

/// Usage metric sink. Without `url`, metrics are only logged.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricConfig {
    pub url: Option<String>,
    pub dds_prefix: String,
    pub timeout_seconds: u64,
    pub versions: StarterKitVersions,
}

impl MetricConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Version reported for each starter kit in usage metrics.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StarterKitVersions {
    pub tonic: String,
    pub stump: String,
    pub human: String,
}

impl StarterKitVersions {
    #[must_use]
    pub fn for_kind(&self, kind: StarterKitType) -> &str {
        match kind {
            StarterKitType::Tonic => &self.tonic,
            StarterKitType::Stump => &self.stump,
            StarterKitType::Human => &self.human,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    pub directory: Option<PathBuf>,
    pub filter: Option<String>,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 4583, ssl: None }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for InitializrConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080".to_owned(),
            org_prefix: "fr.cnam".to_owned(),
            timeout_seconds: 30,
            connect_timeout_seconds: 5,
            catalog_path: "metadata/config".to_owned(),
            archive_path: "starter.zip".to_owned(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { ttl_seconds: 3600, serve_stale: true, refresh_on_start: false }
    }
}

impl Default for MetricConfig {
    fn default() -> Self {
        Self {
            url: None,
            dds_prefix: String::new(),
            timeout_seconds: 5,
            versions: StarterKitVersions::default(),
        }
    }
}

impl Default for StarterKitVersions {
    fn default() -> Self {
        Self { tonic: "1.0.0".to_owned(), stump: "1.0.0".to_owned(), human: "1.0.0".to_owned() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), json: false, directory: None, filter: None }
    }
}
