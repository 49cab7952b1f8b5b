//! # Initium Server
//!
//! HTTP front of the starter-kit facade, built on `Axum`.
//!
//! ## Example
//! ```no_run
//! use initium_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .port(4583)
//!         .build()
//!         .await?
//!         .run()
//!         .await
//! }
//! ```

mod router;

use anyhow::{Context, Result};
use axum::Router;
use axum_server::Handle;
use initium::domain::config::{ApiConfig, LoggingConfig};
use initium::features::starter_kit::catalog::FeatureCatalog;
use initium::kernel::prelude::ApiState;
use initium_logger::{Logger, parse_level};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// How long in-flight requests may take to finish after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: ApiConfig,
}

impl ServerBuilder {
    /// Set up the server's configuration.
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    fn validate_ssl_config(&self) -> Result<()> {
        if let Some(ssl) = &self.cfg.server.ssl {
            if !ssl.cert.exists() {
                anyhow::bail!("SSL certificate not found at: {}", ssl.cert.display());
            }
            if !ssl.key.exists() {
                anyhow::bail!("SSL key not found at: {}", ssl.key.display());
            }

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let metadata = ssl.key.metadata()?;
                if metadata.permissions().mode() & 0o077 != 0 {
                    warn!(
                        "SECURITY: SSL Private Key {} has insecure permissions (should be 600)",
                        ssl.key.display()
                    );
                }
            }
        }
        Ok(())
    }

    /// Consumes the builder and initializes the server.
    ///
    /// # Process
    /// 1. Validates the TLS files when `server.ssl` is set
    /// 2. Builds every feature slice (upstream client, catalog, metric recorder)
    /// 3. Warms the feature catalog when `catalog.refresh_on_start` is set
    /// 4. Constructs the application state
    ///
    /// A failed warm-up is logged; the catalog is fetched again on first use.
    ///
    /// # Errors
    /// Returns an error if:
    /// * SSL certificate/key files are missing
    /// * the upstream or metric URLs are malformed
    pub async fn build(self) -> Result<Server> {
        self.validate_ssl_config()?;

        let address = SocketAddr::new(self.cfg.server.address, self.cfg.server.port);
        info!(address = %address, upstream = %self.cfg.initializr.url, "Initializing server");

        let slices = initium::init(&self.cfg).context("Platform bootstrap failed")?;
        let catalog = Arc::clone(slices.starter_kit.orchestrator.catalog());

        if self.cfg.catalog.refresh_on_start {
            match catalog.snapshot().await {
                Ok(snapshot) => info!(features = snapshot.general().len(), "Feature catalog warmed up"),
                Err(err) => warn!(error = %err, "Feature catalog warm-up failed"),
            }
        }

        let state = ApiState::builder()
            .config(self.cfg)
            .register_slices(slices.into_registered())
            .build()
            .context("Failed to finalize API state registry")?;

        Ok(Server { state, catalog })
    }
}

/// A fully initialized server instance ready to run.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
    catalog: Arc<FeatureCatalog>,
}

impl Server {
    /// Returns a new [`ServerBuilder`] to configure the server.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// The full HTTP application: system routes, starter-kit routes and the
    /// Scalar UI at `/api`.
    #[must_use]
    pub fn app(&self) -> Router {
        router::init(self.state.clone())
    }

    /// Starts the catalog refresh task and serves until a shutdown signal.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the configured address
    /// or if SSL/TLS setup fails.
    pub async fn run(self) -> Result<()> {
        let cfg = self.state.config.clone();
        let address = SocketAddr::new(cfg.server.address, cfg.server.port);

        info!(
            address = %address,
            ssl = cfg.server.ssl.is_some(),
            slices = ?self.state.slice_names().collect::<Vec<_>>(),
            "Starting server"
        );

        let app = self.app();
        let refresh = self.catalog.spawn_refresh(cfg.catalog.ttl());

        let handle = Handle::<SocketAddr>::new();
        let shutdown_handle = handle.clone();

        tokio::spawn(async move {
            if let Err(e) = shutdown_signal().await {
                error!("Error while waiting for shutdown signal: {e}");
                return;
            }
            info!("Shutdown signal received, starting graceful shutdown...");
            shutdown_handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        });

        let served = serve(&cfg, address, handle, app).await;
        stop(refresh).await;
        served?;

        info!("Server shutdown complete");
        Ok(())
    }

    /// Returns a reference to the application state.
    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }

    #[must_use]
    pub const fn catalog(&self) -> &Arc<FeatureCatalog> {
        &self.catalog
    }
}

async fn serve(cfg: &ApiConfig, address: SocketAddr, handle: Handle<SocketAddr>, app: Router) -> Result<()> {
    if let Some(ssl_config) = &cfg.server.ssl {
        info!("Starting HTTPS server on https://{address}");

        let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(&ssl_config.cert, &ssl_config.key)
            .await
            .context("Failed to load SSL/TLS certificates")?;

        axum_server::bind_rustls(address, tls_config)
            .handle(handle)
            .serve(app.into_make_service())
            .await
            .context("HTTPS server failed")
    } else {
        info!("Starting HTTP server on http://{address}");

        axum_server::bind(address)
            .handle(handle)
            .serve(app.into_make_service())
            .await
            .context("HTTP server failed")
    }
}

async fn stop(task: JoinHandle<()>) {
    task.abort();
    if let Err(err) = task.await
        && !err.is_cancelled()
    {
        error!(error = %err, "Catalog refresh task ended abnormally");
    }
}

/// Builds the global logger from the `[logging]` section.
///
/// # Errors
/// Returns an error for an unknown level, a malformed filter, or when a
/// global subscriber is already installed.
pub fn init_logger(name: &str, cfg: &LoggingConfig) -> Result<Logger> {
    let mut builder = Logger::builder(name).level(parse_level(&cfg.level)?).json(cfg.json);
    if let Some(filter) = &cfg.filter {
        builder = builder.filter(filter.clone());
    }
    if let Some(directory) = &cfg.directory {
        builder = builder.directory(directory.clone());
    }
    Ok(builder.init()?)
}

/// Listens for shutdown signals (Ctrl+C, SIGTERM).
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => {
            res.context("Ctrl+C signal received")?;
        },
        res = terminate => {
            res.context("SIGTERM signal received")?;
        },
    }

    Ok(())
}
