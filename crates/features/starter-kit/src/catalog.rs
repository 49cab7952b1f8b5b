//! # Feature catalog
//!
//! A TTL-bounded, eventually consistent view of the features the upstream
//! generator advertises.
//!
//! The current [`CatalogSnapshot`] is immutable and shared behind an `Arc`;
//! a refresh builds a new snapshot and swaps the reference, so readers see
//! either the old snapshot or the new one in full. Refreshes are single-flight:
//! concurrent readers of an expired catalog wait for one fetch instead of
//! issuing their own, and share its outcome whether it succeeded or failed.
//!
//! When a fetch fails and a previous snapshot exists, [`StalePolicy`] decides
//! between serving it (stale-while-revalidate) and failing.

use crate::error::CatalogError;
use crate::upstream::{DependencyGroup, DependencySource};
use initium_domain::FeatureId;
use initium_domain::constants::CONTRACTS_GROUP;
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Shortest refresh period accepted by [`FeatureCatalog::spawn_refresh`].
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Immutable catalog contents at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSnapshot {
    general: BTreeSet<FeatureId>,
    contract: BTreeSet<FeatureId>,
    fetched_at: Instant,
    epoch: u64,
}

impl CatalogSnapshot {
    /// Partitions upstream groups: the `Contracts` group feeds the contract
    /// set, every other group the general set. Duplicate ids collapse.
    #[must_use]
    pub fn from_groups(groups: Vec<DependencyGroup>) -> Self {
        let (contract, general): (Vec<_>, Vec<_>) =
            groups.into_iter().partition(|group| group.name == CONTRACTS_GROUP);

        Self {
            general: general.into_iter().flat_map(|group| group.ids).collect(),
            contract: contract.into_iter().flat_map(|group| group.ids).collect(),
            fetched_at: Instant::now(),
            epoch: 0,
        }
    }

    #[must_use]
    pub const fn general(&self) -> &BTreeSet<FeatureId> {
        &self.general
    }

    #[must_use]
    pub const fn contract(&self) -> &BTreeSet<FeatureId> {
        &self.contract
    }

    /// Features a request may name: general ones, plus contract ones when allowed.
    #[must_use]
    pub fn allowed(&self, allow_contract: bool) -> BTreeSet<&str> {
        let contract = allow_contract.then_some(&self.contract).into_iter().flatten();
        self.general.iter().chain(contract).map(String::as_str).collect()
    }

    const fn with_epoch(mut self, epoch: u64) -> Self {
        self.epoch = epoch;
        self
    }
}

/// What to do when a refresh fails while an older snapshot is cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StalePolicy {
    ServeStale,
    Fail,
}

impl StalePolicy {
    #[must_use]
    pub const fn from_flag(serve_stale: bool) -> Self {
        if serve_stale { Self::ServeStale } else { Self::Fail }
    }
}

#[derive(Debug)]
pub struct FeatureCatalog {
    source: Arc<dyn DependencySource>,
    ttl: Duration,
    stale: StalePolicy,
    current: RwLock<Option<Arc<CatalogSnapshot>>>,
    /// Bumped by [`FeatureCatalog::invalidate`]; snapshots from older epochs are expired.
    epoch: AtomicU64,
    /// Bumped when a fetch finishes, under `refresh`.
    attempts: AtomicU64,
    /// Outcome of the last finished fetch when it failed.
    failure: RwLock<Option<RecentFailure>>,
    refresh: Mutex<()>,
}

#[derive(Debug, Clone)]
struct RecentFailure {
    cause: &'static str,
    message: String,
}

impl FeatureCatalog {
    #[must_use]
    pub fn new(source: Arc<dyn DependencySource>, ttl: Duration, stale: StalePolicy) -> Self {
        Self {
            source,
            ttl,
            stale,
            current: RwLock::new(None),
            epoch: AtomicU64::new(0),
            attempts: AtomicU64::new(0),
            failure: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the current snapshot, fetching first when none is cached,
    /// the cached one is older than the TTL, or it was invalidated.
    ///
    /// Readers that queued behind a fetch reuse its outcome: they never start
    /// a second fetch for the same expiry, even when the first one failed.
    pub async fn snapshot(&self) -> Result<Arc<CatalogSnapshot>, CatalogError> {
        if let Some(snapshot) = self.fresh() {
            return Ok(snapshot);
        }

        let attempt = self.attempts.load(Ordering::Acquire);
        let _refresh = self.refresh.lock().await;
        // Another caller may have refreshed while we waited.
        if let Some(snapshot) = self.fresh() {
            return Ok(snapshot);
        }
        if self.attempts.load(Ordering::Acquire) != attempt {
            let failure = self.failure.read().clone();
            if let Some(failure) = failure {
                return self.fallback(CatalogError::Unavailable { cause: failure.cause, message: failure.message });
            }
            if let Some(snapshot) = self.cached() {
                return Ok(snapshot);
            }
        }

        let epoch = self.epoch.load(Ordering::Acquire);
        let started = Instant::now();
        let fetched = self.source.fetch_dependencies().await;
        self.attempts.fetch_add(1, Ordering::AcqRel);

        match fetched {
            Ok(groups) => {
                let snapshot = Arc::new(CatalogSnapshot::from_groups(groups).with_epoch(epoch));
                *self.current.write() = Some(Arc::clone(&snapshot));
                *self.failure.write() = None;
                info!(
                    general = snapshot.general.len(),
                    contract = snapshot.contract.len(),
                    elapsed_ms = started.elapsed().as_millis(),
                    "Feature catalog refreshed"
                );
                Ok(snapshot)
            },
            Err(err) => {
                *self.failure.write() = Some(RecentFailure { cause: err.cause(), message: err.to_string() });
                self.fallback(CatalogError::Fetch {
                    source: err,
                    context: Some("fetching the upstream feature catalog".into()),
                })
            },
        }
    }

    /// Applies the [`StalePolicy`] after a failed fetch.
    fn fallback(&self, err: CatalogError) -> Result<Arc<CatalogSnapshot>, CatalogError> {
        match (self.stale, self.cached()) {
            (StalePolicy::ServeStale, Some(stale)) => {
                warn!(
                    error = %err,
                    age_s = stale.fetched_at.elapsed().as_secs(),
                    "Catalog refresh failed, serving stale snapshot"
                );
                Ok(stale)
            },
            _ => Err(err),
        }
    }

    /// Forces the next [`FeatureCatalog::snapshot`] to fetch.
    pub fn invalidate(&self) {
        let epoch = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(epoch, "Feature catalog invalidated");
    }

    /// The cached snapshot, fresh or not, without fetching.
    #[must_use]
    pub fn cached(&self) -> Option<Arc<CatalogSnapshot>> {
        self.current.read().clone()
    }

    fn fresh(&self) -> Option<Arc<CatalogSnapshot>> {
        let snapshot = self.cached()?;
        let valid = snapshot.epoch == self.epoch.load(Ordering::Acquire)
            && snapshot.fetched_at.elapsed() < self.ttl;
        valid.then_some(snapshot)
    }

    /// Spawns the periodic refresh: every `interval`, invalidate and fetch
    /// eagerly so request paths rarely pay for a fetch. Failures are logged.
    pub fn spawn_refresh(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let catalog = Arc::clone(self);
        let interval = interval.max(MIN_REFRESH_INTERVAL);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                catalog.invalidate();
                if let Err(err) = catalog.snapshot().await {
                    warn!(error = %err, "Scheduled catalog refresh failed");
                }
            }
        })
    }
}
