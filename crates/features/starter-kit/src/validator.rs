//! # Feature validation
//!
//! Decides whether a feature list may reach the generator. Rules run in
//! order and stop at the first failure:
//!
//! 1. the starter kit must have a generator (`UnsupportedType`);
//! 2. an empty list is accepted without touching the catalog;
//! 3. contract ids are refused unless explicitly allowed (`ContractFeaturesNotAllowed`);
//! 4. the allowed set is read from the catalog snapshot;
//! 5. an empty allowed set is refused (`NoFeaturesAvailable`);
//! 6. ids outside the allowed set are refused with the full allowed set (`InvalidFeatures`);
//! 7. otherwise the list is accepted unchanged.
//!
//! Matching is exact and case-sensitive on both sides.

use crate::catalog::{CatalogSnapshot, FeatureCatalog};
use crate::error::{CatalogError, Rejection};
use initium_domain::FeatureId;
use initium_domain::starter_kit::{StarterKitType, is_contract_feature};
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// The requested ids, in request order, duplicates included.
    Accepted(Vec<FeatureId>),
    Rejected(Rejection),
}

#[derive(Debug, Clone)]
pub struct FeatureValidator {
    catalog: Arc<FeatureCatalog>,
}

impl FeatureValidator {
    #[must_use]
    pub const fn new(catalog: Arc<FeatureCatalog>) -> Self {
        Self { catalog }
    }

    /// Errors only when the catalog is needed and cannot be read.
    pub async fn validate(
        &self,
        kind: StarterKitType,
        requested: &[FeatureId],
        allow_contract: bool,
    ) -> Result<ValidationOutcome, CatalogError> {
        if let Some(outcome) = screen(kind, requested, allow_contract) {
            return Ok(outcome);
        }

        let snapshot = self.catalog.snapshot().await?;
        Ok(match_catalog(&snapshot, requested, allow_contract))
    }
}

/// Only kinds with a generator backend pass.
pub fn ensure_supported(kind: StarterKitType) -> Result<(), Rejection> {
    match kind {
        StarterKitType::Tonic => Ok(()),
        StarterKitType::Stump | StarterKitType::Human => Err(Rejection::UnsupportedType { kind }),
    }
}

/// Rules that need no catalog. `None` means the catalog must decide.
#[must_use]
pub fn screen(kind: StarterKitType, requested: &[FeatureId], allow_contract: bool) -> Option<ValidationOutcome> {
    if let Err(rejection) = ensure_supported(kind) {
        return Some(ValidationOutcome::Rejected(rejection));
    }

    if requested.is_empty() {
        return Some(ValidationOutcome::Accepted(Vec::new()));
    }

    if !allow_contract {
        let features = distinct(requested.iter().filter(|id| is_contract_feature(id)));
        if !features.is_empty() {
            return Some(ValidationOutcome::Rejected(Rejection::ContractFeaturesNotAllowed { features }));
        }
    }

    None
}

/// Checks `requested` against the snapshot's allowed set.
#[must_use]
pub fn match_catalog(snapshot: &CatalogSnapshot, requested: &[FeatureId], allow_contract: bool) -> ValidationOutcome {
    let allowed = snapshot.allowed(allow_contract);
    if allowed.is_empty() {
        return ValidationOutcome::Rejected(Rejection::NoFeaturesAvailable);
    }

    let invalid = distinct(requested.iter().filter(|id| !allowed.contains(id.as_str())));
    if !invalid.is_empty() {
        return ValidationOutcome::Rejected(Rejection::InvalidFeatures {
            invalid,
            available: allowed.into_iter().map(str::to_owned).collect(),
        });
    }

    ValidationOutcome::Accepted(requested.to_vec())
}

/// First occurrence of each id, in request order.
fn distinct<'a>(ids: impl Iterator<Item = &'a FeatureId>) -> Vec<FeatureId> {
    let mut seen = BTreeSet::new();
    ids.filter(|id| seen.insert(id.as_str())).cloned().collect()
}
