//! # Domain Models
//!
//! Pure data shared by every Initium crate: starter-kit kinds, contract formats,
//! naming constants and the typed configuration tree.
//! No I/O and no behavior beyond small conversions.

pub mod config;
pub mod constants;
pub mod starter_kit;

/// Opaque upstream feature identifier. Compared by exact, case-sensitive match.
pub type FeatureId = String;
