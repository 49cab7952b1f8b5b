//! Kernel utilities shared across slices.
//!
//! Keep this crate lightweight: layered config loading, the type-erased slice
//! registry and, behind the `server` feature, the API state, health route and
//! `application/problem+json` responses every slice reuses.
pub mod config;
pub mod prelude;
pub mod registry;
#[cfg(feature = "server")]
pub mod server;

pub use initium_domain as domain;
