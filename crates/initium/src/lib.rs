//! Facade crate for the Initium feature slices and shared modules.
//! Re-exports domain/kernel primitives and aggregates slice initialization.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Add `initium` with the `server` feature for the HTTP surface.
//! - Call [`init`] to build every slice; register the results in the API state.

pub use initium_domain as domain;
use initium_domain::config::ApiConfig;
pub use initium_kernel as kernel;
use initium_kernel::registry::InitializedSlice;

#[cfg(feature = "server")]
pub mod server {
    pub mod router {
        pub use initium_kernel::server::router::system_router;
        pub use initium_starter_kit::server::router as starter_kit_router;
    }
}

/// Feature registry for runtime introspection.
pub mod features {
    pub use initium_starter_kit as starter_kit;

    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "server")]
        "server",
        "starter-kit",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Slices built by [`init`], with typed handles the host needs beyond the registry.
#[derive(Debug)]
pub struct Slices {
    pub starter_kit: features::starter_kit::StarterKit,
}

impl Slices {
    /// Type-erased slices for the API state registry.
    #[must_use]
    pub fn into_registered(self) -> Vec<InitializedSlice> {
        vec![InitializedSlice::new(self.starter_kit)]
    }
}

/// Initialize every feature slice.
///
/// # Errors
/// Returns an error if any slice fails to initialize.
pub fn init(config: &ApiConfig) -> Result<Slices, features::starter_kit::StarterKitError> {
    Ok(Slices { starter_kit: features::starter_kit::build(config)? })
}
