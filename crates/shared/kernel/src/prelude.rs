pub use crate::config::{ConfigError, load_config};
pub use crate::registry::{FeatureSlice, InitializedSlice, SliceRegistry};
pub use initium_domain::config::ApiConfig;

#[cfg(feature = "server")]
pub use crate::server::{
    problem::ApiProblem,
    router::system_router,
    state::{ApiState, ApiStateError},
};
