use initium_domain::FeatureId;
use initium_domain::starter_kit::StarterKitType;

/// Caller-correctable reasons a feature list was refused.
#[initium_derive::initium_error]
#[derive(Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("Starter kit {kind} is not supported")]
    UnsupportedType { kind: StarterKitType },

    #[error("Contract features are not allowed here: {}", features.join(", "))]
    ContractFeaturesNotAllowed { features: Vec<FeatureId> },

    #[error("No features are available from the upstream generator")]
    NoFeaturesAvailable,

    #[error("Unknown features: {}", invalid.join(", "))]
    InvalidFeatures { invalid: Vec<FeatureId>, available: Vec<FeatureId> },
}

impl Rejection {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedType { .. } => "UnsupportedType",
            Self::ContractFeaturesNotAllowed { .. } => "ContractFeaturesNotAllowed",
            Self::NoFeaturesAvailable => "NoFeaturesAvailable",
            Self::InvalidFeatures { .. } => "InvalidFeatures",
        }
    }
}
