/// Prefix reserved for contract-only feature ids.
pub const CONTRACT_FEATURE_PREFIX: &str = "toni-contract-";

/// Upstream dependency group holding the contract features.
pub const CONTRACTS_GROUP: &str = "Contracts";

pub const API_PREFIX: &str = "/api/v1";

// OpenAPI tags
pub const TAG_SYSTEM: &str = "System";
pub const TAG_STARTER_KITS: &str = "Starter kits";
pub const TAG_COMPONENTS: &str = "Components";
pub const TAG_CONTRACTS: &str = "Contracts";
pub const TAG_LIBRARIES: &str = "Libraries";
