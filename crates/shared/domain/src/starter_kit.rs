use crate::FeatureId;
use crate::constants::CONTRACT_FEATURE_PREFIX;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Generator backends a caller may name. Only [`StarterKitType::Tonic`] is
/// backed by an upstream generator; the others are declared but unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StarterKitType {
    Tonic,
    Stump,
    Human,
}

impl StarterKitType {
    pub const ALL: [Self; 3] = [Self::Tonic, Self::Stump, Self::Human];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tonic => "TONIC",
            Self::Stump => "STUMP",
            Self::Human => "HUMAN",
        }
    }
}

impl fmt::Display for StarterKitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StarterKitType {
    type Err = UnknownVariant;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| UnknownVariant::new("starter-kit type", value))
    }
}

/// Contract formats the generator can scaffold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContractType {
    OpenApi,
    Avro,
}

impl ContractType {
    pub const ALL: [Self; 2] = [Self::OpenApi, Self::Avro];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenApi => "OPENAPI",
            Self::Avro => "AVRO",
        }
    }

    /// Lowercase name, as used in feature ids and usage metrics.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::OpenApi => "openapi",
            Self::Avro => "avro",
        }
    }

    /// The synthetic feature forwarded upstream, e.g. `toni-contract-openapi`.
    #[must_use]
    pub fn feature_id(self) -> FeatureId {
        format!("{CONTRACT_FEATURE_PREFIX}{}", self.slug())
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| UnknownVariant::new("contract type", value))
    }
}

/// Whether `id` follows the contract-feature naming convention.
#[must_use]
pub fn is_contract_feature(id: &str) -> bool {
    id.starts_with(CONTRACT_FEATURE_PREFIX)
}

/// A string that names no member of a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self { kind, value: value.to_owned() }
    }
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}
