use initium_derive::api_model;

/// Component generation request
#[api_model]
pub struct ComponentBody {
    /// Starter kit name, e.g. `TONIC` (case-insensitive)
    pub starter_kit: String,
    pub product_name: String,
    pub application_code: String,
    /// Feature ids; absent or empty generates a bare project
    #[serde(default)]
    pub features: Option<Vec<String>>,
    /// Defaults to `<org-prefix>.<product name>`
    #[serde(default)]
    pub group_id: Option<String>,
    /// Defaults to the normalized application code
    #[serde(default)]
    pub artifact_id: Option<String>,
}

/// Contract generation request
#[api_model]
pub struct ContractBody {
    pub starter_kit: String,
    /// `OPENAPI` or `AVRO` (case-insensitive)
    pub contract_type: String,
    pub product_name: String,
    pub application_code: String,
}

/// Library generation request
#[api_model]
pub struct LibraryBody {
    pub starter_kit: String,
    pub product_name: String,
    pub application_code: String,
}

#[api_model]
pub struct StarterKitsResponse {
    pub starter_kits: Vec<String>,
}

#[api_model]
pub struct FeaturesResponse {
    pub starter_kit: String,
    /// Sorted, contract features excluded
    pub features: Vec<String>,
}

#[api_model]
pub struct ContractTypesResponse {
    pub starter_kit: String,
    pub contract_types: Vec<String>,
}
