use super::models::{
    ComponentBody, ContractBody, ContractTypesResponse, FeaturesResponse, LibraryBody, StarterKitsResponse,
};
use crate::StarterKit;
use crate::dispatcher::Archive;
use crate::error::StarterKitError;
use crate::orchestrator::{ComponentRequest, ContractRequest, LibraryRequest, RequestOrchestrator};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use initium_derive::api_handler;
use initium_domain::constants::{TAG_COMPONENTS, TAG_CONTRACTS, TAG_LIBRARIES, TAG_STARTER_KITS};
use initium_domain::starter_kit::{ContractType, StarterKitType};
use initium_kernel::server::problem::ApiProblem;
use initium_kernel::server::state::ApiState;

const ZIP_CONTENT_TYPE: &str = "application/zip";

#[api_handler(
    get,
    path = "/starter-kits",
    responses((status = OK, description = "Every declared starter kit", body = StarterKitsResponse)),
    tag = TAG_STARTER_KITS,
)]
pub(super) async fn list_starter_kits() -> Json<StarterKitsResponse> {
    Json(StarterKitsResponse { starter_kits: names(RequestOrchestrator::starter_kits()) })
}

#[api_handler(
    get,
    path = "/starter-kits/{kind}/features",
    params(("kind" = String, Path, description = "Starter kit name")),
    responses(
        (status = OK, description = "Features the upstream generator currently supports", body = FeaturesResponse),
        (status = BAD_REQUEST, description = "Unknown or unsupported starter kit", body = ApiProblem),
        (status = SERVICE_UNAVAILABLE, description = "Catalog unavailable", body = ApiProblem),
    ),
    tag = TAG_STARTER_KITS,
)]
pub(super) async fn list_features(
    State(state): State<ApiState>,
    Path(kind): Path<String>,
) -> Result<Json<FeaturesResponse>, StarterKitError> {
    let kind = parse_kind(&kind)?;
    let features = slice(&state)?.orchestrator.component_features(kind).await?;

    Ok(Json(FeaturesResponse { starter_kit: kind.to_string(), features }))
}

#[api_handler(
    get,
    path = "/starter-kits/{kind}/contracts",
    params(("kind" = String, Path, description = "Starter kit name")),
    responses(
        (status = OK, description = "Contract formats the starter kit can generate", body = ContractTypesResponse),
        (status = BAD_REQUEST, description = "Unknown or unsupported starter kit", body = ApiProblem),
    ),
    tag = TAG_CONTRACTS,
)]
pub(super) async fn list_contract_types(Path(kind): Path<String>) -> Result<Json<ContractTypesResponse>, StarterKitError> {
    let kind = parse_kind(&kind)?;
    let contract_types = RequestOrchestrator::contract_types(kind)?;

    Ok(Json(ContractTypesResponse { starter_kit: kind.to_string(), contract_types: names(contract_types) }))
}

#[api_handler(
    post,
    path = "/components",
    request_body = ComponentBody,
    responses(
        (status = OK, description = "Generated project", content_type = "application/zip", body = Vec<u8>),
        (status = BAD_REQUEST, description = "Request rejected", body = ApiProblem),
        (status = BAD_GATEWAY, description = "Upstream generation failed", body = ApiProblem),
        (status = SERVICE_UNAVAILABLE, description = "Catalog unavailable", body = ApiProblem),
        (status = GATEWAY_TIMEOUT, description = "Upstream generation timed out", body = ApiProblem),
    ),
    tag = TAG_COMPONENTS,
)]
pub(super) async fn generate_component(
    State(state): State<ApiState>,
    Json(body): Json<ComponentBody>,
) -> Result<Response, StarterKitError> {
    let request = ComponentRequest {
        starter_kit: parse_kind(&body.starter_kit)?,
        product_name: body.product_name,
        application_code: body.application_code,
        features: body.features.unwrap_or_default(),
        group_id: body.group_id,
        artifact_id: body.artifact_id,
    };

    let archive = slice(&state)?.orchestrator.generate_component(request).await?;
    Ok(archive_response(archive))
}

#[api_handler(
    post,
    path = "/contracts",
    request_body = ContractBody,
    responses(
        (status = OK, description = "Generated contract project", content_type = "application/zip", body = Vec<u8>),
        (status = BAD_REQUEST, description = "Request rejected", body = ApiProblem),
        (status = BAD_GATEWAY, description = "Upstream generation failed", body = ApiProblem),
        (status = SERVICE_UNAVAILABLE, description = "Catalog unavailable", body = ApiProblem),
        (status = GATEWAY_TIMEOUT, description = "Upstream generation timed out", body = ApiProblem),
    ),
    tag = TAG_CONTRACTS,
)]
pub(super) async fn generate_contract(
    State(state): State<ApiState>,
    Json(body): Json<ContractBody>,
) -> Result<Response, StarterKitError> {
    let request = ContractRequest {
        starter_kit: parse_kind(&body.starter_kit)?,
        contract_type: body
            .contract_type
            .parse::<ContractType>()
            .map_err(|err| StarterKitError::invalid_request(err.to_string()))?,
        product_name: body.product_name,
        application_code: body.application_code,
    };

    let archive = slice(&state)?.orchestrator.generate_contract(request).await?;
    Ok(archive_response(archive))
}

#[api_handler(
    get,
    path = "/libraries/starter-kits",
    responses((status = OK, description = "Starter kits able to generate libraries", body = StarterKitsResponse)),
    tag = TAG_LIBRARIES,
)]
pub(super) async fn list_library_starter_kits() -> Json<StarterKitsResponse> {
    Json(StarterKitsResponse { starter_kits: names(RequestOrchestrator::library_starter_kits()) })
}

#[api_handler(
    post,
    path = "/libraries",
    request_body = LibraryBody,
    responses(
        (status = BAD_REQUEST, description = "Request rejected", body = ApiProblem),
        (status = NOT_IMPLEMENTED, description = "Library generation is not available", body = ApiProblem),
    ),
    tag = TAG_LIBRARIES,
)]
pub(super) async fn generate_library(Json(body): Json<LibraryBody>) -> Result<Response, StarterKitError> {
    let request = LibraryRequest {
        starter_kit: parse_kind(&body.starter_kit)?,
        product_name: body.product_name,
        application_code: body.application_code,
    };

    let archive = RequestOrchestrator::generate_library(&request)?;
    Ok(archive_response(archive))
}

fn slice(state: &ApiState) -> Result<&StarterKit, StarterKitError> {
    Ok(state.try_get_slice::<StarterKit>()?)
}

fn parse_kind(raw: &str) -> Result<StarterKitType, StarterKitError> {
    raw.parse::<StarterKitType>().map_err(|err| StarterKitError::invalid_request(err.to_string()))
}

fn names<T: ToString>(values: impl IntoIterator<Item = T>) -> Vec<String> {
    values.into_iter().map(|value| value.to_string()).collect()
}

fn archive_response(archive: Archive) -> Response {
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", archive.file_name()))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    (
        [(header::CONTENT_TYPE, HeaderValue::from_static(ZIP_CONTENT_TYPE)), (header::CONTENT_DISPOSITION, disposition)],
        archive.bytes,
    )
        .into_response()
}
