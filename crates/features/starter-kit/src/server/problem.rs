use crate::error::{DispatchError, Rejection, StarterKitError, UpstreamError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use initium_kernel::server::problem::ApiProblem;
use tracing::error;

impl IntoResponse for StarterKitError {
    fn into_response(self) -> Response {
        let problem = problem(&self);
        if problem.status_code().is_server_error() {
            error!(status = problem.status, code = %problem.code, error = %self, "Starter-kit request failed");
        }
        problem.into_response()
    }
}

/// Maps a slice error to its `application/problem+json` body.
pub(crate) fn problem(err: &StarterKitError) -> ApiProblem {
    let detail = err.to_string();

    if let Some(rejection) = err.rejection() {
        return rejection_problem(&rejection, detail);
    }

    match err {
        StarterKitError::InvalidRequest { .. } => ApiProblem::bad_request("InvalidRequest", detail),
        StarterKitError::UpstreamUnavailable { source, .. } => {
            ApiProblem::new(StatusCode::SERVICE_UNAVAILABLE, "UpstreamUnavailable", detail)
                .with("cause", source.cause())
        },
        StarterKitError::GenerationFailed { source: DispatchError::Upstream { source, .. }, .. } => {
            let status = match source {
                UpstreamError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::BAD_GATEWAY,
            };
            ApiProblem::new(status, "GenerationFailed", detail).with("cause", source.cause())
        },
        StarterKitError::LibraryGenerationUnavailable { kind } => {
            ApiProblem::new(StatusCode::NOT_IMPLEMENTED, "LibraryGenerationUnavailable", detail)
                .with("starterKit", kind.as_str())
        },
        _ => ApiProblem::new(StatusCode::INTERNAL_SERVER_ERROR, "InternalError", detail),
    }
}

fn rejection_problem(rejection: &Rejection, detail: String) -> ApiProblem {
    let problem = ApiProblem::bad_request(rejection.code(), detail);

    match rejection {
        Rejection::UnsupportedType { kind } => problem.with("starterKit", kind.as_str()),
        Rejection::ContractFeaturesNotAllowed { features } => problem.with("contractFeatures", features.clone()),
        Rejection::NoFeaturesAvailable => problem,
        Rejection::InvalidFeatures { invalid, available } => problem
            .with("invalidFeatures", invalid.clone())
            .with("availableFeatures", available.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use initium_domain::starter_kit::StarterKitType;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn invalid_features_enumerate_both_lists() {
        let err = StarterKitError::from(Rejection::InvalidFeatures {
            invalid: vec!["nope".to_owned()],
            available: vec!["security".to_owned(), "web".to_owned()],
        });

        let value = serde_json::to_value(problem(&err)).unwrap();
        assert_eq!(value["status"], 400);
        assert_eq!(value["code"], "InvalidFeatures");
        assert_eq!(value["invalidFeatures"], json!(["nope"]));
        assert_eq!(value["availableFeatures"], json!(["security", "web"]));
    }

    #[test]
    fn unsupported_dispatch_is_a_client_error() {
        let err = StarterKitError::from(DispatchError::Unsupported { kind: StarterKitType::Stump });
        let problem = problem(&err);

        assert_eq!(problem.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(problem.code, "UnsupportedType");
    }

    #[test]
    fn generation_timeouts_are_gateway_timeouts() {
        let timeout = StarterKitError::from(DispatchError::from(UpstreamError::Timeout { after: Duration::from_secs(30) }));
        let status = StarterKitError::from(DispatchError::from(UpstreamError::Status { status: 500, body: String::new() }));

        assert_eq!(problem(&timeout).status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(problem(&timeout).extensions["cause"], "timeout");
        assert_eq!(problem(&status).status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(problem(&status).extensions["cause"], "status");
    }

    #[test]
    fn catalog_outage_is_service_unavailable() {
        let err = StarterKitError::from(crate::error::CatalogError::from(UpstreamError::EmptyBody));
        assert_eq!(problem(&err).status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let shared = StarterKitError::from(crate::error::CatalogError::Unavailable {
            cause: "timeout",
            message: "Upstream call timed out after 30s".to_owned(),
        });
        assert_eq!(problem(&shared).status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(problem(&shared).extensions["cause"], "timeout");
    }

    #[test]
    fn library_requests_are_not_implemented() {
        let err = StarterKitError::LibraryGenerationUnavailable { kind: StarterKitType::Tonic };
        assert_eq!(problem(&err).status_code(), StatusCode::NOT_IMPLEMENTED);
    }
}
