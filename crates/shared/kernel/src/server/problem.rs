//! `application/problem+json` error bodies shared by every slice.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use initium_derive::api_model;
use serde_json::{Map, Value};
use std::borrow::Cow;

pub const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

/// Machine-readable failure returned by every endpoint.
///
/// `code` is stable and meant for programs; `detail` is for humans.
/// Slice-specific data (offending ids, upstream cause) goes in `extensions`,
/// which are flattened into the top-level object.
#[api_model(deny_unknown_fields = false)]
#[derive(Clone, PartialEq)]
pub struct ApiProblem {
    pub status: u16,
    pub code: String,
    pub title: String,
    pub detail: String,
    #[serde(flatten)]
    #[cfg_attr(feature = "server", schema(value_type = Object))]
    pub extensions: Map<String, Value>,
}

impl ApiProblem {
    pub fn new(status: StatusCode, code: impl Into<Cow<'static, str>>, detail: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            code: code.into().into_owned(),
            title: status.canonical_reason().unwrap_or("Error").to_owned(),
            detail: detail.into(),
            extensions: Map::new(),
        }
    }

    pub fn bad_request(code: impl Into<Cow<'static, str>>, detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, detail)
    }

    /// Adds a top-level member such as `invalidFeatures`.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extensions.insert(key.to_owned(), value.into());
        self
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ApiProblem {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut response = (status, Json(self)).into_response();
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(PROBLEM_CONTENT_TYPE));
        response
    }
}
