use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum AuthzError {
    #[error("Invalid requirement: {0}")]
    #[diagnostic(
        code(turnstile::authz::invalid_requirement),
        help("Mode `single` takes exactly one permission; `any` and `all` take a list")
    )]
    InvalidRequirement(String),

    #[error("Failed to fetch permission snapshot from `{url}`")]
    #[diagnostic(
        code(turnstile::authz::snapshot_fetch),
        help("Check that the upstream API is reachable and `upstream.base_url` is correct")
    )]
    SnapshotFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Permission service returned HTTP {status} for `{url}`")]
    #[diagnostic(code(turnstile::authz::upstream_status))]
    UpstreamStatus { url: String, status: u16 },

    #[error("Malformed permission payload: {0}")]
    #[diagnostic(
        code(turnstile::authz::malformed_payload),
        help("Expected a JSON body of the form {{ \"permissions\": [...], \"roleId\": ... }}")
    )]
    MalformedPayload(String),
}

impl IntoResponse for AuthzError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthzError::InvalidRequirement(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AuthzError::SnapshotFetch { .. }
            | AuthzError::UpstreamStatus { .. }
            | AuthzError::MalformedPayload(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
        };
        let body = json!({ "error": message });
        (status, Json(body)).into_response()
    }
}
