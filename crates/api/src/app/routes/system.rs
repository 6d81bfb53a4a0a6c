use axum::{Extension, Json, http::StatusCode, response::IntoResponse};

use crate::app::envelope::Envelope;
use crate::app::errors::ApiError;
use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Fallback for unmatched paths, so they get the envelope too.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("no such route".to_string())
}

pub async fn whoami(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    Json(Envelope::ok(serde_json::json!({
        "user_id": principal.user_id().to_string(),
        "roles": principal.roles().iter().map(|r| r.as_str()).collect::<Vec<_>>(),
        "permissions": principal.permissions().iter().map(|p| p.as_str()).collect::<Vec<_>>(),
    })))
}
