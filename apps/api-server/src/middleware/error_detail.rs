//! Development-only exposure of internal error detail.

use axum::{
    Json,
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::InternalErrorDetail;

/// Rewrites 500 responses to carry the underlying error as `"error"`.
///
/// Only installed when running in development.
pub async fn error_detail_middleware(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    let Some(detail) = response.extensions().get::<InternalErrorDetail>().cloned() else {
        return response;
    };

    (
        response.status(),
        Json(json!({
            "message": detail.message,
            "error": detail.detail,
        })),
    )
        .into_response()
}
