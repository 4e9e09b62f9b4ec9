//! Server error types.

use auth::{AuthError, LoginFailure};
use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use entities::ValidationError;
use location_store::StoreError;
use serde_json::json;

/// Message sent with every 500 response.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Missing or malformed request input.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A document failed schema validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or rejected bearer token.
    #[error("Authentication required: {0}")]
    AuthenticationRequired(String),

    /// Login with an unknown email or a wrong password.
    #[error("Invalid credentials: {}", .failure.reason())]
    InvalidCredentials {
        failure: LoginFailure,
        expose_reason: bool,
    },

    /// Authentication error.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Store failure that is not the client's fault.
    #[error("Database error: {0}")]
    Database(StoreError),

    /// Internal server error. `message` is sent to the client, `detail` only
    /// in development.
    #[error("Internal error: {detail}")]
    Internal { message: String, detail: String },
}

impl ServerError {
    /// An internal error with the generic client message.
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            message: INTERNAL_ERROR_MESSAGE.to_string(),
            detail: detail.into(),
        }
    }
}

impl From<StoreError> for ServerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { entity_type, .. } => {
                ServerError::NotFound(format!("{entity_type} not found"))
            }
            StoreError::Validation(e) => ServerError::Validation(e),
            other => ServerError::Database(other),
        }
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        ServerError::InvalidRequest(rejection.body_text())
    }
}

/// Detail of a 500 response, attached to the response extensions so that the
/// development error layer can expose it.
#[derive(Debug, Clone)]
pub struct InternalErrorDetail {
    pub message: String,
    pub detail: String,
}

fn internal_response(message: String, detail: String) -> Response {
    tracing::error!(error = %detail, "{message}");

    let mut response = (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": message })),
    )
        .into_response();
    response
        .extensions_mut()
        .insert(InternalErrorDetail { message, detail });
    response
}

fn message_response(status: StatusCode, message: impl Into<String>) -> Response {
    let message: String = message.into();
    (status, Json(json!({ "message": message }))).into_response()
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            ServerError::InvalidRequest(msg) => message_response(StatusCode::BAD_REQUEST, msg),
            ServerError::Validation(e) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "message": e.to_string(),
                    "errors": e.violations,
                })),
            )
                .into_response(),
            ServerError::NotFound(msg) => message_response(StatusCode::NOT_FOUND, msg),
            ServerError::AuthenticationRequired(msg) => {
                message_response(StatusCode::UNAUTHORIZED, msg)
            }
            ServerError::InvalidCredentials {
                failure,
                expose_reason,
            } => {
                let message = if expose_reason {
                    failure.reason()
                } else {
                    "Incorrect email or password."
                };
                message_response(StatusCode::UNAUTHORIZED, message)
            }
            ServerError::Auth(
                e @ (AuthError::JwtEncoding(_)
                | AuthError::CorruptCredential(_)
                | AuthError::Configuration(_)),
            ) => internal_response(INTERNAL_ERROR_MESSAGE.to_string(), e.to_string()),
            ServerError::Auth(e) => message_response(StatusCode::UNAUTHORIZED, e.to_string()),
            ServerError::Database(e) => {
                internal_response(INTERNAL_ERROR_MESSAGE.to_string(), e.to_string())
            }
            ServerError::Internal { message, detail } => internal_response(message, detail),
        }
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
