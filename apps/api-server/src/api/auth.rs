//! Authentication API endpoints.

use api_protocol::{LoginRequest, RegisterRequest, TokenResponse};
use auth::{LoginFailure, PasswordCredential};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use entities::User;
use location_store::LocationStore;

use super::non_blank;
use crate::error::{ServerError, ServerResult};
use crate::state::{AppState, SharedState};

const ALL_FIELDS_REQUIRED: &str = "All fields required";

fn issue_token<S: LocationStore>(state: &AppState<S>, user: &User) -> ServerResult<Json<TokenResponse>> {
    let token = state
        .jwt_manager
        .generate_token(user.id, user.email.clone(), user.name.clone())?;
    Ok(Json(TokenResponse { token }))
}

/// Registers a new user and returns a token for them.
pub async fn register<S: LocationStore>(
    State(state): State<SharedState<S>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ServerResult<Json<TokenResponse>> {
    let Json(request) = payload?;

    let (Some(name), Some(email), Some(password)) = (
        non_blank(request.name),
        non_blank(request.email),
        request.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ServerError::InvalidRequest(ALL_FIELDS_REQUIRED.to_string()));
    };

    let credential = PasswordCredential::derive(&password);
    let user = User::new(email, name, credential.hash, credential.salt);

    let user = state
        .store
        .create_user(user)
        .await
        .map_err(|e| ServerError::Internal {
            message: "Error saving user".to_string(),
            detail: e.to_string(),
        })?;

    tracing::info!(user_id = %user.id, "Registered user");

    issue_token(&state, &user)
}

/// Exchanges an email and password for a token.
pub async fn login<S: LocationStore>(
    State(state): State<SharedState<S>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ServerResult<Json<TokenResponse>> {
    let Json(request) = payload?;

    let (Some(email), Some(password)) = (
        non_blank(request.email),
        request.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ServerError::InvalidRequest(ALL_FIELDS_REQUIRED.to_string()));
    };

    let failure = match state.store.get_user_by_email(&email).await? {
        Some(user) => {
            if PasswordCredential::verify(&password, &user.password_hash, &user.salt)? {
                tracing::info!(user_id = %user.id, "User logged in");
                return issue_token(&state, &user);
            }
            LoginFailure::WrongPassword
        }
        None => LoginFailure::UnknownEmail,
    };

    tracing::warn!(email = %email, reason = failure.reason(), "Rejected login");

    Err(ServerError::InvalidCredentials {
        failure,
        expose_reason: state.config.expose_login_failure_reason,
    })
}
