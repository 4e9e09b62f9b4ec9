//! Authentication middleware.

use std::sync::Arc;

use auth::{Claims, extract_bearer_token};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use location_store::LocationStore;
use uuid::Uuid;

use crate::error::ServerError;
use crate::state::AppState;

/// Authenticated user information.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// User ID.
    pub id: Uuid,
    /// User email.
    pub email: String,
    /// User display name at the time the token was issued.
    pub name: String,
}

impl TryFrom<Claims> for AuthenticatedUser {
    type Error = auth::AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            id: claims.user_id()?,
            email: claims.email,
            name: claims.name,
        })
    }
}

/// Extracts the JWT token from the Authorization header.
fn extract_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_bearer_token)
}

/// Authentication middleware.
///
/// Extracts the bearer token from the Authorization header, validates it, and
/// stores the authenticated user in the request extensions. Requests without a
/// valid token never reach the handler.
pub async fn auth_middleware<S: LocationStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_token(&request) else {
        return ServerError::AuthenticationRequired(
            "No authorization token was found".to_string(),
        )
        .into_response();
    };

    let user = match state
        .jwt_manager
        .validate_token(token)
        .and_then(AuthenticatedUser::try_from)
    {
        Ok(user) => user,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected bearer token");
            return ServerError::Auth(e).into_response();
        }
    };

    request.extensions_mut().insert(user);

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authenticated_user_from_claims() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(
            user_id,
            "test@example.com".to_string(),
            "Test User".to_string(),
            auth::DEFAULT_JWT_ISSUER,
            24,
        )
        .unwrap();

        let user = AuthenticatedUser::try_from(claims).unwrap();
        assert_eq!(user.id, user_id);
        assert_eq!(user.email, "test@example.com");
        assert_eq!(user.name, "Test User");
    }

    #[test]
    fn test_authenticated_user_rejects_bad_subject() {
        let mut claims = Claims::new(
            Uuid::new_v4(),
            "test@example.com".to_string(),
            "Test User".to_string(),
            auth::DEFAULT_JWT_ISSUER,
            24,
        )
        .unwrap();
        claims.sub = "not-a-uuid".to_string();

        assert!(AuthenticatedUser::try_from(claims).is_err());
    }
}
