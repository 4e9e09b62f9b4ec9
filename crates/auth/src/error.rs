//! Authentication error types.

use thiserror::Error;

/// Why a login attempt was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailure {
    /// No user is registered with the given email.
    UnknownEmail,
    /// The user exists but the password does not match.
    WrongPassword,
}

impl LoginFailure {
    /// Message describing the specific reason.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::UnknownEmail => "Incorrect username.",
            Self::WrongPassword => "Incorrect password.",
        }
    }
}

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// JWT validation failed.
    #[error("JWT validation failed: {0}")]
    JwtValidation(String),

    /// JWT encoding failed.
    #[error("JWT encoding failed: {0}")]
    JwtEncoding(String),

    /// Token expired.
    #[error("Token expired")]
    TokenExpired,

    /// Invalid token.
    #[error("Invalid token")]
    InvalidToken,

    /// Email or password did not match a registered user.
    #[error("Invalid credentials: {}", .0.reason())]
    InvalidCredentials(LoginFailure),

    /// A stored credential could not be decoded.
    #[error("Corrupt credential: {0}")]
    CorruptCredential(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            jsonwebtoken::errors::ErrorKind::InvalidToken => AuthError::InvalidToken,
            _ => AuthError::JwtValidation(e.to_string()),
        }
    }
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;
