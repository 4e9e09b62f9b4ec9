//! Authentication for Loc8r.
//!
//! This crate provides:
//! - JWT token generation and validation
//! - Salted password hashing and verification

mod error;
mod jwt;
mod password;

pub use error::*;
pub use jwt::*;
pub use password::*;

/// Default JWT expiration time in hours (seven days).
pub const DEFAULT_JWT_EXPIRATION_HOURS: u64 = 24 * 7;

/// Longest accepted token lifetime in hours (ten years).
pub const MAX_JWT_EXPIRATION_HOURS: u64 = 24 * 365 * 10;

/// Default JWT issuer.
pub const DEFAULT_JWT_ISSUER: &str = "loc8r";
