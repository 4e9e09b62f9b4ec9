//! Request middleware.

mod auth;
mod error_detail;

pub use self::auth::*;
pub use self::error_detail::*;
