//! Core entity definitions for Loc8r.
//!
//! This crate defines the documents the location directory persists: places
//! with their embedded opening times and reviews, and the users that author
//! reviews. Schema rules live next to the types so every store enforces the
//! same constraints before writing.

mod geo;
mod location;
mod review;
mod user;
mod validation;

pub use geo::*;
pub use location::*;
pub use review::*;
pub use user::*;
pub use validation::*;
