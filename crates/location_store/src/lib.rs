//! Location and user storage for Loc8r
//!
//! This crate provides a storage abstraction for locations (with their
//! embedded reviews) and users. It ships an in-memory store for tests and
//! ephemeral runs, and a SQLite store that keeps each location as a single
//! document row.

mod error;
mod memory;
mod sqlite;
mod traits;

pub use error::*;
pub use memory::*;
pub use sqlite::*;
pub use traits::*;
