//! Server-side services shared by handlers.

pub mod rating;
