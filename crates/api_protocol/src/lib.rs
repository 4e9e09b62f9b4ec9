//! JSON wire types for the Loc8r REST API
//!
//! Field names follow the API's established JSON shape (`_id`, `reviewText`,
//! `openingTimes`, `createdOn`, GeoJSON `coords`), independent of how the
//! entities are stored.

mod lenient;
mod requests;
mod responses;
mod types;

pub use requests::*;
pub use responses::*;
pub use types::*;
