//! Axum extractors for request handling
//!
//! Bearer authentication, validated JSON bodies and typed path ids.

mod auth;
mod path;
mod validated;

pub use auth::AuthUser;
pub use path::CompetitionIdPath;
pub use validated::ValidatedJson;
