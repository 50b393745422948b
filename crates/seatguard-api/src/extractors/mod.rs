//! Custom Axum extractors.

pub mod auth;
pub mod json;

pub use auth::SessionAuth;
pub use json::ValidatedJson;
