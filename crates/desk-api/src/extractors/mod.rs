//! Axum extractors for request handling
//!
//! Custom extractors for authentication, query parsing, and body validation.

mod auth;
mod query;
mod validated;

pub use auth::AuthActor;
pub use query::QueryParams;
pub use validated::ValidatedJson;
