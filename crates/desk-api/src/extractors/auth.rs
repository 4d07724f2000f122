//! Authentication extractor
//!
//! Extracts and validates JWT tokens from the Authorization header.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use desk_common::AppError;
use desk_core::Actor;

use crate::response::ApiError;
use crate::state::AppState;

/// Authenticated staff actor extracted from the bearer token
#[derive(Debug, Clone)]
pub struct AuthActor(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for AuthActor
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Extract the Authorization header
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::from(AppError::MissingAuth))?;

        // Validate the token and build the acting identity
        let app_state = AppState::from_ref(state);
        let actor = app_state.jwt_service().authenticate(bearer.token()).map_err(|e| {
            tracing::warn!(error = %e, "Token rejected");
            ApiError::from(e)
        })?;

        Ok(AuthActor(actor))
    }
}
