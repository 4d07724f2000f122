//! Commission-bypass and fraud flag handlers

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use desk_service::{ActionResponse, FlagActionRequest, FlagListParams, FlagService};

use crate::{
    extractors::{AuthActor, QueryParams, ValidatedJson},
    response::ApiResult,
    state::AppState,
};

/// Inspect or list flag records
///
/// GET /flags
///
/// With `conversationId` the full flag state of one conversation is returned,
/// including explicit nulls when no record exists. Otherwise `filter` selects
/// a paginated listing (`bypass`, `fraud`, `escalated`, or `all`).
pub async fn list_flags(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    QueryParams(params): QueryParams<FlagListParams>,
) -> ApiResult<Response> {
    let service = FlagService::new(state.service_context());

    let conversation_id = params
        .conversation_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());

    match conversation_id {
        Some(id) => {
            let inspection = service.inspect(&actor, id).await?;
            Ok(Json(inspection).into_response())
        }
        None => {
            let listing = service.list(&actor, &params).await?;
            Ok(Json(listing).into_response())
        }
    }
}

/// Execute a flag action against a conversation
///
/// POST /flags
pub async fn execute_action(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    ValidatedJson(request): ValidatedJson<FlagActionRequest>,
) -> ApiResult<Json<ActionResponse>> {
    let service = FlagService::new(state.service_context());
    let response = service.execute(&actor, &request).await?;

    Ok(Json(response))
}
