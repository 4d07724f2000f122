//! Moderation feed and audit trail handlers

use axum::{extract::State, Json};
use desk_service::{
    AuditEntryResponse, AuditListParams, HistoryService, ModerationEventResponse,
    ModerationListParams, PaginatedResponse,
};

use crate::{
    extractors::{AuthActor, QueryParams},
    response::ApiResult,
    state::AppState,
};

/// List moderation events for a thread, newest first
///
/// GET /moderation
pub async fn moderation_feed(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    QueryParams(params): QueryParams<ModerationListParams>,
) -> ApiResult<Json<PaginatedResponse<ModerationEventResponse>>> {
    let service = HistoryService::new(state.service_context());
    let page = service.moderation_feed(&actor, &params).await?;

    Ok(Json(page))
}

/// List audit entries, optionally scoped to one entity
///
/// GET /audit
pub async fn audit_trail(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    QueryParams(params): QueryParams<AuditListParams>,
) -> ApiResult<Json<PaginatedResponse<AuditEntryResponse>>> {
    let service = HistoryService::new(state.service_context());
    let page = service.audit_trail(&actor, &params).await?;

    Ok(Json(page))
}
