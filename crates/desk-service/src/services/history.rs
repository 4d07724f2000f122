//! History feeds - the thread-scoped moderation feed and the audit trail

use tracing::instrument;

use desk_core::{Actor, Capabilities, DomainError};

use crate::dto::requests::{AuditListParams, ModerationListParams};
use crate::dto::responses::{AuditEntryResponse, ModerationEventResponse, PaginatedResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

pub struct HistoryService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> HistoryService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// One thread's moderation feed, newest first
    #[instrument(skip(self, actor, params))]
    pub async fn moderation_feed(
        &self,
        actor: &Actor,
        params: &ModerationListParams,
    ) -> ServiceResult<PaginatedResponse<ModerationEventResponse>> {
        actor.require(Capabilities::VIEW_THREADS)?;

        let thread_id = params
            .thread_id
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| DomainError::ValidationError("threadId is required".to_string()))?;

        let (page, limit) = (params.page(), params.limit());
        let events = self
            .ctx
            .moderation_repo()
            .list_for_thread(thread_id, limit, params.offset())
            .await?;
        let total = self.ctx.moderation_repo().count_for_thread(thread_id).await?;
        let data = events.iter().map(ModerationEventResponse::from).collect();

        Ok(PaginatedResponse::new(data, total, page, limit))
    }

    /// The system-of-record audit trail, optionally scoped to one entity
    #[instrument(skip(self, actor, params))]
    pub async fn audit_trail(
        &self,
        actor: &Actor,
        params: &AuditListParams,
    ) -> ServiceResult<PaginatedResponse<AuditEntryResponse>> {
        actor.require(Capabilities::VIEW_AUDIT)?;

        let entity_type = params
            .entity_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());
        let entity_id = params
            .entity_id
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());

        let (page, limit) = (params.page(), params.limit());
        let entries = self
            .ctx
            .audit_repo()
            .list(entity_type, entity_id, limit, params.offset())
            .await?;
        let total = self.ctx.audit_repo().count(entity_type, entity_id).await?;
        let data = entries.iter().map(AuditEntryResponse::from).collect();

        Ok(PaginatedResponse::new(data, total, page, limit))
    }
}
