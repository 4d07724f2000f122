//! Thread action processor - assignment, status, priority, and tags
//!
//! Every action requires an existing thread and the thread-management
//! capability. Each writes exactly one audit entry in the same transaction
//! as the mutation; assignment and priority changes also land in the
//! moderation feed.

use serde_json::json;
use tracing::{info, instrument};

use desk_core::{
    Actor, AuditAction, AuditEntityType, Capabilities, DomainError, ModerationActionType,
    NewAuditEntry, NewModerationEvent, Thread, ThreadPriority, ThreadStatus, ThreadTag,
};

use crate::dto::requests::{ThreadAction, ThreadActionRequest};
use crate::dto::responses::ActionResponse;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Write side of the thread surface
pub struct ThreadActionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ThreadActionService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Dispatch one thread action
    #[instrument(skip(self, actor, request))]
    pub async fn execute(
        &self,
        actor: &Actor,
        request: &ThreadActionRequest,
    ) -> ServiceResult<ActionResponse> {
        actor.require(Capabilities::MANAGE_THREADS)?;

        let thread = self
            .ctx
            .thread_repo()
            .find_by_id(&request.thread_id)
            .await?
            .ok_or_else(|| DomainError::ThreadNotFound(request.thread_id.clone()))?;

        match &request.action {
            ThreadAction::Assign { assign_to_user_id } => {
                self.assign(actor, &thread, assign_to_user_id.as_deref()).await
            }
            ThreadAction::Status { status } => self.set_status(actor, &thread, status).await,
            ThreadAction::Priority { priority } => {
                self.set_priority(actor, &thread, priority).await
            }
            ThreadAction::AddTag { tag } => self.add_tag(actor, &thread, tag).await,
            ThreadAction::RemoveTag { tag } => self.remove_tag(actor, &thread, tag).await,
        }
    }

    async fn assign(
        &self,
        actor: &Actor,
        thread: &Thread,
        target: Option<&str>,
    ) -> ServiceResult<ActionResponse> {
        // An omitted or blank target clears the assignment
        let target = target.map(str::trim).filter(|t| !t.is_empty());
        let previous = thread.assigned_to_user_id.as_deref();

        let (action_type, message) = match target {
            Some(user_id) => (
                ModerationActionType::ThreadAssign,
                format!("Thread assigned to {user_id}"),
            ),
            None => (
                ModerationActionType::ThreadUnassign,
                "Thread unassigned".to_string(),
            ),
        };

        let change = json!({ "previous": previous, "new": target });
        let audit = NewAuditEntry::new(
            actor,
            AuditAction::ThreadAssign,
            AuditEntityType::Thread,
            thread.id.as_str(),
            message.clone(),
        )
        .with_meta(change.clone());
        let event = NewModerationEvent::new(actor, action_type, thread.id.as_str())
            .with_metadata(change);

        self.ctx
            .thread_repo()
            .set_assignee(&thread.id, target, &audit, &event)
            .await?;

        info!(thread_id = %thread.id, assignee = ?target, "thread assignment updated");
        Ok(ActionResponse::ok(message))
    }

    async fn set_status(
        &self,
        actor: &Actor,
        thread: &Thread,
        raw: &str,
    ) -> ServiceResult<ActionResponse> {
        let status =
            ThreadStatus::parse(raw).ok_or_else(|| DomainError::InvalidStatus(raw.to_string()))?;

        if !self.ctx.transition_policy().allows(thread.status, status) {
            return Err(DomainError::TransitionDenied {
                from: thread.status.to_string(),
                to: status.to_string(),
            }
            .into());
        }

        // Terminal provenance; the repository stamps these only while the
        // column is still null
        let closed_by = (status == ThreadStatus::Closed).then_some(actor.user_id.as_str());
        let resolved_by = (status == ThreadStatus::Resolved).then_some(actor.user_id.as_str());

        let message = format!("Status changed to {status}");
        let audit = NewAuditEntry::new(
            actor,
            AuditAction::ThreadStatus,
            AuditEntityType::Thread,
            thread.id.as_str(),
            message.clone(),
        )
        .with_meta(json!({ "previous": thread.status.as_str(), "new": status.as_str() }));

        self.ctx
            .thread_repo()
            .set_status(&thread.id, status, closed_by, resolved_by, &audit)
            .await?;

        info!(thread_id = %thread.id, status = %status, "thread status updated");
        Ok(ActionResponse::ok(message))
    }

    async fn set_priority(
        &self,
        actor: &Actor,
        thread: &Thread,
        raw: &str,
    ) -> ServiceResult<ActionResponse> {
        let priority = ThreadPriority::parse(raw)
            .ok_or_else(|| DomainError::InvalidPriority(raw.to_string()))?;

        let change = json!({ "previous": thread.priority.as_str(), "new": priority.as_str() });
        let message = format!("Priority changed to {priority}");
        let audit = NewAuditEntry::new(
            actor,
            AuditAction::ThreadPriority,
            AuditEntityType::Thread,
            thread.id.as_str(),
            message.clone(),
        )
        .with_meta(change.clone());
        let event = NewModerationEvent::new(
            actor,
            ModerationActionType::ThreadPriorityChange,
            thread.id.as_str(),
        )
        .with_metadata(change);

        self.ctx
            .thread_repo()
            .set_priority(&thread.id, priority, &audit, &event)
            .await?;

        info!(thread_id = %thread.id, priority = %priority, "thread priority updated");
        Ok(ActionResponse::ok(message))
    }

    async fn add_tag(
        &self,
        actor: &Actor,
        thread: &Thread,
        raw: &str,
    ) -> ServiceResult<ActionResponse> {
        let tag = ThreadTag::normalize(raw);
        if tag.is_empty() {
            return Err(DomainError::EmptyTag.into());
        }

        let audit = NewAuditEntry::new(
            actor,
            AuditAction::ThreadTagAdd,
            AuditEntityType::Thread,
            thread.id.as_str(),
            format!("Tag '{tag}' added"),
        )
        .with_meta(json!({ "tag": tag }));

        self.ctx.tag_repo().add(&thread.id, &tag, &audit).await?;

        info!(thread_id = %thread.id, tag = %tag, "tag added");
        Ok(ActionResponse::ok(format!("Tag '{tag}' added")))
    }

    async fn remove_tag(
        &self,
        actor: &Actor,
        thread: &Thread,
        raw: &str,
    ) -> ServiceResult<ActionResponse> {
        let tag = ThreadTag::normalize(raw);
        if tag.is_empty() {
            return Err(DomainError::EmptyTag.into());
        }

        let audit = NewAuditEntry::new(
            actor,
            AuditAction::ThreadTagRemove,
            AuditEntityType::Thread,
            thread.id.as_str(),
            format!("Tag '{tag}' removed"),
        )
        .with_meta(json!({ "tag": tag }));

        self.ctx.tag_repo().remove(&thread.id, &tag, &audit).await?;

        info!(thread_id = %thread.id, tag = %tag, "tag removed");
        Ok(ActionResponse::ok(format!("Tag '{tag}' removed")))
    }
}
