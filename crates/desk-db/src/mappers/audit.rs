//! Audit and moderation record mappers

use desk_core::entities::{AuditEntry, ModerationEvent};
use desk_core::Role;

use crate::models::{AuditLogModel, ModerationEventModel};

/// Convert AuditLogModel to AuditEntry
impl From<AuditLogModel> for AuditEntry {
    fn from(model: AuditLogModel) -> Self {
        AuditEntry {
            id: model.id,
            actor_id: model.actor_id,
            actor_role: Role::parse_or_default(&model.actor_role),
            action: model.action,
            entity_type: model.entity_type,
            entity_id: model.entity_id,
            message: model.message,
            meta: model.meta.unwrap_or(serde_json::Value::Null),
            created_at: model.created_at,
        }
    }
}

/// Convert ModerationEventModel to ModerationEvent
impl From<ModerationEventModel> for ModerationEvent {
    fn from(model: ModerationEventModel) -> Self {
        ModerationEvent {
            id: model.id,
            actor_id: model.actor_id,
            actor_name: model.actor_name,
            actor_role: Role::parse_or_default(&model.actor_role),
            action_type: model.action_type,
            thread_id: model.thread_id,
            reason: model.reason,
            note: model.note,
            metadata: model.metadata.unwrap_or(serde_json::Value::Null),
            created_at: model.created_at,
        }
    }
}
