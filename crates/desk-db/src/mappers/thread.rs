//! Thread entity <-> model mapper

use desk_core::entities::{Thread, ThreadPriority, ThreadSource, ThreadStatus, ThreadTag};

use crate::models::{ThreadModel, ThreadTagModel};

/// Convert ThreadModel to Thread entity
///
/// Enum columns parse leniently: a value written under an unknown taxonomy
/// degrades to the enum default instead of failing the whole page.
impl From<ThreadModel> for Thread {
    fn from(model: ThreadModel) -> Self {
        Thread {
            id: model.id,
            source: ThreadSource::parse_or_default(&model.source),
            source_id: model.source_id,
            status: ThreadStatus::parse_or_default(&model.status),
            priority: ThreadPriority::parse_or_default(&model.priority),
            order_id: model.order_id,
            seller_id: model.seller_id,
            buyer_id: model.buyer_id,
            assigned_to_user_id: model.assigned_to_user_id,
            closed_by_user_id: model.closed_by_user_id,
            resolved_by_user_id: model.resolved_by_user_id,
            subject: model.subject,
            last_message_preview: model.last_message_preview,
            message_count: model.message_count,
            last_message_at: model.last_message_at,
            sla_deadline: model.sla_deadline,
            sla_breach: model.sla_breach,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Convert ThreadTagModel to ThreadTag entity
impl From<ThreadTagModel> for ThreadTag {
    fn from(model: ThreadTagModel) -> Self {
        ThreadTag {
            thread_id: model.thread_id,
            tag: model.tag,
            created_at: model.created_at,
        }
    }
}
