//! Mappers - convert domain entities into response DTOs
//!
//! The query service batch-resolves display data for a page and hands it over
//! as borrowed references; the mapping itself stays pure.

use desk_core::{
    AuditEntry, EscalatedFlag, FlagBasic, FlagExtended, ModerationEvent, Role, SellerRef, Thread,
    ThreadSource, UserRef,
};

use super::responses::{
    AuditEntryResponse, BuyerSummaryResponse, FlagBasicResponse, FlagExtendedResponse,
    ModerationEventResponse, SellerSummaryResponse, ThreadResponse, UserSummaryResponse,
};

/// A thread together with the display data resolved for its page
#[derive(Debug, Clone, Copy)]
pub struct ThreadWithContext<'a> {
    pub thread: &'a Thread,
    pub seller: Option<&'a SellerRef>,
    pub buyer: Option<&'a UserRef>,
    pub assigned_to: Option<&'a UserRef>,
    pub closed_by: Option<&'a UserRef>,
    pub resolved_by: Option<&'a UserRef>,
    pub tags: &'a [String],
}

impl From<ThreadWithContext<'_>> for ThreadResponse {
    fn from(ctx: ThreadWithContext<'_>) -> Self {
        let thread = ctx.thread;
        Self {
            id: thread.id.clone(),
            source: thread.source,
            source_id: thread.source_id.clone(),
            status: thread.status,
            priority: thread.priority,
            order_id: thread.order_id.clone(),
            seller_id: thread.seller_id.clone(),
            buyer_id: thread.buyer_id.clone(),
            assigned_to_user_id: thread.assigned_to_user_id.clone(),
            closed_by_user_id: thread.closed_by_user_id.clone(),
            resolved_by_user_id: thread.resolved_by_user_id.clone(),
            subject: thread.subject.clone(),
            display_subject: display_subject(thread, ctx.buyer),
            last_message_preview: thread.last_message_preview.clone(),
            message_count: thread.message_count,
            last_message_at: thread.last_message_at,
            sla_deadline: thread.sla_deadline,
            sla_breach: thread.sla_breach,
            created_at: thread.created_at,
            updated_at: thread.updated_at,
            seller: ctx.seller.map(SellerSummaryResponse::from),
            buyer: ctx.buyer.map(BuyerSummaryResponse::from),
            assigned_to: ctx.assigned_to.map(UserSummaryResponse::from),
            closed_by: ctx.closed_by.map(UserSummaryResponse::from),
            resolved_by: ctx.resolved_by.map(UserSummaryResponse::from),
            tags: ctx.tags.to_vec(),
        }
    }
}

/// Synthesized subject for conversational sources.
///
/// Webchat and WhatsApp threads carry no meaningful stored subject, so the
/// listing shows a channel prefix plus the buyer's name, falling back to a
/// localized role noun when the name is blank. A conversational thread with
/// no buyer attached at all renders the literal `Webchat: Vizitator`
/// whichever channel it came in on. Other sources keep the stored subject.
#[must_use]
pub fn display_subject(thread: &Thread, buyer: Option<&UserRef>) -> Option<String> {
    if !thread.source.is_conversational() {
        return thread.subject.clone();
    }

    let Some(buyer) = buyer else {
        return Some("Webchat: Vizitator".to_string());
    };

    let prefix = match thread.source {
        ThreadSource::Whatsapp => "WhatsApp",
        _ => "Webchat",
    };

    let name = buyer.name.trim();
    if name.is_empty() {
        let noun = match buyer.role {
            Role::Buyer => "Client",
            Role::Seller => "Vânzător",
            _ => "Vizitator",
        };
        Some(format!("{prefix}: {noun}"))
    } else {
        Some(format!("{prefix}: {name}"))
    }
}

impl From<&SellerRef> for SellerSummaryResponse {
    fn from(seller: &SellerRef) -> Self {
        Self {
            brand_name: seller.brand_name.clone(),
            slug: seller.slug.clone(),
        }
    }
}

impl From<&UserRef> for BuyerSummaryResponse {
    fn from(user: &UserRef) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

impl From<&UserRef> for UserSummaryResponse {
    fn from(user: &UserRef) -> Self {
        Self {
            id: user.id.clone(),
            display_id: user.display_id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

impl From<&FlagBasic> for FlagBasicResponse {
    fn from(flag: &FlagBasic) -> Self {
        Self {
            conversation_id: flag.conversation_id.clone(),
            bypass_suspected: flag.bypass_suspected,
            attempts_24h: flag.attempts_24h,
            created_at: flag.created_at,
            updated_at: flag.updated_at,
        }
    }
}

impl From<FlagBasic> for FlagBasicResponse {
    fn from(flag: FlagBasic) -> Self {
        Self::from(&flag)
    }
}

impl From<&FlagExtended> for FlagExtendedResponse {
    fn from(flag: &FlagExtended) -> Self {
        Self {
            conversation_id: flag.conversation_id.clone(),
            fraud_suspected: flag.fraud_suspected,
            fraud_reason: flag.fraud_reason.clone(),
            fraud_detected_at: flag.fraud_detected_at,
            fraud_detected_by_user_id: flag.fraud_detected_by_user_id.clone(),
            escalated_to_user_id: flag.escalated_to_user_id.clone(),
            escalated_at: flag.escalated_at,
            escalation_reason: flag.escalation_reason.clone(),
            evidence: flag.evidence.clone(),
            created_at: flag.created_at,
            updated_at: flag.updated_at,
            escalated_to: None,
        }
    }
}

impl From<FlagExtended> for FlagExtendedResponse {
    fn from(flag: FlagExtended) -> Self {
        Self::from(&flag)
    }
}

impl From<&EscalatedFlag> for FlagExtendedResponse {
    fn from(row: &EscalatedFlag) -> Self {
        let mut response = Self::from(&row.flag);
        response.escalated_to = row.escalated_to.as_ref().map(UserSummaryResponse::from);
        response
    }
}

impl From<&ModerationEvent> for ModerationEventResponse {
    fn from(event: &ModerationEvent) -> Self {
        Self {
            id: event.id,
            actor_id: event.actor_id.clone(),
            actor_name: event.actor_name.clone(),
            actor_role: event.actor_role,
            action_type: event.action_type.clone(),
            thread_id: event.thread_id.clone(),
            reason: event.reason.clone(),
            note: event.note.clone(),
            metadata: event.metadata.clone(),
            created_at: event.created_at,
        }
    }
}

impl From<&AuditEntry> for AuditEntryResponse {
    fn from(entry: &AuditEntry) -> Self {
        Self {
            id: entry.id,
            actor_id: entry.actor_id.clone(),
            actor_role: entry.actor_role,
            action: entry.action.clone(),
            entity_type: entry.entity_type.clone(),
            entity_id: entry.entity_id.clone(),
            message: entry.message.clone(),
            meta: entry.meta.clone(),
            created_at: entry.created_at,
        }
    }
}
