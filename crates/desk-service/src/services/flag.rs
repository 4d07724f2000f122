//! Flag service - fraud suspicion, escalation, and the evidence ledger
//!
//! Flag records are keyed by source conversation id, not thread id. Every
//! mutation writes exactly one audit entry; escalation moves additionally
//! land in the moderation feed under the owning thread when one resolves.

use serde_json::json;
use tracing::{info, instrument};

use desk_core::{
    Actor, AuditAction, AuditEntityType, Capabilities, DomainError, EvidenceEntry,
    ModerationActionType, NewAuditEntry, NewModerationEvent,
};

use crate::dto::requests::{FlagAction, FlagActionRequest, FlagListParams};
use crate::dto::responses::{
    ActionResponse, FlagBasicResponse, FlagExtendedResponse, FlagInspectResponse,
    FlagListResponse, FlagRowResponse,
};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Listing mode for `GET /flags`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagListFilter {
    Bypass,
    Fraud,
    Escalated,
    #[default]
    All,
}

impl FlagListFilter {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bypass => "bypass",
            Self::Fraud => "fraud",
            Self::Escalated => "escalated",
            Self::All => "all",
        }
    }

    /// Strict parse; an absent filter means the fraud-or-escalated union
    pub fn parse(value: Option<&str>) -> Result<Self, DomainError> {
        match value {
            None | Some("all") => Ok(Self::All),
            Some("bypass") => Ok(Self::Bypass),
            Some("fraud") => Ok(Self::Fraud),
            Some("escalated") => Ok(Self::Escalated),
            Some(other) => Err(DomainError::ValidationError(format!(
                "unknown filter value: {other}"
            ))),
        }
    }
}

pub struct FlagService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> FlagService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Dispatch one flag action against a conversation's flag record
    #[instrument(skip(self, actor, request))]
    pub async fn execute(
        &self,
        actor: &Actor,
        request: &FlagActionRequest,
    ) -> ServiceResult<ActionResponse> {
        actor.require(Capabilities::MANAGE_FLAGS)?;

        let conversation_id = request.conversation_id.as_str();
        match &request.action {
            FlagAction::SetFraud {
                fraud_suspected,
                fraud_reason,
                evidence,
            } => {
                self.set_fraud(
                    actor,
                    conversation_id,
                    *fraud_suspected,
                    fraud_reason.as_deref(),
                    evidence.as_ref(),
                )
                .await
            }
            FlagAction::Escalate {
                escalate_to_user_id,
                escalation_reason,
            } => {
                self.escalate(
                    actor,
                    conversation_id,
                    escalate_to_user_id.as_deref(),
                    escalation_reason.as_deref(),
                )
                .await
            }
            FlagAction::Deescalate => self.deescalate(actor, conversation_id).await,
            FlagAction::AddEvidence { evidence } => {
                self.add_evidence(actor, conversation_id, evidence).await
            }
        }
    }

    async fn set_fraud(
        &self,
        actor: &Actor,
        conversation_id: &str,
        suspected: bool,
        reason: Option<&str>,
        evidence: Option<&serde_json::Value>,
    ) -> ServiceResult<ActionResponse> {
        let entry = match evidence {
            Some(content) => {
                if EvidenceEntry::content_is_empty(content) {
                    return Err(DomainError::EmptyEvidence.into());
                }
                Some(EvidenceEntry::new(actor.user_id.as_str(), content.clone()))
            }
            None => None,
        };

        let message = if suspected {
            "Fraud suspicion set"
        } else {
            "Fraud suspicion cleared"
        };
        let audit = NewAuditEntry::new(
            actor,
            AuditAction::FlagFraud,
            AuditEntityType::Flag,
            conversation_id,
            message,
        )
        .with_meta(json!({
            "fraudSuspected": suspected,
            "reason": reason,
            "evidenceAttached": entry.is_some(),
        }));

        self.ctx
            .flag_repo()
            .set_fraud(
                conversation_id,
                suspected,
                reason,
                &actor.user_id,
                entry.as_ref(),
                &audit,
            )
            .await?;

        info!(conversation_id = %conversation_id, suspected, "fraud suspicion updated");
        Ok(ActionResponse::ok(message))
    }

    async fn escalate(
        &self,
        actor: &Actor,
        conversation_id: &str,
        target: Option<&str>,
        reason: Option<&str>,
    ) -> ServiceResult<ActionResponse> {
        let target = target
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(DomainError::MissingEscalationTarget)?;

        // The moderation feed wants a thread id. When no thread matches the
        // conversation, the event still lands under the conversation id
        // rather than being dropped.
        let lookup = self
            .ctx
            .thread_repo()
            .resolve_by_conversation(conversation_id)
            .await?;
        let thread_id = lookup.id_or(conversation_id).to_string();

        let audit = NewAuditEntry::new(
            actor,
            AuditAction::FlagEscalate,
            AuditEntityType::Flag,
            conversation_id,
            format!("Escalated to {target}"),
        )
        .with_meta(json!({ "escalatedTo": target, "reason": reason }));
        let event = NewModerationEvent::new(actor, ModerationActionType::ThreadEscalate, thread_id)
            .with_reason(reason.map(str::to_string))
            .with_metadata(json!({ "escalatedTo": target }));

        self.ctx
            .flag_repo()
            .set_escalation(conversation_id, target, reason, &audit, &event)
            .await?;

        info!(conversation_id = %conversation_id, target = %target, "conversation escalated");
        Ok(ActionResponse::ok(format!("Escalated to {target}")))
    }

    async fn deescalate(
        &self,
        actor: &Actor,
        conversation_id: &str,
    ) -> ServiceResult<ActionResponse> {
        // Requires an existing extended record; whether it currently holds an
        // escalation target does not matter
        let existing = self
            .ctx
            .flag_repo()
            .find_extended(conversation_id)
            .await?
            .ok_or_else(|| DomainError::NothingToDeescalate(conversation_id.to_string()))?;
        let previous = existing.escalated_to_user_id.as_deref();

        let lookup = self
            .ctx
            .thread_repo()
            .resolve_by_conversation(conversation_id)
            .await?;
        let thread_id = lookup.id_or(conversation_id).to_string();

        let audit = NewAuditEntry::new(
            actor,
            AuditAction::FlagDeescalate,
            AuditEntityType::Flag,
            conversation_id,
            "Escalation cleared",
        )
        .with_meta(json!({ "previous": previous }));
        let event =
            NewModerationEvent::new(actor, ModerationActionType::ThreadDeescalate, thread_id)
                .with_metadata(json!({ "previous": previous }));

        self.ctx
            .flag_repo()
            .clear_escalation(conversation_id, &audit, &event)
            .await?;

        info!(conversation_id = %conversation_id, "conversation de-escalated");
        Ok(ActionResponse::ok("Escalation cleared"))
    }

    async fn add_evidence(
        &self,
        actor: &Actor,
        conversation_id: &str,
        content: &serde_json::Value,
    ) -> ServiceResult<ActionResponse> {
        if EvidenceEntry::content_is_empty(content) {
            return Err(DomainError::EmptyEvidence.into());
        }
        let entry = EvidenceEntry::new(actor.user_id.as_str(), content.clone());

        let audit = NewAuditEntry::new(
            actor,
            AuditAction::FlagEvidence,
            AuditEntityType::Flag,
            conversation_id,
            "Evidence appended",
        )
        .with_meta(json!({ "addedBy": actor.user_id }));

        let flag = self
            .ctx
            .flag_repo()
            .append_evidence(conversation_id, &entry, &audit)
            .await?;

        info!(
            conversation_id = %conversation_id,
            entries = flag.evidence.len(),
            "evidence appended"
        );
        Ok(ActionResponse::ok("Evidence appended"))
    }

    /// Both flag records for one conversation; absent records come back as
    /// nulls rather than an error
    #[instrument(skip(self, actor))]
    pub async fn inspect(
        &self,
        actor: &Actor,
        conversation_id: &str,
    ) -> ServiceResult<FlagInspectResponse> {
        actor.require(Capabilities::VIEW_FLAGS)?;

        let basic = self.ctx.flag_repo().find_basic(conversation_id).await?;
        let extended = self.ctx.flag_repo().find_extended(conversation_id).await?;

        Ok(FlagInspectResponse {
            conversation_id: conversation_id.to_string(),
            basic_flags: basic.as_ref().map(FlagBasicResponse::from),
            extended_flags: extended.as_ref().map(FlagExtendedResponse::from),
        })
    }

    /// One page of one of the four flag listings
    #[instrument(skip(self, actor, params))]
    pub async fn list(
        &self,
        actor: &Actor,
        params: &FlagListParams,
    ) -> ServiceResult<FlagListResponse> {
        actor.require(Capabilities::VIEW_FLAGS)?;

        let filter = FlagListFilter::parse(params.filter.as_deref())?;
        let (page, limit) = (params.page(), params.limit());
        let offset = params.offset();

        let repo = self.ctx.flag_repo();
        let (data, total): (Vec<FlagRowResponse>, i64) = match filter {
            FlagListFilter::Bypass => {
                let rows = repo.list_bypass(limit, offset).await?;
                let total = repo.count_bypass().await?;
                let data = rows
                    .iter()
                    .map(|f| FlagRowResponse::Basic(f.into()))
                    .collect();
                (data, total)
            }
            FlagListFilter::Fraud => {
                let rows = repo.list_fraud(limit, offset).await?;
                let total = repo.count_fraud().await?;
                let data = rows
                    .iter()
                    .map(|f| FlagRowResponse::Extended(f.into()))
                    .collect();
                (data, total)
            }
            FlagListFilter::Escalated => {
                let rows = repo.list_escalated(limit, offset).await?;
                let total = repo.count_escalated().await?;
                let data = rows
                    .iter()
                    .map(|f| FlagRowResponse::Extended(f.into()))
                    .collect();
                (data, total)
            }
            FlagListFilter::All => {
                let rows = repo.list_flagged(limit, offset).await?;
                let total = repo.count_flagged().await?;
                let data = rows
                    .iter()
                    .map(|f| FlagRowResponse::Extended(f.into()))
                    .collect();
                (data, total)
            }
        };

        Ok(FlagListResponse {
            data,
            total,
            page,
            limit,
            filter: filter.as_str().to_string(),
        })
    }
}
