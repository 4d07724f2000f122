//! Flag entity <-> model mappers

use desk_core::entities::{EscalatedFlag, EvidenceLedger, FlagBasic, FlagExtended, UserRef};
use desk_core::Role;

use crate::models::{EscalatedFlagModel, FlagBasicModel, FlagExtendedModel};

/// Parse the stored evidence ledger; a null column or a ledger written under
/// an unknown shape degrades to an empty ledger rather than failing the read
fn parse_evidence(value: Option<serde_json::Value>) -> EvidenceLedger {
    value
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

/// Convert FlagBasicModel to FlagBasic entity
impl From<FlagBasicModel> for FlagBasic {
    fn from(model: FlagBasicModel) -> Self {
        FlagBasic {
            conversation_id: model.conversation_id,
            bypass_suspected: model.bypass_suspected,
            attempts_24h: model.attempts_24h,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Convert FlagExtendedModel to FlagExtended entity
impl From<FlagExtendedModel> for FlagExtended {
    fn from(model: FlagExtendedModel) -> Self {
        FlagExtended {
            conversation_id: model.conversation_id,
            fraud_suspected: model.fraud_suspected,
            fraud_reason: model.fraud_reason,
            fraud_detected_at: model.fraud_detected_at,
            fraud_detected_by_user_id: model.fraud_detected_by_user_id,
            escalated_to_user_id: model.escalated_to_user_id,
            escalated_at: model.escalated_at,
            escalation_reason: model.escalation_reason,
            evidence: parse_evidence(model.evidence_json),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Convert EscalatedFlagModel to EscalatedFlag entity
///
/// The join target may have been deleted from the users projection; the flag
/// row still lists, with `escalated_to` absent.
impl From<EscalatedFlagModel> for EscalatedFlag {
    fn from(model: EscalatedFlagModel) -> Self {
        let escalated_to = model.target_id.map(|id| UserRef {
            id,
            display_id: model.target_display_id,
            name: model.target_name.unwrap_or_default(),
            email: model.target_email.unwrap_or_default(),
            role: Role::parse_or_default(model.target_role.as_deref().unwrap_or_default()),
        });

        EscalatedFlag {
            flag: FlagExtended {
                conversation_id: model.conversation_id,
                fraud_suspected: model.fraud_suspected,
                fraud_reason: model.fraud_reason,
                fraud_detected_at: model.fraud_detected_at,
                fraud_detected_by_user_id: model.fraud_detected_by_user_id,
                escalated_to_user_id: model.escalated_to_user_id,
                escalated_at: model.escalated_at,
                escalation_reason: model.escalation_reason,
                evidence: parse_evidence(model.evidence_json),
                created_at: model.created_at,
                updated_at: model.updated_at,
            },
            escalated_to,
        }
    }
}
