//! Flag database models

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

/// Database model for the legacy chat_flags table
#[derive(Debug, Clone, FromRow)]
pub struct FlagBasicModel {
    pub conversation_id: String,
    pub bypass_suspected: bool,
    pub attempts_24h: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database model for the chat_flags_extended table
#[derive(Debug, Clone, FromRow)]
pub struct FlagExtendedModel {
    pub conversation_id: String,
    pub fraud_suspected: bool,
    pub fraud_reason: Option<String>,
    pub fraud_detected_at: Option<DateTime<Utc>>,
    pub fraud_detected_by_user_id: Option<String>,
    pub escalated_to_user_id: Option<String>,
    pub escalated_at: Option<DateTime<Utc>>,
    pub escalation_reason: Option<String>,
    /// Append-only ledger: `{ "entries": [...] }`
    pub evidence_json: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FlagExtendedModel {
    #[inline]
    pub fn is_escalated(&self) -> bool {
        self.escalated_to_user_id.is_some()
    }
}

/// Escalated-flag listing row: chat_flags_extended left-joined with the
/// escalation target's user columns (aliased `target_*`)
#[derive(Debug, Clone, FromRow)]
pub struct EscalatedFlagModel {
    pub conversation_id: String,
    pub fraud_suspected: bool,
    pub fraud_reason: Option<String>,
    pub fraud_detected_at: Option<DateTime<Utc>>,
    pub fraud_detected_by_user_id: Option<String>,
    pub escalated_to_user_id: Option<String>,
    pub escalated_at: Option<DateTime<Utc>>,
    pub escalation_reason: Option<String>,
    pub evidence_json: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub target_id: Option<String>,
    pub target_display_id: Option<String>,
    pub target_name: Option<String>,
    pub target_email: Option<String>,
    pub target_role: Option<String>,
}
