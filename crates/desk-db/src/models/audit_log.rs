//! Audit log database model

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

/// Database model for the audit_log table
#[derive(Debug, Clone, FromRow)]
pub struct AuditLogModel {
    pub id: i64,
    pub actor_id: String,
    /// Role at the time of the action, stored as TEXT
    pub actor_role: String,
    /// Dotted action name, e.g. `support.thread.assign`
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub message: String,
    pub meta: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
}
