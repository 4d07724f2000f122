//! Moderation event database model

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

/// Database model for the moderation_events table
#[derive(Debug, Clone, FromRow)]
pub struct ModerationEventModel {
    pub id: i64,
    pub actor_id: String,
    pub actor_name: String,
    pub actor_role: String,
    /// Feed action kind, e.g. `thread.assign`; historic values pass through
    pub action_type: String,
    pub thread_id: String,
    pub reason: Option<String>,
    pub note: Option<String>,
    pub metadata: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
}
