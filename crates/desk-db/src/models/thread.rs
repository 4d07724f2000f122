//! Thread database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the support_threads table
#[derive(Debug, Clone, FromRow)]
pub struct ThreadModel {
    pub id: String,
    /// Origin channel: 'buyer_seller', 'seller_support', 'chatbot', 'whatsapp'
    pub source: String,
    pub source_id: String,
    /// Lifecycle status, stored as TEXT
    pub status: String,
    /// Priority, stored as TEXT
    pub priority: String,
    pub order_id: Option<String>,
    pub seller_id: Option<String>,
    pub buyer_id: Option<String>,
    pub assigned_to_user_id: Option<String>,
    pub closed_by_user_id: Option<String>,
    pub resolved_by_user_id: Option<String>,
    pub subject: Option<String>,
    pub last_message_preview: Option<String>,
    pub message_count: i32,
    pub last_message_at: Option<DateTime<Utc>>,
    pub sla_deadline: Option<DateTime<Utc>>,
    pub sla_breach: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ThreadModel {
    /// Check if a staff member is currently responsible
    #[inline]
    pub fn is_assigned(&self) -> bool {
        self.assigned_to_user_id.is_some()
    }
}

/// Database model for the support_thread_tags table
#[derive(Debug, Clone, FromRow)]
pub struct ThreadTagModel {
    pub thread_id: String,
    pub tag: String,
    pub created_at: DateTime<Utc>,
}
