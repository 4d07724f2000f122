//! Thread entity - a staff-visible support conversation envelope

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Origin channel of a support thread, immutable after creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThreadSource {
    /// Buyer-to-seller conversation surfaced to support
    #[default]
    BuyerSeller,
    /// Seller talking directly to the support team
    SellerSupport,
    /// Webchat widget conversation
    Chatbot,
    /// WhatsApp bridge conversation
    Whatsapp,
}

impl ThreadSource {
    /// Canonical storage/wire string
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BuyerSeller => "buyer_seller",
            Self::SellerSupport => "seller_support",
            Self::Chatbot => "chatbot",
            Self::Whatsapp => "whatsapp",
        }
    }

    /// Strict parse for wire input
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "buyer_seller" => Some(Self::BuyerSeller),
            "seller_support" => Some(Self::SellerSupport),
            "chatbot" => Some(Self::Chatbot),
            "whatsapp" => Some(Self::Whatsapp),
            _ => None,
        }
    }

    /// Lenient parse for database reads (unknown values fall back to the default)
    #[must_use]
    pub fn parse_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }

    /// Whether this source renders a synthesized display subject
    #[inline]
    #[must_use]
    pub fn is_conversational(self) -> bool {
        matches!(self, Self::Chatbot | Self::Whatsapp)
    }
}

impl std::fmt::Display for ThreadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thread lifecycle status
///
/// Any status may be set from any other; transition legality is a policy
/// concern layered on top (see `TransitionPolicy`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThreadStatus {
    #[default]
    Open,
    Assigned,
    Waiting,
    Resolved,
    Closed,
    Active,
}

impl ThreadStatus {
    /// Canonical storage/wire string
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Assigned => "assigned",
            Self::Waiting => "waiting",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
            Self::Active => "active",
        }
    }

    /// Strict parse for wire input
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(Self::Open),
            "assigned" => Some(Self::Assigned),
            "waiting" => Some(Self::Waiting),
            "resolved" => Some(Self::Resolved),
            "closed" => Some(Self::Closed),
            "active" => Some(Self::Active),
            _ => None,
        }
    }

    /// Lenient parse for database reads (unknown values fall back to the default)
    #[must_use]
    pub fn parse_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }

    /// Terminal statuses carry actor provenance (closedBy/resolvedBy)
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }
}

impl std::fmt::Display for ThreadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thread priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThreadPriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl ThreadPriority {
    /// Canonical storage/wire string
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    /// Strict parse for wire input
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "normal" => Some(Self::Normal),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }

    /// Lenient parse for database reads (unknown values fall back to the default)
    #[must_use]
    pub fn parse_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }

    /// Sort rank: urgent > high > normal > low
    #[inline]
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Normal => 1,
            Self::High => 2,
            Self::Urgent => 3,
        }
    }
}

impl std::fmt::Display for ThreadPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thread entity
///
/// The message stream itself is owned by an external messaging collaborator;
/// `subject`, `last_message_preview`, `message_count`, and `last_message_at`
/// are cached projections of it. `sla_deadline`/`sla_breach` are maintained by
/// an external SLA job and only read here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thread {
    pub id: String,
    pub source: ThreadSource,
    pub source_id: String,
    pub status: ThreadStatus,
    pub priority: ThreadPriority,
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

impl Thread {
    /// Create a fresh thread envelope (used by fixtures; production threads
    /// are inserted by the messaging collaborator)
    #[must_use]
    pub fn new(id: impl Into<String>, source: ThreadSource, source_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            source,
            source_id: source_id.into(),
            status: ThreadStatus::Open,
            priority: ThreadPriority::Normal,
            order_id: None,
            seller_id: None,
            buyer_id: None,
            assigned_to_user_id: None,
            closed_by_user_id: None,
            resolved_by_user_id: None,
            subject: None,
            last_message_preview: None,
            message_count: 0,
            last_message_at: None,
            sla_deadline: None,
            sla_breach: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if a staff member is currently responsible
    #[inline]
    #[must_use]
    pub fn is_assigned(&self) -> bool {
        self.assigned_to_user_id.is_some()
    }
}

/// Many-to-many label on a thread; `(thread_id, tag)` is unique
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadTag {
    pub thread_id: String,
    pub tag: String,
    pub created_at: DateTime<Utc>,
}

impl ThreadTag {
    /// Canonical tag form: trimmed and lower-cased. Applied on every write
    /// and on every tag filter so lookups stay case-insensitive.
    #[must_use]
    pub fn normalize(raw: &str) -> String {
        raw.trim().to_lowercase()
    }
}
