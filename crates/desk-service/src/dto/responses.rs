//! Response DTOs for serializing API outputs
//!
//! Enriched views carry their nullable display fields explicitly; a missing
//! seller or assignee serializes as `null`, never disappears from the shape.

use chrono::{DateTime, Utc};
use serde::Serialize;

use desk_core::{EvidenceLedger, Role, ThreadPriority, ThreadSource, ThreadStatus};

// ============================================================================
// Envelopes
// ============================================================================

/// Acknowledgement for a successful mutation
#[derive(Debug, Clone, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl ActionResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Page envelope shared by the listing endpoints
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: i64, page: i64, limit: i64) -> Self {
        Self {
            data,
            total,
            page,
            limit,
        }
    }

    /// The short-circuit page: no rows, zero total
    pub fn empty(page: i64, limit: i64) -> Self {
        Self::new(Vec::new(), 0, page, limit)
    }
}

// ============================================================================
// Directory Summaries
// ============================================================================

/// Seller display fields embedded in an enriched thread row
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerSummaryResponse {
    pub brand_name: String,
    pub slug: String,
}

/// Buyer display fields embedded in an enriched thread row
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerSummaryResponse {
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// User display fields for assignee, closer, resolver, and escalation target
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummaryResponse {
    pub id: String,
    pub display_id: Option<String>,
    pub name: String,
    pub email: String,
    pub role: Role,
}

// ============================================================================
// Threads
// ============================================================================

/// One enriched thread row: the stored fields plus batch-resolved display data
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadResponse {
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
    pub display_subject: Option<String>,
    pub last_message_preview: Option<String>,
    pub message_count: i32,
    pub last_message_at: Option<DateTime<Utc>>,
    pub sla_deadline: Option<DateTime<Utc>>,
    pub sla_breach: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub seller: Option<SellerSummaryResponse>,
    pub buyer: Option<BuyerSummaryResponse>,
    pub assigned_to: Option<UserSummaryResponse>,
    pub closed_by: Option<UserSummaryResponse>,
    pub resolved_by: Option<UserSummaryResponse>,
    pub tags: Vec<String>,
}

/// A rendered CSV export and the filename it should download as
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub filename: String,
    pub body: String,
}

// ============================================================================
// Flags
// ============================================================================

/// Bypass-detection flag view
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagBasicResponse {
    pub conversation_id: String,
    pub bypass_suspected: bool,
    pub attempts_24h: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fraud and escalation flag view
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagExtendedResponse {
    pub conversation_id: String,
    pub fraud_suspected: bool,
    pub fraud_reason: Option<String>,
    pub fraud_detected_at: Option<DateTime<Utc>>,
    pub fraud_detected_by_user_id: Option<String>,
    pub escalated_to_user_id: Option<String>,
    pub escalated_at: Option<DateTime<Utc>>,
    pub escalation_reason: Option<String>,
    pub evidence: EvidenceLedger,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Resolved target user, present on escalated-listing rows only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalated_to: Option<UserSummaryResponse>,
}

/// Row shape for the flag listings: basic views under the bypass filter,
/// extended views otherwise
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FlagRowResponse {
    Basic(FlagBasicResponse),
    Extended(FlagExtendedResponse),
}

/// Page envelope for `GET /flags` listings, echoing the applied filter
#[derive(Debug, Clone, Serialize)]
pub struct FlagListResponse {
    pub data: Vec<FlagRowResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub filter: String,
}

/// Single-conversation inspection; absent records come back as nulls
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagInspectResponse {
    pub conversation_id: String,
    pub basic_flags: Option<FlagBasicResponse>,
    pub extended_flags: Option<FlagExtendedResponse>,
}

// ============================================================================
// History
// ============================================================================

/// One moderation feed event
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationEventResponse {
    pub id: i64,
    pub actor_id: String,
    pub actor_name: String,
    pub actor_role: Role,
    pub action_type: String,
    pub thread_id: String,
    pub reason: Option<String>,
    pub note: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// One audit trail entry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntryResponse {
    pub id: i64,
    pub actor_id: String,
    pub actor_role: Role,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub message: String,
    pub meta: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Health
// ============================================================================

/// Liveness response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Seconds since the server started
    pub uptime: u64,
}

impl HealthResponse {
    pub fn healthy(version: impl Into<String>, uptime: u64) -> Self {
        Self {
            status: "healthy".to_string(),
            version: version.into(),
            uptime,
        }
    }
}

/// Readiness response with per-dependency checks
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: HealthChecks,
}

/// Health status of each dependency
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool) -> Self {
        Self {
            status: if database_healthy { "ready" } else { "not_ready" }.to_string(),
            checks: HealthChecks {
                database: if database_healthy { "healthy" } else { "unhealthy" }.to_string(),
            },
        }
    }
}
