//! Request DTOs with validation
//!
//! Mutations arrive as a body with an `action` discriminator; listings take
//! their filter surface as query parameters. Enum-valued filters parse
//! strictly (unknown values are a 400), date filters parse permissively
//! (malformed values are silently ignored).

use serde::{Deserialize, Serialize};
use validator::Validate;

use desk_core::{
    parse_day_end, parse_day_start, Actor, AssigneeFilter, DomainError, SortDirection, SortKey,
    ThreadFilter, ThreadOrdering, ThreadPriority, ThreadSource, ThreadStatus, ThreadTag,
};

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 100;

fn normalize_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Trim a parameter, treating blank values as absent
fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Parse a comma-separated enum set strictly
fn parse_set<T>(
    raw: Option<&str>,
    field: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Vec<T>, DomainError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    let mut values = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let value = parse(part)
            .ok_or_else(|| DomainError::ValidationError(format!("unknown {field} value: {part}")))?;
        values.push(value);
    }
    Ok(values)
}

/// Split and normalize a comma-separated tag list; blank entries drop out
fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(ThreadTag::normalize)
        .filter(|t| !t.is_empty())
        .collect()
}

// ============================================================================
// Thread Listing & Export
// ============================================================================

/// Query parameters for `GET /threads` (listing and CSV export).
///
/// Serialization is used for the filter snapshot recorded in the export audit
/// entry; pagination and the export switch are excluded from it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThreadListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to_user_id: Option<String>,
    /// `myQueue=true` is shorthand for `assignedToUserId=me`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_queue: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sla_breach: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_resolved_by_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,
    #[serde(skip_serializing)]
    pub export: Option<String>,
    #[serde(skip_serializing)]
    pub page: Option<i64>,
    #[serde(skip_serializing)]
    pub limit: Option<i64>,
}

impl ThreadListParams {
    pub fn page(&self) -> i64 {
        normalize_page(self.page)
    }

    pub fn limit(&self) -> i64 {
        normalize_limit(self.limit)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }

    /// Build the filter specification, binding the `"me"` sentinel to the
    /// caller. Enum sets parse strictly; dates permissively.
    pub fn build_filter(&self, actor: &Actor) -> Result<ThreadFilter, DomainError> {
        let statuses = parse_set(self.status.as_deref(), "status", ThreadStatus::parse)?;
        let sources = parse_set(self.source.as_deref(), "source", ThreadSource::parse)?;
        let priorities = parse_set(self.priority.as_deref(), "priority", ThreadPriority::parse)?;

        // An explicit assignedToUserId wins over the myQueue shorthand
        let assignee = match (non_empty(self.assigned_to_user_id.as_deref()), self.my_queue) {
            (Some(raw), _) => Some(AssigneeFilter::from_param(&raw, &actor.user_id)),
            (None, Some(true)) => Some(AssigneeFilter::User(actor.user_id.clone())),
            _ => None,
        };

        Ok(ThreadFilter {
            statuses,
            sources,
            priorities,
            assignee,
            seller_id: non_empty(self.seller_id.as_deref()),
            buyer_id: non_empty(self.buyer_id.as_deref()),
            order_id: non_empty(self.order_id.as_deref()),
            sla_breach: self.sla_breach,
            search: non_empty(self.search.as_deref()),
            created_from: self.from.as_deref().and_then(parse_day_start),
            created_to: self.to.as_deref().and_then(parse_day_end),
            tags: self.tags.as_deref().map(split_tags).unwrap_or_default(),
            thread_ids: None,
            closed_resolved_by_user_id: non_empty(self.closed_resolved_by_user_id.as_deref()),
        })
    }

    /// Resolve the page ordering, applying the triage-queue override when
    /// the filter shape calls for it
    pub fn ordering(&self, filter: &ThreadFilter) -> Result<ThreadOrdering, DomainError> {
        let key = match non_empty(self.sort_by.as_deref()) {
            Some(raw) => SortKey::parse(&raw)
                .ok_or_else(|| DomainError::ValidationError(format!("unknown sortBy value: {raw}")))?,
            None => SortKey::default(),
        };
        let direction = match non_empty(self.sort_order.as_deref()) {
            Some(raw) => SortDirection::parse(&raw).ok_or_else(|| {
                DomainError::ValidationError(format!("unknown sortOrder value: {raw}"))
            })?,
            None => SortDirection::default(),
        };
        Ok(ThreadOrdering::for_filter(filter, key, direction))
    }

    /// The filter values as given, recorded in the export audit entry
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

// ============================================================================
// Thread Actions
// ============================================================================

/// Body of `POST /threads`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ThreadActionRequest {
    #[validate(length(min = 1, message = "threadId must not be empty"))]
    pub thread_id: String,
    #[serde(flatten)]
    pub action: ThreadAction,
}

/// Thread mutation selected by the body's `action` discriminator
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ThreadAction {
    /// Set or clear the assignee; an omitted or empty target unassigns
    #[serde(rename_all = "camelCase")]
    Assign {
        #[serde(default)]
        assign_to_user_id: Option<String>,
    },
    Status { status: String },
    Priority { priority: String },
    AddTag { tag: String },
    RemoveTag { tag: String },
}

// ============================================================================
// Flag Actions & Listings
// ============================================================================

/// Body of `POST /flags`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FlagActionRequest {
    #[validate(length(min = 1, message = "conversationId must not be empty"))]
    pub conversation_id: String,
    #[serde(flatten)]
    pub action: FlagAction,
}

/// Flag mutation selected by the body's `action` discriminator
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum FlagAction {
    #[serde(rename_all = "camelCase")]
    SetFraud {
        fraud_suspected: bool,
        #[serde(default)]
        fraud_reason: Option<String>,
        #[serde(default)]
        evidence: Option<serde_json::Value>,
    },
    /// The target is required; it stays optional on the wire so the miss
    /// surfaces as a domain validation error instead of a parse error
    #[serde(rename_all = "camelCase")]
    Escalate {
        #[serde(default)]
        escalate_to_user_id: Option<String>,
        #[serde(default)]
        escalation_reason: Option<String>,
    },
    Deescalate,
    AddEvidence {
        #[serde(default)]
        evidence: serde_json::Value,
    },
}

/// Query parameters for `GET /flags`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlagListParams {
    pub conversation_id: Option<String>,
    pub filter: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl FlagListParams {
    pub fn page(&self) -> i64 {
        normalize_page(self.page)
    }

    pub fn limit(&self) -> i64 {
        normalize_limit(self.limit)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

// ============================================================================
// History Feeds
// ============================================================================

/// Query parameters for `GET /moderation`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModerationListParams {
    pub thread_id: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ModerationListParams {
    pub fn page(&self) -> i64 {
        normalize_page(self.page)
    }

    pub fn limit(&self) -> i64 {
        normalize_limit(self.limit)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

/// Query parameters for `GET /audit`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuditListParams {
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl AuditListParams {
    pub fn page(&self) -> i64 {
        normalize_page(self.page)
    }

    pub fn limit(&self) -> i64 {
        normalize_limit(self.limit)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}
