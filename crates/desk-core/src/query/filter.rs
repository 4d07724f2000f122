//! Thread filter specification
//!
//! One struct carries every filter dimension; all dimensions are optional and
//! combine with logical AND. `matches` is the pure in-memory mirror of the SQL
//! predicate, used by test doubles and property checks so the page query and
//! the count query can never drift apart.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::entities::{Thread, ThreadPriority, ThreadSource, ThreadStatus, ThreadTag};

/// Assignee dimension: an exact user id or the unassigned sentinel.
///
/// The wire-level `"me"` sentinel is bound to the caller before this type is
/// constructed, so the query layer never sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssigneeFilter {
    User(String),
    Unassigned,
}

impl AssigneeFilter {
    /// Resolve a raw `assignedToUserId` parameter, binding sentinels
    #[must_use]
    pub fn from_param(raw: &str, caller_id: &str) -> Self {
        match raw {
            "unassigned" => Self::Unassigned,
            "me" => Self::User(caller_id.to_string()),
            other => Self::User(other.to_string()),
        }
    }
}

/// Filter specification for the thread list, count, and export queries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadFilter {
    /// OR within the set, AND against the other dimensions
    pub statuses: Vec<ThreadStatus>,
    pub sources: Vec<ThreadSource>,
    pub priorities: Vec<ThreadPriority>,
    pub assignee: Option<AssigneeFilter>,
    pub seller_id: Option<String>,
    pub buyer_id: Option<String>,
    pub order_id: Option<String>,
    pub sla_breach: Option<bool>,
    /// Case-insensitive substring over subject OR last message preview
    pub search: Option<String>,
    /// Inclusive bounds on `created_at`, already normalized to day edges
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    /// Any-of tag match; resolved through a pre-pass over the tag relation
    pub tags: Vec<String>,
    /// Narrowed id set produced by the tag pre-pass
    pub thread_ids: Option<Vec<String>>,
    /// OR match against closedBy or resolvedBy
    pub closed_resolved_by_user_id: Option<String>,
}

impl ThreadFilter {
    #[must_use]
    pub fn has_tag_filter(&self) -> bool {
        !self.tags.is_empty()
    }

    /// Pure predicate mirroring the SQL WHERE clause.
    ///
    /// `thread_tags` carries the thread's stored (normalized) tags for the
    /// tag dimension.
    #[must_use]
    pub fn matches(&self, thread: &Thread, thread_tags: &[String]) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(&thread.status) {
            return false;
        }
        if !self.sources.is_empty() && !self.sources.contains(&thread.source) {
            return false;
        }
        if !self.priorities.is_empty() && !self.priorities.contains(&thread.priority) {
            return false;
        }
        match &self.assignee {
            Some(AssigneeFilter::User(id)) => {
                if thread.assigned_to_user_id.as_deref() != Some(id.as_str()) {
                    return false;
                }
            }
            Some(AssigneeFilter::Unassigned) => {
                if thread.assigned_to_user_id.is_some() {
                    return false;
                }
            }
            None => {}
        }
        if let Some(seller_id) = &self.seller_id {
            if thread.seller_id.as_deref() != Some(seller_id.as_str()) {
                return false;
            }
        }
        if let Some(buyer_id) = &self.buyer_id {
            if thread.buyer_id.as_deref() != Some(buyer_id.as_str()) {
                return false;
            }
        }
        if let Some(order_id) = &self.order_id {
            if thread.order_id.as_deref() != Some(order_id.as_str()) {
                return false;
            }
        }
        if let Some(breach) = self.sla_breach {
            if thread.sla_breach != breach {
                return false;
            }
        }
        if let Some(needle) = &self.search {
            let needle = needle.to_lowercase();
            let in_subject = thread
                .subject
                .as_deref()
                .is_some_and(|s| s.to_lowercase().contains(&needle));
            let in_preview = thread
                .last_message_preview
                .as_deref()
                .is_some_and(|p| p.to_lowercase().contains(&needle));
            if !in_subject && !in_preview {
                return false;
            }
        }
        if let Some(from) = self.created_from {
            if thread.created_at < from {
                return false;
            }
        }
        if let Some(to) = self.created_to {
            if thread.created_at > to {
                return false;
            }
        }
        if !self.tags.is_empty() {
            let any = self.tags.iter().any(|wanted| {
                let wanted = ThreadTag::normalize(wanted);
                thread_tags.iter().any(|t| ThreadTag::normalize(t) == wanted)
            });
            if !any {
                return false;
            }
        }
        if let Some(ids) = &self.thread_ids {
            if !ids.iter().any(|id| id == &thread.id) {
                return false;
            }
        }
        if let Some(user_id) = &self.closed_resolved_by_user_id {
            let closed = thread.closed_by_user_id.as_deref() == Some(user_id.as_str());
            let resolved = thread.resolved_by_user_id.as_deref() == Some(user_id.as_str());
            if !closed && !resolved {
                return false;
            }
        }
        true
    }
}

/// Parse a `YYYY-MM-DD` date into the first instant of that day (UTC).
/// Malformed input yields `None`; date filters are permissive by contract.
#[must_use]
pub fn parse_day_start(raw: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()?;
    let at_midnight = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&at_midnight))
}

/// Parse a `YYYY-MM-DD` date into the last representable millisecond of that
/// day (UTC), making the `to` bound inclusive of the whole calendar day.
#[must_use]
pub fn parse_day_end(raw: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()?;
    let at_day_end = date.and_hms_milli_opt(23, 59, 59, 999)?;
    Some(Utc.from_utc_datetime(&at_day_end))
}
