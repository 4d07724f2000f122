//! Thread ordering strategies
//!
//! The ordering applied to a page is a named value selected from the filter
//! shape in exactly one place (`ThreadOrdering::for_filter`), so the
//! open+waiting triage rule is a first-class, unit-testable comparator rather
//! than an inline SQL fragment. The SQL ORDER BY text is derived from the
//! selected variant in the persistence layer; `cmp` is the pure in-memory
//! mirror used by test doubles.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::entities::{Thread, ThreadStatus};

use super::filter::ThreadFilter;

/// Sortable columns exposed to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    #[default]
    LastMessageAt,
    CreatedAt,
    Priority,
    SlaDeadline,
}

impl SortKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LastMessageAt => "lastMessageAt",
            Self::CreatedAt => "createdAt",
            Self::Priority => "priority",
            Self::SlaDeadline => "slaDeadline",
        }
    }

    /// Strict parse for wire input
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "lastMessageAt" => Some(Self::LastMessageAt),
            "createdAt" => Some(Self::CreatedAt),
            "priority" => Some(Self::Priority),
            "slaDeadline" => Some(Self::SlaDeadline),
            _ => None,
        }
    }
}

/// Sort direction, descending by default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Strict parse for wire input
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// The ordering strategy applied to a thread page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadOrdering {
    /// Caller-selected column and direction
    Field {
        key: SortKey,
        direction: SortDirection,
    },
    /// Triage-queue override for the exact {open, waiting} status filter:
    /// waiting threads first by lastMessageAt ascending (oldest unanswered
    /// first), then open threads by lastMessageAt descending (newest first),
    /// nulls last in both tiers.
    TriageQueue,
}

impl Default for ThreadOrdering {
    fn default() -> Self {
        Self::Field {
            key: SortKey::default(),
            direction: SortDirection::default(),
        }
    }
}

impl ThreadOrdering {
    /// Select the ordering for a filter: the triage-queue override applies
    /// exactly when the status set is {open, waiting} (both present, nothing
    /// else), regardless of the requested sort.
    #[must_use]
    pub fn for_filter(filter: &ThreadFilter, key: SortKey, direction: SortDirection) -> Self {
        if Self::is_open_waiting(&filter.statuses) {
            Self::TriageQueue
        } else {
            Self::Field { key, direction }
        }
    }

    fn is_open_waiting(statuses: &[ThreadStatus]) -> bool {
        if statuses.is_empty() {
            return false;
        }
        let set: HashSet<ThreadStatus> = statuses.iter().copied().collect();
        set.len() == 2
            && set.contains(&ThreadStatus::Open)
            && set.contains(&ThreadStatus::Waiting)
    }

    /// Pure comparator mirroring the SQL ORDER BY for this strategy.
    ///
    /// Total order: ties always break on thread id descending so pagination
    /// is deterministic.
    #[must_use]
    pub fn cmp(&self, a: &Thread, b: &Thread) -> Ordering {
        let primary = match *self {
            Self::Field { key, direction } => match key {
                SortKey::LastMessageAt => {
                    cmp_nullable(a.last_message_at, b.last_message_at, direction)
                }
                SortKey::CreatedAt => cmp_directed(a.created_at, b.created_at, direction),
                SortKey::Priority => {
                    cmp_directed(a.priority.rank(), b.priority.rank(), direction)
                }
                SortKey::SlaDeadline => cmp_nullable(a.sla_deadline, b.sla_deadline, direction),
            },
            Self::TriageQueue => tier(a.status).cmp(&tier(b.status)).then_with(|| {
                if tier(a.status) == 0 {
                    cmp_nullable(a.last_message_at, b.last_message_at, SortDirection::Asc)
                } else {
                    cmp_nullable(a.last_message_at, b.last_message_at, SortDirection::Desc)
                }
            }),
        };
        primary.then_with(|| b.id.cmp(&a.id))
    }
}

/// Waiting threads form the first tier, everything else the second
fn tier(status: ThreadStatus) -> u8 {
    u8::from(status != ThreadStatus::Waiting)
}

fn cmp_directed<T: Ord>(a: T, b: T, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => a.cmp(&b),
        SortDirection::Desc => b.cmp(&a),
    }
}

/// Nulls sort last in both directions, matching NULLS LAST in the SQL
fn cmp_nullable(
    a: Option<DateTime<Utc>>,
    b: Option<DateTime<Utc>>,
    direction: SortDirection,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp_directed(a, b, direction),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
