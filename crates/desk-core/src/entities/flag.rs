//! Flag entities - per-thread risk and escalation metadata
//!
//! Flag rows are keyed by the source conversation id and created lazily on
//! the first flag-related action; one row per thread thereafter, never
//! deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::user::UserRef;

/// Legacy bypass-detection record, written by an external abuse-detection
/// collaborator and only queried here
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagBasic {
    pub conversation_id: String,
    pub bypass_suspected: bool,
    pub attempts_24h: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One entry in the append-only evidence ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceEntry {
    pub added_by: String,
    pub added_at: DateTime<Utc>,
    pub content: serde_json::Value,
}

impl EvidenceEntry {
    /// Stamp a new entry with the acting user and "now"
    #[must_use]
    pub fn new(added_by: impl Into<String>, content: serde_json::Value) -> Self {
        Self {
            added_by: added_by.into(),
            added_at: Utc::now(),
            content,
        }
    }

    /// An entry is rejected when its content carries no information
    #[must_use]
    pub fn content_is_empty(content: &serde_json::Value) -> bool {
        match content {
            serde_json::Value::Null => true,
            serde_json::Value::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// Append-only evidence ledger, stored as `{ "entries": [...] }`
///
/// Entries are never removed or mutated. Appends happen through a single
/// atomic database operation; this type is the read-side projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EvidenceLedger {
    #[serde(default)]
    pub entries: Vec<EvidenceEntry>,
}

impl EvidenceLedger {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Authoritative one-to-one flag extension of a thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagExtended {
    pub conversation_id: String,
    pub fraud_suspected: bool,
    pub fraud_reason: Option<String>,
    /// Provenance of the first transition into suspicion; never cleared
    pub fraud_detected_at: Option<DateTime<Utc>>,
    pub fraud_detected_by_user_id: Option<String>,
    /// Escalation triple - the three fields are set together and cleared together
    pub escalated_to_user_id: Option<String>,
    pub escalated_at: Option<DateTime<Utc>>,
    pub escalation_reason: Option<String>,
    pub evidence: EvidenceLedger,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FlagExtended {
    #[inline]
    #[must_use]
    pub fn is_escalated(&self) -> bool {
        self.escalated_to_user_id.is_some()
    }

    /// Flagged = fraud-suspected or escalated (the "all flagged" listing)
    #[inline]
    #[must_use]
    pub fn is_flagged(&self) -> bool {
        self.fraud_suspected || self.is_escalated()
    }
}

/// Escalated-flag listing row: the flag joined with the escalation target's
/// display fields (target may have been deleted, hence optional)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalatedFlag {
    pub flag: FlagExtended,
    pub escalated_to: Option<UserRef>,
}
