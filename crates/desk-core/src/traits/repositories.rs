//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs; the infrastructure layer provides
//! the implementation. Mutating methods take the audit entry (and moderation
//! event where the operation has one) alongside the domain change so the
//! implementation can commit them in a single transaction - a crash can never
//! leave the audit trail inconsistent with the domain state.

use async_trait::async_trait;

use crate::entities::{
    AuditEntry, EscalatedFlag, EvidenceEntry, FlagBasic, FlagExtended, ModerationEvent,
    NewAuditEntry, NewModerationEvent, SellerRef, Thread, ThreadPriority, ThreadStatus, ThreadTag,
    UserRef,
};
use crate::error::DomainError;
use crate::query::{ThreadFilter, ThreadOrdering};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Outcome of resolving a source conversation id to a thread id.
///
/// Moderation logging needs a thread id but flag operations are keyed by
/// conversation id; the lookup is best-effort and callers choose the fallback
/// explicitly instead of it happening implicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadLookup {
    Found(String),
    NotFound,
}

impl ThreadLookup {
    /// The resolved thread id, or the caller-chosen fallback identifier
    #[must_use]
    pub fn id_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self {
            Self::Found(id) => id.as_str(),
            Self::NotFound => fallback,
        }
    }
}

// ============================================================================
// Thread Repository
// ============================================================================

#[async_trait]
pub trait ThreadRepository: Send + Sync {
    /// Find a thread by ID
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Thread>>;

    /// Fetch one page of threads matching the filter, in the given order
    async fn find_page(
        &self,
        filter: &ThreadFilter,
        ordering: ThreadOrdering,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<Thread>>;

    /// Count all threads matching the filter (same predicate as `find_page`)
    async fn count(&self, filter: &ThreadFilter) -> RepoResult<i64>;

    /// Fetch up to `cap` threads for export, same filter and order as a page
    async fn export(
        &self,
        filter: &ThreadFilter,
        ordering: ThreadOrdering,
        cap: i64,
    ) -> RepoResult<Vec<Thread>>;

    /// Best-effort resolution of a source conversation id to a thread id
    async fn resolve_by_conversation(&self, conversation_id: &str) -> RepoResult<ThreadLookup>;

    /// Set or clear the assignee; commits the audit entry and moderation
    /// event in the same transaction
    async fn set_assignee(
        &self,
        thread_id: &str,
        assignee: Option<&str>,
        audit: &NewAuditEntry,
        event: &NewModerationEvent,
    ) -> RepoResult<()>;

    /// Change the status; `closed_by`/`resolved_by` stamp terminal provenance
    /// only when the column is still null. Audit-only (no moderation event).
    async fn set_status(
        &self,
        thread_id: &str,
        status: ThreadStatus,
        closed_by: Option<&str>,
        resolved_by: Option<&str>,
        audit: &NewAuditEntry,
    ) -> RepoResult<()>;

    /// Change the priority; commits audit entry and moderation event together
    async fn set_priority(
        &self,
        thread_id: &str,
        priority: ThreadPriority,
        audit: &NewAuditEntry,
        event: &NewModerationEvent,
    ) -> RepoResult<()>;
}

// ============================================================================
// Tag Repository
// ============================================================================

#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Distinct thread ids carrying at least one of the given (normalized)
    /// tags - the tag filter pre-pass
    async fn thread_ids_with_any_tag(&self, tags: &[String]) -> RepoResult<Vec<String>>;

    /// All tag rows for a set of threads, for page enrichment
    async fn tags_for_threads(&self, thread_ids: &[String]) -> RepoResult<Vec<ThreadTag>>;

    /// Insert a (thread, tag) pair; duplicate inserts are a successful no-op.
    /// Tags do not touch the thread row. Audit committed in the same
    /// transaction.
    async fn add(&self, thread_id: &str, tag: &str, audit: &NewAuditEntry) -> RepoResult<()>;

    /// Delete a (thread, tag) pair; absent pairs are a successful no-op
    async fn remove(&self, thread_id: &str, tag: &str, audit: &NewAuditEntry) -> RepoResult<()>;
}

// ============================================================================
// Flag Repository
// ============================================================================

#[async_trait]
pub trait FlagRepository: Send + Sync {
    /// Legacy bypass record for one conversation
    async fn find_basic(&self, conversation_id: &str) -> RepoResult<Option<FlagBasic>>;

    /// Extended flag record for one conversation
    async fn find_extended(&self, conversation_id: &str) -> RepoResult<Option<FlagExtended>>;

    /// Upsert fraud suspicion. Fraud provenance is stamped only on the
    /// transition into suspicion and never cleared. An optional evidence
    /// entry is appended atomically in the same statement set.
    async fn set_fraud(
        &self,
        conversation_id: &str,
        suspected: bool,
        reason: Option<&str>,
        detected_by: &str,
        evidence: Option<&EvidenceEntry>,
        audit: &NewAuditEntry,
    ) -> RepoResult<FlagExtended>;

    /// Upsert the escalation triple (target, timestamp, reason) as a unit
    async fn set_escalation(
        &self,
        conversation_id: &str,
        escalate_to: &str,
        reason: Option<&str>,
        audit: &NewAuditEntry,
        event: &NewModerationEvent,
    ) -> RepoResult<FlagExtended>;

    /// Clear the escalation triple as a unit; the row must already exist
    async fn clear_escalation(
        &self,
        conversation_id: &str,
        audit: &NewAuditEntry,
        event: &NewModerationEvent,
    ) -> RepoResult<()>;

    /// Append one evidence entry via a database-native atomic array append;
    /// concurrent appends must not lose entries
    async fn append_evidence(
        &self,
        conversation_id: &str,
        entry: &EvidenceEntry,
        audit: &NewAuditEntry,
    ) -> RepoResult<FlagExtended>;

    /// Bypass-suspected listing (legacy table), updatedAt descending
    async fn list_bypass(&self, limit: i64, offset: i64) -> RepoResult<Vec<FlagBasic>>;
    async fn count_bypass(&self) -> RepoResult<i64>;

    /// Fraud-suspected listing, fraudDetectedAt descending
    async fn list_fraud(&self, limit: i64, offset: i64) -> RepoResult<Vec<FlagExtended>>;
    async fn count_fraud(&self) -> RepoResult<i64>;

    /// Escalated listing with target display fields, escalatedAt descending
    async fn list_escalated(&self, limit: i64, offset: i64) -> RepoResult<Vec<EscalatedFlag>>;
    async fn count_escalated(&self) -> RepoResult<i64>;

    /// Fraud-or-escalated union, updatedAt descending
    async fn list_flagged(&self, limit: i64, offset: i64) -> RepoResult<Vec<FlagExtended>>;
    async fn count_flagged(&self) -> RepoResult<i64>;
}

// ============================================================================
// Audit & Moderation Logs
// ============================================================================

#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Append a standalone audit entry (exports; mutations bundle theirs into
    /// the owning repository transaction)
    async fn append(&self, entry: &NewAuditEntry) -> RepoResult<()>;

    /// Read the trail, newest first, optionally scoped to one entity
    async fn list(
        &self,
        entity_type: Option<&str>,
        entity_id: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<AuditEntry>>;

    async fn count(&self, entity_type: Option<&str>, entity_id: Option<&str>) -> RepoResult<i64>;
}

#[async_trait]
pub trait ModerationLogRepository: Send + Sync {
    /// Read one thread's moderation feed, newest first
    async fn list_for_thread(
        &self,
        thread_id: &str,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<ModerationEvent>>;

    async fn count_for_thread(&self, thread_id: &str) -> RepoResult<i64>;
}

// ============================================================================
// Reference Data & Health
// ============================================================================

#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    /// Batch-read user display fields; unknown ids are simply absent
    async fn users_by_ids(&self, ids: &[String]) -> RepoResult<Vec<UserRef>>;

    /// Batch-read seller display fields; unknown ids are simply absent
    async fn sellers_by_ids(&self, ids: &[String]) -> RepoResult<Vec<SellerRef>>;
}

#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Cheap reachability check against the backing store
    async fn ping(&self) -> RepoResult<()>;
}
