//! Audit and moderation records
//!
//! Two append-only trails are written for the same business actions, on
//! purpose: `AuditEntry` is the system-of-record log across the whole admin
//! surface, `ModerationEvent` is the thread-scoped, user-facing history feed.
//! Neither is ever updated or deleted.

use chrono::{DateTime, Utc};

use crate::value_objects::{Actor, Role};

/// Dotted audit action names, one per mutating operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditAction {
    ThreadAssign,
    ThreadStatus,
    ThreadPriority,
    ThreadTagAdd,
    ThreadTagRemove,
    ThreadsExport,
    FlagFraud,
    FlagEscalate,
    FlagDeescalate,
    FlagEvidence,
}

impl AuditAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ThreadAssign => "support.thread.assign",
            Self::ThreadStatus => "support.thread.status",
            Self::ThreadPriority => "support.thread.priority",
            Self::ThreadTagAdd => "support.thread.tag_add",
            Self::ThreadTagRemove => "support.thread.tag_remove",
            Self::ThreadsExport => "support.threads.export",
            Self::FlagFraud => "support.flag.fraud",
            Self::FlagEscalate => "support.flag.escalate",
            Self::FlagDeescalate => "support.flag.deescalate",
            Self::FlagEvidence => "support.flag.evidence",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of entity an audit entry points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditEntityType {
    /// Entity id is a thread id
    Thread,
    /// Entity id is a source conversation id (flag rows are keyed by it)
    Flag,
}

impl AuditEntityType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Thread => "thread",
            Self::Flag => "flag",
        }
    }
}

/// Stored audit record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
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

/// Audit record ready to append (id and timestamp assigned by storage)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditEntry {
    pub actor_id: String,
    pub actor_role: Role,
    pub action: AuditAction,
    pub entity_type: AuditEntityType,
    pub entity_id: String,
    pub message: String,
    pub meta: serde_json::Value,
}

impl NewAuditEntry {
    #[must_use]
    pub fn new(
        actor: &Actor,
        action: AuditAction,
        entity_type: AuditEntityType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            actor_id: actor.user_id.clone(),
            actor_role: actor.role,
            action,
            entity_type,
            entity_id: entity_id.into(),
            message: message.into(),
            meta: serde_json::Value::Null,
        }
    }

    /// Attach structured metadata (previous/new values, filter snapshots, ...)
    #[must_use]
    pub fn with_meta(mut self, meta: serde_json::Value) -> Self {
        self.meta = meta;
        self
    }
}

/// Moderation feed action kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModerationActionType {
    ThreadAssign,
    ThreadUnassign,
    ThreadPriorityChange,
    ThreadEscalate,
    ThreadDeescalate,
}

impl ModerationActionType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ThreadAssign => "thread.assign",
            Self::ThreadUnassign => "thread.unassign",
            Self::ThreadPriorityChange => "thread.priorityChange",
            Self::ThreadEscalate => "thread.escalate",
            Self::ThreadDeescalate => "thread.deescalate",
        }
    }
}

impl std::fmt::Display for ModerationActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored moderation event
///
/// `action_type` stays a raw string on the read side so feed history written
/// under older taxonomies survives a round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationEvent {
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

/// Moderation event ready to append
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewModerationEvent {
    pub actor_id: String,
    pub actor_name: String,
    pub actor_role: Role,
    pub action_type: ModerationActionType,
    pub thread_id: String,
    pub reason: Option<String>,
    pub note: Option<String>,
    pub metadata: serde_json::Value,
}

impl NewModerationEvent {
    #[must_use]
    pub fn new(
        actor: &Actor,
        action_type: ModerationActionType,
        thread_id: impl Into<String>,
    ) -> Self {
        Self {
            actor_id: actor.user_id.clone(),
            actor_name: actor.name.clone(),
            actor_role: actor.role,
            action_type,
            thread_id: thread_id.into(),
            reason: None,
            note: None,
            metadata: serde_json::Value::Null,
        }
    }

    #[must_use]
    pub fn with_reason(mut self, reason: Option<String>) -> Self {
        self.reason = reason;
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}
