//! # desk-core
//!
//! Domain layer for the support-desk triage engine: entities, value objects,
//! the thread query model, and repository traits. This crate has zero
//! dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod query;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    AuditAction, AuditEntityType, AuditEntry, EscalatedFlag, EvidenceEntry, EvidenceLedger,
    FlagBasic, FlagExtended, ModerationActionType, ModerationEvent, NewAuditEntry,
    NewModerationEvent, SellerRef, Thread, ThreadPriority, ThreadSource, ThreadStatus, ThreadTag,
    UserRef,
};
pub use error::DomainError;
pub use query::{
    parse_day_end, parse_day_start, AssigneeFilter, SortDirection, SortKey, ThreadFilter,
    ThreadOrdering,
};
pub use traits::{
    AuditLogRepository, DirectoryRepository, FlagRepository, HealthProbe, ModerationLogRepository,
    PermissiveTransitions, RepoResult, RestrictedTransitions, TagRepository, ThreadLookup,
    ThreadRepository, TransitionPolicy,
};
pub use value_objects::{Actor, Capabilities, Role};
