//! Domain entities - core business objects

mod audit;
mod flag;
mod thread;
mod user;

pub use audit::{
    AuditAction, AuditEntityType, AuditEntry, ModerationActionType, ModerationEvent,
    NewAuditEntry, NewModerationEvent,
};
pub use flag::{EscalatedFlag, EvidenceEntry, EvidenceLedger, FlagBasic, FlagExtended};
pub use thread::{Thread, ThreadPriority, ThreadSource, ThreadStatus, ThreadTag};
pub use user::{SellerRef, UserRef};
