//! Database models - SQLx-compatible structs for PostgreSQL tables

mod audit_log;
mod directory;
mod flag;
mod moderation_event;
mod thread;

pub use audit_log::AuditLogModel;
pub use directory::{SellerModel, UserModel};
pub use flag::{EscalatedFlagModel, FlagBasicModel, FlagExtendedModel};
pub use moderation_event::ModerationEventModel;
pub use thread::{ThreadModel, ThreadTagModel};
