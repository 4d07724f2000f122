//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in desk-core.
//! Mutating repositories bundle the caller's audit entry (and moderation
//! event, where the operation has one) into the same transaction as the
//! domain change.

mod audit;
mod directory;
mod error;
mod flag;
mod health;
mod moderation;
mod tag;
mod thread;

pub use audit::PgAuditLogRepository;
pub use directory::PgDirectoryRepository;
pub use flag::PgFlagRepository;
pub use health::PgHealthProbe;
pub use moderation::PgModerationLogRepository;
pub use tag::PgTagRepository;
pub use thread::PgThreadRepository;
