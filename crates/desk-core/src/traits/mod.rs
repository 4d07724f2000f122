//! Ports - repository and policy traits implemented by the infrastructure
//! and configuration layers

mod repositories;
mod transition;

pub use repositories::{
    AuditLogRepository, DirectoryRepository, FlagRepository, HealthProbe, ModerationLogRepository,
    RepoResult, TagRepository, ThreadLookup, ThreadRepository,
};
pub use transition::{PermissiveTransitions, RestrictedTransitions, TransitionPolicy};
