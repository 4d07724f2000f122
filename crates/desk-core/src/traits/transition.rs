//! Status transition policy
//!
//! The action processor validates only that a status value is recognized; it
//! does not hard-code a transition graph. Deployments that want one supply a
//! policy built from configuration, consulted before every status change.

use std::collections::HashSet;

use crate::entities::ThreadStatus;
use crate::error::DomainError;

/// Decides whether a status change is allowed
pub trait TransitionPolicy: Send + Sync {
    fn allows(&self, from: ThreadStatus, to: ThreadStatus) -> bool;
}

/// Reference behavior: any status may be set from any other
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveTransitions;

impl TransitionPolicy for PermissiveTransitions {
    fn allows(&self, _from: ThreadStatus, _to: ThreadStatus) -> bool {
        true
    }
}

/// Whitelist policy built from a `from>to` pair spec.
///
/// Setting a status to itself is always allowed; idempotent re-sets stay
/// no-ops rather than becoming errors.
#[derive(Debug, Clone, Default)]
pub struct RestrictedTransitions {
    allowed: HashSet<(ThreadStatus, ThreadStatus)>,
}

impl RestrictedTransitions {
    /// Parse a comma-separated `from>to` spec, e.g.
    /// `open>assigned,assigned>resolved,resolved>closed`.
    pub fn parse_spec(spec: &str) -> Result<Self, DomainError> {
        let mut allowed = HashSet::new();
        for pair in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (from, to) = pair.split_once('>').ok_or_else(|| {
                DomainError::ValidationError(format!("malformed transition pair: {pair}"))
            })?;
            let from = ThreadStatus::parse(from.trim())
                .ok_or_else(|| DomainError::InvalidStatus(from.trim().to_string()))?;
            let to = ThreadStatus::parse(to.trim())
                .ok_or_else(|| DomainError::InvalidStatus(to.trim().to_string()))?;
            allowed.insert((from, to));
        }
        Ok(Self { allowed })
    }
}

impl TransitionPolicy for RestrictedTransitions {
    fn allows(&self, from: ThreadStatus, to: ThreadStatus) -> bool {
        from == to || self.allowed.contains(&(from, to))
    }
}
