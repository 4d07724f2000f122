//! Caller identity threaded through every service call

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

use super::capabilities::Capabilities;
use super::role::Role;

/// The authenticated caller: identity plus the display fields that audit and
/// moderation records need
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: String,
    pub role: Role,
    pub name: String,
    pub email: String,
}

impl Actor {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        role: Role,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            role,
            name: name.into(),
            email: email.into(),
        }
    }

    /// Capabilities granted by the caller's role
    #[inline]
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.role.capabilities()
    }

    #[inline]
    #[must_use]
    pub fn can(&self, needed: Capabilities) -> bool {
        self.capabilities().contains(needed)
    }

    /// Gate an operation on a capability; the standard guard at the top of
    /// every service method
    pub fn require(&self, needed: Capabilities) -> Result<(), DomainError> {
        if self.can(needed) {
            Ok(())
        } else {
            Err(DomainError::MissingCapability(needed.to_string()))
        }
    }

    #[inline]
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
