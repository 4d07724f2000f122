//! Marketplace roles
//!
//! Roles are owned by the external identity collaborator and arrive on the
//! wire inside the caller's token; here they only exist to derive
//! capabilities and to label audit records.

use serde::{Deserialize, Serialize};

use super::capabilities::Capabilities;

/// Marketplace account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Default for unknown values: least privilege
    #[default]
    Buyer,
    Seller,
    Support,
    Admin,
}

impl Role {
    /// Canonical storage/wire string
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Seller => "seller",
            Self::Support => "support",
            Self::Admin => "admin",
        }
    }

    /// Strict parse for wire input
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "buyer" => Some(Self::Buyer),
            "seller" => Some(Self::Seller),
            "support" => Some(Self::Support),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Lenient parse for stored records (unknown roles degrade to buyer)
    #[must_use]
    pub fn parse_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }

    /// The staff set admitted to the triage surface
    #[inline]
    #[must_use]
    pub fn is_staff(self) -> bool {
        matches!(self, Self::Support | Self::Admin)
    }

    /// Centralized role-to-capability mapping. Every authorization decision
    /// in the system flows through this table.
    #[must_use]
    pub fn capabilities(self) -> Capabilities {
        match self {
            Self::Buyer | Self::Seller => Capabilities::empty(),
            Self::Support => Capabilities::STAFF,
            Self::Admin => Capabilities::all(),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
