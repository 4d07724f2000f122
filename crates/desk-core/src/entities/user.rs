//! Read-only reference data owned by the identity and catalog collaborators
//!
//! The triage engine never writes these; they are batch-read for page
//! enrichment and CSV export.

use crate::value_objects::Role;

/// User display fields (staff, buyers, escalation targets)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: String,
    pub display_id: Option<String>,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Seller storefront display fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellerRef {
    pub id: String,
    pub brand_name: String,
    pub slug: String,
}
