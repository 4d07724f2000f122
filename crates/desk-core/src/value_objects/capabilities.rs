//! Capability bitflags for the triage surface
//!
//! Replaces role-string dispatch at call sites: handlers and services check a
//! named capability, and the role-to-capability mapping lives in one place
//! (`Role::capabilities`).

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Named permissions over the triage surface
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        /// Read the thread list and single threads
        const VIEW_THREADS   = 1 << 0;
        /// Assign, re-status, re-prioritize, and tag threads
        const MANAGE_THREADS = 1 << 1;
        /// Read flag records and flag listings
        const VIEW_FLAGS     = 1 << 2;
        /// Set fraud, escalate/de-escalate, add evidence
        const MANAGE_FLAGS   = 1 << 3;
        /// Download the CSV export (admin-only concern)
        const EXPORT_THREADS = 1 << 4;
        /// Read the system-of-record audit trail
        const VIEW_AUDIT     = 1 << 5;

        /// Everything the support role gets
        const STAFF = Self::VIEW_THREADS.bits()
            | Self::MANAGE_THREADS.bits()
            | Self::VIEW_FLAGS.bits()
            | Self::MANAGE_FLAGS.bits();
    }
}

impl Capabilities {
    /// Names of the individual capabilities that are set, for error messages
    /// and audit context
    #[must_use]
    pub fn list(&self) -> Vec<&'static str> {
        let mut result = Vec::new();
        if self.contains(Self::VIEW_THREADS) {
            result.push("VIEW_THREADS");
        }
        if self.contains(Self::MANAGE_THREADS) {
            result.push("MANAGE_THREADS");
        }
        if self.contains(Self::VIEW_FLAGS) {
            result.push("VIEW_FLAGS");
        }
        if self.contains(Self::MANAGE_FLAGS) {
            result.push("MANAGE_FLAGS");
        }
        if self.contains(Self::EXPORT_THREADS) {
            result.push("EXPORT_THREADS");
        }
        if self.contains(Self::VIEW_AUDIT) {
            result.push("VIEW_AUDIT");
        }
        result
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities::empty()
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.list().join("|"))
    }
}
