//! Integration test utilities for the triage API
//!
//! This crate provides helpers for running end-to-end tests against the REST
//! API. The server under test runs on in-memory repositories, so the suite
//! needs no database and exercises the full HTTP stack on every run.

pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
