//! Entity to model mappers
//!
//! This module provides conversions between domain entities (desk-core) and
//! database models: `From<Model> for Entity` converts rows to domain objects,
//! parsing stored enum strings leniently.

mod audit;
mod directory;
mod flag;
mod thread;
