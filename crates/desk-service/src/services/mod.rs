//! Business logic services
//!
//! This module contains the service layer implementations that handle
//! authorization, validation, and orchestration of domain operations.

pub mod context;
pub mod error;
pub mod flag;
pub mod history;
pub mod thread_action;
pub mod thread_query;

// Re-export all services for convenience
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use flag::{FlagListFilter, FlagService};
pub use history::HistoryService;
pub use thread_action::ThreadActionService;
pub use thread_query::ThreadQueryService;
