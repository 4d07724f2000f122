//! # desk-service
//!
//! Application layer containing triage business logic, services, and DTOs.

pub mod dto;
pub mod services;

// Re-export services and DTOs for handler convenience
pub use dto::{
    ActionResponse, AuditEntryResponse, AuditListParams, CsvExport, FlagActionRequest,
    FlagInspectResponse, FlagListParams, FlagListResponse, HealthResponse, ModerationEventResponse,
    ModerationListParams, PaginatedResponse, ReadinessResponse, ThreadActionRequest,
    ThreadListParams, ThreadResponse,
};
pub use services::{
    FlagListFilter, FlagService, HistoryService, ServiceContext, ServiceContextBuilder,
    ServiceError, ServiceResult, ThreadActionService, ThreadQueryService,
};
