//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

// Re-export request types
pub use requests::{
    AuditListParams, FlagAction, FlagActionRequest, FlagListParams, ModerationListParams,
    ThreadAction, ThreadActionRequest, ThreadListParams,
};

// Re-export response types
pub use responses::{
    ActionResponse, AuditEntryResponse, BuyerSummaryResponse, CsvExport, FlagBasicResponse,
    FlagExtendedResponse, FlagInspectResponse, FlagListResponse, FlagRowResponse, HealthChecks,
    HealthResponse, ModerationEventResponse, PaginatedResponse, ReadinessResponse,
    SellerSummaryResponse, ThreadResponse, UserSummaryResponse,
};

// Re-export mappers
pub use mappers::{display_subject, ThreadWithContext};
