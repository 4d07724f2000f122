//! Service context - dependency container for services
//!
//! Holds the repositories, auth service, and policy hooks needed by services.

use std::sync::Arc;

use desk_common::auth::JwtService;
use desk_core::traits::{
    AuditLogRepository, DirectoryRepository, FlagRepository, HealthProbe,
    ModerationLogRepository, PermissiveTransitions, TagRepository, ThreadRepository,
    TransitionPolicy,
};

/// Default cap on CSV export rows, overridable through the builder
const DEFAULT_EXPORT_MAX_ROWS: i64 = 10_000;

/// Service context containing all dependencies
///
/// This is the main dependency container that gets passed to all services.
/// It provides access to:
/// - Database repositories
/// - JWT service for authentication
/// - The status-transition policy hook
/// - The export row cap
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    thread_repo: Arc<dyn ThreadRepository>,
    tag_repo: Arc<dyn TagRepository>,
    flag_repo: Arc<dyn FlagRepository>,
    audit_repo: Arc<dyn AuditLogRepository>,
    moderation_repo: Arc<dyn ModerationLogRepository>,
    directory_repo: Arc<dyn DirectoryRepository>,
    health_probe: Arc<dyn HealthProbe>,

    // Services
    jwt_service: Arc<JwtService>,

    // Policy
    transition_policy: Arc<dyn TransitionPolicy>,
    export_max_rows: i64,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        thread_repo: Arc<dyn ThreadRepository>,
        tag_repo: Arc<dyn TagRepository>,
        flag_repo: Arc<dyn FlagRepository>,
        audit_repo: Arc<dyn AuditLogRepository>,
        moderation_repo: Arc<dyn ModerationLogRepository>,
        directory_repo: Arc<dyn DirectoryRepository>,
        health_probe: Arc<dyn HealthProbe>,
        jwt_service: Arc<JwtService>,
        transition_policy: Arc<dyn TransitionPolicy>,
        export_max_rows: i64,
    ) -> Self {
        Self {
            thread_repo,
            tag_repo,
            flag_repo,
            audit_repo,
            moderation_repo,
            directory_repo,
            health_probe,
            jwt_service,
            transition_policy,
            export_max_rows,
        }
    }

    // === Repositories ===

    /// Get the thread repository
    pub fn thread_repo(&self) -> &dyn ThreadRepository {
        self.thread_repo.as_ref()
    }

    /// Get the tag repository
    pub fn tag_repo(&self) -> &dyn TagRepository {
        self.tag_repo.as_ref()
    }

    /// Get the flag repository
    pub fn flag_repo(&self) -> &dyn FlagRepository {
        self.flag_repo.as_ref()
    }

    /// Get the audit log repository
    pub fn audit_repo(&self) -> &dyn AuditLogRepository {
        self.audit_repo.as_ref()
    }

    /// Get the moderation log repository
    pub fn moderation_repo(&self) -> &dyn ModerationLogRepository {
        self.moderation_repo.as_ref()
    }

    /// Get the user/seller directory repository
    pub fn directory_repo(&self) -> &dyn DirectoryRepository {
        self.directory_repo.as_ref()
    }

    /// Get the backing-store health probe
    pub fn health_probe(&self) -> &dyn HealthProbe {
        self.health_probe.as_ref()
    }

    // === Services ===

    /// Get the JWT service
    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    // === Policy ===

    /// Get the status-transition policy
    pub fn transition_policy(&self) -> &dyn TransitionPolicy {
        self.transition_policy.as_ref()
    }

    /// Maximum number of rows a CSV export may return
    pub fn export_max_rows(&self) -> i64 {
        self.export_max_rows
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("jwt_service", &self.jwt_service)
            .field("export_max_rows", &self.export_max_rows)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
pub struct ServiceContextBuilder {
    thread_repo: Option<Arc<dyn ThreadRepository>>,
    tag_repo: Option<Arc<dyn TagRepository>>,
    flag_repo: Option<Arc<dyn FlagRepository>>,
    audit_repo: Option<Arc<dyn AuditLogRepository>>,
    moderation_repo: Option<Arc<dyn ModerationLogRepository>>,
    directory_repo: Option<Arc<dyn DirectoryRepository>>,
    health_probe: Option<Arc<dyn HealthProbe>>,
    jwt_service: Option<Arc<JwtService>>,
    transition_policy: Arc<dyn TransitionPolicy>,
    export_max_rows: i64,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            thread_repo: None,
            tag_repo: None,
            flag_repo: None,
            audit_repo: None,
            moderation_repo: None,
            directory_repo: None,
            health_probe: None,
            jwt_service: None,
            transition_policy: Arc::new(PermissiveTransitions),
            export_max_rows: DEFAULT_EXPORT_MAX_ROWS,
        }
    }

    pub fn thread_repo(mut self, repo: Arc<dyn ThreadRepository>) -> Self {
        self.thread_repo = Some(repo);
        self
    }

    pub fn tag_repo(mut self, repo: Arc<dyn TagRepository>) -> Self {
        self.tag_repo = Some(repo);
        self
    }

    pub fn flag_repo(mut self, repo: Arc<dyn FlagRepository>) -> Self {
        self.flag_repo = Some(repo);
        self
    }

    pub fn audit_repo(mut self, repo: Arc<dyn AuditLogRepository>) -> Self {
        self.audit_repo = Some(repo);
        self
    }

    pub fn moderation_repo(mut self, repo: Arc<dyn ModerationLogRepository>) -> Self {
        self.moderation_repo = Some(repo);
        self
    }

    pub fn directory_repo(mut self, repo: Arc<dyn DirectoryRepository>) -> Self {
        self.directory_repo = Some(repo);
        self
    }

    pub fn health_probe(mut self, probe: Arc<dyn HealthProbe>) -> Self {
        self.health_probe = Some(probe);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn transition_policy(mut self, policy: Arc<dyn TransitionPolicy>) -> Self {
        self.transition_policy = policy;
        self
    }

    pub fn export_max_rows(mut self, cap: i64) -> Self {
        self.export_max_rows = cap;
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> super::error::ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.thread_repo.ok_or_else(|| super::error::ServiceError::validation("thread_repo is required"))?,
            self.tag_repo.ok_or_else(|| super::error::ServiceError::validation("tag_repo is required"))?,
            self.flag_repo.ok_or_else(|| super::error::ServiceError::validation("flag_repo is required"))?,
            self.audit_repo.ok_or_else(|| super::error::ServiceError::validation("audit_repo is required"))?,
            self.moderation_repo.ok_or_else(|| super::error::ServiceError::validation("moderation_repo is required"))?,
            self.directory_repo.ok_or_else(|| super::error::ServiceError::validation("directory_repo is required"))?,
            self.health_probe.ok_or_else(|| super::error::ServiceError::validation("health_probe is required"))?,
            self.jwt_service.ok_or_else(|| super::error::ServiceError::validation("jwt_service is required"))?,
            self.transition_policy,
            self.export_max_rows,
        ))
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
