//! Server setup and initialization
//!
//! Provides the main application builder and server runner.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use desk_common::{AppConfig, AppError, JwtService};
use desk_core::traits::{PermissiveTransitions, RestrictedTransitions, TransitionPolicy};
use desk_db::{
    create_pool, run_migrations, PgAuditLogRepository, PgDirectoryRepository, PgFlagRepository,
    PgHealthProbe, PgModerationLogRepository, PgTagRepository, PgThreadRepository,
};
use desk_service::ServiceContextBuilder;
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::apply_middleware;
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
///
/// Health routes are merged outside the middleware stack so probes are
/// neither rate limited nor traced.
pub fn create_app(state: AppState) -> Router {
    let router = apply_middleware(create_router(), state.config());

    router.merge(health_routes()).with_state(state)
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    // Create database pool
    info!("Connecting to PostgreSQL...");
    let db_config = desk_db::DatabaseConfig::from(&config.database);
    let pool = create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    // Apply pending migrations
    run_migrations(&pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("Database migrations applied");

    // Create JWT service
    let jwt_service = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.issuer.clone(),
    ));

    // Status-transition policy: permissive unless a whitelist is configured
    let transition_policy: Arc<dyn TransitionPolicy> = match config.status_transitions.as_deref() {
        Some(spec) => Arc::new(
            RestrictedTransitions::parse_spec(spec)
                .map_err(|e| AppError::Config(e.to_string()))?,
        ),
        None => Arc::new(PermissiveTransitions),
    };

    // Create repositories
    let thread_repo = Arc::new(PgThreadRepository::new(pool.clone()));
    let tag_repo = Arc::new(PgTagRepository::new(pool.clone()));
    let flag_repo = Arc::new(PgFlagRepository::new(pool.clone()));
    let audit_repo = Arc::new(PgAuditLogRepository::new(pool.clone()));
    let moderation_repo = Arc::new(PgModerationLogRepository::new(pool.clone()));
    let directory_repo = Arc::new(PgDirectoryRepository::new(pool.clone()));
    let health_probe = Arc::new(PgHealthProbe::new(pool));

    // Build service context
    let service_context = ServiceContextBuilder::new()
        .thread_repo(thread_repo)
        .tag_repo(tag_repo)
        .flag_repo(flag_repo)
        .audit_repo(audit_repo)
        .moderation_repo(moderation_repo)
        .directory_repo(directory_repo)
        .health_probe(health_probe)
        .jwt_service(jwt_service)
        .transition_policy(transition_policy)
        .export_max_rows(config.export.max_rows)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(service_context, config))
}

/// Run the HTTP server until a shutdown signal arrives
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {}: {}", addr, e)))?;

    info!(
        "desk-api {} listening on http://{}",
        env!("CARGO_PKG_VERSION"),
        addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {}", e)))?;

    info!("Server stopped");
    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config
        .api
        .address()
        .parse::<SocketAddr>()
        .map_err(|e| AppError::Config(format!("Invalid bind address: {}", e)))?;

    // Create app state
    let state = create_app_state(config).await?;

    // Build application
    let app = create_app(state);

    // Run server
    run_server(app, addr).await
}

/// Resolve on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
