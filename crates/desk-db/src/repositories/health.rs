//! Database reachability probe for readiness checks

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use desk_core::traits::{HealthProbe, RepoResult};

use super::error::map_db_error;

/// PostgreSQL implementation of HealthProbe
#[derive(Clone)]
pub struct PgHealthProbe {
    pool: PgPool,
}

impl PgHealthProbe {
    /// Create a new PgHealthProbe
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthProbe for PgHealthProbe {
    #[instrument(skip(self))]
    async fn ping(&self) -> RepoResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }
}
