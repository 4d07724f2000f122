//! PostgreSQL implementation of DirectoryRepository
//!
//! `users` and `sellers` are read-only projections synced from the main
//! platform; this repository only ever batch-reads display fields.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use desk_core::entities::{SellerRef, UserRef};
use desk_core::traits::{DirectoryRepository, RepoResult};

use crate::models::{SellerModel, UserModel};

use super::error::map_db_error;

/// PostgreSQL implementation of DirectoryRepository
#[derive(Clone)]
pub struct PgDirectoryRepository {
    pool: PgPool,
}

impl PgDirectoryRepository {
    /// Create a new PgDirectoryRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectoryRepository for PgDirectoryRepository {
    #[instrument(skip(self, ids))]
    async fn users_by_ids(&self, ids: &[String]) -> RepoResult<Vec<UserRef>> {
        let models = sqlx::query_as::<_, UserModel>(
            r"
            SELECT id, display_id, name, email, role
            FROM users
            WHERE id = ANY($1)
            ",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(models.into_iter().map(UserRef::from).collect())
    }

    #[instrument(skip(self, ids))]
    async fn sellers_by_ids(&self, ids: &[String]) -> RepoResult<Vec<SellerRef>> {
        let models = sqlx::query_as::<_, SellerModel>(
            r"
            SELECT id, brand_name, slug
            FROM sellers
            WHERE id = ANY($1)
            ",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(models.into_iter().map(SellerRef::from).collect())
    }
}
