//! PostgreSQL implementation of TagRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use desk_core::entities::{NewAuditEntry, ThreadTag};
use desk_core::traits::{RepoResult, TagRepository};

use crate::models::ThreadTagModel;

use super::audit::insert_audit;
use super::error::map_db_error;

/// PostgreSQL implementation of TagRepository
#[derive(Clone)]
pub struct PgTagRepository {
    pool: PgPool,
}

impl PgTagRepository {
    /// Create a new PgTagRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TagRepository for PgTagRepository {
    #[instrument(skip(self))]
    async fn thread_ids_with_any_tag(&self, tags: &[String]) -> RepoResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            r"
            SELECT DISTINCT thread_id FROM support_thread_tags
            WHERE tag = ANY($1)
            ",
        )
        .bind(tags)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, thread_ids))]
    async fn tags_for_threads(&self, thread_ids: &[String]) -> RepoResult<Vec<ThreadTag>> {
        let models = sqlx::query_as::<_, ThreadTagModel>(
            r"
            SELECT thread_id, tag, created_at FROM support_thread_tags
            WHERE thread_id = ANY($1)
            ORDER BY thread_id, tag
            ",
        )
        .bind(thread_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(models.into_iter().map(ThreadTag::from).collect())
    }

    #[instrument(skip(self, audit))]
    async fn add(&self, thread_id: &str, tag: &str, audit: &NewAuditEntry) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Re-adding an existing tag is a no-op on the row, but still audited
        sqlx::query(
            r"
            INSERT INTO support_thread_tags (thread_id, tag)
            VALUES ($1, $2)
            ON CONFLICT (thread_id, tag) DO NOTHING
            ",
        )
        .bind(thread_id)
        .bind(tag)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        insert_audit(&mut tx, audit).await?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self, audit))]
    async fn remove(&self, thread_id: &str, tag: &str, audit: &NewAuditEntry) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            DELETE FROM support_thread_tags
            WHERE thread_id = $1 AND tag = $2
            ",
        )
        .bind(thread_id)
        .bind(tag)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        insert_audit(&mut tx, audit).await?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }
}
