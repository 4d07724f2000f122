//! PostgreSQL implementation of AuditLogRepository

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use desk_core::entities::{AuditEntry, NewAuditEntry};
use desk_core::traits::{AuditLogRepository, RepoResult};

use crate::models::AuditLogModel;

use super::error::map_db_error;

/// Append an audit entry inside a caller-owned transaction.
///
/// Mutating repositories call this so the trail commits or rolls back with
/// the domain change.
pub(crate) async fn insert_audit(
    tx: &mut Transaction<'_, Postgres>,
    entry: &NewAuditEntry,
) -> RepoResult<()> {
    sqlx::query(
        r"
        INSERT INTO audit_log (actor_id, actor_role, action, entity_type, entity_id, message, meta)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ",
    )
    .bind(&entry.actor_id)
    .bind(entry.actor_role.as_str())
    .bind(entry.action.as_str())
    .bind(entry.entity_type.as_str())
    .bind(&entry.entity_id)
    .bind(&entry.message)
    .bind(&entry.meta)
    .execute(&mut **tx)
    .await
    .map_err(map_db_error)?;

    Ok(())
}

/// PostgreSQL implementation of AuditLogRepository
#[derive(Clone)]
pub struct PgAuditLogRepository {
    pool: PgPool,
}

impl PgAuditLogRepository {
    /// Create a new PgAuditLogRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogRepository for PgAuditLogRepository {
    #[instrument(skip(self, entry))]
    async fn append(&self, entry: &NewAuditEntry) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO audit_log (actor_id, actor_role, action, entity_type, entity_id, message, meta)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(&entry.actor_id)
        .bind(entry.actor_role.as_str())
        .bind(entry.action.as_str())
        .bind(entry.entity_type.as_str())
        .bind(&entry.entity_id)
        .bind(&entry.message)
        .bind(&entry.meta)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        entity_type: Option<&str>,
        entity_id: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<AuditEntry>> {
        let models = sqlx::query_as::<_, AuditLogModel>(
            r"
            SELECT id, actor_id, actor_role, action, entity_type, entity_id, message, meta, created_at
            FROM audit_log
            WHERE ($1::text IS NULL OR entity_type = $1)
              AND ($2::text IS NULL OR entity_id = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            ",
        )
        .bind(entity_type)
        .bind(entity_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(models.into_iter().map(AuditEntry::from).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self, entity_type: Option<&str>, entity_id: Option<&str>) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*) FROM audit_log
            WHERE ($1::text IS NULL OR entity_type = $1)
              AND ($2::text IS NULL OR entity_id = $2)
            ",
        )
        .bind(entity_type)
        .bind(entity_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }
}
