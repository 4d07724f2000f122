//! PostgreSQL implementation of ModerationLogRepository

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use desk_core::entities::{ModerationEvent, NewModerationEvent};
use desk_core::traits::{ModerationLogRepository, RepoResult};

use crate::models::ModerationEventModel;

use super::error::map_db_error;

/// Append a moderation event inside a caller-owned transaction
pub(crate) async fn insert_moderation_event(
    tx: &mut Transaction<'_, Postgres>,
    event: &NewModerationEvent,
) -> RepoResult<()> {
    sqlx::query(
        r"
        INSERT INTO moderation_events
            (actor_id, actor_name, actor_role, action_type, thread_id, reason, note, metadata)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ",
    )
    .bind(&event.actor_id)
    .bind(&event.actor_name)
    .bind(event.actor_role.as_str())
    .bind(event.action_type.as_str())
    .bind(&event.thread_id)
    .bind(event.reason.as_deref())
    .bind(event.note.as_deref())
    .bind(&event.metadata)
    .execute(&mut **tx)
    .await
    .map_err(map_db_error)?;

    Ok(())
}

/// PostgreSQL implementation of ModerationLogRepository
#[derive(Clone)]
pub struct PgModerationLogRepository {
    pool: PgPool,
}

impl PgModerationLogRepository {
    /// Create a new PgModerationLogRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ModerationLogRepository for PgModerationLogRepository {
    #[instrument(skip(self))]
    async fn list_for_thread(
        &self,
        thread_id: &str,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<ModerationEvent>> {
        let models = sqlx::query_as::<_, ModerationEventModel>(
            r"
            SELECT id, actor_id, actor_name, actor_role, action_type, thread_id,
                   reason, note, metadata, created_at
            FROM moderation_events
            WHERE thread_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(thread_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(models.into_iter().map(ModerationEvent::from).collect())
    }

    #[instrument(skip(self))]
    async fn count_for_thread(&self, thread_id: &str) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM moderation_events WHERE thread_id = $1",
        )
        .bind(thread_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }
}
