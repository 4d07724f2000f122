//! PostgreSQL implementation of ThreadRepository

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use desk_core::entities::{NewAuditEntry, NewModerationEvent, Thread, ThreadPriority, ThreadStatus};
use desk_core::query::{AssigneeFilter, SortDirection, SortKey, ThreadFilter, ThreadOrdering};
use desk_core::traits::{RepoResult, ThreadLookup, ThreadRepository};

use crate::models::ThreadModel;

use super::audit::insert_audit;
use super::error::{map_db_error, thread_not_found};
use super::moderation::insert_moderation_event;

/// Column list shared by every thread SELECT
const THREAD_COLUMNS: &str = "t.id, t.source, t.source_id, t.status, t.priority, \
     t.order_id, t.seller_id, t.buyer_id, t.assigned_to_user_id, \
     t.closed_by_user_id, t.resolved_by_user_id, t.subject, \
     t.last_message_preview, t.message_count, t.last_message_at, \
     t.sla_deadline, t.sla_breach, t.created_at, t.updated_at";

/// Escape LIKE metacharacters so a search needle matches literally
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Append the filter dimensions as AND predicates
///
/// Must stay in lockstep with `ThreadFilter::matches`, the pure in-memory
/// mirror of this WHERE clause.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ThreadFilter) {
    if !filter.statuses.is_empty() {
        let values: Vec<String> = filter
            .statuses
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();
        qb.push(" AND t.status = ANY(").push_bind(values).push(")");
    }
    if !filter.sources.is_empty() {
        let values: Vec<String> = filter
            .sources
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();
        qb.push(" AND t.source = ANY(").push_bind(values).push(")");
    }
    if !filter.priorities.is_empty() {
        let values: Vec<String> = filter
            .priorities
            .iter()
            .map(|p| p.as_str().to_string())
            .collect();
        qb.push(" AND t.priority = ANY(").push_bind(values).push(")");
    }
    match &filter.assignee {
        Some(AssigneeFilter::Unassigned) => {
            qb.push(" AND t.assigned_to_user_id IS NULL");
        }
        Some(AssigneeFilter::User(id)) => {
            qb.push(" AND t.assigned_to_user_id = ").push_bind(id.clone());
        }
        None => {}
    }
    if let Some(seller_id) = &filter.seller_id {
        qb.push(" AND t.seller_id = ").push_bind(seller_id.clone());
    }
    if let Some(buyer_id) = &filter.buyer_id {
        qb.push(" AND t.buyer_id = ").push_bind(buyer_id.clone());
    }
    if let Some(order_id) = &filter.order_id {
        qb.push(" AND t.order_id = ").push_bind(order_id.clone());
    }
    if let Some(sla_breach) = filter.sla_breach {
        qb.push(" AND t.sla_breach = ").push_bind(sla_breach);
    }
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        qb.push(" AND (t.subject ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR t.last_message_preview ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(from) = filter.created_from {
        qb.push(" AND t.created_at >= ").push_bind(from);
    }
    if let Some(to) = filter.created_to {
        qb.push(" AND t.created_at <= ").push_bind(to);
    }
    if !filter.tags.is_empty() {
        qb.push(
            " AND EXISTS (SELECT 1 FROM support_thread_tags tt \
             WHERE tt.thread_id = t.id AND tt.tag = ANY(",
        )
        .push_bind(filter.tags.clone())
        .push("))");
    }
    if let Some(thread_ids) = &filter.thread_ids {
        qb.push(" AND t.id = ANY(").push_bind(thread_ids.clone()).push(")");
    }
    if let Some(user_id) = &filter.closed_resolved_by_user_id {
        qb.push(" AND (t.closed_by_user_id = ")
            .push_bind(user_id.clone())
            .push(" OR t.resolved_by_user_id = ")
            .push_bind(user_id.clone())
            .push(")");
    }
}

/// Render the ORDER BY for an ordering strategy
///
/// Must stay in lockstep with `ThreadOrdering::cmp`. Every variant ends on
/// `t.id DESC` so pages are deterministic; nullable keys sort nulls last in
/// either direction.
fn order_by_clause(ordering: ThreadOrdering) -> String {
    match ordering {
        ThreadOrdering::TriageQueue => {
            "CASE WHEN t.status = 'waiting' THEN 0 ELSE 1 END ASC, \
             CASE WHEN t.status = 'waiting' THEN t.last_message_at END ASC NULLS LAST, \
             CASE WHEN t.status <> 'waiting' THEN t.last_message_at END DESC NULLS LAST, \
             t.id DESC"
                .to_string()
        }
        ThreadOrdering::Field { key, direction } => {
            let dir = match direction {
                SortDirection::Asc => "ASC",
                SortDirection::Desc => "DESC",
            };
            match key {
                SortKey::LastMessageAt => {
                    format!("t.last_message_at {dir} NULLS LAST, t.id DESC")
                }
                SortKey::CreatedAt => format!("t.created_at {dir}, t.id DESC"),
                SortKey::SlaDeadline => format!("t.sla_deadline {dir} NULLS LAST, t.id DESC"),
                SortKey::Priority => format!(
                    "CASE t.priority \
                     WHEN 'urgent' THEN 3 WHEN 'high' THEN 2 \
                     WHEN 'normal' THEN 1 WHEN 'low' THEN 0 \
                     ELSE 1 END {dir}, t.id DESC"
                ),
            }
        }
    }
}

/// PostgreSQL implementation of ThreadRepository
#[derive(Clone)]
pub struct PgThreadRepository {
    pool: PgPool,
}

impl PgThreadRepository {
    /// Create a new PgThreadRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_filtered(
        &self,
        filter: &ThreadFilter,
        ordering: ThreadOrdering,
        limit: i64,
        offset: Option<i64>,
    ) -> RepoResult<Vec<Thread>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {THREAD_COLUMNS} FROM support_threads t WHERE 1=1"
        ));
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY ");
        qb.push(order_by_clause(ordering));
        qb.push(" LIMIT ");
        qb.push_bind(limit);
        if let Some(offset) = offset {
            qb.push(" OFFSET ");
            qb.push_bind(offset);
        }

        let models = qb
            .build_query_as::<ThreadModel>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(models.into_iter().map(Thread::from).collect())
    }
}

#[async_trait]
impl ThreadRepository for PgThreadRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Thread>> {
        let result = sqlx::query_as::<_, ThreadModel>(&format!(
            "SELECT {THREAD_COLUMNS} FROM support_threads t WHERE t.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Thread::from))
    }

    #[instrument(skip(self, filter))]
    async fn find_page(
        &self,
        filter: &ThreadFilter,
        ordering: ThreadOrdering,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<Thread>> {
        self.fetch_filtered(filter, ordering, limit, Some(offset)).await
    }

    #[instrument(skip(self, filter))]
    async fn count(&self, filter: &ThreadFilter) -> RepoResult<i64> {
        let mut qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM support_threads t WHERE 1=1");
        push_filter(&mut qb, filter);

        qb.build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self, filter))]
    async fn export(
        &self,
        filter: &ThreadFilter,
        ordering: ThreadOrdering,
        cap: i64,
    ) -> RepoResult<Vec<Thread>> {
        self.fetch_filtered(filter, ordering, cap, None).await
    }

    #[instrument(skip(self))]
    async fn resolve_by_conversation(&self, conversation_id: &str) -> RepoResult<ThreadLookup> {
        let result = sqlx::query_scalar::<_, String>(
            r"
            SELECT id FROM support_threads
            WHERE source_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            ",
        )
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(match result {
            Some(id) => ThreadLookup::Found(id),
            None => ThreadLookup::NotFound,
        })
    }

    #[instrument(skip(self, audit, event))]
    async fn set_assignee(
        &self,
        thread_id: &str,
        assignee: Option<&str>,
        audit: &NewAuditEntry,
        event: &NewModerationEvent,
    ) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let result = sqlx::query(
            r"
            UPDATE support_threads
            SET assigned_to_user_id = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(thread_id)
        .bind(assignee)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(thread_not_found(thread_id));
        }

        insert_audit(&mut tx, audit).await?;
        insert_moderation_event(&mut tx, event).await?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self, audit))]
    async fn set_status(
        &self,
        thread_id: &str,
        status: ThreadStatus,
        closed_by: Option<&str>,
        resolved_by: Option<&str>,
        audit: &NewAuditEntry,
    ) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Terminal provenance is stamped once: COALESCE keeps the first writer
        let result = sqlx::query(
            r"
            UPDATE support_threads
            SET status = $2,
                closed_by_user_id = COALESCE(closed_by_user_id, $3),
                resolved_by_user_id = COALESCE(resolved_by_user_id, $4),
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(thread_id)
        .bind(status.as_str())
        .bind(closed_by)
        .bind(resolved_by)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(thread_not_found(thread_id));
        }

        insert_audit(&mut tx, audit).await?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self, audit, event))]
    async fn set_priority(
        &self,
        thread_id: &str,
        priority: ThreadPriority,
        audit: &NewAuditEntry,
        event: &NewModerationEvent,
    ) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let result = sqlx::query(
            r"
            UPDATE support_threads
            SET priority = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(thread_id)
        .bind(priority.as_str())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(thread_not_found(thread_id));
        }

        insert_audit(&mut tx, audit).await?;
        insert_moderation_event(&mut tx, event).await?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }
}
