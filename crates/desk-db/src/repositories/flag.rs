//! PostgreSQL implementation of FlagRepository
//!
//! One row per conversation in `chat_flags_extended`, created lazily through
//! upserts. Evidence appends and the fraud/escalation field groups are single
//! statements so concurrent writers cannot interleave half an update.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use tracing::instrument;

use desk_core::entities::{
    EscalatedFlag, EvidenceEntry, FlagBasic, FlagExtended, NewAuditEntry, NewModerationEvent,
};
use desk_core::error::DomainError;
use desk_core::traits::{FlagRepository, RepoResult};

use crate::models::{EscalatedFlagModel, FlagBasicModel, FlagExtendedModel};

use super::audit::insert_audit;
use super::error::map_db_error;
use super::moderation::insert_moderation_event;

/// Column list shared by every extended-flag SELECT and RETURNING
const FLAG_COLUMNS: &str = "conversation_id, fraud_suspected, fraud_reason, \
     fraud_detected_at, fraud_detected_by_user_id, escalated_to_user_id, \
     escalated_at, escalation_reason, evidence_json, created_at, updated_at";

fn evidence_value(entry: Option<&EvidenceEntry>) -> RepoResult<Option<JsonValue>> {
    entry
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| DomainError::InternalError(format!("Failed to serialize evidence: {e}")))
}

/// PostgreSQL implementation of FlagRepository
#[derive(Clone)]
pub struct PgFlagRepository {
    pool: PgPool,
}

impl PgFlagRepository {
    /// Create a new PgFlagRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FlagRepository for PgFlagRepository {
    #[instrument(skip(self))]
    async fn find_basic(&self, conversation_id: &str) -> RepoResult<Option<FlagBasic>> {
        let result = sqlx::query_as::<_, FlagBasicModel>(
            r"
            SELECT conversation_id, bypass_suspected, attempts_24h, created_at, updated_at
            FROM chat_flags
            WHERE conversation_id = $1
            ",
        )
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(FlagBasic::from))
    }

    #[instrument(skip(self))]
    async fn find_extended(&self, conversation_id: &str) -> RepoResult<Option<FlagExtended>> {
        let result = sqlx::query_as::<_, FlagExtendedModel>(&format!(
            "SELECT {FLAG_COLUMNS} FROM chat_flags_extended WHERE conversation_id = $1"
        ))
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(FlagExtended::from))
    }

    #[instrument(skip(self, evidence, audit))]
    async fn set_fraud(
        &self,
        conversation_id: &str,
        suspected: bool,
        reason: Option<&str>,
        detected_by: &str,
        evidence: Option<&EvidenceEntry>,
        audit: &NewAuditEntry,
    ) -> RepoResult<FlagExtended> {
        let evidence = evidence_value(evidence)?;
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Detection provenance stamps only on the false -> true transition and
        // survives clearing; an omitted reason keeps the stored one.
        let model = sqlx::query_as::<_, FlagExtendedModel>(&format!(
            r#"
            INSERT INTO chat_flags_extended
                (conversation_id, fraud_suspected, fraud_reason,
                 fraud_detected_at, fraud_detected_by_user_id, evidence_json)
            VALUES ($1, $2, $3,
                    CASE WHEN $2 THEN NOW() END,
                    CASE WHEN $2 THEN $4 END,
                    CASE WHEN $5::jsonb IS NULL THEN '{{"entries": []}}'::jsonb
                         ELSE jsonb_build_object('entries', jsonb_build_array($5::jsonb)) END)
            ON CONFLICT (conversation_id) DO UPDATE SET
                fraud_suspected = EXCLUDED.fraud_suspected,
                fraud_reason = COALESCE(EXCLUDED.fraud_reason, chat_flags_extended.fraud_reason),
                fraud_detected_at = CASE
                    WHEN EXCLUDED.fraud_suspected AND NOT chat_flags_extended.fraud_suspected
                    THEN NOW() ELSE chat_flags_extended.fraud_detected_at END,
                fraud_detected_by_user_id = CASE
                    WHEN EXCLUDED.fraud_suspected AND NOT chat_flags_extended.fraud_suspected
                    THEN $4 ELSE chat_flags_extended.fraud_detected_by_user_id END,
                evidence_json = CASE WHEN $5::jsonb IS NULL THEN chat_flags_extended.evidence_json
                    ELSE jsonb_set(
                        COALESCE(chat_flags_extended.evidence_json, '{{"entries": []}}'::jsonb),
                        '{{entries}}',
                        COALESCE(chat_flags_extended.evidence_json->'entries', '[]'::jsonb)
                            || $5::jsonb) END,
                updated_at = NOW()
            RETURNING {FLAG_COLUMNS}
            "#
        ))
        .bind(conversation_id)
        .bind(suspected)
        .bind(reason)
        .bind(detected_by)
        .bind(evidence)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        insert_audit(&mut tx, audit).await?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(FlagExtended::from(model))
    }

    #[instrument(skip(self, audit, event))]
    async fn set_escalation(
        &self,
        conversation_id: &str,
        escalate_to: &str,
        reason: Option<&str>,
        audit: &NewAuditEntry,
        event: &NewModerationEvent,
    ) -> RepoResult<FlagExtended> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // The triple moves as a unit: re-escalating overwrites target,
        // timestamp and reason, including reason back to null when omitted.
        let model = sqlx::query_as::<_, FlagExtendedModel>(&format!(
            r"
            INSERT INTO chat_flags_extended
                (conversation_id, escalated_to_user_id, escalated_at, escalation_reason)
            VALUES ($1, $2, NOW(), $3)
            ON CONFLICT (conversation_id) DO UPDATE SET
                escalated_to_user_id = EXCLUDED.escalated_to_user_id,
                escalated_at = NOW(),
                escalation_reason = EXCLUDED.escalation_reason,
                updated_at = NOW()
            RETURNING {FLAG_COLUMNS}
            "
        ))
        .bind(conversation_id)
        .bind(escalate_to)
        .bind(reason)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        insert_audit(&mut tx, audit).await?;
        insert_moderation_event(&mut tx, event).await?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(FlagExtended::from(model))
    }

    #[instrument(skip(self, audit, event))]
    async fn clear_escalation(
        &self,
        conversation_id: &str,
        audit: &NewAuditEntry,
        event: &NewModerationEvent,
    ) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let result = sqlx::query(
            r"
            UPDATE chat_flags_extended
            SET escalated_to_user_id = NULL,
                escalated_at = NULL,
                escalation_reason = NULL,
                updated_at = NOW()
            WHERE conversation_id = $1
            ",
        )
        .bind(conversation_id)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NothingToDeescalate(
                conversation_id.to_string(),
            ));
        }

        insert_audit(&mut tx, audit).await?;
        insert_moderation_event(&mut tx, event).await?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self, entry, audit))]
    async fn append_evidence(
        &self,
        conversation_id: &str,
        entry: &EvidenceEntry,
        audit: &NewAuditEntry,
    ) -> RepoResult<FlagExtended> {
        let entry = serde_json::to_value(entry)
            .map_err(|e| DomainError::InternalError(format!("Failed to serialize evidence: {e}")))?;
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // jsonb array concat runs inside the statement, so two concurrent
        // appends both land instead of one overwriting the other.
        let model = sqlx::query_as::<_, FlagExtendedModel>(&format!(
            r#"
            INSERT INTO chat_flags_extended (conversation_id, evidence_json)
            VALUES ($1, jsonb_build_object('entries', jsonb_build_array($2::jsonb)))
            ON CONFLICT (conversation_id) DO UPDATE SET
                evidence_json = jsonb_set(
                    COALESCE(chat_flags_extended.evidence_json, '{{"entries": []}}'::jsonb),
                    '{{entries}}',
                    COALESCE(chat_flags_extended.evidence_json->'entries', '[]'::jsonb)
                        || $2::jsonb),
                updated_at = NOW()
            RETURNING {FLAG_COLUMNS}
            "#
        ))
        .bind(conversation_id)
        .bind(entry)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        insert_audit(&mut tx, audit).await?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(FlagExtended::from(model))
    }

    #[instrument(skip(self))]
    async fn list_bypass(&self, limit: i64, offset: i64) -> RepoResult<Vec<FlagBasic>> {
        let models = sqlx::query_as::<_, FlagBasicModel>(
            r"
            SELECT conversation_id, bypass_suspected, attempts_24h, created_at, updated_at
            FROM chat_flags
            WHERE bypass_suspected
            ORDER BY updated_at DESC
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(models.into_iter().map(FlagBasic::from).collect())
    }

    #[instrument(skip(self))]
    async fn count_bypass(&self) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM chat_flags WHERE bypass_suspected")
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn list_fraud(&self, limit: i64, offset: i64) -> RepoResult<Vec<FlagExtended>> {
        let models = sqlx::query_as::<_, FlagExtendedModel>(&format!(
            r"
            SELECT {FLAG_COLUMNS} FROM chat_flags_extended
            WHERE fraud_suspected
            ORDER BY fraud_detected_at DESC NULLS LAST
            LIMIT $1 OFFSET $2
            "
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(models.into_iter().map(FlagExtended::from).collect())
    }

    #[instrument(skip(self))]
    async fn count_fraud(&self) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM chat_flags_extended WHERE fraud_suspected",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn list_escalated(&self, limit: i64, offset: i64) -> RepoResult<Vec<EscalatedFlag>> {
        let models = sqlx::query_as::<_, EscalatedFlagModel>(
            r"
            SELECT f.conversation_id, f.fraud_suspected, f.fraud_reason,
                   f.fraud_detected_at, f.fraud_detected_by_user_id,
                   f.escalated_to_user_id, f.escalated_at, f.escalation_reason,
                   f.evidence_json, f.created_at, f.updated_at,
                   u.id AS target_id, u.display_id AS target_display_id,
                   u.name AS target_name, u.email AS target_email,
                   u.role AS target_role
            FROM chat_flags_extended f
            LEFT JOIN users u ON u.id = f.escalated_to_user_id
            WHERE f.escalated_to_user_id IS NOT NULL
            ORDER BY f.escalated_at DESC
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(models.into_iter().map(EscalatedFlag::from).collect())
    }

    #[instrument(skip(self))]
    async fn count_escalated(&self) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM chat_flags_extended WHERE escalated_to_user_id IS NOT NULL",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn list_flagged(&self, limit: i64, offset: i64) -> RepoResult<Vec<FlagExtended>> {
        let models = sqlx::query_as::<_, FlagExtendedModel>(&format!(
            r"
            SELECT {FLAG_COLUMNS} FROM chat_flags_extended
            WHERE fraud_suspected OR escalated_to_user_id IS NOT NULL
            ORDER BY updated_at DESC
            LIMIT $1 OFFSET $2
            "
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(models.into_iter().map(FlagExtended::from).collect())
    }

    #[instrument(skip(self))]
    async fn count_flagged(&self) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*) FROM chat_flags_extended
            WHERE fraud_suspected OR escalated_to_user_id IS NOT NULL
            ",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }
}
