//! Thread query service - filtered listing, page enrichment, and CSV export

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use serde_json::json;
use tracing::{info, instrument};

use desk_core::{
    Actor, AuditAction, AuditEntityType, Capabilities, NewAuditEntry, SellerRef, Thread,
    ThreadFilter, ThreadOrdering, UserRef,
};

use crate::dto::mappers::ThreadWithContext;
use crate::dto::requests::ThreadListParams;
use crate::dto::responses::{CsvExport, PaginatedResponse, ThreadResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Header row of the CSV export, fixed order
const EXPORT_HEADER: [&str; 12] = [
    "ID",
    "Source",
    "Status",
    "Priority",
    "Subject",
    "Seller",
    "Buyer Email",
    "Assigned To",
    "Message Count",
    "SLA Breach",
    "Last Message",
    "Created",
];

/// Read side of the thread surface
pub struct ThreadQueryService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ThreadQueryService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// One enriched page plus the total count under the same filter
    #[instrument(skip(self, actor, params))]
    pub async fn list(
        &self,
        actor: &Actor,
        params: &ThreadListParams,
    ) -> ServiceResult<PaginatedResponse<ThreadResponse>> {
        actor.require(Capabilities::VIEW_THREADS)?;

        let (page, limit) = (params.page(), params.limit());
        let Some((filter, ordering)) = self.resolve_query(actor, params).await? else {
            return Ok(PaginatedResponse::empty(page, limit));
        };

        let threads = self
            .ctx
            .thread_repo()
            .find_page(&filter, ordering, limit, params.offset())
            .await?;
        let total = self.ctx.thread_repo().count(&filter).await?;
        let data = self.enrich(&threads).await?;

        Ok(PaginatedResponse::new(data, total, page, limit))
    }

    /// Full filtered export as CSV, capped at the configured row limit.
    ///
    /// Requires the export capability; a rejected export never reaches the
    /// audit log. A completed one is recorded with its row count and the
    /// filter snapshot.
    #[instrument(skip(self, actor, params))]
    pub async fn export_csv(
        &self,
        actor: &Actor,
        params: &ThreadListParams,
    ) -> ServiceResult<CsvExport> {
        actor.require(Capabilities::EXPORT_THREADS)?;

        let rows = match self.resolve_query(actor, params).await? {
            Some((filter, ordering)) => {
                let threads = self
                    .ctx
                    .thread_repo()
                    .export(&filter, ordering, self.ctx.export_max_rows())
                    .await?;
                self.enrich(&threads).await?
            }
            None => Vec::new(),
        };

        let body = render_csv(&rows)?;

        let entry = NewAuditEntry::new(
            actor,
            AuditAction::ThreadsExport,
            AuditEntityType::Thread,
            "export",
            format!("Exported {} threads to CSV", rows.len()),
        )
        .with_meta(json!({ "rows": rows.len(), "filters": params.snapshot() }));
        self.ctx.audit_repo().append(&entry).await?;

        info!(rows = rows.len(), "thread export rendered");
        Ok(CsvExport {
            filename: export_filename(Utc::now().date_naive()),
            body,
        })
    }

    /// Build the filter and ordering from raw parameters. `None` means the
    /// tag pre-pass matched no threads and the whole query short-circuits:
    /// no page query, no count, no enrichment.
    async fn resolve_query(
        &self,
        actor: &Actor,
        params: &ThreadListParams,
    ) -> ServiceResult<Option<(ThreadFilter, ThreadOrdering)>> {
        let mut filter = params.build_filter(actor)?;
        let ordering = params.ordering(&filter)?;

        if filter.has_tag_filter() {
            let ids = self
                .ctx
                .tag_repo()
                .thread_ids_with_any_tag(&filter.tags)
                .await?;
            if ids.is_empty() {
                return Ok(None);
            }
            filter.thread_ids = Some(ids);
        }

        Ok(Some((filter, ordering)))
    }

    /// Batch-resolve sellers, users, and tags for a fetched page. One keyed
    /// lookup per dimension, never one per row.
    async fn enrich(&self, threads: &[Thread]) -> ServiceResult<Vec<ThreadResponse>> {
        if threads.is_empty() {
            return Ok(Vec::new());
        }

        let thread_ids: Vec<String> = threads.iter().map(|t| t.id.clone()).collect();

        let mut user_ids: BTreeSet<&str> = BTreeSet::new();
        let mut seller_ids: BTreeSet<&str> = BTreeSet::new();
        for thread in threads {
            let refs = [
                &thread.buyer_id,
                &thread.assigned_to_user_id,
                &thread.closed_by_user_id,
                &thread.resolved_by_user_id,
            ];
            for id in refs.into_iter().flatten() {
                user_ids.insert(id);
            }
            if let Some(id) = &thread.seller_id {
                seller_ids.insert(id);
            }
        }
        let user_ids: Vec<String> = user_ids.into_iter().map(str::to_string).collect();
        let seller_ids: Vec<String> = seller_ids.into_iter().map(str::to_string).collect();

        let users: HashMap<String, UserRef> = self
            .ctx
            .directory_repo()
            .users_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();
        let sellers: HashMap<String, SellerRef> = self
            .ctx
            .directory_repo()
            .sellers_by_ids(&seller_ids)
            .await?
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();

        let mut tags: HashMap<String, Vec<String>> = HashMap::new();
        for tag in self.ctx.tag_repo().tags_for_threads(&thread_ids).await? {
            tags.entry(tag.thread_id).or_default().push(tag.tag);
        }

        let rows = threads
            .iter()
            .map(|thread| {
                let user = |id: &Option<String>| id.as_deref().and_then(|id| users.get(id));
                ThreadResponse::from(ThreadWithContext {
                    thread,
                    seller: thread.seller_id.as_deref().and_then(|id| sellers.get(id)),
                    buyer: user(&thread.buyer_id),
                    assigned_to: user(&thread.assigned_to_user_id),
                    closed_by: user(&thread.closed_by_user_id),
                    resolved_by: user(&thread.resolved_by_user_id),
                    tags: tags.get(&thread.id).map_or(&[][..], Vec::as_slice),
                })
            })
            .collect();

        Ok(rows)
    }
}

/// `support-threads-<date>.csv`, date in UTC
fn export_filename(date: chrono::NaiveDate) -> String {
    format!("support-threads-{}.csv", date.format("%Y-%m-%d"))
}

fn render_csv(rows: &[ThreadResponse]) -> ServiceResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADER).map_err(csv_err)?;
    for row in rows {
        writer.write_record(&export_record(row)).map_err(csv_err)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ServiceError::internal(e.error().to_string()))?;
    String::from_utf8(bytes).map_err(|e| ServiceError::internal(e.to_string()))
}

fn csv_err(err: csv::Error) -> ServiceError {
    ServiceError::internal(err.to_string())
}

/// One export line; column order mirrors `EXPORT_HEADER`
fn export_record(row: &ThreadResponse) -> [String; 12] {
    [
        row.id.clone(),
        row.source.as_str().to_string(),
        row.status.as_str().to_string(),
        row.priority.as_str().to_string(),
        row.display_subject.clone().unwrap_or_default(),
        row.seller
            .as_ref()
            .map(|s| s.brand_name.clone())
            .unwrap_or_default(),
        row.buyer.as_ref().map(|b| b.email.clone()).unwrap_or_default(),
        row.assigned_to
            .as_ref()
            .map_or_else(|| "Unassigned".to_string(), |u| u.email.clone()),
        row.message_count.to_string(),
        if row.sla_breach { "Yes" } else { "No" }.to_string(),
        row.last_message_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_default(),
        row.created_at.to_rfc3339(),
    ]
}
