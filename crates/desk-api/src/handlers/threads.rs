//! Support thread queue handlers

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use desk_service::{
    ActionResponse, ThreadActionRequest, ThreadActionService, ThreadListParams,
    ThreadQueryService,
};

use crate::{
    extractors::{AuthActor, QueryParams, ValidatedJson},
    response::{ApiError, ApiResult, CsvFile},
    state::AppState,
};

/// List, filter, and export support threads
///
/// GET /threads
///
/// With `export=csv` the same filtered view is returned as a CSV attachment
/// instead of a JSON page.
pub async fn list_threads(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    QueryParams(params): QueryParams<ThreadListParams>,
) -> ApiResult<Response> {
    let service = ThreadQueryService::new(state.service_context());

    match params.export.as_deref() {
        None => {
            let page = service.list(&actor, &params).await?;
            Ok(Json(page).into_response())
        }
        Some("csv") => {
            let file = service.export_csv(&actor, &params).await?;
            Ok(CsvFile(file).into_response())
        }
        Some(other) => Err(ApiError::invalid_query(format!(
            "unknown export format: {other}"
        ))),
    }
}

/// Execute a triage action against a thread
///
/// POST /threads
pub async fn execute_action(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    ValidatedJson(request): ValidatedJson<ThreadActionRequest>,
) -> ApiResult<Json<ActionResponse>> {
    let service = ThreadActionService::new(state.service_context());
    let response = service.execute(&actor, &request).await?;

    Ok(Json(response))
}
