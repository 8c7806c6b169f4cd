use crate::error::AppError;
use crate::handler::{deleted, into_list, lookup_uuid, ApiResult, Body, Params};
use crate::serializer::workflow::{WorkflowLevelStatusInput, WorkflowLevelStatusRepr};
use crate::serializer::{from_json, patched};
use crate::server::auth::Auth;
use crate::server::pagination::ListResponse;
use crate::server::AppState;
use app::app::workflow::level_status::WorkflowLevelStatusApp;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/workflowlevelstatus/", get(list).post(create))
        .route(
            "/workflowlevelstatus/{id}/",
            get(retrieve).put(update).patch(partial_update).delete(destroy),
        )
}

async fn list(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    params: Params,
) -> ApiResult<Json<ListResponse<WorkflowLevelStatusRepr>>> {
    let params = params?.0;
    let app = &state.app_module.workflow_level_status_app;
    let (limit, offset) = (params.limit(state.config.max_limit), params.offset());
    let results: Vec<WorkflowLevelStatusRepr> = app
        .find_workflow_level_status_list(&requester, limit.as_ref(), offset.as_ref())
        .await?
        .iter()
        .map(WorkflowLevelStatusRepr::from)
        .collect();
    let count = app.count_workflow_level_statuses(&requester);
    Ok(Json(into_list(&params, results, count).await?))
}

async fn create(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    body: Body,
) -> ApiResult<(StatusCode, Json<WorkflowLevelStatusRepr>)> {
    let input: WorkflowLevelStatusInput = from_json(body?.0)?;
    let status = state
        .app_module
        .workflow_level_status_app
        .create_workflow_level_status(&requester, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(WorkflowLevelStatusRepr::from(&status))))
}

async fn retrieve(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
) -> ApiResult<Json<WorkflowLevelStatusRepr>> {
    let uuid = lookup_uuid(&id)?;
    state
        .app_module
        .workflow_level_status_app
        .find_workflow_level_status(&requester, &uuid)
        .await?
        .map(|s| Json(WorkflowLevelStatusRepr::from(&s)))
        .ok_or_else(AppError::not_found)
}

async fn update(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Json<WorkflowLevelStatusRepr>> {
    let uuid = lookup_uuid(&id)?;
    let input: WorkflowLevelStatusInput = from_json(body?.0)?;
    let status = state
        .app_module
        .workflow_level_status_app
        .update_workflow_level_status(&requester, &uuid, &input)
        .await?;
    Ok(Json(WorkflowLevelStatusRepr::from(&status)))
}

async fn partial_update(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Json<WorkflowLevelStatusRepr>> {
    let uuid = lookup_uuid(&id)?;
    let app = &state.app_module.workflow_level_status_app;
    let current = app
        .find_workflow_level_status(&requester, &uuid)
        .await?
        .ok_or_else(AppError::not_found)?;
    let input = patched(&current.data, body?.0)?;
    let status = app
        .update_workflow_level_status(&requester, &uuid, &input)
        .await?;
    Ok(Json(WorkflowLevelStatusRepr::from(&status)))
}

async fn destroy(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let uuid = lookup_uuid(&id)?;
    deleted(
        state
            .app_module
            .workflow_level_status_app
            .delete_workflow_level_status(&requester, &uuid)
            .await?,
    )
}
