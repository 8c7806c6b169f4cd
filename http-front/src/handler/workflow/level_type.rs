use crate::error::AppError;
use crate::handler::{deleted, into_list, lookup_uuid, ApiResult, Body, Params};
use crate::serializer::workflow::{WorkflowLevelTypeInput, WorkflowLevelTypeRepr};
use crate::serializer::{from_json, patched};
use crate::server::auth::Auth;
use crate::server::pagination::ListResponse;
use crate::server::AppState;
use app::app::workflow::level_type::WorkflowLevelTypeApp;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/workflowleveltype/", get(list).post(create))
        .route(
            "/workflowleveltype/{id}/",
            get(retrieve).put(update).patch(partial_update).delete(destroy),
        )
}

async fn list(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    params: Params,
) -> ApiResult<Json<ListResponse<WorkflowLevelTypeRepr>>> {
    let params = params?.0;
    let app = &state.app_module.workflow_level_type_app;
    let (limit, offset) = (params.limit(state.config.max_limit), params.offset());
    let results: Vec<WorkflowLevelTypeRepr> = app
        .find_workflow_level_type_list(&requester, limit.as_ref(), offset.as_ref())
        .await?
        .iter()
        .map(WorkflowLevelTypeRepr::from)
        .collect();
    let list = into_list(&params, results, app.count_workflow_level_types(&requester)).await?;
    Ok(Json(list))
}

async fn create(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    body: Body,
) -> ApiResult<(StatusCode, Json<WorkflowLevelTypeRepr>)> {
    let input: WorkflowLevelTypeInput = from_json(body?.0)?;
    let level_type = state
        .app_module
        .workflow_level_type_app
        .create_workflow_level_type(&requester, &input)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(WorkflowLevelTypeRepr::from(&level_type)),
    ))
}

async fn retrieve(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
) -> ApiResult<Json<WorkflowLevelTypeRepr>> {
    let uuid = lookup_uuid(&id)?;
    state
        .app_module
        .workflow_level_type_app
        .find_workflow_level_type(&requester, &uuid)
        .await?
        .map(|t| Json(WorkflowLevelTypeRepr::from(&t)))
        .ok_or_else(AppError::not_found)
}

async fn update(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Json<WorkflowLevelTypeRepr>> {
    let uuid = lookup_uuid(&id)?;
    let input: WorkflowLevelTypeInput = from_json(body?.0)?;
    let level_type = state
        .app_module
        .workflow_level_type_app
        .update_workflow_level_type(&requester, &uuid, &input)
        .await?;
    Ok(Json(WorkflowLevelTypeRepr::from(&level_type)))
}

async fn partial_update(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Json<WorkflowLevelTypeRepr>> {
    let uuid = lookup_uuid(&id)?;
    let app = &state.app_module.workflow_level_type_app;
    let current = app
        .find_workflow_level_type(&requester, &uuid)
        .await?
        .ok_or_else(AppError::not_found)?;
    let input = patched(&current.data, body?.0)?;
    let level_type = app
        .update_workflow_level_type(&requester, &uuid, &input)
        .await?;
    Ok(Json(WorkflowLevelTypeRepr::from(&level_type)))
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
            .workflow_level_type_app
            .delete_workflow_level_type(&requester, &uuid)
            .await?,
    )
}
