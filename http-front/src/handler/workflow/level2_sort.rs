use crate::error::AppError;
use crate::handler::{deleted, into_list, lookup_id, ApiResult, Body, Params};
use crate::serializer::workflow::{WorkflowLevel2SortInput, WorkflowLevel2SortRepr};
use crate::serializer::{from_json, patched};
use crate::server::auth::Auth;
use crate::server::pagination::ListResponse;
use crate::server::AppState;
use app::app::workflow::level2_sort::WorkflowLevel2SortApp;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/workflowlevel2sort/", get(list).post(create))
        .route(
            "/workflowlevel2sort/{id}/",
            get(retrieve).put(update).patch(partial_update).delete(destroy),
        )
}

async fn list(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    params: Params,
) -> ApiResult<Json<ListResponse<WorkflowLevel2SortRepr>>> {
    let params = params?.0;
    let app = &state.app_module.workflow_level2_sort_app;
    let (limit, offset) = (params.limit(state.config.max_limit), params.offset());
    let results: Vec<WorkflowLevel2SortRepr> = app
        .find_workflow_level2_sort_list(
            &requester,
            params.workflowlevel1,
            limit.as_ref(),
            offset.as_ref(),
        )
        .await?
        .iter()
        .map(WorkflowLevel2SortRepr::from)
        .collect();
    let count = app.count_workflow_level2_sorts(&requester, params.workflowlevel1);
    Ok(Json(into_list(&params, results, count).await?))
}

async fn create(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    body: Body,
) -> ApiResult<(StatusCode, Json<WorkflowLevel2SortRepr>)> {
    let input: WorkflowLevel2SortInput = from_json(body?.0)?;
    let sort = state
        .app_module
        .workflow_level2_sort_app
        .create_workflow_level2_sort(&requester, &input.into())
        .await?;
    Ok((StatusCode::CREATED, Json(WorkflowLevel2SortRepr::from(&sort))))
}

async fn retrieve(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
) -> ApiResult<Json<WorkflowLevel2SortRepr>> {
    let id = lookup_id(&id)?;
    state
        .app_module
        .workflow_level2_sort_app
        .find_workflow_level2_sort(&requester, id)
        .await?
        .map(|s| Json(WorkflowLevel2SortRepr::from(&s)))
        .ok_or_else(AppError::not_found)
}

async fn update(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Json<WorkflowLevel2SortRepr>> {
    let id = lookup_id(&id)?;
    let input: WorkflowLevel2SortInput = from_json(body?.0)?;
    let sort = state
        .app_module
        .workflow_level2_sort_app
        .update_workflow_level2_sort(&requester, id, &input.into())
        .await?;
    Ok(Json(WorkflowLevel2SortRepr::from(&sort)))
}

async fn partial_update(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Json<WorkflowLevel2SortRepr>> {
    let id = lookup_id(&id)?;
    let app = &state.app_module.workflow_level2_sort_app;
    let current = app
        .find_workflow_level2_sort(&requester, id)
        .await?
        .ok_or_else(AppError::not_found)?;
    let input = patched(&WorkflowLevel2SortInput::from(&current), body?.0)?;
    let sort = app
        .update_workflow_level2_sort(&requester, id, &input.into())
        .await?;
    Ok(Json(WorkflowLevel2SortRepr::from(&sort)))
}

async fn destroy(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = lookup_id(&id)?;
    deleted(
        state
            .app_module
            .workflow_level2_sort_app
            .delete_workflow_level2_sort(&requester, id)
            .await?,
    )
}
