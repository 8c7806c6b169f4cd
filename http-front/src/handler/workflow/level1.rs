use crate::error::AppError;
use crate::handler::{deleted, into_list, lookup_id, ApiResult, Body, Params};
use crate::serializer::workflow::{WorkflowLevel1Input, WorkflowLevel1Repr};
use crate::serializer::{from_json, patched};
use crate::server::auth::Auth;
use crate::server::pagination::ListResponse;
use crate::server::AppState;
use app::app::workflow::level1::WorkflowLevel1App;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/workflowlevel1/", get(list).post(create))
        .route(
            "/workflowlevel1/{id}/",
            get(retrieve).put(update).patch(partial_update).delete(destroy),
        )
}

async fn list(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    params: Params,
) -> ApiResult<Json<ListResponse<WorkflowLevel1Repr>>> {
    let params = params?.0;
    let app = &state.app_module.workflow_level1_app;
    let (limit, offset) = (params.limit(state.config.max_limit), params.offset());
    let results: Vec<WorkflowLevel1Repr> = app
        .find_workflow_level1_list(&requester, limit.as_ref(), offset.as_ref())
        .await?
        .iter()
        .map(WorkflowLevel1Repr::from)
        .collect();
    let list = into_list(&params, results, app.count_workflow_level1s(&requester)).await?;
    Ok(Json(list))
}

async fn create(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    body: Body,
) -> ApiResult<(StatusCode, Json<WorkflowLevel1Repr>)> {
    let input: WorkflowLevel1Input = from_json(body?.0)?;
    let level1 = state
        .app_module
        .workflow_level1_app
        .create_workflow_level1(&requester, &input.into())
        .await?;
    Ok((StatusCode::CREATED, Json(WorkflowLevel1Repr::from(&level1))))
}

async fn retrieve(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
) -> ApiResult<Json<WorkflowLevel1Repr>> {
    let id = lookup_id(&id)?;
    state
        .app_module
        .workflow_level1_app
        .find_workflow_level1(&requester, id)
        .await?
        .map(|w| Json(WorkflowLevel1Repr::from(&w)))
        .ok_or_else(AppError::not_found)
}

async fn update(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Json<WorkflowLevel1Repr>> {
    let id = lookup_id(&id)?;
    let input: WorkflowLevel1Input = from_json(body?.0)?;
    let level1 = state
        .app_module
        .workflow_level1_app
        .update_workflow_level1(&requester, id, &input.into())
        .await?;
    Ok(Json(WorkflowLevel1Repr::from(&level1)))
}

async fn partial_update(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Json<WorkflowLevel1Repr>> {
    let id = lookup_id(&id)?;
    let app = &state.app_module.workflow_level1_app;
    let current = app
        .find_workflow_level1(&requester, id)
        .await?
        .ok_or_else(AppError::not_found)?;
    let input = patched(&WorkflowLevel1Input::from(&current), body?.0)?;
    let level1 = app
        .update_workflow_level1(&requester, id, &input.into())
        .await?;
    Ok(Json(WorkflowLevel1Repr::from(&level1)))
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
            .workflow_level1_app
            .delete_workflow_level1(&requester, id)
            .await?,
    )
}
