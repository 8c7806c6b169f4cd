use crate::error::AppError;
use crate::handler::{deleted, into_list, lookup_uuid, ApiResult, Body, Params};
use crate::serializer::workflow::{
    WorkflowLevel2Input, WorkflowLevel2NameRepr, WorkflowLevel2Repr,
};
use crate::serializer::{from_json, patched};
use crate::server::auth::Auth;
use crate::server::pagination::ListResponse;
use crate::server::AppState;
use app::app::workflow::level2::WorkflowLevel2App;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/workflowlevel2/", get(list).post(create))
        .route("/workflowlevel2/names/", get(list_names))
        .route(
            "/workflowlevel2/{id}/",
            get(retrieve).put(update).patch(partial_update).delete(destroy),
        )
}

async fn list(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    params: Params,
) -> ApiResult<Json<ListResponse<WorkflowLevel2Repr>>> {
    let params = params?.0;
    let app = &state.app_module.workflow_level2_app;
    let (limit, offset) = (params.limit(state.config.max_limit), params.offset());
    let results: Vec<WorkflowLevel2Repr> = app
        .find_workflow_level2_list(
            &requester,
            params.workflowlevel1,
            limit.as_ref(),
            offset.as_ref(),
        )
        .await?
        .iter()
        .map(WorkflowLevel2Repr::from)
        .collect();
    let count = app.count_workflow_level2s(&requester, params.workflowlevel1);
    Ok(Json(into_list(&params, results, count).await?))
}

/// compact listing (`level2_uuid` and `name`)
async fn list_names(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    params: Params,
) -> ApiResult<Json<ListResponse<WorkflowLevel2NameRepr>>> {
    let params = params?.0;
    let app = &state.app_module.workflow_level2_app;
    let (limit, offset) = (params.limit(state.config.max_limit), params.offset());
    let results: Vec<WorkflowLevel2NameRepr> = app
        .find_workflow_level2_list(
            &requester,
            params.workflowlevel1,
            limit.as_ref(),
            offset.as_ref(),
        )
        .await?
        .iter()
        .map(WorkflowLevel2NameRepr::from)
        .collect();
    let count = app.count_workflow_level2s(&requester, params.workflowlevel1);
    Ok(Json(into_list(&params, results, count).await?))
}

async fn create(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    body: Body,
) -> ApiResult<(StatusCode, Json<WorkflowLevel2Repr>)> {
    let input: WorkflowLevel2Input = from_json(body?.0)?;
    let level2 = state
        .app_module
        .workflow_level2_app
        .create_workflow_level2(&requester, &input.into())
        .await?;
    Ok((StatusCode::CREATED, Json(WorkflowLevel2Repr::from(&level2))))
}

async fn retrieve(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
) -> ApiResult<Json<WorkflowLevel2Repr>> {
    let uuid = lookup_uuid(&id)?;
    state
        .app_module
        .workflow_level2_app
        .find_workflow_level2(&requester, &uuid)
        .await?
        .map(|w| Json(WorkflowLevel2Repr::from(&w)))
        .ok_or_else(AppError::not_found)
}

async fn update(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Json<WorkflowLevel2Repr>> {
    let uuid = lookup_uuid(&id)?;
    let input: WorkflowLevel2Input = from_json(body?.0)?;
    let level2 = state
        .app_module
        .workflow_level2_app
        .update_workflow_level2(&requester, &uuid, &input.into())
        .await?;
    Ok(Json(WorkflowLevel2Repr::from(&level2)))
}

async fn partial_update(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Json<WorkflowLevel2Repr>> {
    let uuid = lookup_uuid(&id)?;
    let app = &state.app_module.workflow_level2_app;
    let current = app
        .find_workflow_level2(&requester, &uuid)
        .await?
        .ok_or_else(AppError::not_found)?;
    let input = patched(&WorkflowLevel2Input::from(&current), body?.0)?;
    let level2 = app
        .update_workflow_level2(&requester, &uuid, &input.into())
        .await?;
    Ok(Json(WorkflowLevel2Repr::from(&level2)))
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
            .workflow_level2_app
            .delete_workflow_level2(&requester, &uuid)
            .await?,
    )
}
