//! The list carries the nested workflowlevel1 of each membership, single
//! records only its id.

use crate::error::AppError;
use crate::handler::{deleted, into_list, lookup_id, ApiResult, Body, Params};
use crate::serializer::workflow::{WorkflowTeamInput, WorkflowTeamListFullRepr, WorkflowTeamRepr};
use crate::serializer::{from_json, patched};
use crate::server::auth::Auth;
use crate::server::pagination::ListResponse;
use crate::server::AppState;
use app::app::workflow::team::WorkflowTeamApp;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/workflowteam/", get(list).post(create))
        .route(
            "/workflowteam/{id}/",
            get(retrieve).put(update).patch(partial_update).delete(destroy),
        )
}

async fn list(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    params: Params,
) -> ApiResult<Json<ListResponse<WorkflowTeamListFullRepr>>> {
    let params = params?.0;
    let app = &state.app_module.workflow_team_app;
    let (limit, offset) = (params.limit(state.config.max_limit), params.offset());
    let results: Vec<WorkflowTeamListFullRepr> = app
        .find_workflow_team_list_full(
            &requester,
            params.workflowlevel1,
            limit.as_ref(),
            offset.as_ref(),
        )
        .await?
        .iter()
        .map(WorkflowTeamListFullRepr::from)
        .collect();
    let count = app.count_workflow_teams(&requester, params.workflowlevel1);
    Ok(Json(into_list(&params, results, count).await?))
}

async fn create(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    body: Body,
) -> ApiResult<(StatusCode, Json<WorkflowTeamRepr>)> {
    let input: WorkflowTeamInput = from_json(body?.0)?;
    let team = state
        .app_module
        .workflow_team_app
        .create_workflow_team(&requester, &input.into())
        .await?;
    Ok((StatusCode::CREATED, Json(WorkflowTeamRepr::from(&team))))
}

async fn retrieve(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
) -> ApiResult<Json<WorkflowTeamRepr>> {
    let id = lookup_id(&id)?;
    state
        .app_module
        .workflow_team_app
        .find_workflow_team(&requester, id)
        .await?
        .map(|t| Json(WorkflowTeamRepr::from(&t)))
        .ok_or_else(AppError::not_found)
}

async fn update(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Json<WorkflowTeamRepr>> {
    let id = lookup_id(&id)?;
    let input: WorkflowTeamInput = from_json(body?.0)?;
    let team = state
        .app_module
        .workflow_team_app
        .update_workflow_team(&requester, id, &input.into())
        .await?;
    Ok(Json(WorkflowTeamRepr::from(&team)))
}

async fn partial_update(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Json<WorkflowTeamRepr>> {
    let id = lookup_id(&id)?;
    let app = &state.app_module.workflow_team_app;
    let current = app
        .find_workflow_team(&requester, id)
        .await?
        .ok_or_else(AppError::not_found)?;
    let input = patched(&WorkflowTeamInput::from(&current), body?.0)?;
    let team = app
        .update_workflow_team(&requester, id, &input.into())
        .await?;
    Ok(Json(WorkflowTeamRepr::from(&team)))
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
            .workflow_team_app
            .delete_workflow_team(&requester, id)
            .await?,
    )
}
