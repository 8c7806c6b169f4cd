use super::{deleted, into_list, lookup_id, ApiResult, Body, Params};
use crate::error::AppError;
use crate::serializer::hook::{HookInput, HookRepr};
use crate::serializer::{from_json, patched};
use crate::server::auth::Auth;
use crate::server::pagination::ListResponse;
use crate::server::AppState;
use app::app::hook::HookApp;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/webhook/", get(list).post(create)).route(
        "/webhook/{id}/",
        get(retrieve).put(update).patch(partial_update).delete(destroy),
    )
}

async fn list(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    params: Params,
) -> ApiResult<Json<ListResponse<HookRepr>>> {
    let params = params?.0;
    let app = &state.app_module.hook_app;
    let (limit, offset) = (params.limit(state.config.max_limit), params.offset());
    let results: Vec<HookRepr> = app
        .find_hook_list(&requester, limit.as_ref(), offset.as_ref())
        .await?
        .iter()
        .map(HookRepr::from)
        .collect();
    let list = into_list(&params, results, app.count_hooks(&requester)).await?;
    Ok(Json(list))
}

async fn create(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    body: Body,
) -> ApiResult<(StatusCode, Json<HookRepr>)> {
    let input: HookInput = from_json(body?.0)?;
    let hook = state
        .app_module
        .hook_app
        .create_hook(&requester, &input.event, &input.target)
        .await?;
    Ok((StatusCode::CREATED, Json(HookRepr::from(&hook))))
}

async fn retrieve(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
) -> ApiResult<Json<HookRepr>> {
    let id = lookup_id(&id)?;
    state
        .app_module
        .hook_app
        .find_hook(&requester, id)
        .await?
        .map(|h| Json(HookRepr::from(&h)))
        .ok_or_else(AppError::not_found)
}

async fn update(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Json<HookRepr>> {
    let id = lookup_id(&id)?;
    let input: HookInput = from_json(body?.0)?;
    let hook = state
        .app_module
        .hook_app
        .update_hook(&requester, id, &input.event, &input.target)
        .await?;
    Ok(Json(HookRepr::from(&hook)))
}

async fn partial_update(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Json<HookRepr>> {
    let id = lookup_id(&id)?;
    let app = &state.app_module.hook_app;
    let current = app
        .find_hook(&requester, id)
        .await?
        .ok_or_else(AppError::not_found)?;
    let input = patched(&HookInput::from(&current), body?.0)?;
    let hook = app
        .update_hook(&requester, id, &input.event, &input.target)
        .await?;
    Ok(Json(HookRepr::from(&hook)))
}

async fn destroy(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = lookup_id(&id)?;
    deleted(state.app_module.hook_app.delete_hook(&requester, id).await?)
}
