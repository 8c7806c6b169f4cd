use super::{deleted, into_list, lookup_id, ApiResult, Body, Params};
use crate::error::AppError;
use crate::serializer::core::{CoreGroupInput, CoreGroupRepr};
use crate::serializer::{from_json, patched};
use crate::server::auth::Auth;
use crate::server::pagination::ListResponse;
use crate::server::AppState;
use app::app::core_group::CoreGroupApp;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/coregroups/", get(list).post(create))
        .route(
            "/coregroups/{id}/",
            get(retrieve).put(update).patch(partial_update).delete(destroy),
        )
}

async fn list(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    params: Params,
) -> ApiResult<Json<ListResponse<CoreGroupRepr>>> {
    let params = params?.0;
    let app = &state.app_module.core_group_app;
    let (limit, offset) = (params.limit(state.config.max_limit), params.offset());
    let groups = app
        .find_core_group_list(&requester, limit.as_ref(), offset.as_ref())
        .await?;
    let results = CoreGroupRepr::build_list(&state.app_module.repositories, &groups).await?;
    let list = into_list(&params, results, app.count_core_groups(&requester)).await?;
    Ok(Json(list))
}

async fn create(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    body: Body,
) -> ApiResult<(StatusCode, Json<CoreGroupRepr>)> {
    let repositories = &state.app_module.repositories;
    let input: CoreGroupInput = from_json(body?.0)?;
    let data = input.into_data(repositories).await?;
    let group = state
        .app_module
        .core_group_app
        .create_core_group(&requester, &data)
        .await?;
    let repr = CoreGroupRepr::build(repositories, &group).await?;
    Ok((StatusCode::CREATED, Json(repr)))
}

async fn retrieve(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
) -> ApiResult<Json<CoreGroupRepr>> {
    let id = lookup_id(&id)?;
    let group = state
        .app_module
        .core_group_app
        .find_core_group(&requester, id)
        .await?
        .ok_or_else(AppError::not_found)?;
    let repr = CoreGroupRepr::build(&state.app_module.repositories, &group).await?;
    Ok(Json(repr))
}

async fn update(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Json<CoreGroupRepr>> {
    let id = lookup_id(&id)?;
    let repositories = &state.app_module.repositories;
    let input: CoreGroupInput = from_json(body?.0)?;
    let data = input.into_data(repositories).await?;
    let group = state
        .app_module
        .core_group_app
        .update_core_group(&requester, id, &data)
        .await?;
    Ok(Json(CoreGroupRepr::build(repositories, &group).await?))
}

async fn partial_update(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Json<CoreGroupRepr>> {
    let id = lookup_id(&id)?;
    let repositories = &state.app_module.repositories;
    let app = &state.app_module.core_group_app;
    let current = app
        .find_core_group(&requester, id)
        .await?
        .ok_or_else(AppError::not_found)?;
    let base = CoreGroupInput::from_model(repositories, &current).await?;
    let data = patched(&base, body?.0)?.into_data(repositories).await?;
    let group = app.update_core_group(&requester, id, &data).await?;
    Ok(Json(CoreGroupRepr::build(repositories, &group).await?))
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
            .core_group_app
            .delete_core_group(&requester, id)
            .await?,
    )
}
