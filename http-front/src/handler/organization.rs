use super::{deleted, into_list, lookup_uuid, ApiResult, Body, Params};
use crate::error::AppError;
use crate::serializer::organization::{OrganizationInput, OrganizationRepr};
use crate::serializer::{from_json, patched};
use crate::server::auth::Auth;
use crate::server::pagination::ListResponse;
use crate::server::AppState;
use app::app::organization::OrganizationApp;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/organization/", get(list).post(create))
        .route(
            "/organization/{id}/",
            get(retrieve).put(update).patch(partial_update).delete(destroy),
        )
}

async fn list(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    params: Params,
) -> ApiResult<Json<ListResponse<OrganizationRepr>>> {
    let params = params?.0;
    let app = &state.app_module.organization_app;
    let (limit, offset) = (params.limit(state.config.max_limit), params.offset());
    let results: Vec<OrganizationRepr> = app
        .find_organization_list(&requester, limit.as_ref(), offset.as_ref())
        .await?
        .iter()
        .map(OrganizationRepr::from)
        .collect();
    let list = into_list(&params, results, app.count_organizations(&requester)).await?;
    Ok(Json(list))
}

async fn create(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    body: Body,
) -> ApiResult<(StatusCode, Json<OrganizationRepr>)> {
    let input: OrganizationInput = from_json(body?.0)?;
    let organization = state
        .app_module
        .organization_app
        .create_organization(&requester, &input.into())
        .await?;
    Ok((StatusCode::CREATED, Json(OrganizationRepr::from(&organization))))
}

async fn retrieve(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
) -> ApiResult<Json<OrganizationRepr>> {
    let uuid = lookup_uuid(&id)?;
    state
        .app_module
        .organization_app
        .find_organization(&requester, &uuid)
        .await?
        .map(|o| Json(OrganizationRepr::from(&o)))
        .ok_or_else(AppError::not_found)
}

async fn update(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Json<OrganizationRepr>> {
    let uuid = lookup_uuid(&id)?;
    let input: OrganizationInput = from_json(body?.0)?;
    let organization = state
        .app_module
        .organization_app
        .update_organization(&requester, &uuid, &input.into())
        .await?;
    Ok(Json(OrganizationRepr::from(&organization)))
}

async fn partial_update(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Json<OrganizationRepr>> {
    let uuid = lookup_uuid(&id)?;
    let app = &state.app_module.organization_app;
    let current = app
        .find_organization(&requester, &uuid)
        .await?
        .ok_or_else(AppError::not_found)?;
    let input = patched(&OrganizationInput::from(&current), body?.0)?;
    let organization = app
        .update_organization(&requester, &uuid, &input.into())
        .await?;
    Ok(Json(OrganizationRepr::from(&organization)))
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
            .organization_app
            .delete_organization(&requester, &uuid)
            .await?,
    )
}
