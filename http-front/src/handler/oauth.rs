//! `oauth/application`, `oauth/accesstoken` and `oauth/refreshtoken`.
//! Tokens are list / retrieve / destroy only.

use super::{deleted, into_list, lookup_id, ApiResult, Body, Params};
use crate::error::AppError;
use crate::serializer::oauth::{AccessTokenRepr, ApplicationInput, ApplicationRepr, RefreshTokenRepr};
use crate::serializer::{from_json, patched};
use crate::server::auth::Auth;
use crate::server::pagination::ListResponse;
use crate::server::AppState;
use app::app::oauth::OAuthApp;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/oauth/application/",
            get(list_applications).post(create_application),
        )
        .route(
            "/oauth/application/{id}/",
            get(retrieve_application)
                .put(update_application)
                .patch(partial_update_application)
                .delete(destroy_application),
        )
        .route("/oauth/accesstoken/", get(list_access_tokens))
        .route(
            "/oauth/accesstoken/{id}/",
            get(retrieve_access_token).delete(destroy_access_token),
        )
        .route("/oauth/refreshtoken/", get(list_refresh_tokens))
        .route(
            "/oauth/refreshtoken/{id}/",
            get(retrieve_refresh_token).delete(destroy_refresh_token),
        )
}

async fn list_applications(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    params: Params,
) -> ApiResult<Json<ListResponse<ApplicationRepr>>> {
    let params = params?.0;
    let app = &state.app_module.oauth_app;
    let (limit, offset) = (params.limit(state.config.max_limit), params.offset());
    let results: Vec<ApplicationRepr> = app
        .find_application_list(&requester, limit.as_ref(), offset.as_ref())
        .await?
        .iter()
        .map(ApplicationRepr::from)
        .collect();
    let list = into_list(&params, results, app.count_applications(&requester)).await?;
    Ok(Json(list))
}

async fn create_application(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    body: Body,
) -> ApiResult<(StatusCode, Json<ApplicationRepr>)> {
    let input: ApplicationInput = from_json(body?.0)?;
    let application = state
        .app_module
        .oauth_app
        .create_application(&requester, &input.into())
        .await?;
    Ok((StatusCode::CREATED, Json(ApplicationRepr::from(&application))))
}

async fn retrieve_application(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
) -> ApiResult<Json<ApplicationRepr>> {
    let id = lookup_id(&id)?;
    state
        .app_module
        .oauth_app
        .find_application(&requester, id)
        .await?
        .map(|a| Json(ApplicationRepr::from(&a)))
        .ok_or_else(AppError::not_found)
}

async fn update_application(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Json<ApplicationRepr>> {
    let id = lookup_id(&id)?;
    let input: ApplicationInput = from_json(body?.0)?;
    let application = state
        .app_module
        .oauth_app
        .update_application(&requester, id, &input.into())
        .await?;
    Ok(Json(ApplicationRepr::from(&application)))
}

async fn partial_update_application(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Json<ApplicationRepr>> {
    let id = lookup_id(&id)?;
    let app = &state.app_module.oauth_app;
    let current = app
        .find_application(&requester, id)
        .await?
        .ok_or_else(AppError::not_found)?;
    let input = patched(&ApplicationInput::from(&current), body?.0)?;
    let application = app
        .update_application(&requester, id, &input.into())
        .await?;
    Ok(Json(ApplicationRepr::from(&application)))
}

async fn destroy_application(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = lookup_id(&id)?;
    deleted(
        state
            .app_module
            .oauth_app
            .delete_application(&requester, id)
            .await?,
    )
}

async fn list_access_tokens(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    params: Params,
) -> ApiResult<Json<ListResponse<AccessTokenRepr>>> {
    let params = params?.0;
    let app = &state.app_module.oauth_app;
    let (limit, offset) = (params.limit(state.config.max_limit), params.offset());
    let tokens = app
        .find_access_token_list(&requester, limit.as_ref(), offset.as_ref())
        .await?;
    let results = AccessTokenRepr::build_list(&state.app_module.repositories, &tokens).await?;
    let list = into_list(&params, results, app.count_access_tokens(&requester)).await?;
    Ok(Json(list))
}

async fn retrieve_access_token(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
) -> ApiResult<Json<AccessTokenRepr>> {
    let id = lookup_id(&id)?;
    let token = state
        .app_module
        .oauth_app
        .find_access_token(&requester, id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(Json(
        AccessTokenRepr::build(&state.app_module.repositories, &token).await?,
    ))
}

async fn destroy_access_token(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = lookup_id(&id)?;
    deleted(
        state
            .app_module
            .oauth_app
            .delete_access_token(&requester, id)
            .await?,
    )
}

async fn list_refresh_tokens(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    params: Params,
) -> ApiResult<Json<ListResponse<RefreshTokenRepr>>> {
    let params = params?.0;
    let app = &state.app_module.oauth_app;
    let (limit, offset) = (params.limit(state.config.max_limit), params.offset());
    let tokens = app
        .find_refresh_token_list(&requester, limit.as_ref(), offset.as_ref())
        .await?;
    let results = RefreshTokenRepr::build_list(&state.app_module.repositories, &tokens).await?;
    let list = into_list(&params, results, app.count_refresh_tokens(&requester)).await?;
    Ok(Json(list))
}

async fn retrieve_refresh_token(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
) -> ApiResult<Json<RefreshTokenRepr>> {
    let id = lookup_id(&id)?;
    let token = state
        .app_module
        .oauth_app
        .find_refresh_token(&requester, id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(Json(
        RefreshTokenRepr::build(&state.app_module.repositories, &token).await?,
    ))
}

async fn destroy_refresh_token(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = lookup_id(&id)?;
    deleted(
        state
            .app_module
            .oauth_app
            .delete_refresh_token(&requester, id)
            .await?,
    )
}
