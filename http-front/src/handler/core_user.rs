//! Core users with registration, invitations and password reset.

use super::{deleted, into_list, lookup_id, ApiResult, Body, Params};
use crate::error::AppError;
use crate::serializer::core::{
    CoreUserCreateInput, CoreUserInvitationInput, CoreUserRepr, CoreUserResetPasswordCheckInput,
    CoreUserResetPasswordConfirmInput, CoreUserResetPasswordInput, CoreUserUpdateInput,
};
use crate::serializer::from_json;
use crate::server::auth::Auth;
use crate::server::pagination::ListResponse;
use crate::server::AppState;
use app::app::core_user::CoreUserApp;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/coreuser/", get(list).post(register))
        .route("/coreuser/invite/", post(invite))
        .route("/coreuser/reset_password/", post(reset_password))
        .route("/coreuser/reset_password_check/", post(reset_password_check))
        .route(
            "/coreuser/reset_password_confirm/",
            post(reset_password_confirm),
        )
        .route(
            "/coreuser/{id}/",
            get(retrieve).put(update).patch(update).delete(destroy),
        )
}

async fn list(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    params: Params,
) -> ApiResult<Json<ListResponse<CoreUserRepr>>> {
    let params = params?.0;
    let app = &state.app_module.core_user_app;
    let (limit, offset) = (params.limit(state.config.max_limit), params.offset());
    let users = app
        .find_core_user_list(&requester, limit.as_ref(), offset.as_ref())
        .await?;
    let results = CoreUserRepr::build_list(&state.app_module.repositories, &users).await?;
    let list = into_list(&params, results, app.count_core_users(&requester)).await?;
    Ok(Json(list))
}

/// registration (no authentication)
async fn register(
    State(state): State<Arc<AppState>>,
    body: Body,
) -> ApiResult<(StatusCode, Json<CoreUserRepr>)> {
    let input: CoreUserCreateInput = from_json(body?.0)?;
    let user = state
        .app_module
        .core_user_app
        .register(&input.into())
        .await?;
    let repr = CoreUserRepr::build(&state.app_module.repositories, &user).await?;
    Ok((StatusCode::CREATED, Json(repr)))
}

async fn retrieve(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
) -> ApiResult<Json<CoreUserRepr>> {
    let id = lookup_id(&id)?;
    let user = state
        .app_module
        .core_user_app
        .find_core_user(&requester, id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(Json(
        CoreUserRepr::build(&state.app_module.repositories, &user).await?,
    ))
}

// PUT and PATCH: absent fields are kept
async fn update(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Json<CoreUserRepr>> {
    let id = lookup_id(&id)?;
    let input: CoreUserUpdateInput = from_json(body?.0)?;
    let user = state
        .app_module
        .core_user_app
        .update_core_user(&requester, id, &input.into())
        .await?;
    Ok(Json(
        CoreUserRepr::build(&state.app_module.repositories, &user).await?,
    ))
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
            .core_user_app
            .delete_core_user(&requester, id)
            .await?,
    )
}

async fn invite(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    body: Body,
) -> ApiResult<Json<serde_json::Value>> {
    let input: CoreUserInvitationInput = from_json(body?.0)?;
    let count = state
        .app_module
        .core_user_app
        .invite(&requester, &input.emails)
        .await?;
    Ok(Json(json!({ "count": count })))
}

async fn reset_password(
    State(state): State<Arc<AppState>>,
    body: Body,
) -> ApiResult<Json<serde_json::Value>> {
    let input: CoreUserResetPasswordInput = from_json(body?.0)?;
    let count = state
        .app_module
        .core_user_app
        .reset_password(&input.email)
        .await?;
    Ok(Json(json!({ "count": count })))
}

async fn reset_password_check(
    State(state): State<Arc<AppState>>,
    body: Body,
) -> ApiResult<Json<serde_json::Value>> {
    let input: CoreUserResetPasswordCheckInput = from_json(body?.0)?;
    state
        .app_module
        .core_user_app
        .reset_password_check(&input.uid, &input.token)
        .await?;
    Ok(Json(json!({ "success": true })))
}

async fn reset_password_confirm(
    State(state): State<Arc<AppState>>,
    body: Body,
) -> ApiResult<Json<serde_json::Value>> {
    let input: CoreUserResetPasswordConfirmInput = from_json(body?.0)?;
    state
        .app_module
        .core_user_app
        .reset_password_confirm(
            &input.uid,
            &input.token,
            &input.new_password1,
            &input.new_password2,
        )
        .await?;
    Ok(Json(json!({ "success": true })))
}
