//! Translations are readable without authentication.

use super::{deleted, into_list, lookup_id, ApiResult, Body, Params};
use crate::error::AppError;
use crate::serializer::internationalization::{InternationalizationInput, InternationalizationRepr};
use crate::serializer::{from_json, patched};
use crate::server::auth::Auth;
use crate::server::pagination::ListResponse;
use crate::server::AppState;
use app::app::internationalization::InternationalizationApp;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/internationalization/", get(list).post(create))
        .route(
            "/internationalization/{id}/",
            get(retrieve).put(update).patch(partial_update).delete(destroy),
        )
}

async fn list(
    State(state): State<Arc<AppState>>,
    params: Params,
) -> ApiResult<Json<ListResponse<InternationalizationRepr>>> {
    let params = params?.0;
    let app = &state.app_module.internationalization_app;
    let (limit, offset) = (params.limit(state.config.max_limit), params.offset());
    let language = params.language.as_deref();
    let results: Vec<InternationalizationRepr> = app
        .find_internationalization_list(language, limit.as_ref(), offset.as_ref())
        .await?
        .iter()
        .map(InternationalizationRepr::from)
        .collect();
    let list = into_list(&params, results, app.count_internationalizations(language)).await?;
    Ok(Json(list))
}

async fn create(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    body: Body,
) -> ApiResult<(StatusCode, Json<InternationalizationRepr>)> {
    let input: InternationalizationInput = from_json(body?.0)?;
    let i18n = state
        .app_module
        .internationalization_app
        .create_internationalization(&requester, &input.into())
        .await?;
    Ok((StatusCode::CREATED, Json(InternationalizationRepr::from(&i18n))))
}

async fn retrieve(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<InternationalizationRepr>> {
    let id = lookup_id(&id)?;
    state
        .app_module
        .internationalization_app
        .find_internationalization(id)
        .await?
        .map(|i| Json(InternationalizationRepr::from(&i)))
        .ok_or_else(AppError::not_found)
}

async fn update(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Json<InternationalizationRepr>> {
    let id = lookup_id(&id)?;
    let input: InternationalizationInput = from_json(body?.0)?;
    let i18n = state
        .app_module
        .internationalization_app
        .update_internationalization(&requester, id, &input.into())
        .await?;
    Ok(Json(InternationalizationRepr::from(&i18n)))
}

async fn partial_update(
    State(state): State<Arc<AppState>>,
    Auth(requester): Auth,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Json<InternationalizationRepr>> {
    let id = lookup_id(&id)?;
    let app = &state.app_module.internationalization_app;
    let current = app
        .find_internationalization(id)
        .await?
        .ok_or_else(AppError::not_found)?;
    let input = patched(&InternationalizationInput::from(&current), body?.0)?;
    let i18n = app
        .update_internationalization(&requester, id, &input.into())
        .await?;
    Ok(Json(InternationalizationRepr::from(&i18n)))
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
            .internationalization_app
            .delete_internationalization(&requester, id)
            .await?,
    )
}
