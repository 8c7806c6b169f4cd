//! Bearer authentication against issued access tokens.

use super::AppState;
use crate::error::AppError;
use app::app::auth::Requester;
use app::app::oauth::OAuthApp;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use std::sync::Arc;

/// Extract Bearer token from Authorization header.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// authenticated requester (401 otherwise)
#[derive(Debug, Clone)]
pub struct Auth(pub Requester);

impl FromRequestParts<Arc<AppState>> for Auth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers);
        let requester = state
            .app_module
            .oauth_app
            .authenticate(token.as_deref())
            .await?;
        Ok(Auth(requester))
    }
}
