//! OAuth2 applications and tokens. Tokens are issued by the admin cli and
//! resolved to a [`Requester`] on every authenticated request.

use super::auth::{AuthenticatedToken, Requester, TokenCache, UseTokenCache};
use super::core_user::{CoreUserApp, CoreUserAppImpl, UseCoreUserApp};
use super::UseSettings;
use anyhow::Result;
use async_trait::async_trait;
use bifrost_base::error::BifrostError;
use bifrost_base::limits::{ACCESS_TOKEN_BYTES, CLIENT_ID_BYTES, CLIENT_SECRET_BYTES};
use bifrost_base::settings::Settings;
use chrono::Duration;
use command_utils::util::datetime;
use command_utils::util::token::token_urlsafe;
use infra::infra::core_user::rdb::{CoreUserRepository, UseCoreUserRepository};
use infra::infra::module::{RdbRepositoryModule, UseRdbRepositoryModule};
use infra::infra::oauth::access_token::{AccessTokenRepository, UseAccessTokenRepository};
use infra::infra::oauth::application::{ApplicationRepository, UseApplicationRepository};
use infra::infra::oauth::refresh_token::{RefreshTokenRepository, UseRefreshTokenRepository};
use infra_utils::infra::cache::{MokaCache, UseMokaCache};
use infra_utils::infra::rdb::UseRdbPool;
use model::{
    AccessToken, AccessTokenData, Application, ApplicationData, AuthorizationGrantType,
    RefreshToken, RefreshTokenData,
};
use std::sync::Arc;

pub const AUTHENTICATION_FAILED: &str = "Authentication credentials were not provided.";
pub const INVALID_TOKEN: &str = "Invalid token.";

/// issued access token and its refresh token (only with an application)
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedToken {
    pub access_token: AccessToken,
    pub refresh_token: Option<RefreshToken>,
}

fn validate_application(data: &ApplicationData) -> Result<()> {
    let needs_redirect = matches!(
        data.authorization_grant_type,
        AuthorizationGrantType::AuthorizationCode | AuthorizationGrantType::Implicit
    );
    if needs_redirect && data.redirect_uris.trim().is_empty() {
        return Err(BifrostError::validation_field(
            "redirect_uris",
            "Redirect URIs are required for this grant type.",
        )
        .into());
    }
    for uri in data.redirect_uris.split_whitespace() {
        if url::Url::parse(uri).is_err() {
            return Err(BifrostError::validation_field(
                "redirect_uris",
                format!("Enter a valid URL: {}", uri),
            )
            .into());
        }
    }
    Ok(())
}

#[async_trait]
pub trait OAuthApp:
    UseApplicationRepository
    + UseAccessTokenRepository
    + UseRefreshTokenRepository
    + UseCoreUserRepository
    + UseCoreUserApp
    + UseSettings
    + UseMokaCache<Arc<String>, AuthenticatedToken>
    + UseTokenCache
    + Send
    + Sync
{
    /// token rows of the requester (superusers see every row)
    fn user_filter(requester: &Requester) -> Option<i64> {
        if requester.is_superuser() {
            None
        } else {
            Some(requester.id())
        }
    }

    fn token_cache_key(token: &str) -> Arc<String> {
        Arc::new(format!("at:{}", token))
    }

    /// client_id and client_secret of the input are replaced with generated ones
    async fn create_application(
        &self,
        requester: &Requester,
        data: &ApplicationData,
    ) -> Result<Application> {
        validate_application(data)?;
        let data = ApplicationData {
            client_id: token_urlsafe(CLIENT_ID_BYTES),
            client_secret: token_urlsafe(CLIENT_SECRET_BYTES),
            user_id: Some(requester.id()),
            ..data.clone()
        };
        let repo = self.application_repository();
        repo.create(repo.db_pool(), &data).await
    }

    /// credentials and owner are kept
    async fn update_application(
        &self,
        requester: &Requester,
        id: i64,
        data: &ApplicationData,
    ) -> Result<Application> {
        let current = self
            .find_application(requester, id)
            .await?
            .ok_or_else(|| BifrostError::NotFound(format!("application not found: id = {}", id)))?;
        validate_application(data)?;
        let data = ApplicationData {
            client_id: current.data.client_id.clone(),
            client_secret: current.data.client_secret.clone(),
            user_id: current.data.user_id,
            ..data.clone()
        };
        let repo = self.application_repository();
        repo.update(repo.db_pool(), id, &data).await?;
        repo.find(id)
            .await?
            .ok_or_else(|| BifrostError::NotFound(format!("application not found: id = {}", id)).into())
    }

    async fn delete_application(&self, requester: &Requester, id: i64) -> Result<bool> {
        if self.find_application(requester, id).await?.is_none() {
            return Ok(false);
        }
        // tokens of the application are removed by the foreign keys
        let deleted = self.application_repository().delete(id).await?;
        self.clear_token_cache();
        Ok(deleted)
    }

    async fn find_application(&self, requester: &Requester, id: i64) -> Result<Option<Application>> {
        let filter = Self::user_filter(requester);
        Ok(self
            .application_repository()
            .find(id)
            .await?
            .filter(|a| filter.is_none() || a.data.user_id == filter))
    }

    async fn find_application_list(
        &self,
        requester: &Requester,
        limit: Option<&i32>,
        offset: Option<&i64>,
    ) -> Result<Vec<Application>> {
        self.application_repository()
            .find_list(Self::user_filter(requester), limit, offset)
            .await
    }

    async fn count_applications(&self, requester: &Requester) -> Result<i64> {
        let repo = self.application_repository();
        repo.count_list_tx(repo.db_pool(), Self::user_filter(requester))
            .await
    }

    async fn find_access_token(&self, requester: &Requester, id: i64) -> Result<Option<AccessToken>> {
        let filter = Self::user_filter(requester);
        Ok(self
            .access_token_repository()
            .find(id)
            .await?
            .filter(|t| filter.is_none() || t.data.user_id == filter))
    }

    async fn find_access_token_list(
        &self,
        requester: &Requester,
        limit: Option<&i32>,
        offset: Option<&i64>,
    ) -> Result<Vec<AccessToken>> {
        self.access_token_repository()
            .find_list(Self::user_filter(requester), limit, offset)
            .await
    }

    async fn count_access_tokens(&self, requester: &Requester) -> Result<i64> {
        let repo = self.access_token_repository();
        repo.count_list_tx(repo.db_pool(), Self::user_filter(requester))
            .await
    }

    async fn delete_access_token(&self, requester: &Requester, id: i64) -> Result<bool> {
        let Some(current) = self.find_access_token(requester, id).await? else {
            return Ok(false);
        };
        self.delete_cache(&Self::token_cache_key(&current.data.token))
            .await;
        self.access_token_repository().delete(id).await
    }

    async fn find_refresh_token(
        &self,
        requester: &Requester,
        id: i64,
    ) -> Result<Option<RefreshToken>> {
        let filter = Self::user_filter(requester);
        Ok(self
            .refresh_token_repository()
            .find(id)
            .await?
            .filter(|t| filter.is_none() || Some(t.data.user_id) == filter))
    }

    async fn find_refresh_token_list(
        &self,
        requester: &Requester,
        limit: Option<&i32>,
        offset: Option<&i64>,
    ) -> Result<Vec<RefreshToken>> {
        self.refresh_token_repository()
            .find_list(Self::user_filter(requester), limit, offset)
            .await
    }

    async fn count_refresh_tokens(&self, requester: &Requester) -> Result<i64> {
        let repo = self.refresh_token_repository();
        repo.count_list_tx(repo.db_pool(), Self::user_filter(requester))
            .await
    }

    async fn delete_refresh_token(&self, requester: &Requester, id: i64) -> Result<bool> {
        if self.find_refresh_token(requester, id).await?.is_none() {
            return Ok(false);
        }
        self.refresh_token_repository().delete(id).await
    }

    /// Issue a bearer token of the user (and a refresh token when an
    /// application is given). Records the login time of the user.
    async fn issue_token(
        &self,
        user_id: i64,
        application_id: Option<i64>,
        scope: &str,
    ) -> Result<IssuedToken> {
        let user = self
            .core_user_repository()
            .find(user_id)
            .await?
            .ok_or_else(|| BifrostError::NotFound(format!("core_user not found: id = {}", user_id)))?;
        if !user.data.is_active {
            return Err(BifrostError::InvalidParameter(format!(
                "user {} is not active",
                &user.data.username
            ))
            .into());
        }
        if let Some(app_id) = application_id {
            if self.application_repository().find(app_id).await?.is_none() {
                return Err(BifrostError::NotFound(format!(
                    "application not found: id = {}",
                    app_id
                ))
                .into());
            }
        }
        let now = datetime::now();
        let mut tx = self
            .access_token_repository()
            .db_pool()
            .begin()
            .await
            .map_err(BifrostError::DBError)?;
        let access_token = self
            .access_token_repository()
            .create(
                &mut *tx,
                &AccessTokenData {
                    user_id: Some(user.id),
                    token: token_urlsafe(ACCESS_TOKEN_BYTES),
                    application_id,
                    expires: now + Duration::seconds(self.settings().access_token_expire_seconds),
                    scope: scope.to_string(),
                },
            )
            .await?;
        let refresh_token = match application_id {
            Some(app_id) => Some(
                self.refresh_token_repository()
                    .create(
                        &mut *tx,
                        &RefreshTokenData {
                            user_id: user.id,
                            token: token_urlsafe(ACCESS_TOKEN_BYTES),
                            application_id: app_id,
                            access_token_id: Some(access_token.id),
                            revoked: None,
                        },
                    )
                    .await?,
            ),
            None => None,
        };
        tx.commit().await.map_err(BifrostError::DBError)?;
        self.core_user_repository()
            .update_last_login(user.id, &now)
            .await?;
        tracing::info!("issued access token {} for user {}", access_token.id, user.id);
        Ok(IssuedToken {
            access_token,
            refresh_token,
        })
    }

    /// Revoke refresh tokens and delete access tokens which have expired.
    /// Returns the number of deleted access tokens.
    async fn clear_expired_tokens(&self) -> Result<u64> {
        let now = datetime::now();
        let refresh_tokens = self
            .refresh_token_repository()
            .find_list(None, None, None)
            .await?;
        for rt in refresh_tokens.iter().filter(|t| t.data.revoked.is_none()) {
            let expired = match rt.data.access_token_id {
                Some(at_id) => self
                    .access_token_repository()
                    .find(at_id)
                    .await?
                    .map_or(true, |at| at.is_expired(&now)),
                None => false,
            };
            if expired {
                self.refresh_token_repository().revoke(rt.id, &now).await?;
            }
        }
        let deleted = self.access_token_repository().delete_expired(&now).await?;
        self.clear_token_cache();
        Ok(deleted)
    }

    /// resolve a bearer token to its (active) user
    async fn authenticate(&self, bearer: Option<&str>) -> Result<Requester> {
        let token = match bearer.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return Err(BifrostError::Unauthorized(AUTHENTICATION_FAILED.to_string()).into()),
        };
        let now = datetime::now();
        let key = Self::token_cache_key(token);
        let found = self
            .with_cache_if_some(&key, || async {
                let Some(at) = self.access_token_repository().find_by_token(token).await? else {
                    return Ok(None);
                };
                let Some(user_id) = at.data.user_id else {
                    return Ok(None);
                };
                Ok(self
                    .core_user_app()
                    .find_requester(user_id)
                    .await?
                    .map(|requester| AuthenticatedToken {
                        requester,
                        expires: at.data.expires,
                    }))
            })
            .await?;
        match found {
            Some(auth) if auth.expires > now && auth.requester.user.data.is_active => {
                Ok(auth.requester)
            }
            Some(_) => {
                self.delete_cache(&key).await;
                Err(BifrostError::Unauthorized(INVALID_TOKEN.to_string()).into())
            }
            None => Err(BifrostError::Unauthorized(INVALID_TOKEN.to_string()).into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OAuthAppImpl {
    settings: Arc<Settings>,
    repositories: Arc<RdbRepositoryModule>,
    core_user_app: Arc<CoreUserAppImpl>,
    token_cache: TokenCache,
}

impl OAuthAppImpl {
    pub fn new(
        settings: Arc<Settings>,
        repositories: Arc<RdbRepositoryModule>,
        core_user_app: Arc<CoreUserAppImpl>,
        token_cache: TokenCache,
    ) -> Self {
        Self {
            settings,
            repositories,
            core_user_app,
            token_cache,
        }
    }
}

impl UseRdbRepositoryModule for OAuthAppImpl {
    fn rdb_repository_module(&self) -> &RdbRepositoryModule {
        &self.repositories
    }
}

impl UseSettings for OAuthAppImpl {
    fn settings(&self) -> &Settings {
        &self.settings
    }
}

impl UseCoreUserApp for OAuthAppImpl {
    fn core_user_app(&self) -> &CoreUserAppImpl {
        &self.core_user_app
    }
}

impl UseMokaCache<Arc<String>, AuthenticatedToken> for OAuthAppImpl {
    fn cache(&self) -> &MokaCache<Arc<String>, AuthenticatedToken> {
        self.token_cache.cache()
    }
}

impl UseTokenCache for OAuthAppImpl {
    fn token_cache(&self) -> &TokenCache {
        &self.token_cache
    }
}

impl OAuthApp for OAuthAppImpl {}

pub trait UseOAuthApp {
    fn oauth_app(&self) -> &OAuthAppImpl;
}
