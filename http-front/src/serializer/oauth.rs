//! OAuth applications and issued tokens.

use super::core::CoreUserRepr;
use anyhow::Result;
use chrono::{DateTime, Utc};
use infra::infra::core_user::rdb::CoreUserRepository;
use infra::infra::module::RdbRepositoryModule;
use infra::infra::oauth::access_token::AccessTokenRepository;
use model::{AccessToken, Application, ApplicationData, AuthorizationGrantType, ClientType, RefreshToken};
use serde::{Deserialize, Serialize};

/// client credentials are generated and read-only
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApplicationRepr {
    pub id: i64,
    pub authorization_grant_type: AuthorizationGrantType,
    pub client_id: String,
    pub client_secret: String,
    pub client_type: ClientType,
    pub name: String,
    pub redirect_uris: String,
}

impl From<&Application> for ApplicationRepr {
    fn from(a: &Application) -> Self {
        Self {
            id: a.id,
            authorization_grant_type: a.data.authorization_grant_type,
            client_id: a.data.client_id.clone(),
            client_secret: a.data.client_secret.clone(),
            client_type: a.data.client_type,
            name: a.data.name.clone(),
            redirect_uris: a.data.redirect_uris.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplicationInput {
    pub authorization_grant_type: AuthorizationGrantType,
    pub client_type: ClientType,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub redirect_uris: String,
}

impl From<&Application> for ApplicationInput {
    fn from(a: &Application) -> Self {
        Self {
            authorization_grant_type: a.data.authorization_grant_type,
            client_type: a.data.client_type,
            name: a.data.name.clone(),
            redirect_uris: a.data.redirect_uris.clone(),
        }
    }
}

impl From<ApplicationInput> for ApplicationData {
    fn from(i: ApplicationInput) -> Self {
        ApplicationData {
            authorization_grant_type: i.authorization_grant_type,
            client_type: i.client_type,
            name: i.name,
            redirect_uris: i.redirect_uris,
            ..Default::default()
        }
    }
}

async fn user_repr(
    repositories: &RdbRepositoryModule,
    user_id: Option<i64>,
) -> Result<Option<CoreUserRepr>> {
    match user_id {
        Some(id) => match repositories.core_user_repository.find(id).await? {
            Some(user) => Ok(Some(CoreUserRepr::build(repositories, &user).await?)),
            None => Ok(None),
        },
        None => Ok(None),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AccessTokenRepr {
    pub id: i64,
    pub user: Option<CoreUserRepr>,
    pub token: String,
    pub expires: DateTime<Utc>,
}

impl AccessTokenRepr {
    pub async fn build(repositories: &RdbRepositoryModule, token: &AccessToken) -> Result<Self> {
        Ok(Self {
            id: token.id,
            user: user_repr(repositories, token.data.user_id).await?,
            token: token.data.token.clone(),
            expires: token.data.expires,
        })
    }

    pub async fn build_list(
        repositories: &RdbRepositoryModule,
        tokens: &[AccessToken],
    ) -> Result<Vec<Self>> {
        let mut reprs = Vec::with_capacity(tokens.len());
        for token in tokens {
            reprs.push(Self::build(repositories, token).await?);
        }
        Ok(reprs)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RefreshTokenRepr {
    pub id: i64,
    pub user: Option<CoreUserRepr>,
    pub token: String,
    pub access_token: Option<AccessTokenRepr>,
    pub revoked: Option<DateTime<Utc>>,
}

impl RefreshTokenRepr {
    pub async fn build(repositories: &RdbRepositoryModule, token: &RefreshToken) -> Result<Self> {
        let access_token = match token.data.access_token_id {
            Some(id) => match repositories.access_token_repository.find(id).await? {
                Some(a) => Some(AccessTokenRepr::build(repositories, &a).await?),
                None => None,
            },
            None => None,
        };
        Ok(Self {
            id: token.id,
            user: user_repr(repositories, Some(token.data.user_id)).await?,
            token: token.data.token.clone(),
            access_token,
            revoked: token.data.revoked,
        })
    }

    pub async fn build_list(
        repositories: &RdbRepositoryModule,
        tokens: &[RefreshToken],
    ) -> Result<Vec<Self>> {
        let mut reprs = Vec::with_capacity(tokens.len());
        for token in tokens {
            reprs.push(Self::build(repositories, token).await?);
        }
        Ok(reprs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_input_ignores_credentials() {
        let input: ApplicationInput = serde_json::from_value(serde_json::json!({
            "authorization_grant_type": "password",
            "client_type": "public",
            "name": "frontend",
            "client_id": "forged"
        }))
        .unwrap();
        let data = ApplicationData::from(input);
        assert_eq!(data.client_type, ClientType::Public);
        assert_eq!(data.authorization_grant_type, AuthorizationGrantType::Password);
        assert!(data.client_id.is_empty());
    }
}
