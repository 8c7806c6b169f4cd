use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ClientType {
    #[default]
    Confidential,
    Public,
}

#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AuthorizationGrantType {
    AuthorizationCode,
    Implicit,
    #[default]
    Password,
    ClientCredentials,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ApplicationData {
    pub client_id: String,
    pub client_secret: String,
    pub client_type: ClientType,
    pub authorization_grant_type: AuthorizationGrantType,
    pub name: String,
    /// space separated uris
    pub redirect_uris: String,
    pub user_id: Option<i64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Application {
    pub id: i64,
    pub data: ApplicationData,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AccessTokenData {
    pub user_id: Option<i64>,
    pub token: String,
    pub application_id: Option<i64>,
    pub expires: DateTime<Utc>,
    pub scope: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AccessToken {
    pub id: i64,
    pub data: AccessTokenData,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl AccessToken {
    pub fn is_expired(&self, now: &DateTime<Utc>) -> bool {
        self.data.expires <= *now
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RefreshTokenData {
    pub user_id: i64,
    pub token: String,
    pub application_id: i64,
    pub access_token_id: Option<i64>,
    pub revoked: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RefreshToken {
    pub id: i64,
    pub data: RefreshTokenData,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}
