use anyhow::Result;
use serde::Deserialize;

use crate::error::BifrostError;

/// Application wide settings read from the environment (no prefix).
///
/// # Environment Variables
/// - `SECRET_KEY`: signing key for invitation jwt and password reset tokens
/// - `FRONTEND_URL`: base url of the frontend used in emailed links
/// - `RESETPASS_CONFIRM_URL_PATH`: path (relative to FRONTEND_URL) of the reset confirm page
/// - `REGISTRATION_URL_PATH`: path of the registration page for invitations
/// - `DEFAULT_ORG`: organization whose email templates are the fallback
/// - `WEBHOOK_TARGET_URL`: target every webhook is delivered to
/// - `INVITATION_EXPIRATION_HOURS`: invitation token lifetime (default: 72)
/// - `PASSWORD_RESET_TIMEOUT_DAYS`: reset token lifetime (default: 3)
/// - `ACCESS_TOKEN_EXPIRE_SECONDS`: lifetime of issued access tokens (default: 36000)
/// - `DEFAULT_FROM_EMAIL`: sender address of outgoing mails
/// - `PASSWORD_HASH_ITERATIONS`: pbkdf2 rounds of new password hashes (default: 260000)
#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    #[serde(default = "default_secret_key")]
    pub secret_key: String,
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
    #[serde(default = "default_resetpass_confirm_url_path")]
    pub resetpass_confirm_url_path: String,
    #[serde(default = "default_registration_url_path")]
    pub registration_url_path: String,
    #[serde(default = "default_org")]
    pub default_org: String,
    #[serde(default = "default_webhook_target_url")]
    pub webhook_target_url: String,
    #[serde(default = "default_invitation_expiration_hours")]
    pub invitation_expiration_hours: i64,
    #[serde(default = "default_password_reset_timeout_days")]
    pub password_reset_timeout_days: i64,
    #[serde(default = "default_access_token_expire_seconds")]
    pub access_token_expire_seconds: i64,
    #[serde(default = "default_from_email")]
    pub default_from_email: String,
    #[serde(default = "default_password_hash_iterations")]
    pub password_hash_iterations: u32,
}

fn default_secret_key() -> String {
    "insecure-development-secret-key".to_string()
}
fn default_frontend_url() -> String {
    "http://localhost:3000/".to_string()
}
fn default_resetpass_confirm_url_path() -> String {
    "reset-password/".to_string()
}
fn default_registration_url_path() -> String {
    "register/".to_string()
}
fn default_org() -> String {
    "Default Organization".to_string()
}
fn default_webhook_target_url() -> String {
    "http://productsservice:8080/webhook/".to_string()
}
fn default_invitation_expiration_hours() -> i64 {
    72
}
fn default_password_reset_timeout_days() -> i64 {
    3
}
fn default_access_token_expire_seconds() -> i64 {
    36000
}
fn default_from_email() -> String {
    "webmaster@localhost".to_string()
}
fn default_password_hash_iterations() -> u32 {
    260_000
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            secret_key: default_secret_key(),
            frontend_url: default_frontend_url(),
            resetpass_confirm_url_path: default_resetpass_confirm_url_path(),
            registration_url_path: default_registration_url_path(),
            default_org: default_org(),
            webhook_target_url: default_webhook_target_url(),
            invitation_expiration_hours: default_invitation_expiration_hours(),
            password_reset_timeout_days: default_password_reset_timeout_days(),
            access_token_expire_seconds: default_access_token_expire_seconds(),
            default_from_email: default_from_email(),
            password_hash_iterations: default_password_hash_iterations(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let settings = envy::from_env::<Settings>().map_err(|e| {
            BifrostError::ConfigurationError(format!("cannot read settings from env: {:?}", e))
        })?;
        if settings.secret_key == default_secret_key() {
            tracing::warn!("SECRET_KEY is not set. Using insecure development key.");
        }
        Ok(settings)
    }
}
