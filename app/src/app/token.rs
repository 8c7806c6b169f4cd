//! Signed tokens: password reset tokens and invitation jwt.

use anyhow::Result;
use bifrost_base::error::BifrostError;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use command_utils::util::datetime;
use hmac::{Hmac, Mac};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use model::CoreUser;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const RESET_TOKEN_KEY_SALT: &str = "bifrost.core_user.PasswordResetTokenGenerator";

fn reset_token_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2001, 1, 1).unwrap_or_default()
}

/// `{days since 2001-01-01 in base36}-{hash}`: invalidated by a password
/// change, a login or its age
#[derive(Debug, Clone)]
pub struct PasswordResetTokenGenerator<'a> {
    secret: &'a str,
    timeout_days: i64,
}

impl<'a> PasswordResetTokenGenerator<'a> {
    pub fn new(secret: &'a str, timeout_days: i64) -> Self {
        Self {
            secret,
            timeout_days,
        }
    }

    pub fn make_token(&self, user: &CoreUser) -> Result<String> {
        self.make_token_at(user, &datetime::now())
    }

    pub fn make_token_at(&self, user: &CoreUser, now: &DateTime<Utc>) -> Result<String> {
        self.make_token_with_timestamp(user, datetime::days_since(reset_token_epoch(), now))
    }

    pub fn check_token(&self, user: &CoreUser, token: &str) -> bool {
        self.check_token_at(user, token, &datetime::now())
    }

    pub fn check_token_at(&self, user: &CoreUser, token: &str, now: &DateTime<Utc>) -> bool {
        let Some((ts_b36, _)) = token.split_once('-') else {
            return false;
        };
        let Some(ts) = base36_decode(ts_b36) else {
            return false;
        };
        let Ok(expected) = self.make_token_with_timestamp(user, ts) else {
            return false;
        };
        if !bool::from(expected.as_bytes().ct_eq(token.as_bytes())) {
            return false;
        }
        datetime::days_since(reset_token_epoch(), now) - ts <= self.timeout_days
    }

    fn make_token_with_timestamp(&self, user: &CoreUser, timestamp: i64) -> Result<String> {
        let login_timestamp = user
            .last_login
            .map(|l| l.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        let value = format!(
            "{}{}{}{}",
            user.id, &user.password, login_timestamp, timestamp
        );
        let key = format!("{}{}", RESET_TOKEN_KEY_SALT, self.secret);
        let mut mac = HmacSha256::new_from_slice(key.as_bytes())
            .map_err(|e| BifrostError::RuntimeError(format!("hmac key: {:?}", e)))?;
        mac.update(value.as_bytes());
        let digest = hex::encode(mac.finalize().into_bytes());
        let hash: String = digest.chars().step_by(2).collect();
        Ok(format!("{}-{}", base36_encode(timestamp), hash))
    }
}

pub fn base36_encode(mut value: i64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value <= 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while value > 0 {
        buf.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    buf.reverse();
    String::from_utf8_lossy(&buf).to_string()
}

pub fn base36_decode(s: &str) -> Option<i64> {
    // limit length to avoid overflow
    if s.is_empty() || s.len() > 12 {
        return None;
    }
    i64::from_str_radix(s, 36).ok().filter(|v| *v >= 0)
}

pub const TOKEN_NOT_VALID: &str = "Token is not valid.";
pub const TOKEN_EXPIRED: &str = "Token is expired.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationClaims {
    pub email: String,
    pub organization_uuid: String,
    pub exp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationTokenError {
    Invalid,
    Expired,
}

impl InvitationTokenError {
    pub fn message(&self) -> &'static str {
        match self {
            InvitationTokenError::Invalid => TOKEN_NOT_VALID,
            InvitationTokenError::Expired => TOKEN_EXPIRED,
        }
    }
}

pub fn encode_invitation_token(
    secret: &str,
    email: &str,
    organization_uuid: &Uuid,
    lifetime_hours: i64,
    now: &DateTime<Utc>,
) -> Result<String> {
    let claims = InvitationClaims {
        email: email.to_string(),
        organization_uuid: organization_uuid.to_string(),
        exp: (*now + Duration::hours(lifetime_hours)).timestamp(),
    };
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| BifrostError::JwtError(e).into())
}

pub fn decode_invitation_token(
    secret: &str,
    token: &str,
) -> Result<InvitationClaims, InvitationTokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    jsonwebtoken::decode::<InvitationClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => InvitationTokenError::Expired,
        _ => InvitationTokenError::Invalid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use model::CoreUserData;

    fn user(password: &str, last_login: Option<DateTime<Utc>>) -> CoreUser {
        let now = Utc::now();
        CoreUser {
            id: 42,
            core_user_uuid: Uuid::new_v4(),
            data: CoreUserData::default(),
            password: password.to_string(),
            core_groups: vec![],
            last_login,
            date_joined: now,
            create_date: now,
            edit_date: now,
        }
    }

    #[test]
    fn test_base36() {
        assert_eq!(base36_encode(0), "0");
        assert_eq!(base36_encode(35), "z");
        assert_eq!(base36_encode(8759), "6rb");
        assert_eq!(base36_decode("6rb"), Some(8759));
        assert_eq!(base36_decode(""), None);
        assert_eq!(base36_decode("-1"), None);
        assert_eq!(base36_decode("zzzzzzzzzzzzzzzz"), None);
    }

    #[test]
    fn test_reset_token_format() -> Result<()> {
        let generator = PasswordResetTokenGenerator::new("secret", 3);
        let at = Utc.with_ymd_and_hms(2001, 1, 11, 0, 0, 0).unwrap();
        let token = generator.make_token_at(&user("pbkdf2_sha256$1$s$h", None), &at)?;
        let (ts, hash) = token.split_once('-').unwrap();
        assert_eq!(ts, "a");
        assert_eq!(hash.len(), 32);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        Ok(())
    }

    #[test]
    fn test_check_reset_token() -> Result<()> {
        let generator = PasswordResetTokenGenerator::new("secret", 3);
        let u = user("pbkdf2_sha256$1$s$h", None);
        let issued = Utc.with_ymd_and_hms(2020, 5, 1, 12, 0, 0).unwrap();
        let token = generator.make_token_at(&u, &issued)?;
        assert!(generator.check_token_at(&u, &token, &issued));
        assert!(generator.check_token_at(&u, &token, &(issued + Duration::days(3))));
        // too old
        assert!(!generator.check_token_at(&u, &token, &(issued + Duration::days(4))));
        // password changed
        let changed = user("pbkdf2_sha256$1$s$other", None);
        assert!(!generator.check_token_at(&changed, &token, &issued));
        // logged in after issuing
        let logged_in = user("pbkdf2_sha256$1$s$h", Some(issued));
        assert!(!generator.check_token_at(&logged_in, &token, &issued));
        // other secret
        let other = PasswordResetTokenGenerator::new("other", 3);
        assert!(!other.check_token_at(&u, &token, &issued));
        assert!(!generator.check_token_at(&u, "broken", &issued));
        assert!(!generator.check_token_at(&u, "!!-abc", &issued));
        Ok(())
    }

    #[test]
    fn test_invitation_token() -> Result<()> {
        let org = Uuid::new_v4();
        let now = Utc::now();
        let token = encode_invitation_token("secret", "new@example.com", &org, 72, &now)?;
        let claims = decode_invitation_token("secret", &token).unwrap();
        assert_eq!(claims.email, "new@example.com");
        assert_eq!(claims.organization_uuid, org.to_string());
        assert_eq!(
            decode_invitation_token("other", &token),
            Err(InvitationTokenError::Invalid)
        );
        assert_eq!(
            decode_invitation_token("secret", "not.a.jwt"),
            Err(InvitationTokenError::Invalid)
        );
        let expired =
            encode_invitation_token("secret", "new@example.com", &org, -1, &now)?;
        let err = decode_invitation_token("secret", &expired).unwrap_err();
        assert_eq!(err, InvitationTokenError::Expired);
        assert_eq!(err.message(), "Token is expired.");
        Ok(())
    }
}
