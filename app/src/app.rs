pub mod auth;
pub mod core_group;
pub mod core_user;
pub mod email;
pub mod hook;
pub mod internationalization;
pub mod oauth;
pub mod organization;
pub mod password;
pub mod token;
pub mod workflow;

use bifrost_base::error::BifrostError;
use bifrost_base::settings::Settings;

pub trait UseSettings {
    fn settings(&self) -> &Settings;
}

/// list page with the total count of the filtered rows
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub count: i64,
    pub results: Vec<T>,
}

/// unique constraint violations as a field validation error
pub(crate) fn unique_violation_to_validation(
    err: anyhow::Error,
    field: &str,
    message: &str,
) -> anyhow::Error {
    match err.downcast_ref::<BifrostError>() {
        Some(e) if e.is_unique_violation() => {
            BifrostError::validation_field(field, message).into()
        }
        _ => err,
    }
}

const EMAIL_PATTERN: &str = r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@(localhost|([A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63})$";

pub fn is_valid_email(email: &str) -> bool {
    match regex::Regex::new(EMAIL_PATTERN) {
        Ok(re) => re.is_match(email),
        Err(e) => {
            tracing::error!("invalid email pattern: {:?}", e);
            false
        }
    }
}

/// resolve `path` against `base` (plain concatenation if base is not a url)
pub fn url_join(base: &str, path: &str) -> String {
    url::Url::parse(base)
        .and_then(|b| b.join(path))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| format!("{}{}", base, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("first.last+tag@sub.example.co.jp"));
        assert!(is_valid_email("webmaster@localhost"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("space in@example.com"));
    }

    #[test]
    fn test_url_join() {
        assert_eq!(
            url_join("http://localhost:3000/", "reset-password/"),
            "http://localhost:3000/reset-password/"
        );
        assert_eq!(
            url_join("http://localhost:3000/app/", "/register/"),
            "http://localhost:3000/register/"
        );
        assert_eq!(url_join("front/", "register/"), "front/register/");
    }
}
