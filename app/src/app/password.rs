//! Password hashing (`pbkdf2_sha256$<iterations>$<salt>$<base64 hash>`) and
//! password strength validation.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bifrost_base::limits::MIN_PASSWORD_LENGTH;
use model::CoreUserData;
use rand::distr::{Alphanumeric, SampleString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

pub const ALGORITHM: &str = "pbkdf2_sha256";
const SALT_LENGTH: usize = 22;
const HASH_LENGTH: usize = 32;

pub fn make_password(password: &str, iterations: u32) -> String {
    let salt = Alphanumeric.sample_string(&mut rand::rng(), SALT_LENGTH);
    make_password_with_salt(password, &salt, iterations)
}

pub fn make_password_with_salt(password: &str, salt: &str, iterations: u32) -> String {
    format!(
        "{}${}${}${}",
        ALGORITHM,
        iterations,
        salt,
        STANDARD.encode(derive(password, salt, iterations))
    )
}

fn derive(password: &str, salt: &str, iterations: u32) -> [u8; HASH_LENGTH] {
    let mut key = [0u8; HASH_LENGTH];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut key);
    key
}

/// false for unusable (empty) or broken hashes
pub fn check_password(password: &str, encoded: &str) -> bool {
    let parts: Vec<&str> = encoded.splitn(4, '$').collect();
    let [algorithm, iterations, salt, hash] = parts[..] else {
        return false;
    };
    if algorithm != ALGORITHM {
        return false;
    }
    let (Ok(iterations), Ok(expected)) = (iterations.parse::<u32>(), STANDARD.decode(hash)) else {
        return false;
    };
    if iterations == 0 {
        return false;
    }
    let actual = derive(password, salt, iterations);
    actual.as_slice().ct_eq(expected.as_slice()).into()
}

/// messages of all failed rules (empty if acceptable)
pub fn validate_password(password: &str, user: Option<&CoreUserData>) -> Vec<String> {
    let mut errors = Vec::new();
    if let Some(user) = user {
        let lowered = password.to_lowercase();
        let attributes = [
            ("username", user.username.as_str()),
            ("email address", user.email.as_str()),
            (
                "email address",
                user.email.split('@').next().unwrap_or_default(),
            ),
            ("first name", user.first_name.as_str()),
            ("last name", user.last_name.as_str()),
        ];
        if let Some((name, _)) = attributes
            .iter()
            .find(|(_, v)| !v.is_empty() && v.to_lowercase() == lowered)
        {
            errors.push(format!("The password is too similar to the {}.", name));
        }
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(format!(
            "This password is too short. It must contain at least {} characters.",
            MIN_PASSWORD_LENGTH
        ));
    }
    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        errors.push("This password is entirely numeric.".to_string());
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_and_check_password() {
        let encoded = make_password("correct horse", 1000);
        assert!(encoded.starts_with("pbkdf2_sha256$1000$"));
        assert!(check_password("correct horse", &encoded));
        assert!(!check_password("wrong horse", &encoded));
        // salted
        assert_ne!(make_password("correct horse", 1000), encoded);
    }

    #[test]
    fn test_known_hash() {
        // same derivation as other pbkdf2_sha256 implementations
        let encoded = make_password_with_salt("password", "salt", 1);
        assert_eq!(
            encoded,
            "pbkdf2_sha256$1$salt$Eg+2z/z4syxD5yJSVsT4N6hlSMkszDVICAWYfLcL4Xs="
        );
    }

    #[test]
    fn test_check_broken_hash() {
        assert!(!check_password("", ""));
        assert!(!check_password("x", "md5$1$salt$abc"));
        assert!(!check_password("x", "pbkdf2_sha256$zero$salt$abc"));
        assert!(!check_password("x", "pbkdf2_sha256$1$salt$***"));
    }

    #[test]
    fn test_validate_password() {
        let user = CoreUserData {
            username: "alice".to_string(),
            email: "alice.smith@example.com".to_string(),
            ..Default::default()
        };
        assert!(validate_password("a-long-passphrase", Some(&user)).is_empty());
        assert_eq!(
            validate_password("12345678", None),
            vec!["This password is entirely numeric.".to_string()]
        );
        let errors = validate_password("short", None);
        assert_eq!(
            errors,
            vec!["This password is too short. It must contain at least 8 characters.".to_string()]
        );
        let errors = validate_password("Alice.Smith", Some(&user));
        assert_eq!(
            errors,
            vec!["The password is too similar to the email address.".to_string()]
        );
    }
}
