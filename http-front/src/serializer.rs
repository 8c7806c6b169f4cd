//! Wire representations of the models and request body parsing.

pub mod core;
pub mod hook;
pub mod internationalization;
pub mod oauth;
pub mod organization;
pub mod workflow;

use bifrost_base::error::BifrostError;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// Parse a request body. A missing field is reported as a field validation
/// error, any other mismatch as a bad request.
pub fn from_json<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, BifrostError> {
    serde_json::from_value(value).map_err(|e| {
        let message = e.to_string();
        match message
            .strip_prefix("missing field `")
            .and_then(|s| s.split('`').next())
        {
            Some(field) => BifrostError::validation_field(field, REQUIRED_MESSAGE),
            None => BifrostError::InvalidParameter(format!("JSON parse error - {}", message)),
        }
    })
}

/// Apply a partial update: keys of `patch` replace those of the current input.
pub fn patched<T: Serialize + DeserializeOwned>(
    current: &T,
    patch: serde_json::Value,
) -> Result<T, BifrostError> {
    let mut base = serde_json::to_value(current)?;
    match (base.as_object_mut(), patch) {
        (Some(base_map), serde_json::Value::Object(patch_map)) => {
            for (k, v) in patch_map {
                base_map.insert(k, v);
            }
        }
        (_, other) => {
            return Err(BifrostError::InvalidParameter(format!(
                "Expected a dictionary of items but got {}",
                other
            )))
        }
    }
    from_json(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Input {
        name: String,
        #[serde(default)]
        sort: i32,
    }

    #[test]
    fn test_from_json_missing_field() {
        let err = from_json::<Input>(serde_json::json!({"sort": 1})).unwrap_err();
        match err {
            BifrostError::ValidationError(errors) => {
                assert_eq!(errors.get("name"), Some(&vec![REQUIRED_MESSAGE.to_string()]))
            }
            e => panic!("unexpected error: {:?}", e),
        }
        assert!(matches!(
            from_json::<Input>(serde_json::json!({"name": 1})),
            Err(BifrostError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_patched() {
        let current = Input {
            name: "a".to_string(),
            sort: 3,
        };
        let updated = patched(&current, serde_json::json!({"sort": 5})).unwrap();
        assert_eq!(
            updated,
            Input {
                name: "a".to_string(),
                sort: 5
            }
        );
        assert!(patched(&current, serde_json::json!([1])).is_err());
    }
}
