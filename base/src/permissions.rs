//! Bit packed CRUD permissions of core groups.
//!
//! The integer stored on a group is read as four binary digits in
//! `create, read, update, delete` order, so `9` (`0b1001`) grants create
//! and delete only. Clients exchange the unpacked form:
//!
//! ```
//! use bifrost_base::permissions::{Permissions, PermissionsRepr};
//! let repr = Permissions::from_value(9).to_representation();
//! assert_eq!(repr, PermissionsRepr { create: true, read: false, update: false, delete: true });
//! ```

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

pub const PERMISSIONS_ORG_ADMIN: i32 = 0b1111;
pub const PERMISSIONS_ADMIN: i32 = 0b1111;
pub const PERMISSIONS_WORKFLOW_ADMIN: i32 = PERMISSIONS_ADMIN;
pub const PERMISSIONS_WORKFLOW_TEAM: i32 = 0b1110;
pub const PERMISSIONS_VIEW_ONLY: i32 = 0b0100;

pub const INCORRECT_KEYS_MESSAGE: &str = "Permissions field: incorrect keys format";
pub const INVALID_BOOLEAN_MESSAGE: &str = "Must be a valid boolean.";

const KEYS: [&str; 4] = ["create", "read", "update", "delete"];
const MAX_VALUE: i32 = 0b1111;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum PermissionAction {
    Create,
    Read,
    Update,
    Delete,
}

impl PermissionAction {
    fn bit(&self) -> u8 {
        match self {
            PermissionAction::Create => 0b1000,
            PermissionAction::Read => 0b0100,
            PermissionAction::Update => 0b0010,
            PermissionAction::Delete => 0b0001,
        }
    }
}

/// unpacked representation (field order is the wire order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PermissionsRepr {
    pub create: bool,
    pub read: bool,
    pub update: bool,
    pub delete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Permissions(u8);

impl Permissions {
    /// values above 15 are treated as full permissions
    pub fn from_value(value: i32) -> Self {
        Self(value.clamp(0, MAX_VALUE) as u8)
    }

    pub fn value(&self) -> i32 {
        self.0 as i32
    }

    pub fn has(&self, action: PermissionAction) -> bool {
        self.0 & action.bit() != 0
    }

    pub fn to_representation(&self) -> PermissionsRepr {
        PermissionsRepr {
            create: self.has(PermissionAction::Create),
            read: self.has(PermissionAction::Read),
            update: self.has(PermissionAction::Update),
            delete: self.has(PermissionAction::Delete),
        }
    }

    pub fn from_representation(repr: &PermissionsRepr) -> Self {
        let bits = [repr.create, repr.read, repr.update, repr.delete]
            .iter()
            .fold(0u8, |acc, b| (acc << 1) | (*b as u8));
        Self(bits)
    }

    /// Parse the wire object: every value must be a boolean and the key set
    /// must be exactly create/read/update/delete.
    pub fn to_internal_value(data: &serde_json::Value) -> Result<i32, String> {
        let map = data.as_object().ok_or_else(|| {
            format!(
                "Expected a dictionary of items but got type \"{}\".",
                json_type_name(data)
            )
        })?;
        let mut parsed = std::collections::BTreeMap::new();
        for (k, v) in map {
            let b = parse_boolean(v).ok_or_else(|| INVALID_BOOLEAN_MESSAGE.to_string())?;
            parsed.insert(k.as_str(), b);
        }
        if parsed.len() != KEYS.len() || !KEYS.iter().all(|k| parsed.contains_key(k)) {
            return Err(INCORRECT_KEYS_MESSAGE.to_string());
        }
        let repr = PermissionsRepr {
            create: parsed["create"],
            read: parsed["read"],
            update: parsed["update"],
            delete: parsed["delete"],
        };
        Ok(Self::from_representation(&repr).value())
    }
}

// boolean field coercion (true/false, 1/0 and their common text forms)
fn parse_boolean(v: &serde_json::Value) -> Option<bool> {
    match v {
        serde_json::Value::Bool(b) => Some(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        serde_json::Value::String(s) => match s.to_lowercase().as_str() {
            "true" | "t" | "1" | "yes" | "y" | "on" => Some(true),
            "false" | "f" | "0" | "no" | "n" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn json_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "NoneType",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "int",
        serde_json::Value::String(_) => "str",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "dict",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_representation() {
        assert_eq!(
            serde_json::to_value(Permissions::from_value(9).to_representation()).unwrap(),
            json!({"create": true, "read": false, "update": false, "delete": true})
        );
        assert_eq!(
            Permissions::from_value(0).to_representation(),
            PermissionsRepr::default()
        );
        assert_eq!(
            Permissions::from_value(PERMISSIONS_VIEW_ONLY).to_representation(),
            PermissionsRepr {
                create: false,
                read: true,
                update: false,
                delete: false
            }
        );
    }

    #[test]
    fn test_to_representation_clamps_large_values() {
        let all = PermissionsRepr {
            create: true,
            read: true,
            update: true,
            delete: true,
        };
        assert_eq!(Permissions::from_value(16).to_representation(), all);
        assert_eq!(Permissions::from_value(255).to_representation(), all);
    }

    #[test]
    fn test_wire_key_order() {
        let text = serde_json::to_string(&Permissions::from_value(6).to_representation()).unwrap();
        assert_eq!(
            text,
            r#"{"create":false,"read":true,"update":true,"delete":false}"#
        );
    }

    #[test]
    fn test_to_internal_value() {
        let v = json!({"create": true, "read": false, "update": false, "delete": true});
        assert_eq!(Permissions::to_internal_value(&v), Ok(9));
        let v = json!({"delete": "true", "update": 1, "read": "on", "create": false});
        assert_eq!(Permissions::to_internal_value(&v), Ok(7));
    }

    #[test]
    fn test_to_internal_value_rejects_wrong_keys() {
        let missing = json!({"create": true, "read": false, "update": false});
        assert_eq!(
            Permissions::to_internal_value(&missing),
            Err(INCORRECT_KEYS_MESSAGE.to_string())
        );
        let extra =
            json!({"create": true, "read": false, "update": false, "delete": true, "x": true});
        assert_eq!(
            Permissions::to_internal_value(&extra),
            Err(INCORRECT_KEYS_MESSAGE.to_string())
        );
    }

    #[test]
    fn test_to_internal_value_rejects_non_boolean() {
        let v = json!({"create": "maybe", "read": false, "update": false, "delete": true});
        assert_eq!(
            Permissions::to_internal_value(&v),
            Err(INVALID_BOOLEAN_MESSAGE.to_string())
        );
        assert!(Permissions::to_internal_value(&json!([1, 2]))
            .unwrap_err()
            .contains("\"list\""));
    }

    #[test]
    fn test_has() {
        let p = Permissions::from_value(PERMISSIONS_WORKFLOW_TEAM);
        assert!(p.has(PermissionAction::Create));
        assert!(p.has(PermissionAction::Read));
        assert!(p.has(PermissionAction::Update));
        assert!(!p.has(PermissionAction::Delete));
    }
}
