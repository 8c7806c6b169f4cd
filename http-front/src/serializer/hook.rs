use chrono::{DateTime, Utc};
use model::Hook;
use serde::{Deserialize, Serialize};

/// `user` is read-only (the requester)
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HookRepr {
    pub id: i64,
    pub user: i64,
    pub event: String,
    pub target: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl From<&Hook> for HookRepr {
    fn from(h: &Hook) -> Self {
        Self {
            id: h.id,
            user: h.data.user_id,
            event: h.data.event.clone(),
            target: h.data.target.clone(),
            created: h.created,
            updated: h.updated,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HookInput {
    pub event: String,
    pub target: String,
}

impl From<&Hook> for HookInput {
    fn from(h: &Hook) -> Self {
        Self {
            event: h.data.event.clone(),
            target: h.data.target.clone(),
        }
    }
}
