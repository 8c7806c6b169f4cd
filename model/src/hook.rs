use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct HookData {
    pub user_id: i64,
    pub event: String,
    pub target: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Hook {
    pub id: i64,
    pub data: HookData,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}
