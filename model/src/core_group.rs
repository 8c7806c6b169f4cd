use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct CoreGroupData {
    pub name: String,
    pub organization_id: Option<i64>,
    pub is_global: bool,
    pub is_org_level: bool,
    /// crud bits (create: 8, read: 4, update: 2, delete: 1)
    pub permissions: i32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CoreGroup {
    pub id: i64,
    pub uuid: Uuid,
    pub data: CoreGroupData,
    pub workflowlevel1s: Vec<i64>,
    pub workflowlevel2s: Vec<i64>,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}
