use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct CoreUserData {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub title: Option<String>,
    pub contact_info: Option<String>,
    pub privacy_disclaimer_accepted: bool,
    pub organization_id: Option<i64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CoreUser {
    pub id: i64,
    pub core_user_uuid: Uuid,
    pub data: CoreUserData,
    /// hashed password (empty: unusable)
    #[serde(default, skip_serializing)]
    pub password: String,
    pub core_groups: Vec<i64>,
    pub last_login: Option<DateTime<Utc>>,
    pub date_joined: DateTime<Utc>,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}
