use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct OrganizationData {
    pub name: String,
    pub description: Option<String>,
    pub organization_url: Option<String>,
    pub industry: Option<String>,
    pub phone: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Organization {
    pub id: i64,
    pub organization_uuid: Uuid,
    pub data: OrganizationData,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}
