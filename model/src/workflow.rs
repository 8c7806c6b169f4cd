use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct WorkflowLevelTypeData {
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WorkflowLevelType {
    pub id: i64,
    pub uuid: Uuid,
    pub data: WorkflowLevelTypeData,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct WorkflowLevelStatusData {
    pub order: i32,
    pub name: String,
    pub short_name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WorkflowLevelStatus {
    pub id: i64,
    pub uuid: Uuid,
    pub data: WorkflowLevelStatusData,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct WorkflowLevel1Data {
    pub name: String,
    pub unique_id: Option<String>,
    pub organization_id: Option<i64>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sort: i32,
    pub user_access: Vec<i64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WorkflowLevel1 {
    pub id: i64,
    pub level1_uuid: Uuid,
    pub data: WorkflowLevel1Data,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct WorkflowLevel2Data {
    pub workflowlevel1_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub short_name: Option<String>,
    /// 0: no parent
    pub parent_workflowlevel2: i64,
    pub type_id: Option<i64>,
    pub status_id: Option<i64>,
    pub created_by_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub expected_start_date: Option<NaiveDate>,
    pub expected_end_date: Option<NaiveDate>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WorkflowLevel2 {
    pub id: i64,
    pub level2_uuid: Uuid,
    pub data: WorkflowLevel2Data,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct WorkflowLevel2SortData {
    pub workflowlevel1_id: Option<i64>,
    pub workflowlevel2_parent_id: Option<i64>,
    pub workflowlevel2_pk: i64,
    pub sort_array: Vec<serde_json::Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WorkflowLevel2Sort {
    pub id: i64,
    pub data: WorkflowLevel2SortData,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct WorkflowTeamData {
    pub workflow_user_id: i64,
    pub workflowlevel1_id: i64,
    /// CoreGroup used as the role of the member
    pub role_id: Option<i64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WorkflowTeam {
    pub id: i64,
    pub team_uuid: Uuid,
    pub data: WorkflowTeamData,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}
