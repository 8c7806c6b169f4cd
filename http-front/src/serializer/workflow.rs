//! Workflow levels, their master data, sorts and teams.

use app::app::workflow::team::WorkflowTeamWithLevel1;
use chrono::{DateTime, NaiveDate, Utc};
use model::{
    WorkflowLevel1, WorkflowLevel1Data, WorkflowLevel2, WorkflowLevel2Data, WorkflowLevel2Sort,
    WorkflowLevel2SortData, WorkflowLevelStatus, WorkflowLevelStatusData, WorkflowLevelType,
    WorkflowLevelTypeData, WorkflowTeam, WorkflowTeamData,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkflowLevelTypeRepr {
    pub id: Uuid,
    pub name: String,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}

impl From<&WorkflowLevelType> for WorkflowLevelTypeRepr {
    fn from(t: &WorkflowLevelType) -> Self {
        Self {
            id: t.uuid,
            name: t.data.name.clone(),
            create_date: t.create_date,
            edit_date: t.edit_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkflowLevelStatusRepr {
    pub id: Uuid,
    pub order: i32,
    pub name: String,
    pub short_name: String,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}

impl From<&WorkflowLevelStatus> for WorkflowLevelStatusRepr {
    fn from(s: &WorkflowLevelStatus) -> Self {
        Self {
            id: s.uuid,
            order: s.data.order,
            name: s.data.name.clone(),
            short_name: s.data.short_name.clone(),
            create_date: s.create_date,
            edit_date: s.edit_date,
        }
    }
}

// the master data bodies are the model payloads
pub type WorkflowLevelTypeInput = WorkflowLevelTypeData;
pub type WorkflowLevelStatusInput = WorkflowLevelStatusData;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkflowLevel1Repr {
    pub id: i64,
    pub level1_uuid: Uuid,
    pub unique_id: Option<String>,
    pub name: String,
    pub organization: Option<i64>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sort: i32,
    pub user_access: Vec<i64>,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}

impl From<&WorkflowLevel1> for WorkflowLevel1Repr {
    fn from(w: &WorkflowLevel1) -> Self {
        Self {
            id: w.id,
            level1_uuid: w.level1_uuid,
            unique_id: w.data.unique_id.clone(),
            name: w.data.name.clone(),
            organization: w.data.organization_id,
            description: w.data.description.clone(),
            start_date: w.data.start_date,
            end_date: w.data.end_date,
            sort: w.data.sort,
            user_access: w.data.user_access.clone(),
            create_date: w.create_date,
            edit_date: w.edit_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowLevel1Input {
    pub name: String,
    #[serde(default)]
    pub unique_id: Option<String>,
    #[serde(default)]
    pub organization: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub sort: i32,
    #[serde(default)]
    pub user_access: Vec<i64>,
}

impl From<&WorkflowLevel1> for WorkflowLevel1Input {
    fn from(w: &WorkflowLevel1) -> Self {
        Self {
            name: w.data.name.clone(),
            unique_id: w.data.unique_id.clone(),
            organization: w.data.organization_id,
            description: w.data.description.clone(),
            start_date: w.data.start_date,
            end_date: w.data.end_date,
            sort: w.data.sort,
            user_access: w.data.user_access.clone(),
        }
    }
}

impl From<WorkflowLevel1Input> for WorkflowLevel1Data {
    fn from(i: WorkflowLevel1Input) -> Self {
        Self {
            name: i.name,
            unique_id: i.unique_id,
            organization_id: i.organization,
            description: i.description,
            start_date: i.start_date,
            end_date: i.end_date,
            sort: i.sort,
            user_access: i.user_access,
        }
    }
}

/// `id` is the level2 uuid
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkflowLevel2Repr {
    pub id: Uuid,
    pub level2_uuid: Uuid,
    pub workflowlevel1: i64,
    pub name: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub short_name: Option<String>,
    pub parent_workflowlevel2: i64,
    #[serde(rename = "type")]
    pub r#type: Option<i64>,
    pub status: Option<i64>,
    pub created_by: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub expected_start_date: Option<NaiveDate>,
    pub expected_end_date: Option<NaiveDate>,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}

impl From<&WorkflowLevel2> for WorkflowLevel2Repr {
    fn from(w: &WorkflowLevel2) -> Self {
        Self {
            id: w.level2_uuid,
            level2_uuid: w.level2_uuid,
            workflowlevel1: w.data.workflowlevel1_id,
            name: w.data.name.clone(),
            description: w.data.description.clone(),
            notes: w.data.notes.clone(),
            short_name: w.data.short_name.clone(),
            parent_workflowlevel2: w.data.parent_workflowlevel2,
            r#type: w.data.type_id,
            status: w.data.status_id,
            created_by: w.data.created_by_id,
            start_date: w.data.start_date,
            end_date: w.data.end_date,
            expected_start_date: w.data.expected_start_date,
            expected_end_date: w.data.expected_end_date,
            create_date: w.create_date,
            edit_date: w.edit_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowLevel2Input {
    pub workflowlevel1: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub parent_workflowlevel2: i64,
    #[serde(default, rename = "type")]
    pub r#type: Option<i64>,
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub created_by: Option<i64>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub expected_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub expected_end_date: Option<NaiveDate>,
}

impl From<&WorkflowLevel2> for WorkflowLevel2Input {
    fn from(w: &WorkflowLevel2) -> Self {
        Self {
            workflowlevel1: w.data.workflowlevel1_id,
            name: w.data.name.clone(),
            description: w.data.description.clone(),
            notes: w.data.notes.clone(),
            short_name: w.data.short_name.clone(),
            parent_workflowlevel2: w.data.parent_workflowlevel2,
            r#type: w.data.type_id,
            status: w.data.status_id,
            created_by: w.data.created_by_id,
            start_date: w.data.start_date,
            end_date: w.data.end_date,
            expected_start_date: w.data.expected_start_date,
            expected_end_date: w.data.expected_end_date,
        }
    }
}

impl From<WorkflowLevel2Input> for WorkflowLevel2Data {
    fn from(i: WorkflowLevel2Input) -> Self {
        Self {
            workflowlevel1_id: i.workflowlevel1,
            name: i.name,
            description: i.description,
            notes: i.notes,
            short_name: i.short_name,
            parent_workflowlevel2: i.parent_workflowlevel2,
            type_id: i.r#type,
            status_id: i.status,
            created_by_id: i.created_by,
            start_date: i.start_date,
            end_date: i.end_date,
            expected_start_date: i.expected_start_date,
            expected_end_date: i.expected_end_date,
        }
    }
}

/// `level2_uuid` and `name` only
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkflowLevel2NameRepr {
    pub level2_uuid: Uuid,
    pub name: String,
}

impl From<&WorkflowLevel2> for WorkflowLevel2NameRepr {
    fn from(w: &WorkflowLevel2) -> Self {
        Self {
            level2_uuid: w.level2_uuid,
            name: w.data.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkflowLevel2SortRepr {
    pub id: i64,
    pub workflowlevel1: Option<i64>,
    pub workflowlevel2_parent_id: Option<i64>,
    pub workflowlevel2_pk: i64,
    pub sort_array: Vec<serde_json::Value>,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}

impl From<&WorkflowLevel2Sort> for WorkflowLevel2SortRepr {
    fn from(s: &WorkflowLevel2Sort) -> Self {
        Self {
            id: s.id,
            workflowlevel1: s.data.workflowlevel1_id,
            workflowlevel2_parent_id: s.data.workflowlevel2_parent_id,
            workflowlevel2_pk: s.data.workflowlevel2_pk,
            sort_array: s.data.sort_array.clone(),
            create_date: s.create_date,
            edit_date: s.edit_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowLevel2SortInput {
    #[serde(default)]
    pub workflowlevel1: Option<i64>,
    #[serde(default)]
    pub workflowlevel2_parent_id: Option<i64>,
    #[serde(default)]
    pub workflowlevel2_pk: i64,
    #[serde(default)]
    pub sort_array: Vec<serde_json::Value>,
}

impl From<&WorkflowLevel2Sort> for WorkflowLevel2SortInput {
    fn from(s: &WorkflowLevel2Sort) -> Self {
        Self {
            workflowlevel1: s.data.workflowlevel1_id,
            workflowlevel2_parent_id: s.data.workflowlevel2_parent_id,
            workflowlevel2_pk: s.data.workflowlevel2_pk,
            sort_array: s.data.sort_array.clone(),
        }
    }
}

impl From<WorkflowLevel2SortInput> for WorkflowLevel2SortData {
    fn from(i: WorkflowLevel2SortInput) -> Self {
        Self {
            workflowlevel1_id: i.workflowlevel1,
            workflowlevel2_parent_id: i.workflowlevel2_parent_id,
            workflowlevel2_pk: i.workflowlevel2_pk,
            sort_array: i.sort_array,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkflowTeamRepr {
    pub id: i64,
    pub team_uuid: Uuid,
    pub workflow_user: i64,
    pub workflowlevel1: i64,
    pub role: Option<i64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}

impl From<&WorkflowTeam> for WorkflowTeamRepr {
    fn from(t: &WorkflowTeam) -> Self {
        Self {
            id: t.id,
            team_uuid: t.team_uuid,
            workflow_user: t.data.workflow_user_id,
            workflowlevel1: t.data.workflowlevel1_id,
            role: t.data.role_id,
            start_date: t.data.start_date,
            end_date: t.data.end_date,
            status: t.data.status.clone(),
            create_date: t.create_date,
            edit_date: t.edit_date,
        }
    }
}

/// list form with the level1 nested
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkflowTeamListFullRepr {
    pub id: i64,
    pub team_uuid: Uuid,
    pub workflow_user: i64,
    pub workflowlevel1: Option<WorkflowLevel1Repr>,
    pub role: Option<i64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}

impl From<&WorkflowTeamWithLevel1> for WorkflowTeamListFullRepr {
    fn from(t: &WorkflowTeamWithLevel1) -> Self {
        let team = &t.team;
        Self {
            id: team.id,
            team_uuid: team.team_uuid,
            workflow_user: team.data.workflow_user_id,
            workflowlevel1: t.workflowlevel1.as_ref().map(WorkflowLevel1Repr::from),
            role: team.data.role_id,
            start_date: team.data.start_date,
            end_date: team.data.end_date,
            status: team.data.status.clone(),
            create_date: team.create_date,
            edit_date: team.edit_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowTeamInput {
    pub workflow_user: i64,
    pub workflowlevel1: i64,
    #[serde(default)]
    pub role: Option<i64>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
}

impl From<&WorkflowTeam> for WorkflowTeamInput {
    fn from(t: &WorkflowTeam) -> Self {
        Self {
            workflow_user: t.data.workflow_user_id,
            workflowlevel1: t.data.workflowlevel1_id,
            role: t.data.role_id,
            start_date: t.data.start_date,
            end_date: t.data.end_date,
            status: t.data.status.clone(),
        }
    }
}

impl From<WorkflowTeamInput> for WorkflowTeamData {
    fn from(i: WorkflowTeamInput) -> Self {
        Self {
            workflow_user_id: i.workflow_user,
            workflowlevel1_id: i.workflowlevel1,
            role_id: i.role,
            start_date: i.start_date,
            end_date: i.end_date,
            status: i.status,
        }
    }
}
