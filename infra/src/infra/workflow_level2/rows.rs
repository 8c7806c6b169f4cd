use crate::infra::parse_uuid_column;
use chrono::{DateTime, NaiveDate, Utc};
use model::{WorkflowLevel2, WorkflowLevel2Data};

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct WorkflowLevel2Row {
    pub id: i64,
    pub level2_uuid: String,
    pub workflowlevel1_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub short_name: Option<String>,
    pub parent_workflowlevel2: i64,
    pub type_id: Option<i64>,
    pub status_id: Option<i64>,
    pub created_by_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub expected_start_date: Option<NaiveDate>,
    pub expected_end_date: Option<NaiveDate>,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}

impl WorkflowLevel2Row {
    pub fn to_model(&self) -> WorkflowLevel2 {
        WorkflowLevel2 {
            id: self.id,
            level2_uuid: parse_uuid_column("workflow_level2", self.id, &self.level2_uuid),
            data: WorkflowLevel2Data {
                workflowlevel1_id: self.workflowlevel1_id,
                name: self.name.clone(),
                description: self.description.clone(),
                notes: self.notes.clone(),
                short_name: self.short_name.clone(),
                parent_workflowlevel2: self.parent_workflowlevel2,
                type_id: self.type_id,
                status_id: self.status_id,
                created_by_id: self.created_by_id,
                start_date: self.start_date,
                end_date: self.end_date,
                expected_start_date: self.expected_start_date,
                expected_end_date: self.expected_end_date,
            },
            create_date: self.create_date,
            edit_date: self.edit_date,
        }
    }
}

/// list conditions shared by the workflowlevel1 children
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkflowLevel1ChildFilter {
    /// organization of the parent workflowlevel1
    pub organization_id: Option<i64>,
    pub workflowlevel1_id: Option<i64>,
}
