use crate::infra::parse_uuid_column;
use chrono::{DateTime, NaiveDate, Utc};
use model::{WorkflowLevel1, WorkflowLevel1Data};

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct WorkflowLevel1Row {
    pub id: i64,
    pub level1_uuid: String,
    pub unique_id: Option<String>,
    pub name: String,
    pub organization_id: Option<i64>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sort: i32,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}

impl WorkflowLevel1Row {
    pub fn to_model(&self, user_access: Vec<i64>) -> WorkflowLevel1 {
        WorkflowLevel1 {
            id: self.id,
            level1_uuid: parse_uuid_column("workflow_level1", self.id, &self.level1_uuid),
            data: WorkflowLevel1Data {
                name: self.name.clone(),
                unique_id: self.unique_id.clone(),
                organization_id: self.organization_id,
                description: self.description.clone(),
                start_date: self.start_date,
                end_date: self.end_date,
                sort: self.sort,
                user_access,
            },
            create_date: self.create_date,
            edit_date: self.edit_date,
        }
    }
}
