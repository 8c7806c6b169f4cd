use crate::infra::parse_uuid_column;
use chrono::{DateTime, Utc};
use model::{WorkflowLevelType, WorkflowLevelTypeData};

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct WorkflowLevelTypeRow {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}

impl WorkflowLevelTypeRow {
    pub fn to_model(&self) -> WorkflowLevelType {
        WorkflowLevelType {
            id: self.id,
            uuid: parse_uuid_column("workflow_level_type", self.id, &self.uuid),
            data: WorkflowLevelTypeData {
                name: self.name.clone(),
            },
            create_date: self.create_date,
            edit_date: self.edit_date,
        }
    }
}
