use crate::infra::parse_uuid_column;
use chrono::{DateTime, Utc};
use model::{WorkflowLevelStatus, WorkflowLevelStatusData};

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct WorkflowLevelStatusRow {
    pub id: i64,
    pub uuid: String,
    pub order: i32,
    pub name: String,
    pub short_name: String,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}

impl WorkflowLevelStatusRow {
    pub fn to_model(&self) -> WorkflowLevelStatus {
        WorkflowLevelStatus {
            id: self.id,
            uuid: parse_uuid_column("workflow_level_status", self.id, &self.uuid),
            data: WorkflowLevelStatusData {
                order: self.order,
                name: self.name.clone(),
                short_name: self.short_name.clone(),
            },
            create_date: self.create_date,
            edit_date: self.edit_date,
        }
    }
}
