use crate::infra::parse_uuid_column;
use chrono::{DateTime, Utc};
use model::{CoreGroup, CoreGroupData};

// db row definitions
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct CoreGroupRow {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    pub organization_id: Option<i64>,
    pub is_global: bool,
    pub is_org_level: bool,
    pub permissions: i32,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}

impl CoreGroupRow {
    pub fn to_model(&self, workflowlevel1s: Vec<i64>, workflowlevel2s: Vec<i64>) -> CoreGroup {
        CoreGroup {
            id: self.id,
            uuid: parse_uuid_column("core_group", self.id, &self.uuid),
            data: CoreGroupData {
                name: self.name.clone(),
                organization_id: self.organization_id,
                is_global: self.is_global,
                is_org_level: self.is_org_level,
                permissions: self.permissions,
            },
            workflowlevel1s,
            workflowlevel2s,
            create_date: self.create_date,
            edit_date: self.edit_date,
        }
    }
}
