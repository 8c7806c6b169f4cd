use crate::infra::parse_uuid_column;
use chrono::{DateTime, Utc};
use model::{WorkflowTeam, WorkflowTeamData};

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct WorkflowTeamRow {
    pub id: i64,
    pub team_uuid: String,
    pub workflow_user_id: i64,
    pub workflowlevel1_id: i64,
    pub role_id: Option<i64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}

impl WorkflowTeamRow {
    pub fn to_model(&self) -> WorkflowTeam {
        WorkflowTeam {
            id: self.id,
            team_uuid: parse_uuid_column("workflow_team", self.id, &self.team_uuid),
            data: WorkflowTeamData {
                workflow_user_id: self.workflow_user_id,
                workflowlevel1_id: self.workflowlevel1_id,
                role_id: self.role_id,
                start_date: self.start_date,
                end_date: self.end_date,
                status: self.status.clone(),
            },
            create_date: self.create_date,
            edit_date: self.edit_date,
        }
    }
}
