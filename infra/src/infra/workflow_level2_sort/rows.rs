use chrono::{DateTime, Utc};
use model::{WorkflowLevel2Sort, WorkflowLevel2SortData};

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct WorkflowLevel2SortRow {
    pub id: i64,
    pub workflowlevel1_id: Option<i64>,
    pub workflowlevel2_parent_id: Option<i64>,
    pub workflowlevel2_pk: i64,
    /// json array text
    pub sort_array: String,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}

impl WorkflowLevel2SortRow {
    pub fn to_model(&self) -> WorkflowLevel2Sort {
        let sort_array = serde_json::from_str::<Vec<serde_json::Value>>(&self.sort_array)
            .unwrap_or_else(|e| {
                tracing::warn!(
                    "broken sort_array in workflow_level2_sort: id={}, {:?}",
                    self.id,
                    e
                );
                vec![]
            });
        WorkflowLevel2Sort {
            id: self.id,
            data: WorkflowLevel2SortData {
                workflowlevel1_id: self.workflowlevel1_id,
                workflowlevel2_parent_id: self.workflowlevel2_parent_id,
                workflowlevel2_pk: self.workflowlevel2_pk,
                sort_array,
            },
            create_date: self.create_date,
            edit_date: self.edit_date,
        }
    }
}
