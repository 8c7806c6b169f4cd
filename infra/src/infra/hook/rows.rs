use chrono::{DateTime, Utc};
use model::{Hook, HookData};

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct HookRow {
    pub id: i64,
    pub user_id: i64,
    pub event: String,
    pub target: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl HookRow {
    pub fn to_model(&self) -> Hook {
        Hook {
            id: self.id,
            data: HookData {
                user_id: self.user_id,
                event: self.event.clone(),
                target: self.target.clone(),
            },
            created: self.created,
            updated: self.updated,
        }
    }
}
