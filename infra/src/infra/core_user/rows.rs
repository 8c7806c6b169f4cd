use crate::infra::parse_uuid_column;
use chrono::{DateTime, Utc};
use model::{CoreUser, CoreUserData};

// db row definitions
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct CoreUserRow {
    pub id: i64,
    pub core_user_uuid: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub title: Option<String>,
    pub contact_info: Option<String>,
    pub privacy_disclaimer_accepted: bool,
    pub organization_id: Option<i64>,
    pub last_login: Option<DateTime<Utc>>,
    pub date_joined: DateTime<Utc>,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}

impl CoreUserRow {
    pub fn to_model(&self, core_groups: Vec<i64>) -> CoreUser {
        CoreUser {
            id: self.id,
            core_user_uuid: parse_uuid_column("core_user", self.id, &self.core_user_uuid),
            data: CoreUserData {
                username: self.username.clone(),
                email: self.email.clone(),
                first_name: self.first_name.clone(),
                last_name: self.last_name.clone(),
                is_active: self.is_active,
                is_staff: self.is_staff,
                is_superuser: self.is_superuser,
                title: self.title.clone(),
                contact_info: self.contact_info.clone(),
                privacy_disclaimer_accepted: self.privacy_disclaimer_accepted,
                organization_id: self.organization_id,
            },
            password: self.password.clone(),
            core_groups,
            last_login: self.last_login,
            date_joined: self.date_joined,
            create_date: self.create_date,
            edit_date: self.edit_date,
        }
    }
}
