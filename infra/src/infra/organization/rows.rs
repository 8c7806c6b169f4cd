use crate::infra::parse_uuid_column;
use chrono::{DateTime, Utc};
use model::{Organization, OrganizationData};

// db row definitions
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct OrganizationRow {
    pub id: i64,
    pub organization_uuid: String,
    pub name: String,
    pub description: Option<String>,
    pub organization_url: Option<String>,
    pub industry: Option<String>,
    pub phone: Option<String>,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}

impl OrganizationRow {
    pub fn to_model(&self) -> Organization {
        Organization {
            id: self.id,
            organization_uuid: parse_uuid_column("organization", self.id, &self.organization_uuid),
            data: OrganizationData {
                name: self.name.clone(),
                description: self.description.clone(),
                organization_url: self.organization_url.clone(),
                industry: self.industry.clone(),
                phone: self.phone.clone(),
            },
            create_date: self.create_date,
            edit_date: self.edit_date,
        }
    }
}
