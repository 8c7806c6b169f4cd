use chrono::{DateTime, Utc};
use model::{Organization, OrganizationData};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `id` is the organization uuid
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrganizationRepr {
    pub id: Uuid,
    pub organization_uuid: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub organization_url: Option<String>,
    pub industry: Option<String>,
    pub phone: Option<String>,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}

impl From<&Organization> for OrganizationRepr {
    fn from(o: &Organization) -> Self {
        Self {
            id: o.organization_uuid,
            organization_uuid: o.organization_uuid,
            name: o.data.name.clone(),
            description: o.data.description.clone(),
            organization_url: o.data.organization_url.clone(),
            industry: o.data.industry.clone(),
            phone: o.data.phone.clone(),
            create_date: o.create_date,
            edit_date: o.edit_date,
        }
    }
}

/// nested form (`depth = 1`) with the integer primary key
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrganizationNested {
    pub id: i64,
    pub organization_uuid: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub organization_url: Option<String>,
    pub industry: Option<String>,
    pub phone: Option<String>,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}

impl From<&Organization> for OrganizationNested {
    fn from(o: &Organization) -> Self {
        Self {
            id: o.id,
            organization_uuid: o.organization_uuid,
            name: o.data.name.clone(),
            description: o.data.description.clone(),
            organization_url: o.data.organization_url.clone(),
            industry: o.data.industry.clone(),
            phone: o.data.phone.clone(),
            create_date: o.create_date,
            edit_date: o.edit_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrganizationInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub organization_url: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl From<&Organization> for OrganizationInput {
    fn from(o: &Organization) -> Self {
        Self {
            name: o.data.name.clone(),
            description: o.data.description.clone(),
            organization_url: o.data.organization_url.clone(),
            industry: o.data.industry.clone(),
            phone: o.data.phone.clone(),
        }
    }
}

impl From<OrganizationInput> for OrganizationData {
    fn from(i: OrganizationInput) -> Self {
        Self {
            name: i.name,
            description: i.description,
            organization_url: i.organization_url,
            industry: i.industry,
            phone: i.phone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_uuid() {
        let now = Utc::now();
        let org = Organization {
            id: 3,
            organization_uuid: Uuid::new_v4(),
            data: OrganizationData {
                name: "Humanitec".to_string(),
                ..Default::default()
            },
            create_date: now,
            edit_date: now,
        };
        let json = serde_json::to_value(OrganizationRepr::from(&org)).unwrap();
        assert_eq!(json["id"], serde_json::json!(org.organization_uuid.to_string()));
        let nested = serde_json::to_value(OrganizationNested::from(&org)).unwrap();
        assert_eq!(nested["id"], serde_json::json!(3));
    }
}
