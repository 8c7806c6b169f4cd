//! Core groups and core users.

use super::organization::OrganizationNested;
use anyhow::Result;
use app::app::core_user::{CoreUserCreate, CoreUserUpdate};
use bifrost_base::error::BifrostError;
use bifrost_base::permissions::{Permissions, PermissionsRepr, PERMISSIONS_VIEW_ONLY};
use infra::infra::core_group::rdb::CoreGroupRepository;
use infra::infra::module::RdbRepositoryModule;
use infra::infra::organization::rdb::OrganizationRepository;
use model::{CoreGroup, CoreGroupData, CoreUser, CoreUserData};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CoreGroupRepr {
    pub id: i64,
    pub uuid: Uuid,
    pub name: String,
    pub is_global: bool,
    pub is_org_level: bool,
    pub permissions: PermissionsRepr,
    /// organization uuid
    pub organization: Option<Uuid>,
    pub workflowlevel1s: Vec<i64>,
    pub workflowlevel2s: Vec<i64>,
}

async fn organization_uuid(
    repositories: &RdbRepositoryModule,
    organization_id: Option<i64>,
) -> Result<Option<Uuid>> {
    match organization_id {
        Some(id) => Ok(repositories
            .organization_repository
            .find(id)
            .await?
            .map(|o| o.organization_uuid)),
        None => Ok(None),
    }
}

impl CoreGroupRepr {
    pub async fn build(repositories: &RdbRepositoryModule, group: &CoreGroup) -> Result<Self> {
        Ok(Self {
            id: group.id,
            uuid: group.uuid,
            name: group.data.name.clone(),
            is_global: group.data.is_global,
            is_org_level: group.data.is_org_level,
            permissions: Permissions::from_value(group.data.permissions).to_representation(),
            organization: organization_uuid(repositories, group.data.organization_id).await?,
            workflowlevel1s: group.workflowlevel1s.clone(),
            workflowlevel2s: group.workflowlevel2s.clone(),
        })
    }

    pub async fn build_list(
        repositories: &RdbRepositoryModule,
        groups: &[CoreGroup],
    ) -> Result<Vec<Self>> {
        let mut reprs = Vec::with_capacity(groups.len());
        for group in groups {
            reprs.push(Self::build(repositories, group).await?);
        }
        Ok(reprs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoreGroupInput {
    pub name: String,
    #[serde(default)]
    pub is_global: bool,
    #[serde(default)]
    pub is_org_level: bool,
    /// `{create, read, update, delete}` booleans (view only if omitted)
    #[serde(default)]
    pub permissions: Option<serde_json::Value>,
    #[serde(default)]
    pub organization: Option<Uuid>,
}

impl CoreGroupInput {
    pub async fn from_model(repositories: &RdbRepositoryModule, group: &CoreGroup) -> Result<Self> {
        let permissions = Permissions::from_value(group.data.permissions).to_representation();
        Ok(Self {
            name: group.data.name.clone(),
            is_global: group.data.is_global,
            is_org_level: group.data.is_org_level,
            permissions: Some(serde_json::to_value(permissions)?),
            organization: organization_uuid(repositories, group.data.organization_id).await?,
        })
    }

    pub async fn into_data(self, repositories: &RdbRepositoryModule) -> Result<CoreGroupData> {
        let permissions = match &self.permissions {
            Some(value) => Permissions::to_internal_value(value)
                .map_err(|m| BifrostError::validation_field("permissions", m))?,
            None => PERMISSIONS_VIEW_ONLY,
        };
        let organization_id = match &self.organization {
            Some(uuid) => Some(
                repositories
                    .organization_repository
                    .find_by_uuid(uuid)
                    .await?
                    .map(|o| o.id)
                    .ok_or_else(|| {
                        BifrostError::validation_field(
                            "organization",
                            format!("Invalid pk \"{}\" - object does not exist.", uuid),
                        )
                    })?,
            ),
            None => None,
        };
        Ok(CoreGroupData {
            name: self.name,
            organization_id,
            is_global: self.is_global,
            is_org_level: self.is_org_level,
            permissions,
        })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CoreUserRepr {
    pub id: i64,
    pub core_user_uuid: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub is_active: bool,
    pub title: Option<String>,
    pub contact_info: Option<String>,
    pub privacy_disclaimer_accepted: bool,
    pub organization: Option<OrganizationNested>,
    pub core_groups: Vec<CoreGroupRepr>,
}

impl CoreUserRepr {
    pub async fn build(repositories: &RdbRepositoryModule, user: &CoreUser) -> Result<Self> {
        let organization = match user.data.organization_id {
            Some(id) => repositories
                .organization_repository
                .find(id)
                .await?
                .as_ref()
                .map(OrganizationNested::from),
            None => None,
        };
        let groups = repositories
            .core_group_repository
            .find_by_user(user.id)
            .await?;
        Ok(Self {
            id: user.id,
            core_user_uuid: user.core_user_uuid,
            first_name: user.data.first_name.clone(),
            last_name: user.data.last_name.clone(),
            email: user.data.email.clone(),
            username: user.data.username.clone(),
            is_active: user.data.is_active,
            title: user.data.title.clone(),
            contact_info: user.data.contact_info.clone(),
            privacy_disclaimer_accepted: user.data.privacy_disclaimer_accepted,
            organization,
            core_groups: CoreGroupRepr::build_list(repositories, &groups).await?,
        })
    }

    pub async fn build_list(
        repositories: &RdbRepositoryModule,
        users: &[CoreUser],
    ) -> Result<Vec<Self>> {
        let mut reprs = Vec::with_capacity(users.len());
        for user in users {
            reprs.push(Self::build(repositories, user).await?);
        }
        Ok(reprs)
    }
}

/// registration body
#[derive(Debug, Clone, Deserialize)]
pub struct CoreUserCreateInput {
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub contact_info: Option<String>,
    #[serde(default)]
    pub privacy_disclaimer_accepted: bool,
    pub password: String,
    pub organization_name: String,
    #[serde(default)]
    pub core_groups: Vec<i64>,
    #[serde(default)]
    pub invitation_token: Option<String>,
}

impl From<CoreUserCreateInput> for CoreUserCreate {
    fn from(i: CoreUserCreateInput) -> Self {
        CoreUserCreate {
            data: CoreUserData {
                username: i.username,
                email: i.email,
                first_name: i.first_name,
                last_name: i.last_name,
                title: i.title,
                contact_info: i.contact_info,
                privacy_disclaimer_accepted: i.privacy_disclaimer_accepted,
                ..Default::default()
            },
            password: i.password,
            organization_name: i.organization_name,
            core_groups: i.core_groups,
            invitation_token: i.invitation_token,
        }
    }
}

/// update body (absent fields are kept)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoreUserUpdateInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
    pub title: Option<String>,
    pub contact_info: Option<String>,
    pub privacy_disclaimer_accepted: Option<bool>,
    pub password: Option<String>,
    pub organization_name: Option<String>,
    pub core_groups: Option<Vec<i64>>,
}

impl From<CoreUserUpdateInput> for CoreUserUpdate {
    fn from(i: CoreUserUpdateInput) -> Self {
        CoreUserUpdate {
            username: i.username,
            email: i.email,
            first_name: i.first_name,
            last_name: i.last_name,
            is_active: i.is_active,
            title: i.title,
            contact_info: i.contact_info,
            privacy_disclaimer_accepted: i.privacy_disclaimer_accepted,
            password: i.password,
            organization_name: i.organization_name,
            core_groups: i.core_groups,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoreUserInvitationInput {
    pub emails: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoreUserResetPasswordInput {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoreUserResetPasswordCheckInput {
    pub uid: String,
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoreUserResetPasswordConfirmInput {
    pub uid: String,
    pub token: String,
    pub new_password1: String,
    pub new_password2: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_input_defaults() {
        let input: CoreUserCreateInput = serde_json::from_value(serde_json::json!({
            "username": "alice",
            "password": "s3cret-pass",
            "organization_name": "Humanitec"
        }))
        .unwrap();
        let create = CoreUserCreate::from(input);
        assert_eq!(create.data.username, "alice");
        assert!(!create.data.is_superuser);
        assert!(create.core_groups.is_empty());
        assert_eq!(create.invitation_token, None);
    }

    #[test]
    fn test_update_input_keeps_absent_fields() {
        let input: CoreUserUpdateInput =
            serde_json::from_value(serde_json::json!({"first_name": "Alice"})).unwrap();
        let update = CoreUserUpdate::from(input);
        assert_eq!(update.first_name.as_deref(), Some("Alice"));
        assert_eq!(update.email, None);
        assert_eq!(update.core_groups, None);
    }
}
