use crate::organization::OrganizationFactory;
use crate::{Factory, SubFactory};
use anyhow::Result;
use async_trait::async_trait;
use bifrost_base::error::BifrostError;
use infra::infra::core_group::rdb::{CoreGroupRepository, UseCoreGroupRepository};
use infra::infra::core_user::rdb::{CoreUserRepository, UseCoreUserRepository};
use infra::infra::module::RdbRepositoryModule;
use infra_utils::infra::rdb::UseRdbPool;
use model::{CoreGroup, CoreGroupData, CoreUser, CoreUserData};

#[derive(Debug, Clone)]
pub struct CoreGroupFactory {
    pub name: String,
    pub organization: SubFactory<OrganizationFactory>,
    pub is_global: bool,
    pub is_org_level: bool,
    pub permissions: i32,
}

impl Default for CoreGroupFactory {
    fn default() -> Self {
        Self {
            name: "Group".to_string(),
            organization: SubFactory::default(),
            is_global: false,
            is_org_level: false,
            permissions: 0,
        }
    }
}

#[async_trait]
impl Factory for CoreGroupFactory {
    type Output = CoreGroup;

    async fn create(self, module: &RdbRepositoryModule) -> Result<CoreGroup> {
        let data = CoreGroupData {
            name: self.name,
            organization_id: self.organization.resolve(module).await?,
            is_global: self.is_global,
            is_org_level: self.is_org_level,
            permissions: self.permissions,
        };
        let repo = module.core_group_repository();
        let mut tx = repo.db_pool().begin().await.map_err(BifrostError::DBError)?;
        let group = repo.create(&mut tx, &data).await?;
        tx.commit().await.map_err(BifrostError::DBError)?;
        Ok(group)
    }

    fn output_id(output: &CoreGroup) -> i64 {
        output.id
    }
}

/// get-or-create by username (an existing user is returned as is)
#[derive(Debug, Clone)]
pub struct CoreUserFactory {
    pub data: CoreUserData,
    pub organization: SubFactory<OrganizationFactory>,
    /// stored password hash ("" is unusable)
    pub password: String,
    pub core_groups: Vec<i64>,
}

impl Default for CoreUserFactory {
    fn default() -> Self {
        Self {
            data: CoreUserData {
                username: "john".to_string(),
                email: "john@example.com".to_string(),
                first_name: "John".to_string(),
                last_name: "Lennon".to_string(),
                is_active: true,
                ..Default::default()
            },
            organization: SubFactory::default(),
            password: String::new(),
            core_groups: vec![],
        }
    }
}

impl CoreUserFactory {
    pub fn named(username: &str) -> Self {
        let default = Self::default();
        Self {
            data: CoreUserData {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                ..default.data
            },
            ..default
        }
    }
}

#[async_trait]
impl Factory for CoreUserFactory {
    type Output = CoreUser;

    async fn create(self, module: &RdbRepositoryModule) -> Result<CoreUser> {
        let repo = module.core_user_repository();
        if let Some(user) = repo.find_by_username(&self.data.username).await? {
            return Ok(user);
        }
        let data = CoreUserData {
            organization_id: self.organization.resolve(module).await?,
            ..self.data
        };
        let mut tx = repo.db_pool().begin().await.map_err(BifrostError::DBError)?;
        let created = repo.create(&mut tx, &data, &self.password).await?;
        for group_id in self.core_groups.iter() {
            repo.add_core_group(&mut *tx, created.id, *group_id).await?;
        }
        let user = repo
            .find_in_tx(&mut tx, created.id)
            .await?
            .ok_or_else(|| BifrostError::NotFound(format!("core_user not found: id = {}", created.id)))?;
        tx.commit().await.map_err(BifrostError::DBError)?;
        Ok(user)
    }

    fn output_id(output: &CoreUser) -> i64 {
        output.id
    }
}
