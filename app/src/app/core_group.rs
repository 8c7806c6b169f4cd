use super::auth::{OrganizationScope, Requester, TokenCache, UseTokenCache};
use anyhow::Result;
use async_trait::async_trait;
use bifrost_base::error::BifrostError;
use bifrost_base::permissions::PermissionAction;
use infra::infra::core_group::rdb::{CoreGroupRepository, UseCoreGroupRepository};
use infra::infra::module::{RdbRepositoryModule, UseRdbRepositoryModule};
use infra_utils::infra::rdb::UseRdbPool;
use model::{CoreGroup, CoreGroupData};
use std::sync::Arc;

#[async_trait]
pub trait CoreGroupApp: UseCoreGroupRepository + UseTokenCache + Send + Sync {
    async fn create_core_group(
        &self,
        requester: &Requester,
        data: &CoreGroupData,
    ) -> Result<CoreGroup> {
        requester.authorize(PermissionAction::Create)?;
        let data = CoreGroupData {
            organization_id: requester.resolve_organization(data.organization_id)?,
            ..data.clone()
        };
        let mut tx = self
            .core_group_repository()
            .db_pool()
            .begin()
            .await
            .map_err(BifrostError::DBError)?;
        let group = self.core_group_repository().create(&mut tx, &data).await?;
        tx.commit().await.map_err(BifrostError::DBError)?;
        Ok(group)
    }

    async fn update_core_group(
        &self,
        requester: &Requester,
        id: i64,
        data: &CoreGroupData,
    ) -> Result<CoreGroup> {
        requester.authorize(PermissionAction::Update)?;
        if self.find_core_group(requester, id).await?.is_none() {
            return Err(BifrostError::NotFound(format!("core_group not found: id = {}", id)).into());
        }
        let data = CoreGroupData {
            organization_id: requester.resolve_organization(data.organization_id)?,
            ..data.clone()
        };
        let mut tx = self
            .core_group_repository()
            .db_pool()
            .begin()
            .await
            .map_err(BifrostError::DBError)?;
        self.core_group_repository().update(&mut tx, id, &data).await?;
        tx.commit().await.map_err(BifrostError::DBError)?;
        // permissions of the members changed
        self.clear_token_cache();
        self.core_group_repository()
            .find(id)
            .await?
            .ok_or_else(|| BifrostError::NotFound(format!("core_group not found: id = {}", id)).into())
    }

    async fn delete_core_group(&self, requester: &Requester, id: i64) -> Result<bool> {
        requester.authorize(PermissionAction::Delete)?;
        if self.find_core_group(requester, id).await?.is_none() {
            return Ok(false);
        }
        let deleted = self.core_group_repository().delete(id).await?;
        self.clear_token_cache();
        Ok(deleted)
    }

    async fn find_core_group(&self, requester: &Requester, id: i64) -> Result<Option<CoreGroup>> {
        requester.authorize(PermissionAction::Read)?;
        let found = self.core_group_repository().find(id).await?;
        Ok(found.filter(|g| requester.scope().contains(g.data.organization_id)))
    }

    async fn find_core_group_list(
        &self,
        requester: &Requester,
        limit: Option<&i32>,
        offset: Option<&i64>,
    ) -> Result<Vec<CoreGroup>> {
        requester.authorize(PermissionAction::Read)?;
        match requester.scope() {
            OrganizationScope::All => {
                self.core_group_repository()
                    .find_list(None, limit, offset)
                    .await
            }
            OrganizationScope::Only(id) => {
                self.core_group_repository()
                    .find_list(Some(id), limit, offset)
                    .await
            }
            OrganizationScope::Nothing => Ok(vec![]),
        }
    }

    async fn count_core_groups(&self, requester: &Requester) -> Result<i64> {
        requester.authorize(PermissionAction::Read)?;
        let db = self.core_group_repository().db_pool();
        match requester.scope() {
            OrganizationScope::All => self.core_group_repository().count_list_tx(db, None).await,
            OrganizationScope::Only(id) => {
                self.core_group_repository()
                    .count_list_tx(db, Some(id))
                    .await
            }
            OrganizationScope::Nothing => Ok(0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CoreGroupAppImpl {
    repositories: Arc<RdbRepositoryModule>,
    token_cache: TokenCache,
}

impl CoreGroupAppImpl {
    pub fn new(repositories: Arc<RdbRepositoryModule>, token_cache: TokenCache) -> Self {
        Self {
            repositories,
            token_cache,
        }
    }
}

impl UseTokenCache for CoreGroupAppImpl {
    fn token_cache(&self) -> &TokenCache {
        &self.token_cache
    }
}

impl UseRdbRepositoryModule for CoreGroupAppImpl {
    fn rdb_repository_module(&self) -> &RdbRepositoryModule {
        &self.repositories
    }
}

impl CoreGroupApp for CoreGroupAppImpl {}

pub trait UseCoreGroupApp {
    fn core_group_app(&self) -> &CoreGroupAppImpl;
}
