use super::{child_filter, does_not_exist_message, fire_hook, WorkflowLevel1Scope};
use crate::app::auth::Requester;
use crate::app::hook::{HookAppImpl, UseHookApp};
use anyhow::Result;
use async_trait::async_trait;
use bifrost_base::error::{BifrostError, ValidationErrors};
use bifrost_base::hook_event::HookAction;
use bifrost_base::permissions::PermissionAction;
use infra::infra::module::{RdbRepositoryModule, UseRdbRepositoryModule};
use infra::infra::workflow_level1::rdb::UseWorkflowLevel1Repository;
use infra::infra::workflow_level2::rdb::{WorkflowLevel2Repository, UseWorkflowLevel2Repository};
use infra::infra::workflow_level_status::rdb::{
    UseWorkflowLevelStatusRepository, WorkflowLevelStatusRepository,
};
use infra::infra::workflow_level_type::rdb::{
    UseWorkflowLevelTypeRepository, WorkflowLevelTypeRepository,
};
use infra_utils::infra::rdb::UseRdbPool;
use model::{WorkflowLevel2, WorkflowLevel2Data};
use std::sync::Arc;
use uuid::Uuid;

pub(crate) const RESOURCE: &str = "workflowlevel2";

#[async_trait]
pub trait WorkflowLevel2App:
    UseWorkflowLevel1Repository
    + UseWorkflowLevel2Repository
    + UseWorkflowLevelTypeRepository
    + UseWorkflowLevelStatusRepository
    + UseHookApp
    + Send
    + Sync
{
    /// parent, type and status references must exist (the parent in scope)
    async fn validate_workflow_level2(
        &self,
        requester: &Requester,
        data: &WorkflowLevel2Data,
    ) -> Result<()> {
        let mut errors = ValidationErrors::new();
        if data.name.trim().is_empty() {
            errors.add("name", "This field may not be blank.");
        }
        if self
            .find_scoped_level1(requester, data.workflowlevel1_id)
            .await?
            .is_none()
        {
            errors.add("workflowlevel1", does_not_exist_message(data.workflowlevel1_id));
        }
        if let Some(type_id) = data.type_id {
            if self.workflow_level_type_repository().find(type_id).await?.is_none() {
                errors.add("type", does_not_exist_message(type_id));
            }
        }
        if let Some(status_id) = data.status_id {
            if self
                .workflow_level_status_repository()
                .find(status_id)
                .await?
                .is_none()
            {
                errors.add("status", does_not_exist_message(status_id));
            }
        }
        errors.into_result().map_err(|e| e.into())
    }

    async fn create_workflow_level2(
        &self,
        requester: &Requester,
        data: &WorkflowLevel2Data,
    ) -> Result<WorkflowLevel2> {
        requester.authorize(PermissionAction::Create)?;
        self.validate_workflow_level2(requester, data).await?;
        let data = WorkflowLevel2Data {
            created_by_id: data.created_by_id.or(Some(requester.id())),
            ..data.clone()
        };
        let repo = self.workflow_level2_repository();
        let mut tx = repo.db_pool().begin().await.map_err(BifrostError::DBError)?;
        let created = repo.create(&mut tx, &data).await?;
        tx.commit().await.map_err(BifrostError::DBError)?;
        fire_hook(self.hook_app(), RESOURCE, HookAction::Added, &created).await;
        Ok(created)
    }

    async fn update_workflow_level2(
        &self,
        requester: &Requester,
        uuid: &Uuid,
        data: &WorkflowLevel2Data,
    ) -> Result<WorkflowLevel2> {
        requester.authorize(PermissionAction::Update)?;
        let current = self
            .find_workflow_level2(requester, uuid)
            .await?
            .ok_or_else(|| BifrostError::NotFound(format!("workflowlevel2 not found: {}", uuid)))?;
        self.validate_workflow_level2(requester, data).await?;
        let data = WorkflowLevel2Data {
            created_by_id: data.created_by_id.or(current.data.created_by_id),
            ..data.clone()
        };
        let repo = self.workflow_level2_repository();
        let mut tx = repo.db_pool().begin().await.map_err(BifrostError::DBError)?;
        repo.update(&mut tx, current.id, &data).await?;
        tx.commit().await.map_err(BifrostError::DBError)?;
        let updated = repo
            .find(current.id)
            .await?
            .ok_or_else(|| BifrostError::NotFound(format!("workflowlevel2 not found: {}", uuid)))?;
        fire_hook(self.hook_app(), RESOURCE, HookAction::Changed, &updated).await;
        Ok(updated)
    }

    async fn delete_workflow_level2(&self, requester: &Requester, uuid: &Uuid) -> Result<bool> {
        requester.authorize(PermissionAction::Delete)?;
        let Some(current) = self.find_workflow_level2(requester, uuid).await? else {
            return Ok(false);
        };
        let deleted = self.workflow_level2_repository().delete(current.id).await?;
        if deleted {
            fire_hook(self.hook_app(), RESOURCE, HookAction::Removed, &current).await;
        }
        Ok(deleted)
    }

    async fn find_workflow_level2(
        &self,
        requester: &Requester,
        uuid: &Uuid,
    ) -> Result<Option<WorkflowLevel2>> {
        requester.authorize(PermissionAction::Read)?;
        match self.workflow_level2_repository().find_by_uuid(uuid).await? {
            Some(w) => Ok(self
                .find_scoped_level1(requester, w.data.workflowlevel1_id)
                .await?
                .map(|_| w)),
            None => Ok(None),
        }
    }

    async fn find_workflow_level2_list(
        &self,
        requester: &Requester,
        workflowlevel1_id: Option<i64>,
        limit: Option<&i32>,
        offset: Option<&i64>,
    ) -> Result<Vec<WorkflowLevel2>> {
        requester.authorize(PermissionAction::Read)?;
        match child_filter(requester, workflowlevel1_id) {
            Some(filter) => {
                self.workflow_level2_repository()
                    .find_list(&filter, limit, offset)
                    .await
            }
            None => Ok(vec![]),
        }
    }

    async fn count_workflow_level2s(
        &self,
        requester: &Requester,
        workflowlevel1_id: Option<i64>,
    ) -> Result<i64> {
        requester.authorize(PermissionAction::Read)?;
        let repo = self.workflow_level2_repository();
        match child_filter(requester, workflowlevel1_id) {
            Some(filter) => repo.count_list_tx(repo.db_pool(), &filter).await,
            None => Ok(0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkflowLevel2AppImpl {
    repositories: Arc<RdbRepositoryModule>,
    hook_app: Arc<HookAppImpl>,
}

impl WorkflowLevel2AppImpl {
    pub fn new(repositories: Arc<RdbRepositoryModule>, hook_app: Arc<HookAppImpl>) -> Self {
        Self {
            repositories,
            hook_app,
        }
    }
}

impl UseRdbRepositoryModule for WorkflowLevel2AppImpl {
    fn rdb_repository_module(&self) -> &RdbRepositoryModule {
        &self.repositories
    }
}

impl UseHookApp for WorkflowLevel2AppImpl {
    fn hook_app(&self) -> &HookAppImpl {
        &self.hook_app
    }
}

impl WorkflowLevel2App for WorkflowLevel2AppImpl {}

pub trait UseWorkflowLevel2App {
    fn workflow_level2_app(&self) -> &WorkflowLevel2AppImpl;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::workflow::test::{create_organization, org_admin, superuser};
    use bifrost_base::settings::Settings;
    use infra::infra::module::test::setup_test_rdb_module;
    use infra::infra::workflow_level1::rdb::WorkflowLevel1Repository;
    use infra_utils::infra::test::TEST_RUNTIME;
    use model::{WorkflowLevel1Data, WorkflowLevelTypeData};

    #[test]
    fn test_scoped_crud() -> Result<()> {
        TEST_RUNTIME.block_on(async {
            let (module, _rdb) = setup_test_rdb_module().await;
            let module = Arc::new(module);
            let hook_app = Arc::new(HookAppImpl::new(Arc::new(Settings::default()), module.clone()));
            let app = WorkflowLevel2AppImpl::new(module.clone(), hook_app);
            let mine = create_organization(&module, "Mine").await?;
            let other = create_organization(&module, "Other").await?;
            let mut tx = module.db_pool().begin().await?;
            let wl1 = module
                .workflow_level1_repository()
                .create(
                    &mut tx,
                    &WorkflowLevel1Data {
                        name: "wl1".to_string(),
                        organization_id: Some(mine.id),
                        ..Default::default()
                    },
                )
                .await?;
            let foreign_wl1 = module
                .workflow_level1_repository()
                .create(
                    &mut tx,
                    &WorkflowLevel1Data {
                        name: "foreign".to_string(),
                        organization_id: Some(other.id),
                        ..Default::default()
                    },
                )
                .await?;
            let wl_type = module
                .workflow_level_type_repository()
                .create(
                    &mut tx,
                    &WorkflowLevelTypeData {
                        name: "Project".to_string(),
                    },
                )
                .await?;
            tx.commit().await?;
            let admin = org_admin(&module, mine.id, "admin").await?;

            let data = WorkflowLevel2Data {
                workflowlevel1_id: wl1.id,
                name: "Help Syrians".to_string(),
                type_id: Some(wl_type.id),
                ..Default::default()
            };
            let created = app.create_workflow_level2(&admin, &data).await?;
            assert_eq!(created.data.created_by_id, Some(admin.id()));

            // the parent of another organization is invisible
            let err = app
                .create_workflow_level2(
                    &admin,
                    &WorkflowLevel2Data {
                        workflowlevel1_id: foreign_wl1.id,
                        status_id: Some(-1),
                        ..data.clone()
                    },
                )
                .await
                .unwrap_err();
            match err.downcast_ref::<BifrostError>() {
                Some(BifrostError::ValidationError(e)) => {
                    assert!(e.get("workflowlevel1").is_some());
                    assert!(e.get("status").is_some());
                }
                e => panic!("unexpected error: {:?}", e),
            }
            let theirs = app
                .create_workflow_level2(
                    &superuser(),
                    &WorkflowLevel2Data {
                        workflowlevel1_id: foreign_wl1.id,
                        ..data.clone()
                    },
                )
                .await?;

            assert!(app
                .find_workflow_level2(&admin, &theirs.level2_uuid)
                .await?
                .is_none());
            assert_eq!(app.count_workflow_level2s(&admin, None).await?, 1);
            assert_eq!(
                app.count_workflow_level2s(&superuser(), Some(foreign_wl1.id))
                    .await?,
                1
            );
            assert!(app
                .find_workflow_level2_list(&admin, Some(foreign_wl1.id), None, None)
                .await?
                .is_empty());

            let updated = app
                .update_workflow_level2(
                    &admin,
                    &created.level2_uuid,
                    &WorkflowLevel2Data {
                        name: "Renamed".to_string(),
                        created_by_id: None,
                        ..data.clone()
                    },
                )
                .await?;
            assert_eq!(updated.data.name, "Renamed");
            assert_eq!(updated.data.created_by_id, Some(admin.id()));

            assert!(!app
                .delete_workflow_level2(&admin, &theirs.level2_uuid)
                .await?);
            assert!(app
                .delete_workflow_level2(&admin, &created.level2_uuid)
                .await?);
            Ok(())
        })
    }
}
