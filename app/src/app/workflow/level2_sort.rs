use super::{child_filter, does_not_exist_message, WorkflowLevel1Scope};
use crate::app::auth::Requester;
use anyhow::Result;
use async_trait::async_trait;
use bifrost_base::error::{BifrostError, ValidationErrors};
use bifrost_base::permissions::PermissionAction;
use infra::infra::module::{RdbRepositoryModule, UseRdbRepositoryModule};
use infra::infra::workflow_level1::rdb::UseWorkflowLevel1Repository;
use infra::infra::workflow_level2::rdb::{WorkflowLevel2Repository, UseWorkflowLevel2Repository};
use infra::infra::workflow_level2_sort::rdb::{
    UseWorkflowLevel2SortRepository, WorkflowLevel2SortRepository,
};
use infra_utils::infra::rdb::UseRdbPool;
use model::{WorkflowLevel2Sort, WorkflowLevel2SortData};
use std::sync::Arc;

#[async_trait]
pub trait WorkflowLevel2SortApp:
    UseWorkflowLevel1Repository
    + UseWorkflowLevel2Repository
    + UseWorkflowLevel2SortRepository
    + Send
    + Sync
{
    /// sorts without a workflowlevel1 are only visible to superusers
    async fn validate_workflow_level2_sort(
        &self,
        requester: &Requester,
        data: &WorkflowLevel2SortData,
    ) -> Result<()> {
        let mut errors = ValidationErrors::new();
        match data.workflowlevel1_id {
            Some(id) => {
                if self.find_scoped_level1(requester, id).await?.is_none() {
                    errors.add("workflowlevel1", does_not_exist_message(id));
                }
            }
            None if !requester.is_superuser() => {
                errors.add("workflowlevel1", "This field is required.");
            }
            None => {}
        }
        if let Some(parent_id) = data.workflowlevel2_parent_id {
            if self.workflow_level2_repository().find(parent_id).await?.is_none() {
                errors.add("workflowlevel2_parent_id", does_not_exist_message(parent_id));
            }
        }
        errors.into_result().map_err(|e| e.into())
    }

    async fn create_workflow_level2_sort(
        &self,
        requester: &Requester,
        data: &WorkflowLevel2SortData,
    ) -> Result<WorkflowLevel2Sort> {
        requester.authorize(PermissionAction::Create)?;
        self.validate_workflow_level2_sort(requester, data).await?;
        let repo = self.workflow_level2_sort_repository();
        let mut tx = repo.db_pool().begin().await.map_err(BifrostError::DBError)?;
        let created = repo.create(&mut tx, data).await?;
        tx.commit().await.map_err(BifrostError::DBError)?;
        Ok(created)
    }

    async fn update_workflow_level2_sort(
        &self,
        requester: &Requester,
        id: i64,
        data: &WorkflowLevel2SortData,
    ) -> Result<WorkflowLevel2Sort> {
        requester.authorize(PermissionAction::Update)?;
        if self.find_workflow_level2_sort(requester, id).await?.is_none() {
            return Err(
                BifrostError::NotFound(format!("workflowlevel2sort not found: id = {}", id)).into(),
            );
        }
        self.validate_workflow_level2_sort(requester, data).await?;
        let repo = self.workflow_level2_sort_repository();
        let mut tx = repo.db_pool().begin().await.map_err(BifrostError::DBError)?;
        repo.update(&mut tx, id, data).await?;
        tx.commit().await.map_err(BifrostError::DBError)?;
        repo.find(id).await?.ok_or_else(|| {
            BifrostError::NotFound(format!("workflowlevel2sort not found: id = {}", id)).into()
        })
    }

    async fn delete_workflow_level2_sort(&self, requester: &Requester, id: i64) -> Result<bool> {
        requester.authorize(PermissionAction::Delete)?;
        match self.find_workflow_level2_sort(requester, id).await? {
            Some(_) => self.workflow_level2_sort_repository().delete(id).await,
            None => Ok(false),
        }
    }

    async fn find_workflow_level2_sort(
        &self,
        requester: &Requester,
        id: i64,
    ) -> Result<Option<WorkflowLevel2Sort>> {
        requester.authorize(PermissionAction::Read)?;
        let Some(sort) = self.workflow_level2_sort_repository().find(id).await? else {
            return Ok(None);
        };
        let visible = match sort.data.workflowlevel1_id {
            Some(wl1) => self.find_scoped_level1(requester, wl1).await?.is_some(),
            None => requester.is_superuser(),
        };
        Ok(visible.then_some(sort))
    }

    async fn find_workflow_level2_sort_list(
        &self,
        requester: &Requester,
        workflowlevel1_id: Option<i64>,
        limit: Option<&i32>,
        offset: Option<&i64>,
    ) -> Result<Vec<WorkflowLevel2Sort>> {
        requester.authorize(PermissionAction::Read)?;
        match child_filter(requester, workflowlevel1_id) {
            Some(filter) => {
                self.workflow_level2_sort_repository()
                    .find_list(&filter, limit, offset)
                    .await
            }
            None => Ok(vec![]),
        }
    }

    async fn count_workflow_level2_sorts(
        &self,
        requester: &Requester,
        workflowlevel1_id: Option<i64>,
    ) -> Result<i64> {
        requester.authorize(PermissionAction::Read)?;
        let repo = self.workflow_level2_sort_repository();
        match child_filter(requester, workflowlevel1_id) {
            Some(filter) => repo.count_list_tx(repo.db_pool(), &filter).await,
            None => Ok(0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkflowLevel2SortAppImpl {
    repositories: Arc<RdbRepositoryModule>,
}

impl WorkflowLevel2SortAppImpl {
    pub fn new(repositories: Arc<RdbRepositoryModule>) -> Self {
        Self { repositories }
    }
}

impl UseRdbRepositoryModule for WorkflowLevel2SortAppImpl {
    fn rdb_repository_module(&self) -> &RdbRepositoryModule {
        &self.repositories
    }
}

impl WorkflowLevel2SortApp for WorkflowLevel2SortAppImpl {}

pub trait UseWorkflowLevel2SortApp {
    fn workflow_level2_sort_app(&self) -> &WorkflowLevel2SortAppImpl;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::workflow::test::{create_organization, org_admin, superuser};
    use infra::infra::module::test::setup_test_rdb_module;
    use infra::infra::workflow_level1::rdb::WorkflowLevel1Repository;
    use infra_utils::infra::test::TEST_RUNTIME;
    use model::{WorkflowLevel1Data, WorkflowLevel2Data};
    use serde_json::json;

    #[test]
    fn test_scoped_crud() -> Result<()> {
        TEST_RUNTIME.block_on(async {
            let (module, _rdb) = setup_test_rdb_module().await;
            let module = Arc::new(module);
            let app = WorkflowLevel2SortAppImpl::new(module.clone());
            let mine = create_organization(&module, "Mine").await?;
            let admin = org_admin(&module, mine.id, "admin").await?;
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
            let wl2 = module
                .workflow_level2_repository()
                .create(
                    &mut tx,
                    &WorkflowLevel2Data {
                        workflowlevel1_id: wl1.id,
                        name: "wl2".to_string(),
                        ..Default::default()
                    },
                )
                .await?;
            tx.commit().await?;

            let data = WorkflowLevel2SortData {
                workflowlevel1_id: Some(wl1.id),
                workflowlevel2_parent_id: Some(wl2.id),
                workflowlevel2_pk: wl2.id,
                sort_array: vec![json!(wl2.id)],
            };
            let created = app.create_workflow_level2_sort(&admin, &data).await?;
            assert_eq!(created.data, data);

            let orphan = WorkflowLevel2SortData {
                workflowlevel1_id: None,
                workflowlevel2_parent_id: None,
                ..data.clone()
            };
            assert!(app.create_workflow_level2_sort(&admin, &orphan).await.is_err());
            let orphan = app.create_workflow_level2_sort(&superuser(), &orphan).await?;
            assert!(app
                .find_workflow_level2_sort(&admin, orphan.id)
                .await?
                .is_none());
            assert!(app
                .find_workflow_level2_sort(&superuser(), orphan.id)
                .await?
                .is_some());
            assert_eq!(
                app.find_workflow_level2_sort_list(&admin, Some(wl1.id), None, None)
                    .await?
                    .len(),
                1
            );
            assert_eq!(app.count_workflow_level2_sorts(&superuser(), None).await?, 2);

            let updated = app
                .update_workflow_level2_sort(
                    &admin,
                    created.id,
                    &WorkflowLevel2SortData {
                        sort_array: vec![json!(3), json!(1), json!(2)],
                        ..data.clone()
                    },
                )
                .await?;
            assert_eq!(updated.data.sort_array, vec![json!(3), json!(1), json!(2)]);
            assert!(app.delete_workflow_level2_sort(&admin, created.id).await?);
            assert!(!app.delete_workflow_level2_sort(&admin, orphan.id).await?);
            Ok(())
        })
    }
}
