use crate::app::auth::Requester;
use anyhow::Result;
use async_trait::async_trait;
use bifrost_base::error::{BifrostError, ValidationErrors};
use bifrost_base::permissions::PermissionAction;
use infra::infra::module::{RdbRepositoryModule, UseRdbRepositoryModule};
use infra::infra::workflow_level_status::rdb::{
    UseWorkflowLevelStatusRepository, WorkflowLevelStatusRepository,
};
use infra_utils::infra::rdb::UseRdbPool;
use model::{WorkflowLevelStatus, WorkflowLevelStatusData};
use std::sync::Arc;
use uuid::Uuid;

const BLANK: &str = "This field may not be blank.";

fn validate(data: &WorkflowLevelStatusData) -> Result<()> {
    let mut errors = ValidationErrors::new();
    if data.name.trim().is_empty() {
        errors.add("name", BLANK);
    }
    if data.short_name.trim().is_empty() {
        errors.add("short_name", BLANK);
    }
    errors.into_result().map_err(|e| e.into())
}

fn not_found(uuid: &Uuid) -> BifrostError {
    BifrostError::NotFound(format!("workflowlevelstatus not found: uuid = {}", uuid))
}

#[async_trait]
pub trait WorkflowLevelStatusApp: UseWorkflowLevelStatusRepository + Send + Sync {
    async fn create_workflow_level_status(
        &self,
        requester: &Requester,
        data: &WorkflowLevelStatusData,
    ) -> Result<WorkflowLevelStatus> {
        requester.authorize(PermissionAction::Create)?;
        validate(data)?;
        let repo = self.workflow_level_status_repository();
        let mut tx = repo.db_pool().begin().await.map_err(BifrostError::DBError)?;
        let created = repo.create(&mut tx, data).await?;
        tx.commit().await.map_err(BifrostError::DBError)?;
        Ok(created)
    }

    async fn update_workflow_level_status(
        &self,
        requester: &Requester,
        uuid: &Uuid,
        data: &WorkflowLevelStatusData,
    ) -> Result<WorkflowLevelStatus> {
        requester.authorize(PermissionAction::Update)?;
        let repo = self.workflow_level_status_repository();
        let current = repo.find_by_uuid(uuid).await?.ok_or_else(|| not_found(uuid))?;
        validate(data)?;
        let mut tx = repo.db_pool().begin().await.map_err(BifrostError::DBError)?;
        repo.update(&mut tx, current.id, data).await?;
        tx.commit().await.map_err(BifrostError::DBError)?;
        repo.find(current.id)
            .await?
            .ok_or_else(|| not_found(uuid).into())
    }

    async fn delete_workflow_level_status(
        &self,
        requester: &Requester,
        uuid: &Uuid,
    ) -> Result<bool> {
        requester.authorize(PermissionAction::Delete)?;
        let repo = self.workflow_level_status_repository();
        match repo.find_by_uuid(uuid).await? {
            Some(current) => repo.delete(current.id).await,
            None => Ok(false),
        }
    }

    async fn find_workflow_level_status(
        &self,
        requester: &Requester,
        uuid: &Uuid,
    ) -> Result<Option<WorkflowLevelStatus>> {
        requester.authorize(PermissionAction::Read)?;
        self.workflow_level_status_repository()
            .find_by_uuid(uuid)
            .await
    }

    /// ordered by `order`
    async fn find_workflow_level_status_list(
        &self,
        requester: &Requester,
        limit: Option<&i32>,
        offset: Option<&i64>,
    ) -> Result<Vec<WorkflowLevelStatus>> {
        requester.authorize(PermissionAction::Read)?;
        self.workflow_level_status_repository()
            .find_list(limit, offset)
            .await
    }

    async fn count_workflow_level_statuses(&self, requester: &Requester) -> Result<i64> {
        requester.authorize(PermissionAction::Read)?;
        let repo = self.workflow_level_status_repository();
        repo.count_list_tx(repo.db_pool()).await
    }
}

#[derive(Debug, Clone)]
pub struct WorkflowLevelStatusAppImpl {
    repositories: Arc<RdbRepositoryModule>,
}

impl WorkflowLevelStatusAppImpl {
    pub fn new(repositories: Arc<RdbRepositoryModule>) -> Self {
        Self { repositories }
    }
}

impl UseRdbRepositoryModule for WorkflowLevelStatusAppImpl {
    fn rdb_repository_module(&self) -> &RdbRepositoryModule {
        &self.repositories
    }
}

impl WorkflowLevelStatusApp for WorkflowLevelStatusAppImpl {}

pub trait UseWorkflowLevelStatusApp {
    fn workflow_level_status_app(&self) -> &WorkflowLevelStatusAppImpl;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::workflow::test::superuser;
    use infra::infra::module::test::setup_test_rdb_module;
    use infra_utils::infra::test::TEST_RUNTIME;

    fn status(order: i32, name: &str) -> WorkflowLevelStatusData {
        WorkflowLevelStatusData {
            order,
            name: name.to_string(),
            short_name: name.to_lowercase(),
        }
    }

    #[test]
    fn test_list_ordering() -> Result<()> {
        TEST_RUNTIME.block_on(async {
            let (module, _rdb) = setup_test_rdb_module().await;
            let app = WorkflowLevelStatusAppImpl::new(Arc::new(module));
            let admin = superuser();
            let done = app
                .create_workflow_level_status(&admin, &status(3, "Done"))
                .await?;
            app.create_workflow_level_status(&admin, &status(1, "Open"))
                .await?;
            app.create_workflow_level_status(&admin, &status(2, "Doing"))
                .await?;

            let err = app
                .create_workflow_level_status(&admin, &WorkflowLevelStatusData::default())
                .await
                .unwrap_err();
            match err.downcast_ref::<BifrostError>() {
                Some(BifrostError::ValidationError(e)) => {
                    assert!(e.get("name").is_some());
                    assert!(e.get("short_name").is_some());
                }
                e => panic!("unexpected error: {:?}", e),
            }

            let names = app
                .find_workflow_level_status_list(&admin, None, None)
                .await?
                .into_iter()
                .map(|s| s.data.name)
                .collect::<Vec<_>>();
            assert_eq!(names, vec!["Open", "Doing", "Done"]);

            app.update_workflow_level_status(&admin, &done.uuid, &status(0, "Done"))
                .await?;
            let first = app
                .find_workflow_level_status_list(&admin, Some(&1), None)
                .await?;
            assert_eq!(first[0].uuid, done.uuid);
            assert_eq!(app.count_workflow_level_statuses(&admin).await?, 3);
            assert!(app.delete_workflow_level_status(&admin, &done.uuid).await?);
            assert!(app
                .find_workflow_level_status(&admin, &done.uuid)
                .await?
                .is_none());
            Ok(())
        })
    }
}
