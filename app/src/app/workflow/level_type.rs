use crate::app::auth::Requester;
use anyhow::Result;
use async_trait::async_trait;
use bifrost_base::error::BifrostError;
use bifrost_base::permissions::PermissionAction;
use infra::infra::module::{RdbRepositoryModule, UseRdbRepositoryModule};
use infra::infra::workflow_level_type::rdb::{
    UseWorkflowLevelTypeRepository, WorkflowLevelTypeRepository,
};
use infra_utils::infra::rdb::UseRdbPool;
use model::{WorkflowLevelType, WorkflowLevelTypeData};
use std::sync::Arc;
use uuid::Uuid;

fn validate(data: &WorkflowLevelTypeData) -> Result<()> {
    if data.name.trim().is_empty() {
        return Err(BifrostError::validation_field("name", "This field may not be blank.").into());
    }
    Ok(())
}

fn not_found(uuid: &Uuid) -> BifrostError {
    BifrostError::NotFound(format!("workflowleveltype not found: uuid = {}", uuid))
}

/// shared master data: permission checks only (no organization scope)
#[async_trait]
pub trait WorkflowLevelTypeApp: UseWorkflowLevelTypeRepository + Send + Sync {
    async fn create_workflow_level_type(
        &self,
        requester: &Requester,
        data: &WorkflowLevelTypeData,
    ) -> Result<WorkflowLevelType> {
        requester.authorize(PermissionAction::Create)?;
        validate(data)?;
        let repo = self.workflow_level_type_repository();
        let mut tx = repo.db_pool().begin().await.map_err(BifrostError::DBError)?;
        let created = repo.create(&mut tx, data).await?;
        tx.commit().await.map_err(BifrostError::DBError)?;
        Ok(created)
    }

    async fn update_workflow_level_type(
        &self,
        requester: &Requester,
        uuid: &Uuid,
        data: &WorkflowLevelTypeData,
    ) -> Result<WorkflowLevelType> {
        requester.authorize(PermissionAction::Update)?;
        let repo = self.workflow_level_type_repository();
        let current = repo.find_by_uuid(uuid).await?.ok_or_else(|| not_found(uuid))?;
        validate(data)?;
        let mut tx = repo.db_pool().begin().await.map_err(BifrostError::DBError)?;
        repo.update(&mut tx, current.id, data).await?;
        tx.commit().await.map_err(BifrostError::DBError)?;
        repo.find(current.id)
            .await?
            .ok_or_else(|| not_found(uuid).into())
    }

    async fn delete_workflow_level_type(&self, requester: &Requester, uuid: &Uuid) -> Result<bool> {
        requester.authorize(PermissionAction::Delete)?;
        let repo = self.workflow_level_type_repository();
        match repo.find_by_uuid(uuid).await? {
            Some(current) => repo.delete(current.id).await,
            None => Ok(false),
        }
    }

    async fn find_workflow_level_type(
        &self,
        requester: &Requester,
        uuid: &Uuid,
    ) -> Result<Option<WorkflowLevelType>> {
        requester.authorize(PermissionAction::Read)?;
        self.workflow_level_type_repository().find_by_uuid(uuid).await
    }

    async fn find_workflow_level_type_list(
        &self,
        requester: &Requester,
        limit: Option<&i32>,
        offset: Option<&i64>,
    ) -> Result<Vec<WorkflowLevelType>> {
        requester.authorize(PermissionAction::Read)?;
        self.workflow_level_type_repository()
            .find_list(limit, offset)
            .await
    }

    async fn count_workflow_level_types(&self, requester: &Requester) -> Result<i64> {
        requester.authorize(PermissionAction::Read)?;
        let repo = self.workflow_level_type_repository();
        repo.count_list_tx(repo.db_pool()).await
    }
}

#[derive(Debug, Clone)]
pub struct WorkflowLevelTypeAppImpl {
    repositories: Arc<RdbRepositoryModule>,
}

impl WorkflowLevelTypeAppImpl {
    pub fn new(repositories: Arc<RdbRepositoryModule>) -> Self {
        Self { repositories }
    }
}

impl UseRdbRepositoryModule for WorkflowLevelTypeAppImpl {
    fn rdb_repository_module(&self) -> &RdbRepositoryModule {
        &self.repositories
    }
}

impl WorkflowLevelTypeApp for WorkflowLevelTypeAppImpl {}

pub trait UseWorkflowLevelTypeApp {
    fn workflow_level_type_app(&self) -> &WorkflowLevelTypeAppImpl;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::auth::test::{group, user};
    use crate::app::workflow::test::superuser;
    use bifrost_base::permissions::PERMISSIONS_VIEW_ONLY;
    use infra::infra::module::test::setup_test_rdb_module;
    use infra_utils::infra::test::TEST_RUNTIME;

    #[test]
    fn test_crud_by_uuid() -> Result<()> {
        TEST_RUNTIME.block_on(async {
            let (module, _rdb) = setup_test_rdb_module().await;
            let app = WorkflowLevelTypeAppImpl::new(Arc::new(module));
            let admin = superuser();
            let created = app
                .create_workflow_level_type(
                    &admin,
                    &WorkflowLevelTypeData {
                        name: "Project".to_string(),
                    },
                )
                .await?;
            let blank = app
                .create_workflow_level_type(&admin, &WorkflowLevelTypeData::default())
                .await;
            assert!(blank.is_err());

            let updated = app
                .update_workflow_level_type(
                    &admin,
                    &created.uuid,
                    &WorkflowLevelTypeData {
                        name: "Program".to_string(),
                    },
                )
                .await?;
            assert_eq!(updated.uuid, created.uuid);
            assert_eq!(updated.data.name, "Program");
            assert_eq!(app.count_workflow_level_types(&admin).await?, 1);

            // read only member of an organization
            let viewer = Requester::new(user(Some(1), false), vec![group(PERMISSIONS_VIEW_ONLY, true, false)]);
            assert!(app
                .find_workflow_level_type(&viewer, &created.uuid)
                .await?
                .is_some());
            assert!(app
                .delete_workflow_level_type(&viewer, &created.uuid)
                .await
                .is_err());

            assert!(app.delete_workflow_level_type(&admin, &created.uuid).await?);
            assert!(!app.delete_workflow_level_type(&admin, &created.uuid).await?);
            let missing = app
                .update_workflow_level_type(&admin, &created.uuid, &updated.data)
                .await
                .unwrap_err();
            assert!(matches!(
                missing.downcast_ref::<BifrostError>(),
                Some(BifrostError::NotFound(_))
            ));
            Ok(())
        })
    }
}
