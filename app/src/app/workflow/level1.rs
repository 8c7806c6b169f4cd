use super::{fire_hook, WorkflowCascade};
use crate::app::auth::{OrganizationScope, Requester};
use crate::app::hook::{HookAppImpl, UseHookApp};
use anyhow::Result;
use async_trait::async_trait;
use bifrost_base::error::BifrostError;
use bifrost_base::hook_event::HookAction;
use bifrost_base::permissions::PermissionAction;
use infra::infra::module::{RdbRepositoryModule, UseRdbRepositoryModule};
use infra::infra::workflow_level1::rdb::{WorkflowLevel1Repository, UseWorkflowLevel1Repository};
use infra_utils::infra::rdb::UseRdbPool;
use model::{WorkflowLevel1, WorkflowLevel1Data};
use std::sync::Arc;

pub(crate) const RESOURCE: &str = "workflowlevel1";

fn validate(data: &WorkflowLevel1Data) -> Result<()> {
    if data.name.trim().is_empty() {
        return Err(BifrostError::validation_field("name", "This field may not be blank.").into());
    }
    Ok(())
}

#[async_trait]
pub trait WorkflowLevel1App:
    UseWorkflowLevel1Repository + WorkflowCascade + UseHookApp + Send + Sync
{
    async fn create_workflow_level1(
        &self,
        requester: &Requester,
        data: &WorkflowLevel1Data,
    ) -> Result<WorkflowLevel1> {
        requester.authorize(PermissionAction::Create)?;
        validate(data)?;
        let data = WorkflowLevel1Data {
            organization_id: requester.resolve_organization(data.organization_id)?,
            ..data.clone()
        };
        let repo = self.workflow_level1_repository();
        let mut tx = repo.db_pool().begin().await.map_err(BifrostError::DBError)?;
        let created = repo.create(&mut tx, &data).await?;
        tx.commit().await.map_err(BifrostError::DBError)?;
        fire_hook(self.hook_app(), RESOURCE, HookAction::Added, &created).await;
        Ok(created)
    }

    async fn update_workflow_level1(
        &self,
        requester: &Requester,
        id: i64,
        data: &WorkflowLevel1Data,
    ) -> Result<WorkflowLevel1> {
        requester.authorize(PermissionAction::Update)?;
        let current = self.find_workflow_level1(requester, id).await?.ok_or_else(|| {
            BifrostError::NotFound(format!("workflowlevel1 not found: id = {}", id))
        })?;
        validate(data)?;
        let data = WorkflowLevel1Data {
            organization_id: requester
                .resolve_organization(data.organization_id.or(current.data.organization_id))?,
            ..data.clone()
        };
        let repo = self.workflow_level1_repository();
        let mut tx = repo.db_pool().begin().await.map_err(BifrostError::DBError)?;
        repo.update(&mut tx, id, &data).await?;
        tx.commit().await.map_err(BifrostError::DBError)?;
        let updated = repo.find(id).await?.ok_or_else(|| {
            BifrostError::NotFound(format!("workflowlevel1 not found: id = {}", id))
        })?;
        fire_hook(self.hook_app(), RESOURCE, HookAction::Changed, &updated).await;
        Ok(updated)
    }

    async fn delete_workflow_level1(&self, requester: &Requester, id: i64) -> Result<bool> {
        requester.authorize(PermissionAction::Delete)?;
        let Some(current) = self.find_workflow_level1(requester, id).await? else {
            return Ok(false);
        };
        // level2 and team rows are removed with it by the foreign keys
        let mut cascaded = self.find_level1_cascade(id).await?;
        let deleted = self.workflow_level1_repository().delete(id).await?;
        if deleted {
            cascaded.level1s.push(current);
            cascaded.fire_removed(self.hook_app()).await;
        }
        Ok(deleted)
    }

    async fn find_workflow_level1(
        &self,
        requester: &Requester,
        id: i64,
    ) -> Result<Option<WorkflowLevel1>> {
        requester.authorize(PermissionAction::Read)?;
        Ok(self
            .workflow_level1_repository()
            .find(id)
            .await?
            .filter(|w| requester.scope().contains(w.data.organization_id)))
    }

    async fn find_workflow_level1_list(
        &self,
        requester: &Requester,
        limit: Option<&i32>,
        offset: Option<&i64>,
    ) -> Result<Vec<WorkflowLevel1>> {
        requester.authorize(PermissionAction::Read)?;
        let repo = self.workflow_level1_repository();
        match requester.scope() {
            OrganizationScope::All => repo.find_list(None, limit, offset).await,
            OrganizationScope::Only(id) => repo.find_list(Some(id), limit, offset).await,
            OrganizationScope::Nothing => Ok(vec![]),
        }
    }

    async fn count_workflow_level1s(&self, requester: &Requester) -> Result<i64> {
        requester.authorize(PermissionAction::Read)?;
        let repo = self.workflow_level1_repository();
        match requester.scope() {
            OrganizationScope::All => repo.count_list_tx(repo.db_pool(), None).await,
            OrganizationScope::Only(id) => repo.count_list_tx(repo.db_pool(), Some(id)).await,
            OrganizationScope::Nothing => Ok(0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkflowLevel1AppImpl {
    repositories: Arc<RdbRepositoryModule>,
    hook_app: Arc<HookAppImpl>,
}

impl WorkflowLevel1AppImpl {
    pub fn new(repositories: Arc<RdbRepositoryModule>, hook_app: Arc<HookAppImpl>) -> Self {
        Self {
            repositories,
            hook_app,
        }
    }
}

impl UseRdbRepositoryModule for WorkflowLevel1AppImpl {
    fn rdb_repository_module(&self) -> &RdbRepositoryModule {
        &self.repositories
    }
}

impl UseHookApp for WorkflowLevel1AppImpl {
    fn hook_app(&self) -> &HookAppImpl {
        &self.hook_app
    }
}

impl WorkflowLevel1App for WorkflowLevel1AppImpl {}

pub trait UseWorkflowLevel1App {
    fn workflow_level1_app(&self) -> &WorkflowLevel1AppImpl;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::hook::HookApp;
    use crate::app::workflow::test::{
        create_organization, create_workflow_tree, org_admin, superuser, webhook_receiver,
    };
    use bifrost_base::settings::Settings;
    use infra::infra::workflow_level2::rdb::{UseWorkflowLevel2Repository, WorkflowLevel2Repository};
    use infra::infra::workflow_team::rdb::{UseWorkflowTeamRepository, WorkflowTeamRepository};
    use std::time::Duration;
    use infra::infra::module::test::setup_test_rdb_module;
    use infra_utils::infra::test::TEST_RUNTIME;

    #[test]
    fn test_scoped_crud() -> Result<()> {
        TEST_RUNTIME.block_on(async {
            let (module, _rdb) = setup_test_rdb_module().await;
            let module = Arc::new(module);
            let hook_app = Arc::new(HookAppImpl::new(Arc::new(Settings::default()), module.clone()));
            let app = WorkflowLevel1AppImpl::new(module.clone(), hook_app);
            let mine = create_organization(&module, "Mine").await?;
            let other = create_organization(&module, "Other").await?;
            let admin = org_admin(&module, mine.id, "admin").await?;

            let data = WorkflowLevel1Data {
                name: "Health and Survival for Syrians in Affected Regions".to_string(),
                ..Default::default()
            };
            let created = app.create_workflow_level1(&admin, &data).await?;
            assert_eq!(created.data.organization_id, Some(mine.id));
            let theirs = app
                .create_workflow_level1(
                    &superuser(),
                    &WorkflowLevel1Data {
                        organization_id: Some(other.id),
                        ..data.clone()
                    },
                )
                .await?;
            assert!(app
                .create_workflow_level1(
                    &admin,
                    &WorkflowLevel1Data {
                        name: " ".to_string(),
                        ..data.clone()
                    }
                )
                .await
                .is_err());

            assert!(app.find_workflow_level1(&admin, theirs.id).await?.is_none());
            assert_eq!(app.count_workflow_level1s(&admin).await?, 1);
            assert_eq!(app.count_workflow_level1s(&superuser()).await?, 2);
            assert_eq!(
                app.find_workflow_level1_list(&superuser(), Some(&1), Some(&1))
                    .await?
                    .len(),
                1
            );

            let updated = app
                .update_workflow_level1(
                    &admin,
                    created.id,
                    &WorkflowLevel1Data {
                        name: "Renamed".to_string(),
                        sort: 3,
                        ..Default::default()
                    },
                )
                .await?;
            assert_eq!(updated.data.name, "Renamed");
            assert_eq!(updated.data.sort, 3);
            assert_eq!(updated.data.organization_id, Some(mine.id));
            assert!(app
                .update_workflow_level1(&admin, theirs.id, &data)
                .await
                .is_err());

            assert!(!app.delete_workflow_level1(&admin, theirs.id).await?);
            assert!(app.delete_workflow_level1(&admin, created.id).await?);
            assert!(app.find_workflow_level1(&admin, created.id).await?.is_none());
            Ok(())
        })
    }

    #[test]
    fn test_delete_fires_removed_hooks_of_children() -> Result<()> {
        TEST_RUNTIME.block_on(async {
            let (target, receiver) = webhook_receiver(3).await?;
            let (module, _rdb) = setup_test_rdb_module().await;
            let module = Arc::new(module);
            let settings = Settings {
                webhook_target_url: target,
                ..Default::default()
            };
            let hook_app = Arc::new(HookAppImpl::new(Arc::new(settings), module.clone()));
            let app = WorkflowLevel1AppImpl::new(module.clone(), hook_app.clone());
            let org = create_organization(&module, "Mine").await?;
            let admin = org_admin(&module, org.id, "admin").await?;
            for event in [
                "workflowlevel1.removed",
                "workflowlevel2.removed",
                "workflowteam.removed",
            ] {
                hook_app
                    .create_hook(&admin, event, "http://unreachable.invalid/")
                    .await?;
            }
            let (level1, level2, team) = create_workflow_tree(&module, org.id, admin.id()).await?;

            assert!(app.delete_workflow_level1(&admin, level1.id).await?);
            assert!(module.workflow_level2_repository().find(level2.id).await?.is_none());
            assert!(module.workflow_team_repository().find(team.id).await?.is_none());
            let events = tokio::time::timeout(Duration::from_secs(10), receiver).await???;
            assert_eq!(
                events,
                vec![
                    "workflowlevel1.removed".to_string(),
                    "workflowlevel2.removed".to_string(),
                    "workflowteam.removed".to_string(),
                ]
            );
            Ok(())
        })
    }
}
