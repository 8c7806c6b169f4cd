use super::auth::{OrganizationScope, Requester};
use super::hook::{HookAppImpl, UseHookApp};
use super::workflow::WorkflowCascade;
use super::unique_violation_to_validation;
use anyhow::Result;
use async_trait::async_trait;
use bifrost_base::error::BifrostError;
use bifrost_base::permissions::{PermissionAction, PERMISSIONS_ORG_ADMIN, PERMISSIONS_VIEW_ONLY};
use infra::infra::core_group::rdb::{CoreGroupRepository, UseCoreGroupRepository};
use infra::infra::module::{RdbRepositoryModule, UseRdbRepositoryModule};
use infra::infra::organization::rdb::{OrganizationRepository, UseOrganizationRepository};
use infra_utils::infra::cache::{MokaCache, MokaCacheConfig, MokaCacheImpl, UseMokaCache};
use infra_utils::infra::rdb::{Rdb, UseRdbPool};
use model::{CoreGroupData, Organization, OrganizationData};
use sqlx::Transaction;
use std::sync::Arc;
use uuid::Uuid;

pub const ADMIN_GROUP_NAME: &str = "Admin";
pub const MEMBER_GROUP_NAME: &str = "Member";

fn validate_organization(data: &OrganizationData) -> Result<()> {
    if data.name.trim().is_empty() {
        return Err(BifrostError::validation_field("name", "This field may not be blank.").into());
    }
    Ok(())
}

#[async_trait]
pub trait OrganizationApp:
    UseOrganizationRepository
    + UseCoreGroupRepository
    + UseMokaCache<Arc<String>, Organization>
    + WorkflowCascade
    + UseHookApp
    + Send
    + Sync
{
    fn find_cache_key(&self, uuid: &Uuid) -> String {
        ["organization_uuid:", &uuid.to_string()].join("")
    }

    /// create with its default org level groups (Admin and Member)
    async fn create_organization_tx(
        &self,
        tx: &mut Transaction<'_, Rdb>,
        data: &OrganizationData,
    ) -> Result<Organization> {
        validate_organization(data)?;
        let org = self
            .organization_repository()
            .create(tx, data)
            .await
            .map_err(|e| {
                unique_violation_to_validation(
                    e,
                    "name",
                    "organization with this name already exists.",
                )
            })?;
        for (name, permissions) in [
            (ADMIN_GROUP_NAME, PERMISSIONS_ORG_ADMIN),
            (MEMBER_GROUP_NAME, PERMISSIONS_VIEW_ONLY),
        ] {
            self.core_group_repository()
                .create(
                    tx,
                    &CoreGroupData {
                        name: name.to_string(),
                        organization_id: Some(org.id),
                        is_global: false,
                        is_org_level: true,
                        permissions,
                    },
                )
                .await?;
        }
        tracing::debug!("created organization: {} ({})", &org.data.name, org.id);
        Ok(org)
    }

    /// (organization, created)
    async fn get_or_create_organization_tx(
        &self,
        tx: &mut Transaction<'_, Rdb>,
        name: &str,
    ) -> Result<(Organization, bool)> {
        if let Some(org) = self
            .organization_repository()
            .find_by_name_tx(&mut **tx, name)
            .await?
        {
            return Ok((org, false));
        }
        let data = OrganizationData {
            name: name.to_string(),
            ..Default::default()
        };
        self.create_organization_tx(tx, &data)
            .await
            .map(|org| (org, true))
    }

    async fn create_organization(
        &self,
        requester: &Requester,
        data: &OrganizationData,
    ) -> Result<Organization> {
        requester.authorize(PermissionAction::Create)?;
        let mut tx = self
            .organization_repository()
            .db_pool()
            .begin()
            .await
            .map_err(BifrostError::DBError)?;
        let org = self.create_organization_tx(&mut tx, data).await?;
        tx.commit().await.map_err(BifrostError::DBError)?;
        Ok(org)
    }

    async fn update_organization(
        &self,
        requester: &Requester,
        uuid: &Uuid,
        data: &OrganizationData,
    ) -> Result<Organization> {
        requester.authorize(PermissionAction::Update)?;
        validate_organization(data)?;
        let current = self.find_organization(requester, uuid).await?.ok_or_else(|| {
            BifrostError::NotFound(format!("organization not found: {}", uuid))
        })?;
        let mut tx = self
            .organization_repository()
            .db_pool()
            .begin()
            .await
            .map_err(BifrostError::DBError)?;
        self.organization_repository()
            .update(&mut tx, current.id, data)
            .await
            .map_err(|e| {
                unique_violation_to_validation(
                    e,
                    "name",
                    "organization with this name already exists.",
                )
            })?;
        tx.commit().await.map_err(BifrostError::DBError)?;
        let _ = self.delete_cache(&Arc::new(self.find_cache_key(uuid))).await;
        self.organization_repository()
            .find(current.id)
            .await?
            .ok_or_else(|| BifrostError::NotFound(format!("organization not found: {}", uuid)).into())
    }

    async fn delete_organization(&self, requester: &Requester, uuid: &Uuid) -> Result<bool> {
        requester.authorize(PermissionAction::Delete)?;
        let Some(current) = self.find_organization(requester, uuid).await? else {
            return Ok(false);
        };
        // workflowlevel1s and their children are removed with it by the foreign keys
        let cascaded = self.find_organization_cascade(current.id).await?;
        let r = self.organization_repository().delete(current.id).await;
        let _ = self.delete_cache(&Arc::new(self.find_cache_key(uuid))).await;
        if let Ok(true) = r {
            cascaded.fire_removed(self.hook_app()).await;
        }
        r
    }

    /// None if not found or out of the requester's organization
    async fn find_organization(
        &self,
        requester: &Requester,
        uuid: &Uuid,
    ) -> Result<Option<Organization>> {
        requester.authorize(PermissionAction::Read)?;
        let k = Arc::new(self.find_cache_key(uuid));
        let found = self
            .with_cache_if_some(&k, || async {
                self.organization_repository().find_by_uuid(uuid).await
            })
            .await?;
        Ok(found.filter(|o| requester.scope().contains(Some(o.id))))
    }

    async fn find_organization_list(
        &self,
        requester: &Requester,
        limit: Option<&i32>,
        offset: Option<&i64>,
    ) -> Result<Vec<Organization>> {
        requester.authorize(PermissionAction::Read)?;
        match requester.scope() {
            OrganizationScope::All => {
                self.organization_repository()
                    .find_list(None, limit, offset)
                    .await
            }
            OrganizationScope::Only(id) => {
                self.organization_repository()
                    .find_list(Some(id), limit, offset)
                    .await
            }
            OrganizationScope::Nothing => Ok(vec![]),
        }
    }

    async fn count_organizations(&self, requester: &Requester) -> Result<i64> {
        requester.authorize(PermissionAction::Read)?;
        let db = self.organization_repository().db_pool();
        match requester.scope() {
            OrganizationScope::All => self.organization_repository().count_list_tx(db, None).await,
            OrganizationScope::Only(id) => {
                self.organization_repository()
                    .count_list_tx(db, Some(id))
                    .await
            }
            OrganizationScope::Nothing => Ok(0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrganizationAppImpl {
    repositories: Arc<RdbRepositoryModule>,
    hook_app: Arc<HookAppImpl>,
    memory_cache: MokaCacheImpl<Arc<String>, Organization>,
}

impl OrganizationAppImpl {
    pub fn new(
        repositories: Arc<RdbRepositoryModule>,
        hook_app: Arc<HookAppImpl>,
        mc_config: &MokaCacheConfig,
    ) -> Self {
        Self {
            repositories,
            hook_app,
            memory_cache: MokaCacheImpl::new(mc_config),
        }
    }
}

impl UseHookApp for OrganizationAppImpl {
    fn hook_app(&self) -> &HookAppImpl {
        &self.hook_app
    }
}

impl UseRdbRepositoryModule for OrganizationAppImpl {
    fn rdb_repository_module(&self) -> &RdbRepositoryModule {
        &self.repositories
    }
}

impl UseMokaCache<Arc<String>, Organization> for OrganizationAppImpl {
    fn cache(&self) -> &MokaCache<Arc<String>, Organization> {
        self.memory_cache.cache()
    }
}

impl OrganizationApp for OrganizationAppImpl {}

pub trait UseOrganizationApp {
    fn organization_app(&self) -> &OrganizationAppImpl;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::auth::test::{group, user};
    use crate::app::hook::HookApp;
    use crate::app::workflow::test::{create_workflow_tree, org_admin, webhook_receiver};
    use bifrost_base::settings::Settings;
    use infra::infra::module::test::setup_test_rdb_module;
    use infra::infra::workflow_level1::rdb::{UseWorkflowLevel1Repository, WorkflowLevel1Repository};
    use infra_utils::infra::test::TEST_RUNTIME;
    use std::time::Duration;

    fn superuser() -> Requester {
        Requester::new(user(None, true), vec![])
    }

    fn new_app(module: Arc<RdbRepositoryModule>) -> OrganizationAppImpl {
        let hook_app = Arc::new(HookAppImpl::new(Arc::new(Settings::default()), module.clone()));
        OrganizationAppImpl::new(module, hook_app, &MokaCacheConfig::default())
    }

    #[test]
    fn test_create_organization_with_default_groups() -> Result<()> {
        TEST_RUNTIME.block_on(async {
            let (module, _rdb) = setup_test_rdb_module().await;
            let app = new_app(Arc::new(module));
            let data = OrganizationData {
                name: "Humanitec".to_string(),
                industry: Some("software".to_string()),
                ..Default::default()
            };
            let org = app.create_organization(&superuser(), &data).await?;
            let groups = app
                .core_group_repository()
                .find_list(Some(org.id), None, None)
                .await?;
            let mut summary: Vec<(String, bool, i32)> = groups
                .iter()
                .map(|g| (g.data.name.clone(), g.data.is_org_level, g.data.permissions))
                .collect();
            summary.sort();
            assert_eq!(
                summary,
                vec![
                    ("Admin".to_string(), true, 15),
                    ("Member".to_string(), true, 4)
                ]
            );

            // duplicated name
            let err = app.create_organization(&superuser(), &data).await.unwrap_err();
            assert!(matches!(
                err.downcast_ref::<BifrostError>(),
                Some(BifrostError::ValidationError(_))
            ));
            let blank = OrganizationData::default();
            assert!(app.create_organization(&superuser(), &blank).await.is_err());
            Ok(())
        })
    }

    #[test]
    fn test_get_or_create() -> Result<()> {
        TEST_RUNTIME.block_on(async {
            let (module, _rdb) = setup_test_rdb_module().await;
            let app = new_app(Arc::new(module));
            let mut tx = app.organization_repository().db_pool().begin().await?;
            let (org, created) = app.get_or_create_organization_tx(&mut tx, "Org").await?;
            assert!(created);
            let (again, created) = app.get_or_create_organization_tx(&mut tx, "Org").await?;
            assert!(!created);
            assert_eq!(again.id, org.id);
            tx.commit().await?;
            Ok(())
        })
    }

    #[test]
    fn test_scope_and_permissions() -> Result<()> {
        TEST_RUNTIME.block_on(async {
            let (module, _rdb) = setup_test_rdb_module().await;
            let app = new_app(Arc::new(module));
            let mine = app
                .create_organization(
                    &superuser(),
                    &OrganizationData {
                        name: "Mine".to_string(),
                        ..Default::default()
                    },
                )
                .await?;
            let other = app
                .create_organization(
                    &superuser(),
                    &OrganizationData {
                        name: "Other".to_string(),
                        ..Default::default()
                    },
                )
                .await?;
            let viewer = Requester::new(
                user(Some(mine.id), false),
                vec![group(PERMISSIONS_VIEW_ONLY, true, false)],
            );
            let list = app.find_organization_list(&viewer, None, None).await?;
            assert_eq!(list.iter().map(|o| o.id).collect::<Vec<_>>(), vec![mine.id]);
            assert_eq!(app.count_organizations(&viewer).await?, 1);
            assert_eq!(app.count_organizations(&superuser()).await?, 2);
            assert!(app
                .find_organization(&viewer, &other.organization_uuid)
                .await?
                .is_none());
            assert!(app
                .find_organization(&viewer, &mine.organization_uuid)
                .await?
                .is_some());
            // view only
            let update = OrganizationData {
                name: "Renamed".to_string(),
                ..Default::default()
            };
            assert!(app
                .update_organization(&viewer, &mine.organization_uuid, &update)
                .await
                .is_err());
            let updated = app
                .update_organization(&superuser(), &mine.organization_uuid, &update)
                .await?;
            assert_eq!(updated.data.name, "Renamed");
            // cache is refreshed after update
            let found = app
                .find_organization(&viewer, &mine.organization_uuid)
                .await?
                .unwrap();
            assert_eq!(found.data.name, "Renamed");
            assert!(app
                .delete_organization(&superuser(), &other.organization_uuid)
                .await?);
            assert!(app
                .find_organization(&superuser(), &other.organization_uuid)
                .await?
                .is_none());
            Ok(())
        })
    }

    #[test]
    fn test_delete_fires_removed_hooks_of_workflows() -> Result<()> {
        TEST_RUNTIME.block_on(async {
            let (target, receiver) = webhook_receiver(3).await?;
            let (module, _rdb) = setup_test_rdb_module().await;
            let module = Arc::new(module);
            let settings = Settings {
                webhook_target_url: target,
                ..Default::default()
            };
            let hook_app = Arc::new(HookAppImpl::new(Arc::new(settings), module.clone()));
            let app = OrganizationAppImpl::new(
                module.clone(),
                hook_app.clone(),
                &MokaCacheConfig::default(),
            );
            let org = app
                .create_organization(
                    &superuser(),
                    &OrganizationData {
                        name: "Closing".to_string(),
                        ..Default::default()
                    },
                )
                .await?;
            // the member outlives the organization (organization_id is set to null)
            let member = org_admin(&module, org.id, "member").await?;
            for event in [
                "workflowlevel1.removed",
                "workflowlevel2.removed",
                "workflowteam.removed",
            ] {
                hook_app
                    .create_hook(&member, event, "http://unreachable.invalid/")
                    .await?;
            }
            let (level1, _, _) = create_workflow_tree(&module, org.id, member.id()).await?;

            assert!(app
                .delete_organization(&superuser(), &org.organization_uuid)
                .await?);
            assert!(module.workflow_level1_repository().find(level1.id).await?.is_none());
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
