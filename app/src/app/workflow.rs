//! Workflow structures. Level2 items, their sort orders and team
//! memberships belong to the organization of their WorkflowLevel1.

pub mod level1;
pub mod level2;
pub mod level2_sort;
pub mod level_status;
pub mod level_type;
pub mod team;

use super::auth::{OrganizationScope, Requester};
use super::hook::{HookApp, HookAppImpl};
use anyhow::Result;
use async_trait::async_trait;
use bifrost_base::error::BifrostError;
use bifrost_base::hook_event::{event_name, HookAction};
use infra::infra::workflow_level1::rdb::{WorkflowLevel1Repository, UseWorkflowLevel1Repository};
use infra::infra::workflow_level2::rdb::{UseWorkflowLevel2Repository, WorkflowLevel2Repository};
use infra::infra::workflow_level2::rows::WorkflowLevel1ChildFilter;
use infra::infra::workflow_team::rdb::{UseWorkflowTeamRepository, WorkflowTeamRepository};
use model::{WorkflowLevel1, WorkflowLevel2, WorkflowTeam};
use serde::Serialize;

pub(crate) fn does_not_exist_message(pk: impl std::fmt::Display) -> String {
    format!("Invalid pk \"{}\" - object does not exist.", pk)
}

pub(crate) fn does_not_exist(field: &str, pk: impl std::fmt::Display) -> BifrostError {
    BifrostError::validation_field(field, does_not_exist_message(pk))
}

/// list filter of the requester's organization (None: nothing is visible)
pub fn child_filter(
    requester: &Requester,
    workflowlevel1_id: Option<i64>,
) -> Option<WorkflowLevel1ChildFilter> {
    match requester.scope() {
        OrganizationScope::All => Some(WorkflowLevel1ChildFilter {
            organization_id: None,
            workflowlevel1_id,
        }),
        OrganizationScope::Only(id) => Some(WorkflowLevel1ChildFilter {
            organization_id: Some(id),
            workflowlevel1_id,
        }),
        OrganizationScope::Nothing => None,
    }
}

#[async_trait]
pub trait WorkflowLevel1Scope: UseWorkflowLevel1Repository + Send + Sync {
    async fn find_scoped_level1(
        &self,
        requester: &Requester,
        id: i64,
    ) -> Result<Option<WorkflowLevel1>> {
        Ok(self
            .workflow_level1_repository()
            .find(id)
            .await?
            .filter(|w| requester.scope().contains(w.data.organization_id)))
    }

    /// parent reference of a written row (validation error if not visible)
    async fn validate_level1(&self, requester: &Requester, id: i64) -> Result<WorkflowLevel1> {
        self.find_scoped_level1(requester, id)
            .await?
            .ok_or_else(|| does_not_exist("workflowlevel1", id).into())
    }
}

impl<T: UseWorkflowLevel1Repository + Send + Sync + ?Sized> WorkflowLevel1Scope for T {}

/// fire `{resource}.{action}` with the json of the instance (failures are logged)
pub(crate) async fn fire_hook<T: Serialize + Sync>(
    hook_app: &HookAppImpl,
    resource: &str,
    action: HookAction,
    instance: &T,
) {
    let event = event_name(resource, action);
    let data = match serde_json::to_value(instance) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("cannot serialize {} for hook: {:?}", &event, e);
            return;
        }
    };
    if let Err(e) = hook_app.find_and_fire_hook(&event, data).await {
        tracing::warn!("failed to fire hook {}: {:?}", &event, e);
    }
}

/// Workflow rows deleted by the foreign keys together with their parent.
/// Collected before the parent delete so that their removed hooks can fire.
#[derive(Debug, Default)]
pub struct CascadedRows {
    pub level1s: Vec<WorkflowLevel1>,
    pub level2s: Vec<WorkflowLevel2>,
    pub teams: Vec<WorkflowTeam>,
}

impl CascadedRows {
    /// fire the removed events, children before their workflowlevel1
    pub(crate) async fn fire_removed(&self, hook_app: &HookAppImpl) {
        for row in self.level2s.iter() {
            fire_hook(hook_app, level2::RESOURCE, HookAction::Removed, row).await;
        }
        for row in self.teams.iter() {
            fire_hook(hook_app, team::RESOURCE, HookAction::Removed, row).await;
        }
        for row in self.level1s.iter() {
            fire_hook(hook_app, level1::RESOURCE, HookAction::Removed, row).await;
        }
    }
}

#[async_trait]
pub trait WorkflowCascade:
    UseWorkflowLevel1Repository
    + UseWorkflowLevel2Repository
    + UseWorkflowTeamRepository
    + Send
    + Sync
{
    /// level2 and team rows of a workflowlevel1 (the workflowlevel1 itself is not included)
    async fn find_level1_cascade(&self, workflowlevel1_id: i64) -> Result<CascadedRows> {
        self.find_children(&WorkflowLevel1ChildFilter {
            organization_id: None,
            workflowlevel1_id: Some(workflowlevel1_id),
        })
        .await
    }

    /// workflowlevel1s of an organization with all of their level2 and team rows
    async fn find_organization_cascade(&self, organization_id: i64) -> Result<CascadedRows> {
        let mut rows = self
            .find_children(&WorkflowLevel1ChildFilter {
                organization_id: Some(organization_id),
                workflowlevel1_id: None,
            })
            .await?;
        rows.level1s = self
            .workflow_level1_repository()
            .find_list(Some(organization_id), None, None)
            .await?;
        Ok(rows)
    }

    /// team memberships of a user
    async fn find_user_cascade(&self, core_user_id: i64) -> Result<CascadedRows> {
        let teams = self
            .workflow_team_repository()
            .find_list_by_user(core_user_id)
            .await?;
        Ok(CascadedRows {
            teams,
            ..Default::default()
        })
    }

    async fn find_children(&self, filter: &WorkflowLevel1ChildFilter) -> Result<CascadedRows> {
        let level2s = self
            .workflow_level2_repository()
            .find_list(filter, None, None)
            .await?;
        let teams = self
            .workflow_team_repository()
            .find_list(filter, None, None)
            .await?;
        Ok(CascadedRows {
            level2s,
            teams,
            ..Default::default()
        })
    }
}

impl<T> WorkflowCascade for T where
    T: UseWorkflowLevel1Repository
        + UseWorkflowLevel2Repository
        + UseWorkflowTeamRepository
        + Send
        + Sync
{
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::app::auth::test::{group, user};
    use bifrost_base::permissions::PERMISSIONS_ORG_ADMIN;
    use infra::infra::module::RdbRepositoryModule;
    use infra::infra::organization::rdb::{OrganizationRepository, UseOrganizationRepository};
    use infra_utils::infra::rdb::UseRdbPool;
    use infra::infra::core_user::rdb::{CoreUserRepository, UseCoreUserRepository};
    use model::{
        CoreUserData, Organization, OrganizationData, WorkflowLevel1Data, WorkflowLevel2Data,
        WorkflowTeamData,
    };
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    pub async fn create_organization(module: &RdbRepositoryModule, name: &str) -> Result<Organization> {
        let mut tx = module.db_pool().begin().await?;
        let org = module
            .organization_repository()
            .create(
                &mut tx,
                &OrganizationData {
                    name: name.to_string(),
                    ..Default::default()
                },
            )
            .await?;
        tx.commit().await?;
        Ok(org)
    }

    /// stored org admin user of the organization
    pub async fn org_admin(
        module: &RdbRepositoryModule,
        organization_id: i64,
        username: &str,
    ) -> Result<Requester> {
        let mut tx = module.db_pool().begin().await?;
        let created = module
            .core_user_repository()
            .create(
                &mut tx,
                &CoreUserData {
                    username: username.to_string(),
                    email: format!("{}@example.com", username),
                    is_active: true,
                    organization_id: Some(organization_id),
                    ..Default::default()
                },
                "",
            )
            .await?;
        tx.commit().await?;
        Ok(Requester::new(
            created,
            vec![group(PERMISSIONS_ORG_ADMIN, true, false)],
        ))
    }

    pub fn superuser() -> Requester {
        Requester::new(user(None, true), vec![])
    }

    /// workflowlevel1 of the organization with one level2 item and one team member
    pub async fn create_workflow_tree(
        module: &RdbRepositoryModule,
        organization_id: i64,
        member_id: i64,
    ) -> Result<(WorkflowLevel1, WorkflowLevel2, WorkflowTeam)> {
        let mut tx = module.db_pool().begin().await?;
        let level1 = module
            .workflow_level1_repository()
            .create(
                &mut tx,
                &WorkflowLevel1Data {
                    name: "wl1".to_string(),
                    organization_id: Some(organization_id),
                    ..Default::default()
                },
            )
            .await?;
        let level2 = module
            .workflow_level2_repository()
            .create(
                &mut tx,
                &WorkflowLevel2Data {
                    workflowlevel1_id: level1.id,
                    name: "wl2".to_string(),
                    ..Default::default()
                },
            )
            .await?;
        let team = module
            .workflow_team_repository()
            .create(
                &mut tx,
                &WorkflowTeamData {
                    workflow_user_id: member_id,
                    workflowlevel1_id: level1.id,
                    ..Default::default()
                },
            )
            .await?;
        tx.commit().await?;
        Ok((level1, level2, team))
    }

    async fn read_request(socket: &mut TcpStream) -> std::io::Result<String> {
        let mut buf = vec![0u8; 8192];
        let mut received = Vec::new();
        loop {
            let n = socket.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            received.extend_from_slice(&buf[..n]);
            if let Some(end) = received.windows(4).position(|w| w == b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&received[..end]).to_lowercase();
                let length = headers
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if received.len() >= end + 4 + length {
                    break;
                }
            }
        }
        Ok(String::from_utf8_lossy(&received).to_string())
    }

    /// Local webhook target. Returns its url and a task resolving to the
    /// sorted event names of the first `count` deliveries.
    pub async fn webhook_receiver(
        count: usize,
    ) -> Result<(String, JoinHandle<std::io::Result<Vec<String>>>)> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let target = format!("http://{}/webhook/", listener.local_addr()?);
        let server = tokio::spawn(async move {
            let mut events = Vec::new();
            while events.len() < count {
                let (mut socket, _) = listener.accept().await?;
                let request = read_request(&mut socket).await?;
                socket
                    .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                    .await?;
                if let Some(event) = request
                    .split("\"event\":\"")
                    .nth(1)
                    .and_then(|rest| rest.split('"').next())
                {
                    events.push(event.to_string());
                }
            }
            events.sort();
            Ok(events)
        });
        Ok((target, server))
    }

    #[test]
    fn test_child_filter() {
        assert_eq!(
            child_filter(&superuser(), Some(3)),
            Some(WorkflowLevel1ChildFilter {
                organization_id: None,
                workflowlevel1_id: Some(3)
            })
        );
        let member = Requester::new(user(Some(5), false), vec![]);
        assert_eq!(
            child_filter(&member, None),
            Some(WorkflowLevel1ChildFilter {
                organization_id: Some(5),
                workflowlevel1_id: None
            })
        );
        let orphan = Requester::new(user(None, false), vec![]);
        assert_eq!(child_filter(&orphan, None), None);
    }
}
