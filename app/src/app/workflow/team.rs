use super::{child_filter, does_not_exist_message, fire_hook, WorkflowLevel1Scope};
use crate::app::auth::Requester;
use crate::app::hook::{HookAppImpl, UseHookApp};
use anyhow::Result;
use async_trait::async_trait;
use bifrost_base::error::{BifrostError, ValidationErrors};
use bifrost_base::hook_event::HookAction;
use bifrost_base::permissions::PermissionAction;
use infra::infra::core_group::rdb::{CoreGroupRepository, UseCoreGroupRepository};
use infra::infra::core_user::rdb::{CoreUserRepository, UseCoreUserRepository};
use infra::infra::module::{RdbRepositoryModule, UseRdbRepositoryModule};
use infra::infra::workflow_level1::rdb::UseWorkflowLevel1Repository;
use infra::infra::workflow_team::rdb::{UseWorkflowTeamRepository, WorkflowTeamRepository};
use infra_utils::infra::rdb::UseRdbPool;
use model::{WorkflowLevel1, WorkflowTeam, WorkflowTeamData};
use std::sync::Arc;

pub(crate) const RESOURCE: &str = "workflowteam";

/// team membership with its workflowlevel1 (list representation)
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowTeamWithLevel1 {
    pub team: WorkflowTeam,
    pub workflowlevel1: Option<WorkflowLevel1>,
}

#[async_trait]
pub trait WorkflowTeamApp:
    UseWorkflowLevel1Repository
    + UseWorkflowTeamRepository
    + UseCoreUserRepository
    + UseCoreGroupRepository
    + UseHookApp
    + Send
    + Sync
{
    async fn validate_workflow_team(
        &self,
        requester: &Requester,
        data: &WorkflowTeamData,
    ) -> Result<()> {
        let mut errors = ValidationErrors::new();
        if self
            .find_scoped_level1(requester, data.workflowlevel1_id)
            .await?
            .is_none()
        {
            errors.add("workflowlevel1", does_not_exist_message(data.workflowlevel1_id));
        }
        let user_visible = self
            .core_user_repository()
            .find(data.workflow_user_id)
            .await?
            .is_some_and(|u| requester.scope().contains(u.data.organization_id));
        if !user_visible {
            errors.add("workflow_user", does_not_exist_message(data.workflow_user_id));
        }
        if let Some(role_id) = data.role_id {
            if self.core_group_repository().find(role_id).await?.is_none() {
                errors.add("role", does_not_exist_message(role_id));
            }
        }
        if let (Some(start), Some(end)) = (data.start_date, data.end_date) {
            if end < start {
                errors.add(
                    ValidationErrors::NON_FIELD_ERRORS,
                    "end_date must be after start_date.",
                );
            }
        }
        errors.into_result().map_err(|e| e.into())
    }

    async fn create_workflow_team(
        &self,
        requester: &Requester,
        data: &WorkflowTeamData,
    ) -> Result<WorkflowTeam> {
        requester.authorize(PermissionAction::Create)?;
        self.validate_workflow_team(requester, data).await?;
        let repo = self.workflow_team_repository();
        let mut tx = repo.db_pool().begin().await.map_err(BifrostError::DBError)?;
        let created = repo.create(&mut tx, data).await?;
        tx.commit().await.map_err(BifrostError::DBError)?;
        fire_hook(self.hook_app(), RESOURCE, HookAction::Added, &created).await;
        Ok(created)
    }

    async fn update_workflow_team(
        &self,
        requester: &Requester,
        id: i64,
        data: &WorkflowTeamData,
    ) -> Result<WorkflowTeam> {
        requester.authorize(PermissionAction::Update)?;
        if self.find_workflow_team(requester, id).await?.is_none() {
            return Err(BifrostError::NotFound(format!("workflowteam not found: id = {}", id)).into());
        }
        self.validate_workflow_team(requester, data).await?;
        let repo = self.workflow_team_repository();
        let mut tx = repo.db_pool().begin().await.map_err(BifrostError::DBError)?;
        repo.update(&mut tx, id, data).await?;
        tx.commit().await.map_err(BifrostError::DBError)?;
        let updated = repo
            .find(id)
            .await?
            .ok_or_else(|| BifrostError::NotFound(format!("workflowteam not found: id = {}", id)))?;
        fire_hook(self.hook_app(), RESOURCE, HookAction::Changed, &updated).await;
        Ok(updated)
    }

    async fn delete_workflow_team(&self, requester: &Requester, id: i64) -> Result<bool> {
        requester.authorize(PermissionAction::Delete)?;
        let Some(current) = self.find_workflow_team(requester, id).await? else {
            return Ok(false);
        };
        let deleted = self.workflow_team_repository().delete(id).await?;
        if deleted {
            fire_hook(self.hook_app(), RESOURCE, HookAction::Removed, &current).await;
        }
        Ok(deleted)
    }

    async fn find_workflow_team(
        &self,
        requester: &Requester,
        id: i64,
    ) -> Result<Option<WorkflowTeam>> {
        requester.authorize(PermissionAction::Read)?;
        match self.workflow_team_repository().find(id).await? {
            Some(team) => Ok(self
                .find_scoped_level1(requester, team.data.workflowlevel1_id)
                .await?
                .map(|_| team)),
            None => Ok(None),
        }
    }

    async fn find_workflow_team_list(
        &self,
        requester: &Requester,
        workflowlevel1_id: Option<i64>,
        limit: Option<&i32>,
        offset: Option<&i64>,
    ) -> Result<Vec<WorkflowTeam>> {
        requester.authorize(PermissionAction::Read)?;
        match child_filter(requester, workflowlevel1_id) {
            Some(filter) => {
                self.workflow_team_repository()
                    .find_list(&filter, limit, offset)
                    .await
            }
            None => Ok(vec![]),
        }
    }

    /// list with the nested workflowlevel1 of each membership
    async fn find_workflow_team_list_full(
        &self,
        requester: &Requester,
        workflowlevel1_id: Option<i64>,
        limit: Option<&i32>,
        offset: Option<&i64>,
    ) -> Result<Vec<WorkflowTeamWithLevel1>> {
        let teams = self
            .find_workflow_team_list(requester, workflowlevel1_id, limit, offset)
            .await?;
        let mut res = Vec::with_capacity(teams.len());
        for team in teams {
            let workflowlevel1 = self
                .find_scoped_level1(requester, team.data.workflowlevel1_id)
                .await?;
            res.push(WorkflowTeamWithLevel1 {
                team,
                workflowlevel1,
            });
        }
        Ok(res)
    }

    async fn count_workflow_teams(
        &self,
        requester: &Requester,
        workflowlevel1_id: Option<i64>,
    ) -> Result<i64> {
        requester.authorize(PermissionAction::Read)?;
        let repo = self.workflow_team_repository();
        match child_filter(requester, workflowlevel1_id) {
            Some(filter) => repo.count_list_tx(repo.db_pool(), &filter).await,
            None => Ok(0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkflowTeamAppImpl {
    repositories: Arc<RdbRepositoryModule>,
    hook_app: Arc<HookAppImpl>,
}

impl WorkflowTeamAppImpl {
    pub fn new(repositories: Arc<RdbRepositoryModule>, hook_app: Arc<HookAppImpl>) -> Self {
        Self {
            repositories,
            hook_app,
        }
    }
}

impl UseRdbRepositoryModule for WorkflowTeamAppImpl {
    fn rdb_repository_module(&self) -> &RdbRepositoryModule {
        &self.repositories
    }
}

impl UseHookApp for WorkflowTeamAppImpl {
    fn hook_app(&self) -> &HookAppImpl {
        &self.hook_app
    }
}

impl WorkflowTeamApp for WorkflowTeamAppImpl {}

pub trait UseWorkflowTeamApp {
    fn workflow_team_app(&self) -> &WorkflowTeamAppImpl;
}
