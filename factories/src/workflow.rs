use crate::core::{CoreGroupFactory, CoreUserFactory};
use crate::{Factory, SubFactory};
use anyhow::Result;
use async_trait::async_trait;
use bifrost_base::error::BifrostError;
use infra::infra::module::RdbRepositoryModule;
use infra::infra::workflow_level1::rdb::{UseWorkflowLevel1Repository, WorkflowLevel1Repository};
use infra::infra::workflow_level2::rdb::{UseWorkflowLevel2Repository, WorkflowLevel2Repository};
use infra::infra::workflow_level2_sort::rdb::{
    UseWorkflowLevel2SortRepository, WorkflowLevel2SortRepository,
};
use infra::infra::workflow_team::rdb::{UseWorkflowTeamRepository, WorkflowTeamRepository};
use infra_utils::infra::rdb::UseRdbPool;
use model::{
    WorkflowLevel1, WorkflowLevel1Data, WorkflowLevel2, WorkflowLevel2Data, WorkflowLevel2Sort,
    WorkflowLevel2SortData, WorkflowTeam, WorkflowTeamData,
};

pub const DEFAULT_WORKFLOW_LEVEL1_NAME: &str = "Health and Survival for Syrians in Affected Regions";
pub const DEFAULT_WORKFLOW_LEVEL2_NAME: &str = "Help Syrians";

/// no organization unless given in `data`
#[derive(Debug, Clone)]
pub struct WorkflowLevel1Factory {
    pub data: WorkflowLevel1Data,
}

impl Default for WorkflowLevel1Factory {
    fn default() -> Self {
        Self {
            data: WorkflowLevel1Data {
                name: DEFAULT_WORKFLOW_LEVEL1_NAME.to_string(),
                ..Default::default()
            },
        }
    }
}

impl WorkflowLevel1Factory {
    pub fn in_organization(organization_id: i64) -> Self {
        let default = Self::default();
        Self {
            data: WorkflowLevel1Data {
                organization_id: Some(organization_id),
                ..default.data
            },
        }
    }
}

#[async_trait]
impl Factory for WorkflowLevel1Factory {
    type Output = WorkflowLevel1;

    async fn create(self, module: &RdbRepositoryModule) -> Result<WorkflowLevel1> {
        let repo = module.workflow_level1_repository();
        let mut tx = repo.db_pool().begin().await.map_err(BifrostError::DBError)?;
        let created = repo.create(&mut tx, &self.data).await?;
        tx.commit().await.map_err(BifrostError::DBError)?;
        Ok(created)
    }

    fn output_id(output: &WorkflowLevel1) -> i64 {
        output.id
    }
}

/// `data.workflowlevel1_id` is replaced with the resolved workflowlevel1
#[derive(Debug, Clone)]
pub struct WorkflowLevel2Factory {
    pub data: WorkflowLevel2Data,
    pub workflowlevel1: SubFactory<WorkflowLevel1Factory>,
}

impl Default for WorkflowLevel2Factory {
    fn default() -> Self {
        Self {
            data: WorkflowLevel2Data {
                name: DEFAULT_WORKFLOW_LEVEL2_NAME.to_string(),
                ..Default::default()
            },
            workflowlevel1: SubFactory::default(),
        }
    }
}

#[async_trait]
impl Factory for WorkflowLevel2Factory {
    type Output = WorkflowLevel2;

    async fn create(self, module: &RdbRepositoryModule) -> Result<WorkflowLevel2> {
        let data = WorkflowLevel2Data {
            workflowlevel1_id: self
                .workflowlevel1
                .resolve_required(module, "workflowlevel1")
                .await?,
            ..self.data
        };
        let repo = module.workflow_level2_repository();
        let mut tx = repo.db_pool().begin().await.map_err(BifrostError::DBError)?;
        let created = repo.create(&mut tx, &data).await?;
        tx.commit().await.map_err(BifrostError::DBError)?;
        Ok(created)
    }

    fn output_id(output: &WorkflowLevel2) -> i64 {
        output.id
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorkflowTeamFactory {
    pub workflow_user: SubFactory<CoreUserFactory>,
    pub workflowlevel1: SubFactory<WorkflowLevel1Factory>,
    pub role: SubFactory<CoreGroupFactory>,
    pub data: WorkflowTeamData,
}

#[async_trait]
impl Factory for WorkflowTeamFactory {
    type Output = WorkflowTeam;

    async fn create(self, module: &RdbRepositoryModule) -> Result<WorkflowTeam> {
        let data = WorkflowTeamData {
            workflow_user_id: self
                .workflow_user
                .resolve_required(module, "workflow_user")
                .await?,
            workflowlevel1_id: self
                .workflowlevel1
                .resolve_required(module, "workflowlevel1")
                .await?,
            role_id: self.role.resolve(module).await?,
            ..self.data
        };
        let repo = module.workflow_team_repository();
        let mut tx = repo.db_pool().begin().await.map_err(BifrostError::DBError)?;
        let created = repo.create(&mut tx, &data).await?;
        tx.commit().await.map_err(BifrostError::DBError)?;
        Ok(created)
    }

    fn output_id(output: &WorkflowTeam) -> i64 {
        output.id
    }
}

/// both parents are created unless given
#[derive(Debug, Clone, Default)]
pub struct WorkflowLevel2SortFactory {
    pub workflowlevel1: SubFactory<WorkflowLevel1Factory>,
    pub workflowlevel2_parent: SubFactory<WorkflowLevel2Factory>,
    pub workflowlevel2_pk: i64,
    pub sort_array: Vec<serde_json::Value>,
}

#[async_trait]
impl Factory for WorkflowLevel2SortFactory {
    type Output = WorkflowLevel2Sort;

    async fn create(self, module: &RdbRepositoryModule) -> Result<WorkflowLevel2Sort> {
        let data = WorkflowLevel2SortData {
            workflowlevel1_id: self.workflowlevel1.resolve(module).await?,
            workflowlevel2_parent_id: self.workflowlevel2_parent.resolve(module).await?,
            workflowlevel2_pk: self.workflowlevel2_pk,
            sort_array: self.sort_array,
        };
        let repo = module.workflow_level2_sort_repository();
        let mut tx = repo.db_pool().begin().await.map_err(BifrostError::DBError)?;
        let created = repo.create(&mut tx, &data).await?;
        tx.commit().await.map_err(BifrostError::DBError)?;
        Ok(created)
    }

    fn output_id(output: &WorkflowLevel2Sort) -> i64 {
        output.id
    }
}
