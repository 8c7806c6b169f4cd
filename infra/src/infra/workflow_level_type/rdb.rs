use super::rows::WorkflowLevelTypeRow;
use crate::infra::{limit_value, IdGeneratorWrapper, UseIdGenerator};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bifrost_base::error::BifrostError;
use command_utils::util::datetime;
use infra_utils::infra::rdb::{Rdb, RdbPool, UseRdbPool};
use model::{WorkflowLevelType, WorkflowLevelTypeData};
use sqlx::{Executor, Transaction};
use std::sync::Arc;
use uuid::Uuid;

#[async_trait]
pub trait WorkflowLevelTypeRepository: UseRdbPool + UseIdGenerator + Sync + Send {
    async fn create(
        &self,
        tx: &mut Transaction<'_, Rdb>,
        data: &WorkflowLevelTypeData,
    ) -> Result<WorkflowLevelType> {
        let id = self.id_generator().generate_id()?;
        let uuid = Uuid::new_v4();
        let now = datetime::now();
        sqlx::query::<Rdb>(
            "INSERT INTO `workflow_level_type` (`id`, `uuid`, `name`, `create_date`, `edit_date`)
             VALUES (?,?,?,?,?)",
        )
        .bind(id)
        .bind(uuid.to_string())
        .bind(&data.name)
        .bind(now)
        .bind(now)
        .execute(&mut **tx)
        .await
        .map_err(BifrostError::DBError)
        .context(format!("error in create workflow_level_type: {:?}", data))?;
        Ok(WorkflowLevelType {
            id,
            uuid,
            data: data.clone(),
            create_date: now,
            edit_date: now,
        })
    }

    async fn update(
        &self,
        tx: &mut Transaction<'_, Rdb>,
        id: i64,
        data: &WorkflowLevelTypeData,
    ) -> Result<bool> {
        sqlx::query("UPDATE `workflow_level_type` SET `name` = ?, `edit_date` = ? WHERE `id` = ?;")
            .bind(&data.name)
            .bind(datetime::now())
            .bind(id)
            .execute(&mut **tx)
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(BifrostError::DBError)
            .context(format!("error in update workflow_level_type: id = {}", id))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.delete_tx(self.db_pool(), id).await
    }

    async fn delete_tx<'c, E: Executor<'c, Database = Rdb>>(&self, tx: E, id: i64) -> Result<bool> {
        sqlx::query::<Rdb>("DELETE FROM `workflow_level_type` WHERE `id` = ?;")
            .bind(id)
            .execute(tx)
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(BifrostError::DBError)
            .context(format!("error in delete workflow_level_type: id = {}", id))
    }

    async fn find(&self, id: i64) -> Result<Option<WorkflowLevelType>> {
        sqlx::query_as::<Rdb, WorkflowLevelTypeRow>(
            "SELECT * FROM `workflow_level_type` WHERE `id` = ?;",
        )
        .bind(id)
        .fetch_optional(self.db_pool())
        .await
        .map(|r| r.map(|r| r.to_model()))
        .map_err(BifrostError::DBError)
        .context(format!("error in find workflow_level_type: id = {}", id))
    }

    async fn find_by_uuid(&self, uuid: &Uuid) -> Result<Option<WorkflowLevelType>> {
        sqlx::query_as::<Rdb, WorkflowLevelTypeRow>(
            "SELECT * FROM `workflow_level_type` WHERE `uuid` = ?;",
        )
        .bind(uuid.to_string())
        .fetch_optional(self.db_pool())
        .await
        .map(|r| r.map(|r| r.to_model()))
        .map_err(BifrostError::DBError)
        .context(format!("error in find workflow_level_type: uuid = {}", uuid))
    }

    async fn find_list(
        &self,
        limit: Option<&i32>,
        offset: Option<&i64>,
    ) -> Result<Vec<WorkflowLevelType>> {
        sqlx::query_as::<Rdb, WorkflowLevelTypeRow>(
            "SELECT * FROM `workflow_level_type` ORDER BY `id` LIMIT ? OFFSET ?;",
        )
        .bind(limit_value(limit))
        .bind(offset.unwrap_or(&0))
        .fetch_all(self.db_pool())
        .await
        .map(|rows| rows.iter().map(|r| r.to_model()).collect())
        .map_err(BifrostError::DBError)
        .context(format!("error in find_list: ({:?}, {:?})", limit, offset))
    }

    async fn count_list_tx<'c, E: Executor<'c, Database = Rdb>>(&self, tx: E) -> Result<i64> {
        sqlx::query_scalar("SELECT count(*) as count FROM `workflow_level_type`;")
            .fetch_one(tx)
            .await
            .map_err(BifrostError::DBError)
            .context("error in count_list".to_string())
    }
}

#[derive(Clone, Debug)]
pub struct WorkflowLevelTypeRepositoryImpl {
    id_generator: Arc<IdGeneratorWrapper>,
    pool: RdbPool,
}

pub trait UseWorkflowLevelTypeRepository {
    fn workflow_level_type_repository(&self) -> &WorkflowLevelTypeRepositoryImpl;
}

impl WorkflowLevelTypeRepositoryImpl {
    pub fn new(id_generator: Arc<IdGeneratorWrapper>, pool: RdbPool) -> Self {
        Self { id_generator, pool }
    }
}

impl UseRdbPool for WorkflowLevelTypeRepositoryImpl {
    fn db_pool(&self) -> &RdbPool {
        &self.pool
    }
}

impl UseIdGenerator for WorkflowLevelTypeRepositoryImpl {
    fn id_generator(&self) -> &IdGeneratorWrapper {
        &self.id_generator
    }
}

impl WorkflowLevelTypeRepository for WorkflowLevelTypeRepositoryImpl {}
