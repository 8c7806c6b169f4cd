use super::rows::WorkflowLevel2SortRow;
use crate::infra::workflow_level2::rows::WorkflowLevel1ChildFilter;
use crate::infra::{limit_value, IdGeneratorWrapper, UseIdGenerator};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bifrost_base::error::BifrostError;
use command_utils::util::datetime;
use infra_utils::infra::rdb::{Rdb, RdbPool, UseRdbPool};
use model::{WorkflowLevel2Sort, WorkflowLevel2SortData};
use sqlx::{Executor, Transaction};
use std::sync::Arc;

#[async_trait]
pub trait WorkflowLevel2SortRepository: UseRdbPool + UseIdGenerator + Sync + Send {
    async fn create(
        &self,
        tx: &mut Transaction<'_, Rdb>,
        data: &WorkflowLevel2SortData,
    ) -> Result<WorkflowLevel2Sort> {
        let id = self.id_generator().generate_id()?;
        let now = datetime::now();
        let sort_array = serde_json::to_string(&data.sort_array).map_err(BifrostError::from)?;
        sqlx::query::<Rdb>(
            "INSERT INTO `workflow_level2_sort` (
            `id`,
            `workflowlevel1_id`,
            `workflowlevel2_parent_id`,
            `workflowlevel2_pk`,
            `sort_array`,
            `create_date`,
            `edit_date`
            ) VALUES (?,?,?,?,?,?,?)",
        )
        .bind(id)
        .bind(data.workflowlevel1_id)
        .bind(data.workflowlevel2_parent_id)
        .bind(data.workflowlevel2_pk)
        .bind(sort_array)
        .bind(now)
        .bind(now)
        .execute(&mut **tx)
        .await
        .map_err(BifrostError::DBError)
        .context(format!("error in create workflow_level2_sort: {:?}", data))?;
        Ok(WorkflowLevel2Sort {
            id,
            data: data.clone(),
            create_date: now,
            edit_date: now,
        })
    }

    async fn update(
        &self,
        tx: &mut Transaction<'_, Rdb>,
        id: i64,
        data: &WorkflowLevel2SortData,
    ) -> Result<bool> {
        let sort_array = serde_json::to_string(&data.sort_array).map_err(BifrostError::from)?;
        sqlx::query(
            "UPDATE `workflow_level2_sort` SET
            `workflowlevel1_id` = ?,
            `workflowlevel2_parent_id` = ?,
            `workflowlevel2_pk` = ?,
            `sort_array` = ?,
            `edit_date` = ?
            WHERE `id` = ?;",
        )
        .bind(data.workflowlevel1_id)
        .bind(data.workflowlevel2_parent_id)
        .bind(data.workflowlevel2_pk)
        .bind(sort_array)
        .bind(datetime::now())
        .bind(id)
        .execute(&mut **tx)
        .await
        .map(|r| r.rows_affected() > 0)
        .map_err(BifrostError::DBError)
        .context(format!("error in update workflow_level2_sort: id = {}", id))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        sqlx::query::<Rdb>("DELETE FROM `workflow_level2_sort` WHERE `id` = ?;")
            .bind(id)
            .execute(self.db_pool())
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(BifrostError::DBError)
            .context(format!("error in delete workflow_level2_sort: id = {}", id))
    }

    async fn find(&self, id: i64) -> Result<Option<WorkflowLevel2Sort>> {
        sqlx::query_as::<Rdb, WorkflowLevel2SortRow>(
            "SELECT * FROM `workflow_level2_sort` WHERE `id` = ?;",
        )
        .bind(id)
        .fetch_optional(self.db_pool())
        .await
        .map(|r| r.map(|r| r.to_model()))
        .map_err(BifrostError::DBError)
        .context(format!("error in find workflow_level2_sort: id = {}", id))
    }

    /// organization is the one of the workflowlevel1 (rows without it match only no organization filter)
    async fn find_list(
        &self,
        filter: &WorkflowLevel1ChildFilter,
        limit: Option<&i32>,
        offset: Option<&i64>,
    ) -> Result<Vec<WorkflowLevel2Sort>> {
        sqlx::query_as::<Rdb, WorkflowLevel2SortRow>(
            "SELECT s.* FROM `workflow_level2_sort` s
             LEFT JOIN `workflow_level1` w1 ON w1.`id` = s.`workflowlevel1_id`
             WHERE (? IS NULL OR w1.`organization_id` = ?)
               AND (? IS NULL OR s.`workflowlevel1_id` = ?)
             ORDER BY s.`id` LIMIT ? OFFSET ?;",
        )
        .bind(filter.organization_id)
        .bind(filter.organization_id)
        .bind(filter.workflowlevel1_id)
        .bind(filter.workflowlevel1_id)
        .bind(limit_value(limit))
        .bind(offset.unwrap_or(&0))
        .fetch_all(self.db_pool())
        .await
        .map(|rows| rows.iter().map(|r| r.to_model()).collect())
        .map_err(BifrostError::DBError)
        .context(format!("error in find_list: ({:?}, {:?}, {:?})", filter, limit, offset))
    }

    async fn count_list_tx<'c, E: Executor<'c, Database = Rdb>>(
        &self,
        tx: E,
        filter: &WorkflowLevel1ChildFilter,
    ) -> Result<i64> {
        sqlx::query_scalar(
            "SELECT count(*) as count FROM `workflow_level2_sort` s
             LEFT JOIN `workflow_level1` w1 ON w1.`id` = s.`workflowlevel1_id`
             WHERE (? IS NULL OR w1.`organization_id` = ?)
               AND (? IS NULL OR s.`workflowlevel1_id` = ?);",
        )
        .bind(filter.organization_id)
        .bind(filter.organization_id)
        .bind(filter.workflowlevel1_id)
        .bind(filter.workflowlevel1_id)
        .fetch_one(tx)
        .await
        .map_err(BifrostError::DBError)
        .context("error in count_list".to_string())
    }
}

#[derive(Clone, Debug)]
pub struct WorkflowLevel2SortRepositoryImpl {
    id_generator: Arc<IdGeneratorWrapper>,
    pool: RdbPool,
}

pub trait UseWorkflowLevel2SortRepository {
    fn workflow_level2_sort_repository(&self) -> &WorkflowLevel2SortRepositoryImpl;
}

impl WorkflowLevel2SortRepositoryImpl {
    pub fn new(id_generator: Arc<IdGeneratorWrapper>, pool: RdbPool) -> Self {
        Self { id_generator, pool }
    }
}

impl UseRdbPool for WorkflowLevel2SortRepositoryImpl {
    fn db_pool(&self) -> &RdbPool {
        &self.pool
    }
}

impl UseIdGenerator for WorkflowLevel2SortRepositoryImpl {
    fn id_generator(&self) -> &IdGeneratorWrapper {
        &self.id_generator
    }
}

impl WorkflowLevel2SortRepository for WorkflowLevel2SortRepositoryImpl {}
