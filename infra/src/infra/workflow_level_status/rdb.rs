use super::rows::WorkflowLevelStatusRow;
use crate::infra::{limit_value, IdGeneratorWrapper, UseIdGenerator};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bifrost_base::error::BifrostError;
use command_utils::util::datetime;
use infra_utils::infra::rdb::{Rdb, RdbPool, UseRdbPool};
use model::{WorkflowLevelStatus, WorkflowLevelStatusData};
use sqlx::{Executor, Transaction};
use std::sync::Arc;
use uuid::Uuid;

#[async_trait]
pub trait WorkflowLevelStatusRepository: UseRdbPool + UseIdGenerator + Sync + Send {
    async fn create(
        &self,
        tx: &mut Transaction<'_, Rdb>,
        data: &WorkflowLevelStatusData,
    ) -> Result<WorkflowLevelStatus> {
        let id = self.id_generator().generate_id()?;
        let uuid = Uuid::new_v4();
        let now = datetime::now();
        sqlx::query::<Rdb>(
            "INSERT INTO `workflow_level_status` (
            `id`,
            `uuid`,
            `order`,
            `name`,
            `short_name`,
            `create_date`,
            `edit_date`
            ) VALUES (?,?,?,?,?,?,?)",
        )
        .bind(id)
        .bind(uuid.to_string())
        .bind(data.order)
        .bind(&data.name)
        .bind(&data.short_name)
        .bind(now)
        .bind(now)
        .execute(&mut **tx)
        .await
        .map_err(BifrostError::DBError)
        .context(format!("error in create workflow_level_status: {:?}", data))?;
        Ok(WorkflowLevelStatus {
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
        data: &WorkflowLevelStatusData,
    ) -> Result<bool> {
        sqlx::query(
            "UPDATE `workflow_level_status` SET
            `order` = ?,
            `name` = ?,
            `short_name` = ?,
            `edit_date` = ?
            WHERE `id` = ?;",
        )
        .bind(data.order)
        .bind(&data.name)
        .bind(&data.short_name)
        .bind(datetime::now())
        .bind(id)
        .execute(&mut **tx)
        .await
        .map(|r| r.rows_affected() > 0)
        .map_err(BifrostError::DBError)
        .context(format!("error in update workflow_level_status: id = {}", id))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        sqlx::query::<Rdb>("DELETE FROM `workflow_level_status` WHERE `id` = ?;")
            .bind(id)
            .execute(self.db_pool())
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(BifrostError::DBError)
            .context(format!("error in delete workflow_level_status: id = {}", id))
    }

    async fn find(&self, id: i64) -> Result<Option<WorkflowLevelStatus>> {
        sqlx::query_as::<Rdb, WorkflowLevelStatusRow>(
            "SELECT * FROM `workflow_level_status` WHERE `id` = ?;",
        )
        .bind(id)
        .fetch_optional(self.db_pool())
        .await
        .map(|r| r.map(|r| r.to_model()))
        .map_err(BifrostError::DBError)
        .context(format!("error in find workflow_level_status: id = {}", id))
    }

    async fn find_by_uuid(&self, uuid: &Uuid) -> Result<Option<WorkflowLevelStatus>> {
        sqlx::query_as::<Rdb, WorkflowLevelStatusRow>(
            "SELECT * FROM `workflow_level_status` WHERE `uuid` = ?;",
        )
        .bind(uuid.to_string())
        .fetch_optional(self.db_pool())
        .await
        .map(|r| r.map(|r| r.to_model()))
        .map_err(BifrostError::DBError)
        .context(format!("error in find workflow_level_status: uuid = {}", uuid))
    }

    // ordered by `order`
    async fn find_list(
        &self,
        limit: Option<&i32>,
        offset: Option<&i64>,
    ) -> Result<Vec<WorkflowLevelStatus>> {
        sqlx::query_as::<Rdb, WorkflowLevelStatusRow>(
            "SELECT * FROM `workflow_level_status` ORDER BY `order`, `id` LIMIT ? OFFSET ?;",
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
        sqlx::query_scalar("SELECT count(*) as count FROM `workflow_level_status`;")
            .fetch_one(tx)
            .await
            .map_err(BifrostError::DBError)
            .context("error in count_list".to_string())
    }
}

#[derive(Clone, Debug)]
pub struct WorkflowLevelStatusRepositoryImpl {
    id_generator: Arc<IdGeneratorWrapper>,
    pool: RdbPool,
}

pub trait UseWorkflowLevelStatusRepository {
    fn workflow_level_status_repository(&self) -> &WorkflowLevelStatusRepositoryImpl;
}

impl WorkflowLevelStatusRepositoryImpl {
    pub fn new(id_generator: Arc<IdGeneratorWrapper>, pool: RdbPool) -> Self {
        Self { id_generator, pool }
    }
}

impl UseRdbPool for WorkflowLevelStatusRepositoryImpl {
    fn db_pool(&self) -> &RdbPool {
        &self.pool
    }
}

impl UseIdGenerator for WorkflowLevelStatusRepositoryImpl {
    fn id_generator(&self) -> &IdGeneratorWrapper {
        &self.id_generator
    }
}

impl WorkflowLevelStatusRepository for WorkflowLevelStatusRepositoryImpl {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::infra::SCHEMA;
    use infra_utils::infra::test::{setup_test_rdb, TEST_RUNTIME};

    #[test]
    fn run_test() -> Result<()> {
        TEST_RUNTIME.block_on(async {
            let rdb = setup_test_rdb(SCHEMA).await;
            let repository = WorkflowLevelStatusRepositoryImpl::new(
                Arc::new(IdGeneratorWrapper::new_mock()),
                rdb.pool.clone(),
            );
            let db = repository.db_pool();
            let mut tx = db.begin().await?;
            let done = repository
                .create(
                    &mut tx,
                    &WorkflowLevelStatusData {
                        order: 2,
                        name: "Done".to_string(),
                        short_name: "done".to_string(),
                    },
                )
                .await?;
            let open = repository
                .create(
                    &mut tx,
                    &WorkflowLevelStatusData {
                        order: 1,
                        name: "Open".to_string(),
                        short_name: "open".to_string(),
                    },
                )
                .await?;
            tx.commit().await?;

            let list = repository.find_list(None, None).await?;
            assert_eq!(
                list.iter().map(|s| s.id).collect::<Vec<_>>(),
                vec![open.id, done.id]
            );
            assert_eq!(
                repository.find_by_uuid(&done.uuid).await?.map(|s| s.data),
                Some(done.data.clone())
            );
            let mut tx = db.begin().await?;
            let update = WorkflowLevelStatusData {
                order: 0,
                ..done.data.clone()
            };
            assert!(repository.update(&mut tx, done.id, &update).await?);
            tx.commit().await?;
            assert_eq!(repository.find_list(Some(&1), None).await?[0].id, done.id);
            assert_eq!(repository.count_list_tx(db).await?, 2);
            assert!(repository.delete(open.id).await?);
            assert!(repository.find(open.id).await?.is_none());
            Ok(())
        })
    }
}
