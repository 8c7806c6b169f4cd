use super::rows::WorkflowLevel1Row;
use crate::infra::{limit_value, IdGeneratorWrapper, UseIdGenerator};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bifrost_base::error::BifrostError;
use command_utils::util::datetime;
use infra_utils::infra::rdb::{Rdb, RdbPool, UseRdbPool};
use model::{WorkflowLevel1, WorkflowLevel1Data};
use sqlx::{Executor, Transaction};
use std::sync::Arc;
use uuid::Uuid;

#[async_trait]
pub trait WorkflowLevel1Repository: UseRdbPool + UseIdGenerator + Sync + Send {
    async fn create(
        &self,
        tx: &mut Transaction<'_, Rdb>,
        data: &WorkflowLevel1Data,
    ) -> Result<WorkflowLevel1> {
        let id = self.id_generator().generate_id()?;
        let uuid = Uuid::new_v4();
        let now = datetime::now();
        sqlx::query::<Rdb>(
            "INSERT INTO `workflow_level1` (
            `id`,
            `level1_uuid`,
            `unique_id`,
            `name`,
            `organization_id`,
            `description`,
            `start_date`,
            `end_date`,
            `sort`,
            `create_date`,
            `edit_date`
            ) VALUES (?,?,?,?,?,?,?,?,?,?,?)",
        )
        .bind(id)
        .bind(uuid.to_string())
        .bind(&data.unique_id)
        .bind(&data.name)
        .bind(data.organization_id)
        .bind(&data.description)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(data.sort)
        .bind(now)
        .bind(now)
        .execute(&mut **tx)
        .await
        .map_err(BifrostError::DBError)
        .context(format!("error in create workflow_level1: {}", &data.name))?;
        self.set_user_access(tx, id, &data.user_access).await?;
        Ok(WorkflowLevel1 {
            id,
            level1_uuid: uuid,
            data: data.clone(),
            create_date: now,
            edit_date: now,
        })
    }

    async fn set_user_access(
        &self,
        tx: &mut Transaction<'_, Rdb>,
        id: i64,
        user_ids: &[i64],
    ) -> Result<()> {
        sqlx::query("DELETE FROM `workflow_level1_user_access` WHERE `workflowlevel1_id` = ?;")
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(BifrostError::DBError)
            .context(format!("error in clear user_access: id = {}", id))?;
        for uid in user_ids {
            sqlx::query(
                "INSERT OR IGNORE INTO `workflow_level1_user_access`
                (`workflowlevel1_id`, `core_user_id`) VALUES (?,?);",
            )
            .bind(id)
            .bind(uid)
            .execute(&mut **tx)
            .await
            .map_err(BifrostError::DBError)
            .context(format!("error in add user_access: id = {}, user = {}", id, uid))?;
        }
        Ok(())
    }

    async fn update(
        &self,
        tx: &mut Transaction<'_, Rdb>,
        id: i64,
        data: &WorkflowLevel1Data,
    ) -> Result<bool> {
        let updated = sqlx::query(
            "UPDATE `workflow_level1` SET
            `unique_id` = ?,
            `name` = ?,
            `organization_id` = ?,
            `description` = ?,
            `start_date` = ?,
            `end_date` = ?,
            `sort` = ?,
            `edit_date` = ?
            WHERE `id` = ?;",
        )
        .bind(&data.unique_id)
        .bind(&data.name)
        .bind(data.organization_id)
        .bind(&data.description)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(data.sort)
        .bind(datetime::now())
        .bind(id)
        .execute(&mut **tx)
        .await
        .map(|r| r.rows_affected() > 0)
        .map_err(BifrostError::DBError)
        .context(format!("error in update workflow_level1: id = {}", id))?;
        if updated {
            self.set_user_access(tx, id, &data.user_access).await?;
        }
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.delete_tx(self.db_pool(), id).await
    }

    async fn delete_tx<'c, E: Executor<'c, Database = Rdb>>(&self, tx: E, id: i64) -> Result<bool> {
        sqlx::query::<Rdb>("DELETE FROM `workflow_level1` WHERE `id` = ?;")
            .bind(id)
            .execute(tx)
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(BifrostError::DBError)
            .context(format!("error in delete workflow_level1: id = {}", id))
    }

    async fn find_user_access_tx<'c, E: Executor<'c, Database = Rdb>>(
        &self,
        tx: E,
        id: i64,
    ) -> Result<Vec<i64>> {
        sqlx::query_scalar(
            "SELECT `core_user_id` FROM `workflow_level1_user_access`
             WHERE `workflowlevel1_id` = ? ORDER BY `core_user_id`;",
        )
        .bind(id)
        .fetch_all(tx)
        .await
        .map_err(BifrostError::DBError)
        .context(format!("error in find user_access: id = {}", id))
    }

    async fn to_models(&self, rows: Vec<WorkflowLevel1Row>) -> Result<Vec<WorkflowLevel1>> {
        let mut res = Vec::with_capacity(rows.len());
        for row in rows.iter() {
            let users = self.find_user_access_tx(self.db_pool(), row.id).await?;
            res.push(row.to_model(users));
        }
        Ok(res)
    }

    async fn find(&self, id: i64) -> Result<Option<WorkflowLevel1>> {
        let row = sqlx::query_as::<Rdb, WorkflowLevel1Row>(
            "SELECT * FROM `workflow_level1` WHERE `id` = ?;",
        )
        .bind(id)
        .fetch_optional(self.db_pool())
        .await
        .map_err(BifrostError::DBError)
        .context(format!("error in find workflow_level1: id = {}", id))?;
        Ok(self.to_models(row.into_iter().collect()).await?.pop())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<WorkflowLevel1>> {
        let mut res = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(w) = self.find(*id).await? {
                res.push(w);
            }
        }
        Ok(res)
    }

    /// organization_id: None for all
    async fn find_list(
        &self,
        organization_id: Option<i64>,
        limit: Option<&i32>,
        offset: Option<&i64>,
    ) -> Result<Vec<WorkflowLevel1>> {
        let rows = sqlx::query_as::<Rdb, WorkflowLevel1Row>(
            "SELECT * FROM `workflow_level1` WHERE (? IS NULL OR `organization_id` = ?)
             ORDER BY `id` LIMIT ? OFFSET ?;",
        )
        .bind(organization_id)
        .bind(organization_id)
        .bind(limit_value(limit))
        .bind(offset.unwrap_or(&0))
        .fetch_all(self.db_pool())
        .await
        .map_err(BifrostError::DBError)
        .context(format!("error in find_list: ({:?}, {:?})", limit, offset))?;
        self.to_models(rows).await
    }

    async fn count_list_tx<'c, E: Executor<'c, Database = Rdb>>(
        &self,
        tx: E,
        organization_id: Option<i64>,
    ) -> Result<i64> {
        sqlx::query_scalar(
            "SELECT count(*) as count FROM `workflow_level1` WHERE (? IS NULL OR `organization_id` = ?);",
        )
        .bind(organization_id)
        .bind(organization_id)
        .fetch_one(tx)
        .await
        .map_err(BifrostError::DBError)
        .context("error in count_list".to_string())
    }
}

#[derive(Clone, Debug)]
pub struct WorkflowLevel1RepositoryImpl {
    id_generator: Arc<IdGeneratorWrapper>,
    pool: RdbPool,
}

pub trait UseWorkflowLevel1Repository {
    fn workflow_level1_repository(&self) -> &WorkflowLevel1RepositoryImpl;
}

impl WorkflowLevel1RepositoryImpl {
    pub fn new(id_generator: Arc<IdGeneratorWrapper>, pool: RdbPool) -> Self {
        Self { id_generator, pool }
    }
}

impl UseRdbPool for WorkflowLevel1RepositoryImpl {
    fn db_pool(&self) -> &RdbPool {
        &self.pool
    }
}

impl UseIdGenerator for WorkflowLevel1RepositoryImpl {
    fn id_generator(&self) -> &IdGeneratorWrapper {
        &self.id_generator
    }
}

impl WorkflowLevel1Repository for WorkflowLevel1RepositoryImpl {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::infra::core_user::rdb::{CoreUserRepository, CoreUserRepositoryImpl};
    use crate::infra::SCHEMA;
    use chrono::NaiveDate;
    use infra_utils::infra::test::{setup_test_rdb, TEST_RUNTIME};
    use model::CoreUserData;

    async fn _test_repository(pool: RdbPool) -> Result<()> {
        let id_generator = Arc::new(IdGeneratorWrapper::new_mock());
        let user_repository = CoreUserRepositoryImpl::new(id_generator.clone(), pool.clone());
        let repository = WorkflowLevel1RepositoryImpl::new(id_generator, pool);
        let db = repository.db_pool();

        let mut tx = db.begin().await?;
        let user = user_repository
            .create(
                &mut tx,
                &CoreUserData {
                    username: "u".to_string(),
                    email: "u@example.com".to_string(),
                    ..Default::default()
                },
                "",
            )
            .await?;
        let data = WorkflowLevel1Data {
            name: "Health and Survival for Syrians in Affected Regions".to_string(),
            start_date: NaiveDate::from_ymd_opt(2020, 1, 31),
            sort: 3,
            user_access: vec![user.id],
            ..Default::default()
        };
        let created = repository.create(&mut tx, &data).await?;
        tx.commit().await?;

        let found = repository.find(created.id).await?.unwrap();
        assert_eq!(found.data, data);
        assert_eq!(found.level1_uuid, created.level1_uuid);

        let update = WorkflowLevel1Data {
            user_access: vec![],
            end_date: NaiveDate::from_ymd_opt(2021, 12, 1),
            ..data.clone()
        };
        let mut tx = db.begin().await?;
        assert!(repository.update(&mut tx, created.id, &update).await?);
        assert!(!repository.update(&mut tx, created.id + 100, &update).await?);
        tx.commit().await?;
        assert_eq!(repository.find(created.id).await?.unwrap().data, update);

        assert_eq!(repository.find_list(None, None, None).await?.len(), 1);
        assert_eq!(repository.find_list(Some(1), None, None).await?.len(), 0);
        assert_eq!(repository.count_list_tx(db, None).await?, 1);
        assert_eq!(repository.find_by_ids(&[created.id, 12345]).await?.len(), 1);
        assert!(repository.delete(created.id).await?);
        assert!(repository.find(created.id).await?.is_none());
        Ok(())
    }

    #[test]
    fn run_test() -> Result<()> {
        TEST_RUNTIME.block_on(async {
            let rdb = setup_test_rdb(SCHEMA).await;
            _test_repository(rdb.pool.clone()).await
        })
    }
}
