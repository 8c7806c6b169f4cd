use super::rows::{WorkflowLevel1ChildFilter, WorkflowLevel2Row};
use crate::infra::{limit_value, IdGeneratorWrapper, UseIdGenerator};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bifrost_base::error::BifrostError;
use command_utils::util::datetime;
use infra_utils::infra::rdb::{Rdb, RdbPool, UseRdbPool};
use model::{WorkflowLevel2, WorkflowLevel2Data};
use sqlx::{Executor, Transaction};
use std::sync::Arc;
use uuid::Uuid;

#[async_trait]
pub trait WorkflowLevel2Repository: UseRdbPool + UseIdGenerator + Sync + Send {
    async fn create(
        &self,
        tx: &mut Transaction<'_, Rdb>,
        data: &WorkflowLevel2Data,
    ) -> Result<WorkflowLevel2> {
        let id = self.id_generator().generate_id()?;
        let uuid = Uuid::new_v4();
        let now = datetime::now();
        sqlx::query::<Rdb>(
            "INSERT INTO `workflow_level2` (
            `id`,
            `level2_uuid`,
            `workflowlevel1_id`,
            `name`,
            `description`,
            `notes`,
            `short_name`,
            `parent_workflowlevel2`,
            `type_id`,
            `status_id`,
            `created_by_id`,
            `start_date`,
            `end_date`,
            `expected_start_date`,
            `expected_end_date`,
            `create_date`,
            `edit_date`
            ) VALUES (?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?)",
        )
        .bind(id)
        .bind(uuid.to_string())
        .bind(data.workflowlevel1_id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.notes)
        .bind(&data.short_name)
        .bind(data.parent_workflowlevel2)
        .bind(data.type_id)
        .bind(data.status_id)
        .bind(data.created_by_id)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(data.expected_start_date)
        .bind(data.expected_end_date)
        .bind(now)
        .bind(now)
        .execute(&mut **tx)
        .await
        .map_err(BifrostError::DBError)
        .context(format!("error in create workflow_level2: {}", &data.name))?;
        Ok(WorkflowLevel2 {
            id,
            level2_uuid: uuid,
            data: data.clone(),
            create_date: now,
            edit_date: now,
        })
    }

    async fn update(
        &self,
        tx: &mut Transaction<'_, Rdb>,
        id: i64,
        data: &WorkflowLevel2Data,
    ) -> Result<bool> {
        sqlx::query(
            "UPDATE `workflow_level2` SET
            `workflowlevel1_id` = ?,
            `name` = ?,
            `description` = ?,
            `notes` = ?,
            `short_name` = ?,
            `parent_workflowlevel2` = ?,
            `type_id` = ?,
            `status_id` = ?,
            `created_by_id` = ?,
            `start_date` = ?,
            `end_date` = ?,
            `expected_start_date` = ?,
            `expected_end_date` = ?,
            `edit_date` = ?
            WHERE `id` = ?;",
        )
        .bind(data.workflowlevel1_id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.notes)
        .bind(&data.short_name)
        .bind(data.parent_workflowlevel2)
        .bind(data.type_id)
        .bind(data.status_id)
        .bind(data.created_by_id)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(data.expected_start_date)
        .bind(data.expected_end_date)
        .bind(datetime::now())
        .bind(id)
        .execute(&mut **tx)
        .await
        .map(|r| r.rows_affected() > 0)
        .map_err(BifrostError::DBError)
        .context(format!("error in update workflow_level2: id = {}", id))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.delete_tx(self.db_pool(), id).await
    }

    async fn delete_tx<'c, E: Executor<'c, Database = Rdb>>(&self, tx: E, id: i64) -> Result<bool> {
        sqlx::query::<Rdb>("DELETE FROM `workflow_level2` WHERE `id` = ?;")
            .bind(id)
            .execute(tx)
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(BifrostError::DBError)
            .context(format!("error in delete workflow_level2: id = {}", id))
    }

    async fn find(&self, id: i64) -> Result<Option<WorkflowLevel2>> {
        sqlx::query_as::<Rdb, WorkflowLevel2Row>("SELECT * FROM `workflow_level2` WHERE `id` = ?;")
            .bind(id)
            .fetch_optional(self.db_pool())
            .await
            .map(|r| r.map(|r| r.to_model()))
            .map_err(BifrostError::DBError)
            .context(format!("error in find workflow_level2: id = {}", id))
    }

    async fn find_by_uuid(&self, uuid: &Uuid) -> Result<Option<WorkflowLevel2>> {
        sqlx::query_as::<Rdb, WorkflowLevel2Row>(
            "SELECT * FROM `workflow_level2` WHERE `level2_uuid` = ?;",
        )
        .bind(uuid.to_string())
        .fetch_optional(self.db_pool())
        .await
        .map(|r| r.map(|r| r.to_model()))
        .map_err(BifrostError::DBError)
        .context(format!("error in find workflow_level2: uuid = {}", uuid))
    }

    async fn find_list(
        &self,
        filter: &WorkflowLevel1ChildFilter,
        limit: Option<&i32>,
        offset: Option<&i64>,
    ) -> Result<Vec<WorkflowLevel2>> {
        sqlx::query_as::<Rdb, WorkflowLevel2Row>(
            "SELECT w2.* FROM `workflow_level2` w2
             JOIN `workflow_level1` w1 ON w1.`id` = w2.`workflowlevel1_id`
             WHERE (? IS NULL OR w1.`organization_id` = ?)
               AND (? IS NULL OR w2.`workflowlevel1_id` = ?)
             ORDER BY w2.`id` LIMIT ? OFFSET ?;",
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
            "SELECT count(*) as count FROM `workflow_level2` w2
             JOIN `workflow_level1` w1 ON w1.`id` = w2.`workflowlevel1_id`
             WHERE (? IS NULL OR w1.`organization_id` = ?)
               AND (? IS NULL OR w2.`workflowlevel1_id` = ?);",
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
pub struct WorkflowLevel2RepositoryImpl {
    id_generator: Arc<IdGeneratorWrapper>,
    pool: RdbPool,
}

pub trait UseWorkflowLevel2Repository {
    fn workflow_level2_repository(&self) -> &WorkflowLevel2RepositoryImpl;
}

impl WorkflowLevel2RepositoryImpl {
    pub fn new(id_generator: Arc<IdGeneratorWrapper>, pool: RdbPool) -> Self {
        Self { id_generator, pool }
    }
}

impl UseRdbPool for WorkflowLevel2RepositoryImpl {
    fn db_pool(&self) -> &RdbPool {
        &self.pool
    }
}

impl UseIdGenerator for WorkflowLevel2RepositoryImpl {
    fn id_generator(&self) -> &IdGeneratorWrapper {
        &self.id_generator
    }
}

impl WorkflowLevel2Repository for WorkflowLevel2RepositoryImpl {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::infra::organization::rdb::{OrganizationRepository, OrganizationRepositoryImpl};
    use crate::infra::workflow_level1::rdb::{
        WorkflowLevel1Repository, WorkflowLevel1RepositoryImpl,
    };
    use crate::infra::SCHEMA;
    use infra_utils::infra::test::{setup_test_rdb, TEST_RUNTIME};
    use model::{OrganizationData, WorkflowLevel1Data};

    async fn _test_repository(pool: RdbPool) -> Result<()> {
        let id_generator = Arc::new(IdGeneratorWrapper::new_mock());
        let org_repository = OrganizationRepositoryImpl::new(id_generator.clone(), pool.clone());
        let wl1_repository = WorkflowLevel1RepositoryImpl::new(id_generator.clone(), pool.clone());
        let repository = WorkflowLevel2RepositoryImpl::new(id_generator, pool);
        let db = repository.db_pool();

        let mut tx = db.begin().await?;
        let org = org_repository
            .create(
                &mut tx,
                &OrganizationData {
                    name: "org".to_string(),
                    ..Default::default()
                },
            )
            .await?;
        let wl1a = wl1_repository
            .create(
                &mut tx,
                &WorkflowLevel1Data {
                    name: "a".to_string(),
                    organization_id: Some(org.id),
                    ..Default::default()
                },
            )
            .await?;
        let wl1b = wl1_repository
            .create(
                &mut tx,
                &WorkflowLevel1Data {
                    name: "b".to_string(),
                    ..Default::default()
                },
            )
            .await?;
        let data = WorkflowLevel2Data {
            workflowlevel1_id: wl1a.id,
            name: "Help Syrians".to_string(),
            ..Default::default()
        };
        let created = repository.create(&mut tx, &data).await?;
        let other = repository
            .create(
                &mut tx,
                &WorkflowLevel2Data {
                    workflowlevel1_id: wl1b.id,
                    name: "other".to_string(),
                    parent_workflowlevel2: created.id,
                    ..Default::default()
                },
            )
            .await?;
        tx.commit().await?;

        let found = repository.find_by_uuid(&created.level2_uuid).await?.unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.data, data);

        let by_wl1 = WorkflowLevel1ChildFilter {
            workflowlevel1_id: Some(wl1b.id),
            ..Default::default()
        };
        let list = repository.find_list(&by_wl1, None, None).await?;
        assert_eq!(list.iter().map(|w| w.id).collect::<Vec<_>>(), vec![other.id]);
        let by_org = WorkflowLevel1ChildFilter {
            organization_id: Some(org.id),
            ..Default::default()
        };
        let list = repository.find_list(&by_org, None, None).await?;
        assert_eq!(list.iter().map(|w| w.id).collect::<Vec<_>>(), vec![created.id]);
        assert_eq!(
            repository
                .count_list_tx(db, &WorkflowLevel1ChildFilter::default())
                .await?,
            2
        );

        let update = WorkflowLevel2Data {
            notes: Some("note".to_string()),
            ..data.clone()
        };
        let mut tx = db.begin().await?;
        assert!(repository.update(&mut tx, created.id, &update).await?);
        tx.commit().await?;
        assert_eq!(repository.find(created.id).await?.unwrap().data, update);

        // cascade from the parent workflowlevel1
        assert!(wl1_repository.delete(wl1b.id).await?);
        assert!(repository.find(other.id).await?.is_none());
        assert!(repository.delete(created.id).await?);
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
