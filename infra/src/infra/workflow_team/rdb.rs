use super::rows::WorkflowTeamRow;
use crate::infra::workflow_level2::rows::WorkflowLevel1ChildFilter;
use crate::infra::{limit_value, IdGeneratorWrapper, UseIdGenerator};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bifrost_base::error::BifrostError;
use command_utils::util::datetime;
use infra_utils::infra::rdb::{Rdb, RdbPool, UseRdbPool};
use model::{WorkflowTeam, WorkflowTeamData};
use sqlx::{Executor, Transaction};
use std::sync::Arc;
use uuid::Uuid;

#[async_trait]
pub trait WorkflowTeamRepository: UseRdbPool + UseIdGenerator + Sync + Send {
    async fn create(
        &self,
        tx: &mut Transaction<'_, Rdb>,
        data: &WorkflowTeamData,
    ) -> Result<WorkflowTeam> {
        let id = self.id_generator().generate_id()?;
        let uuid = Uuid::new_v4();
        let now = datetime::now();
        sqlx::query::<Rdb>(
            "INSERT INTO `workflow_team` (
            `id`,
            `team_uuid`,
            `workflow_user_id`,
            `workflowlevel1_id`,
            `role_id`,
            `start_date`,
            `end_date`,
            `status`,
            `create_date`,
            `edit_date`
            ) VALUES (?,?,?,?,?,?,?,?,?,?)",
        )
        .bind(id)
        .bind(uuid.to_string())
        .bind(data.workflow_user_id)
        .bind(data.workflowlevel1_id)
        .bind(data.role_id)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(&data.status)
        .bind(now)
        .bind(now)
        .execute(&mut **tx)
        .await
        .map_err(BifrostError::DBError)
        .context(format!("error in create workflow_team: {:?}", data))?;
        Ok(WorkflowTeam {
            id,
            team_uuid: uuid,
            data: data.clone(),
            create_date: now,
            edit_date: now,
        })
    }

    async fn update(
        &self,
        tx: &mut Transaction<'_, Rdb>,
        id: i64,
        data: &WorkflowTeamData,
    ) -> Result<bool> {
        sqlx::query(
            "UPDATE `workflow_team` SET
            `workflow_user_id` = ?,
            `workflowlevel1_id` = ?,
            `role_id` = ?,
            `start_date` = ?,
            `end_date` = ?,
            `status` = ?,
            `edit_date` = ?
            WHERE `id` = ?;",
        )
        .bind(data.workflow_user_id)
        .bind(data.workflowlevel1_id)
        .bind(data.role_id)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(&data.status)
        .bind(datetime::now())
        .bind(id)
        .execute(&mut **tx)
        .await
        .map(|r| r.rows_affected() > 0)
        .map_err(BifrostError::DBError)
        .context(format!("error in update workflow_team: id = {}", id))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.delete_tx(self.db_pool(), id).await
    }

    async fn delete_tx<'c, E: Executor<'c, Database = Rdb>>(&self, tx: E, id: i64) -> Result<bool> {
        sqlx::query::<Rdb>("DELETE FROM `workflow_team` WHERE `id` = ?;")
            .bind(id)
            .execute(tx)
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(BifrostError::DBError)
            .context(format!("error in delete workflow_team: id = {}", id))
    }

    async fn find(&self, id: i64) -> Result<Option<WorkflowTeam>> {
        sqlx::query_as::<Rdb, WorkflowTeamRow>("SELECT * FROM `workflow_team` WHERE `id` = ?;")
            .bind(id)
            .fetch_optional(self.db_pool())
            .await
            .map(|r| r.map(|r| r.to_model()))
            .map_err(BifrostError::DBError)
            .context(format!("error in find workflow_team: id = {}", id))
    }

    async fn find_list(
        &self,
        filter: &WorkflowLevel1ChildFilter,
        limit: Option<&i32>,
        offset: Option<&i64>,
    ) -> Result<Vec<WorkflowTeam>> {
        sqlx::query_as::<Rdb, WorkflowTeamRow>(
            "SELECT t.* FROM `workflow_team` t
             JOIN `workflow_level1` w1 ON w1.`id` = t.`workflowlevel1_id`
             WHERE (? IS NULL OR w1.`organization_id` = ?)
               AND (? IS NULL OR t.`workflowlevel1_id` = ?)
             ORDER BY t.`id` LIMIT ? OFFSET ?;",
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

    /// memberships of a user in every organization
    async fn find_list_by_user(&self, workflow_user_id: i64) -> Result<Vec<WorkflowTeam>> {
        sqlx::query_as::<Rdb, WorkflowTeamRow>(
            "SELECT * FROM `workflow_team` WHERE `workflow_user_id` = ? ORDER BY `id`;",
        )
        .bind(workflow_user_id)
        .fetch_all(self.db_pool())
        .await
        .map(|rows| rows.iter().map(|r| r.to_model()).collect())
        .map_err(BifrostError::DBError)
        .context(format!("error in find_list_by_user: {}", workflow_user_id))
    }

    async fn count_list_tx<'c, E: Executor<'c, Database = Rdb>>(
        &self,
        tx: E,
        filter: &WorkflowLevel1ChildFilter,
    ) -> Result<i64> {
        sqlx::query_scalar(
            "SELECT count(*) as count FROM `workflow_team` t
             JOIN `workflow_level1` w1 ON w1.`id` = t.`workflowlevel1_id`
             WHERE (? IS NULL OR w1.`organization_id` = ?)
               AND (? IS NULL OR t.`workflowlevel1_id` = ?);",
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
pub struct WorkflowTeamRepositoryImpl {
    id_generator: Arc<IdGeneratorWrapper>,
    pool: RdbPool,
}

pub trait UseWorkflowTeamRepository {
    fn workflow_team_repository(&self) -> &WorkflowTeamRepositoryImpl;
}

impl WorkflowTeamRepositoryImpl {
    pub fn new(id_generator: Arc<IdGeneratorWrapper>, pool: RdbPool) -> Self {
        Self { id_generator, pool }
    }
}

impl UseRdbPool for WorkflowTeamRepositoryImpl {
    fn db_pool(&self) -> &RdbPool {
        &self.pool
    }
}

impl UseIdGenerator for WorkflowTeamRepositoryImpl {
    fn id_generator(&self) -> &IdGeneratorWrapper {
        &self.id_generator
    }
}

impl WorkflowTeamRepository for WorkflowTeamRepositoryImpl {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::infra::core_user::rdb::{CoreUserRepository, CoreUserRepositoryImpl};
    use crate::infra::workflow_level1::rdb::{
        WorkflowLevel1Repository, WorkflowLevel1RepositoryImpl,
    };
    use crate::infra::SCHEMA;
    use infra_utils::infra::test::{setup_test_rdb, TEST_RUNTIME};
    use model::{CoreUserData, WorkflowLevel1Data};

    async fn _test_repository(pool: RdbPool) -> Result<()> {
        let id_generator = Arc::new(IdGeneratorWrapper::new_mock());
        let user_repository = CoreUserRepositoryImpl::new(id_generator.clone(), pool.clone());
        let wl1_repository = WorkflowLevel1RepositoryImpl::new(id_generator.clone(), pool.clone());
        let repository = WorkflowTeamRepositoryImpl::new(id_generator, pool);
        let db = repository.db_pool();

        let mut tx = db.begin().await?;
        let user = user_repository
            .create(
                &mut tx,
                &CoreUserData {
                    username: "member".to_string(),
                    email: "member@example.com".to_string(),
                    ..Default::default()
                },
                "",
            )
            .await?;
        let wl1 = wl1_repository
            .create(
                &mut tx,
                &WorkflowLevel1Data {
                    name: "wl1".to_string(),
                    ..Default::default()
                },
            )
            .await?;
        let data = WorkflowTeamData {
            workflow_user_id: user.id,
            workflowlevel1_id: wl1.id,
            role_id: None,
            start_date: Some(datetime::from_epoch_sec(1_600_000_000)),
            end_date: None,
            status: Some("active".to_string()),
        };
        let created = repository.create(&mut tx, &data).await?;
        tx.commit().await?;

        assert_eq!(repository.find(created.id).await?.unwrap().data, data);
        let filter = WorkflowLevel1ChildFilter {
            workflowlevel1_id: Some(wl1.id),
            ..Default::default()
        };
        assert_eq!(repository.find_list(&filter, None, None).await?.len(), 1);
        let filter = WorkflowLevel1ChildFilter {
            workflowlevel1_id: Some(wl1.id + 1000),
            ..Default::default()
        };
        assert_eq!(repository.count_list_tx(db, &filter).await?, 0);

        let update = WorkflowTeamData {
            status: None,
            ..data.clone()
        };
        let mut tx = db.begin().await?;
        assert!(repository.update(&mut tx, created.id, &update).await?);
        tx.commit().await?;
        assert_eq!(repository.find(created.id).await?.unwrap().data, update);

        assert_eq!(repository.find_list_by_user(user.id).await?.len(), 1);
        assert!(repository.find_list_by_user(user.id + 1000).await?.is_empty());

        // removing the user removes the membership
        assert!(user_repository.delete(user.id).await?);
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
