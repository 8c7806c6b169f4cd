use super::rows::HookRow;
use crate::infra::{limit_value, IdGeneratorWrapper, UseIdGenerator};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bifrost_base::error::BifrostError;
use command_utils::util::datetime;
use infra_utils::infra::rdb::{Rdb, RdbPool, UseRdbPool};
use model::{Hook, HookData};
use sqlx::Executor;
use std::sync::Arc;

#[async_trait]
pub trait HookRepository: UseRdbPool + UseIdGenerator + Sync + Send {
    async fn create<'c, E: Executor<'c, Database = Rdb>>(
        &self,
        tx: E,
        data: &HookData,
    ) -> Result<Hook> {
        let id = self.id_generator().generate_id()?;
        let now = datetime::now();
        sqlx::query::<Rdb>(
            "INSERT INTO `hook` (`id`, `user_id`, `event`, `target`, `created`, `updated`)
             VALUES (?,?,?,?,?,?)",
        )
        .bind(id)
        .bind(data.user_id)
        .bind(&data.event)
        .bind(&data.target)
        .bind(now)
        .bind(now)
        .execute(tx)
        .await
        .map_err(BifrostError::DBError)
        .context(format!("error in create hook: {:?}", data))?;
        Ok(Hook {
            id,
            data: data.clone(),
            created: now,
            updated: now,
        })
    }

    async fn update<'c, E: Executor<'c, Database = Rdb>>(
        &self,
        tx: E,
        id: i64,
        data: &HookData,
    ) -> Result<bool> {
        sqlx::query(
            "UPDATE `hook` SET `user_id` = ?, `event` = ?, `target` = ?, `updated` = ? WHERE `id` = ?;",
        )
        .bind(data.user_id)
        .bind(&data.event)
        .bind(&data.target)
        .bind(datetime::now())
        .bind(id)
        .execute(tx)
        .await
        .map(|r| r.rows_affected() > 0)
        .map_err(BifrostError::DBError)
        .context(format!("error in update hook: id = {}", id))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        sqlx::query::<Rdb>("DELETE FROM `hook` WHERE `id` = ?;")
            .bind(id)
            .execute(self.db_pool())
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(BifrostError::DBError)
            .context(format!("error in delete hook: id = {}", id))
    }

    async fn find(&self, id: i64) -> Result<Option<Hook>> {
        sqlx::query_as::<Rdb, HookRow>("SELECT * FROM `hook` WHERE `id` = ?;")
            .bind(id)
            .fetch_optional(self.db_pool())
            .await
            .map(|r| r.map(|r| r.to_model()))
            .map_err(BifrostError::DBError)
            .context(format!("error in find hook: id = {}", id))
    }

    /// all subscriptions of the event
    async fn find_by_event(&self, event: &str) -> Result<Vec<Hook>> {
        sqlx::query_as::<Rdb, HookRow>("SELECT * FROM `hook` WHERE `event` = ? ORDER BY `id`;")
            .bind(event)
            .fetch_all(self.db_pool())
            .await
            .map(|rows| rows.iter().map(|r| r.to_model()).collect())
            .map_err(BifrostError::DBError)
            .context(format!("error in find hook: event = {}", event))
    }

    /// user_id: None for all
    async fn find_list(
        &self,
        user_id: Option<i64>,
        limit: Option<&i32>,
        offset: Option<&i64>,
    ) -> Result<Vec<Hook>> {
        sqlx::query_as::<Rdb, HookRow>(
            "SELECT * FROM `hook` WHERE (? IS NULL OR `user_id` = ?) ORDER BY `id` LIMIT ? OFFSET ?;",
        )
        .bind(user_id)
        .bind(user_id)
        .bind(limit_value(limit))
        .bind(offset.unwrap_or(&0))
        .fetch_all(self.db_pool())
        .await
        .map(|rows| rows.iter().map(|r| r.to_model()).collect())
        .map_err(BifrostError::DBError)
        .context(format!("error in find_list: ({:?}, {:?})", limit, offset))
    }

    async fn count_list_tx<'c, E: Executor<'c, Database = Rdb>>(
        &self,
        tx: E,
        user_id: Option<i64>,
    ) -> Result<i64> {
        sqlx::query_scalar("SELECT count(*) as count FROM `hook` WHERE (? IS NULL OR `user_id` = ?);")
            .bind(user_id)
            .bind(user_id)
            .fetch_one(tx)
            .await
            .map_err(BifrostError::DBError)
            .context("error in count_list".to_string())
    }
}

#[derive(Clone, Debug)]
pub struct HookRepositoryImpl {
    id_generator: Arc<IdGeneratorWrapper>,
    pool: RdbPool,
}

pub trait UseHookRepository {
    fn hook_repository(&self) -> &HookRepositoryImpl;
}

impl HookRepositoryImpl {
    pub fn new(id_generator: Arc<IdGeneratorWrapper>, pool: RdbPool) -> Self {
        Self { id_generator, pool }
    }
}

impl UseRdbPool for HookRepositoryImpl {
    fn db_pool(&self) -> &RdbPool {
        &self.pool
    }
}

impl UseIdGenerator for HookRepositoryImpl {
    fn id_generator(&self) -> &IdGeneratorWrapper {
        &self.id_generator
    }
}

impl HookRepository for HookRepositoryImpl {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::infra::core_user::rdb::{CoreUserRepository, CoreUserRepositoryImpl};
    use crate::infra::SCHEMA;
    use infra_utils::infra::test::{setup_test_rdb, TEST_RUNTIME};
    use model::CoreUserData;

    #[test]
    fn run_test() -> Result<()> {
        TEST_RUNTIME.block_on(async {
            let rdb = setup_test_rdb(SCHEMA).await;
            let id_generator = Arc::new(IdGeneratorWrapper::new_mock());
            let user_repository = CoreUserRepositoryImpl::new(id_generator.clone(), rdb.pool.clone());
            let repository = HookRepositoryImpl::new(id_generator, rdb.pool.clone());
            let db = repository.db_pool();

            let mut tx = db.begin().await?;
            let user = user_repository
                .create(
                    &mut tx,
                    &CoreUserData {
                        username: "hooker".to_string(),
                        email: "h@example.com".to_string(),
                        ..Default::default()
                    },
                    "",
                )
                .await?;
            tx.commit().await?;

            let data = HookData {
                user_id: user.id,
                event: "workflowlevel1.added".to_string(),
                target: "http://example.com/hook".to_string(),
            };
            let created = repository.create(db, &data).await?;
            repository
                .create(
                    db,
                    &HookData {
                        event: "workflowteam.removed".to_string(),
                        ..data.clone()
                    },
                )
                .await?;
            let hooks = repository.find_by_event("workflowlevel1.added").await?;
            assert_eq!(hooks.iter().map(|h| h.id).collect::<Vec<_>>(), vec![created.id]);
            assert!(repository.find_by_event("workflowlevel2.added").await?.is_empty());
            assert_eq!(repository.find_list(Some(user.id), None, None).await?.len(), 2);
            assert_eq!(repository.count_list_tx(db, Some(user.id + 1)).await?, 0);

            let update = HookData {
                target: "http://example.com/other".to_string(),
                ..data
            };
            assert!(repository.update(db, created.id, &update).await?);
            assert_eq!(repository.find(created.id).await?.unwrap().data, update);
            assert!(repository.delete(created.id).await?);
            Ok(())
        })
    }
}
