use super::rows::CoreUserRow;
use crate::infra::{limit_value, IdGeneratorWrapper, UseIdGenerator};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bifrost_base::error::BifrostError;
use chrono::{DateTime, Utc};
use command_utils::util::datetime;
use infra_utils::infra::rdb::{Rdb, RdbPool, UseRdbPool};
use model::{CoreUser, CoreUserData};
use sqlx::{Executor, Transaction};
use std::sync::Arc;
use uuid::Uuid;

#[async_trait]
pub trait CoreUserRepository: UseRdbPool + UseIdGenerator + Sync + Send {
    /// password: already hashed (empty for an unusable password)
    async fn create(
        &self,
        tx: &mut Transaction<'_, Rdb>,
        data: &CoreUserData,
        password: &str,
    ) -> Result<CoreUser> {
        let id = self.id_generator().generate_id()?;
        let uuid = Uuid::new_v4();
        let now = datetime::now();
        sqlx::query::<Rdb>(
            "INSERT INTO `core_user` (
            `id`,
            `core_user_uuid`,
            `username`,
            `email`,
            `first_name`,
            `last_name`,
            `password`,
            `is_active`,
            `is_staff`,
            `is_superuser`,
            `title`,
            `contact_info`,
            `privacy_disclaimer_accepted`,
            `organization_id`,
            `last_login`,
            `date_joined`,
            `create_date`,
            `edit_date`
            ) VALUES (?,?,?,?,?,?,?,?,?,?,?,?,?,?,NULL,?,?,?)",
        )
        .bind(id)
        .bind(uuid.to_string())
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(password)
        .bind(data.is_active)
        .bind(data.is_staff)
        .bind(data.is_superuser)
        .bind(&data.title)
        .bind(&data.contact_info)
        .bind(data.privacy_disclaimer_accepted)
        .bind(data.organization_id)
        .bind(now)
        .bind(now)
        .bind(now)
        .execute(&mut **tx)
        .await
        .map_err(BifrostError::DBError)
        .context(format!("error in create core_user: {}", &data.username))?;
        Ok(CoreUser {
            id,
            core_user_uuid: uuid,
            data: data.clone(),
            password: password.to_string(),
            core_groups: vec![],
            last_login: None,
            date_joined: now,
            create_date: now,
            edit_date: now,
        })
    }

    async fn update(
        &self,
        tx: &mut Transaction<'_, Rdb>,
        id: i64,
        data: &CoreUserData,
    ) -> Result<bool> {
        sqlx::query(
            "UPDATE `core_user` SET
            `username` = ?,
            `email` = ?,
            `first_name` = ?,
            `last_name` = ?,
            `is_active` = ?,
            `is_staff` = ?,
            `is_superuser` = ?,
            `title` = ?,
            `contact_info` = ?,
            `privacy_disclaimer_accepted` = ?,
            `organization_id` = ?,
            `edit_date` = ?
            WHERE `id` = ?;",
        )
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(data.is_active)
        .bind(data.is_staff)
        .bind(data.is_superuser)
        .bind(&data.title)
        .bind(&data.contact_info)
        .bind(data.privacy_disclaimer_accepted)
        .bind(data.organization_id)
        .bind(datetime::now())
        .bind(id)
        .execute(&mut **tx)
        .await
        .map(|r| r.rows_affected() > 0)
        .map_err(BifrostError::DBError)
        .context(format!("error in update core_user: id = {}", id))
    }

    async fn update_password<'c, E: Executor<'c, Database = Rdb>>(
        &self,
        tx: E,
        id: i64,
        password: &str,
    ) -> Result<bool> {
        sqlx::query("UPDATE `core_user` SET `password` = ?, `edit_date` = ? WHERE `id` = ?;")
            .bind(password)
            .bind(datetime::now())
            .bind(id)
            .execute(tx)
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(BifrostError::DBError)
            .context(format!("error in update_password: id = {}", id))
    }

    async fn update_last_login(&self, id: i64, at: &DateTime<Utc>) -> Result<bool> {
        sqlx::query("UPDATE `core_user` SET `last_login` = ? WHERE `id` = ?;")
            .bind(at)
            .bind(id)
            .execute(self.db_pool())
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(BifrostError::DBError)
            .context(format!("error in update_last_login: id = {}", id))
    }

    async fn add_core_group<'c, E: Executor<'c, Database = Rdb>>(
        &self,
        tx: E,
        id: i64,
        core_group_id: i64,
    ) -> Result<bool> {
        sqlx::query(
            "INSERT OR IGNORE INTO `core_user_core_groups` (`core_user_id`, `core_group_id`) VALUES (?,?);",
        )
        .bind(id)
        .bind(core_group_id)
        .execute(tx)
        .await
        .map(|r| r.rows_affected() > 0)
        .map_err(BifrostError::DBError)
        .context(format!("error in add_core_group: id = {}", id))
    }

    /// replace all group memberships
    async fn set_core_groups(
        &self,
        tx: &mut Transaction<'_, Rdb>,
        id: i64,
        core_group_ids: &[i64],
    ) -> Result<()> {
        sqlx::query("DELETE FROM `core_user_core_groups` WHERE `core_user_id` = ?;")
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(BifrostError::DBError)
            .context(format!("error in clear core_groups: id = {}", id))?;
        for gid in core_group_ids {
            self.add_core_group(&mut **tx, id, *gid).await?;
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.delete_tx(self.db_pool(), id).await
    }

    async fn delete_tx<'c, E: Executor<'c, Database = Rdb>>(&self, tx: E, id: i64) -> Result<bool> {
        sqlx::query::<Rdb>("DELETE FROM `core_user` WHERE `id` = ?;")
            .bind(id)
            .execute(tx)
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(BifrostError::DBError)
            .context(format!("error in delete core_user: id = {}", id))
    }

    async fn find_group_ids_tx<'c, E: Executor<'c, Database = Rdb>>(
        &self,
        tx: E,
        id: i64,
    ) -> Result<Vec<i64>> {
        sqlx::query_scalar(
            "SELECT `core_group_id` FROM `core_user_core_groups`
             WHERE `core_user_id` = ? ORDER BY `core_group_id`;",
        )
        .bind(id)
        .fetch_all(tx)
        .await
        .map_err(BifrostError::DBError)
        .context(format!("error in find core_groups of user: id = {}", id))
    }

    async fn to_models(&self, rows: Vec<CoreUserRow>) -> Result<Vec<CoreUser>> {
        let mut res = Vec::with_capacity(rows.len());
        for row in rows.iter() {
            let groups = self.find_group_ids_tx(self.db_pool(), row.id).await?;
            res.push(row.to_model(groups));
        }
        Ok(res)
    }

    async fn find(&self, id: i64) -> Result<Option<CoreUser>> {
        let row = sqlx::query_as::<Rdb, CoreUserRow>("SELECT * FROM `core_user` WHERE `id` = ?;")
            .bind(id)
            .fetch_optional(self.db_pool())
            .await
            .map_err(BifrostError::DBError)
            .context(format!("error in find core_user: id = {}", id))?;
        Ok(self.to_models(row.into_iter().collect()).await?.pop())
    }

    // read own writes inside a transaction
    async fn find_in_tx(&self, tx: &mut Transaction<'_, Rdb>, id: i64) -> Result<Option<CoreUser>> {
        let row = sqlx::query_as::<Rdb, CoreUserRow>("SELECT * FROM `core_user` WHERE `id` = ?;")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(BifrostError::DBError)
            .context(format!("error in find core_user: id = {}", id))?;
        match row {
            Some(r) => {
                let groups = self.find_group_ids_tx(&mut **tx, r.id).await?;
                Ok(Some(r.to_model(groups)))
            }
            None => Ok(None),
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<CoreUser>> {
        let row =
            sqlx::query_as::<Rdb, CoreUserRow>("SELECT * FROM `core_user` WHERE `username` = ?;")
                .bind(username)
                .fetch_optional(self.db_pool())
                .await
                .map_err(BifrostError::DBError)
                .context(format!("error in find core_user: username = {}", username))?;
        Ok(self.to_models(row.into_iter().collect()).await?.pop())
    }

    async fn find_active_by_email(&self, email: &str) -> Result<Vec<CoreUser>> {
        let rows = sqlx::query_as::<Rdb, CoreUserRow>(
            "SELECT * FROM `core_user` WHERE `email` = ? AND `is_active` = 1 ORDER BY `id`;",
        )
        .bind(email)
        .fetch_all(self.db_pool())
        .await
        .map_err(BifrostError::DBError)
        .context(format!("error in find core_user: email = {}", email))?;
        self.to_models(rows).await
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool> {
        sqlx::query_scalar::<Rdb, i64>("SELECT count(*) FROM `core_user` WHERE `email` = ?;")
            .bind(email)
            .fetch_one(self.db_pool())
            .await
            .map(|c| c > 0)
            .map_err(BifrostError::DBError)
            .context(format!("error in exists_by_email: {}", email))
    }

    /// organization_id: None for all
    async fn find_list(
        &self,
        organization_id: Option<i64>,
        limit: Option<&i32>,
        offset: Option<&i64>,
    ) -> Result<Vec<CoreUser>> {
        let rows = sqlx::query_as::<Rdb, CoreUserRow>(
            "SELECT * FROM `core_user` WHERE (? IS NULL OR `organization_id` = ?)
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
            "SELECT count(*) as count FROM `core_user` WHERE (? IS NULL OR `organization_id` = ?);",
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
pub struct CoreUserRepositoryImpl {
    id_generator: Arc<IdGeneratorWrapper>,
    pool: RdbPool,
}

pub trait UseCoreUserRepository {
    fn core_user_repository(&self) -> &CoreUserRepositoryImpl;
}

impl CoreUserRepositoryImpl {
    pub fn new(id_generator: Arc<IdGeneratorWrapper>, pool: RdbPool) -> Self {
        Self { id_generator, pool }
    }
}

impl UseRdbPool for CoreUserRepositoryImpl {
    fn db_pool(&self) -> &RdbPool {
        &self.pool
    }
}

impl UseIdGenerator for CoreUserRepositoryImpl {
    fn id_generator(&self) -> &IdGeneratorWrapper {
        &self.id_generator
    }
}

impl CoreUserRepository for CoreUserRepositoryImpl {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::infra::core_group::rdb::{CoreGroupRepository, CoreGroupRepositoryImpl};
    use crate::infra::SCHEMA;
    use infra_utils::infra::test::{setup_test_rdb, TEST_RUNTIME};
    use model::CoreGroupData;

    async fn _test_repository(pool: RdbPool) -> Result<()> {
        let id_generator = Arc::new(IdGeneratorWrapper::new_mock());
        let group_repository = CoreGroupRepositoryImpl::new(id_generator.clone(), pool.clone());
        let repository = CoreUserRepositoryImpl::new(id_generator, pool);
        let db = repository.db_pool();

        let data = CoreUserData {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            first_name: "Alice".to_string(),
            is_active: true,
            ..Default::default()
        };
        let mut tx = db.begin().await?;
        let group = group_repository
            .create(
                &mut tx,
                &CoreGroupData {
                    name: "g".to_string(),
                    permissions: 4,
                    ..Default::default()
                },
            )
            .await?;
        let created = repository.create(&mut tx, &data, "hashed").await?;
        assert!(repository.add_core_group(&mut *tx, created.id, group.id).await?);
        // duplicated membership is ignored
        assert!(!repository.add_core_group(&mut *tx, created.id, group.id).await?);
        let in_tx = repository.find_in_tx(&mut tx, created.id).await?.unwrap();
        assert_eq!(in_tx.core_groups, vec![group.id]);
        tx.commit().await?;

        let found = repository.find(created.id).await?.unwrap();
        assert_eq!(found.data, data);
        assert_eq!(found.password, "hashed");
        assert_eq!(found.core_groups, vec![group.id]);

        assert!(repository.exists_by_email("alice@example.com").await?);
        assert!(!repository.exists_by_email("bob@example.com").await?);
        assert_eq!(repository.find_active_by_email("alice@example.com").await?.len(), 1);
        assert_eq!(
            repository.find_by_username("alice").await?.map(|u| u.id),
            Some(created.id)
        );

        let update = CoreUserData {
            is_active: false,
            title: Some("Dr.".to_string()),
            ..data.clone()
        };
        let mut tx = db.begin().await?;
        assert!(repository.update(&mut tx, created.id, &update).await?);
        repository.set_core_groups(&mut tx, created.id, &[]).await?;
        tx.commit().await?;
        let found = repository.find(created.id).await?.unwrap();
        assert_eq!(found.data, update);
        assert!(found.core_groups.is_empty());
        assert!(repository.find_active_by_email("alice@example.com").await?.is_empty());

        assert!(repository.update_password(db, created.id, "other").await?);
        let now = datetime::now();
        assert!(repository.update_last_login(created.id, &now).await?);
        let found = repository.find(created.id).await?.unwrap();
        assert_eq!(found.password, "other");
        assert!(found.last_login.is_some());

        assert_eq!(repository.count_list_tx(db, None).await?, 1);
        assert_eq!(repository.find_list(Some(1), None, None).await?.len(), 0);
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
