use super::rows::CoreGroupRow;
use crate::infra::{limit_value, IdGeneratorWrapper, UseIdGenerator};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bifrost_base::error::BifrostError;
use command_utils::util::datetime;
use infra_utils::infra::rdb::{Rdb, RdbPool, UseRdbPool};
use model::{CoreGroup, CoreGroupData};
use sqlx::{Executor, Transaction};
use std::sync::Arc;
use uuid::Uuid;

#[async_trait]
pub trait CoreGroupRepository: UseRdbPool + UseIdGenerator + Sync + Send {
    async fn create(
        &self,
        tx: &mut Transaction<'_, Rdb>,
        data: &CoreGroupData,
    ) -> Result<CoreGroup> {
        let id = self.id_generator().generate_id()?;
        let uuid = Uuid::new_v4();
        let now = datetime::now();
        sqlx::query::<Rdb>(
            "INSERT INTO `core_group` (
            `id`,
            `uuid`,
            `name`,
            `organization_id`,
            `is_global`,
            `is_org_level`,
            `permissions`,
            `create_date`,
            `edit_date`
            ) VALUES (?,?,?,?,?,?,?,?,?)",
        )
        .bind(id)
        .bind(uuid.to_string())
        .bind(&data.name)
        .bind(data.organization_id)
        .bind(data.is_global)
        .bind(data.is_org_level)
        .bind(data.permissions)
        .bind(now)
        .bind(now)
        .execute(&mut **tx)
        .await
        .map_err(BifrostError::DBError)
        .context(format!("error in create core_group: {:?}", data))?;
        Ok(CoreGroup {
            id,
            uuid,
            data: data.clone(),
            workflowlevel1s: vec![],
            workflowlevel2s: vec![],
            create_date: now,
            edit_date: now,
        })
    }

    async fn update(
        &self,
        tx: &mut Transaction<'_, Rdb>,
        id: i64,
        data: &CoreGroupData,
    ) -> Result<bool> {
        sqlx::query(
            "UPDATE `core_group` SET
            `name` = ?,
            `organization_id` = ?,
            `is_global` = ?,
            `is_org_level` = ?,
            `permissions` = ?,
            `edit_date` = ?
            WHERE `id` = ?;",
        )
        .bind(&data.name)
        .bind(data.organization_id)
        .bind(data.is_global)
        .bind(data.is_org_level)
        .bind(data.permissions)
        .bind(datetime::now())
        .bind(id)
        .execute(&mut **tx)
        .await
        .map(|r| r.rows_affected() > 0)
        .map_err(BifrostError::DBError)
        .context(format!("error in update core_group: id = {}", id))
    }

    async fn add_workflowlevel1<'c, E: Executor<'c, Database = Rdb>>(
        &self,
        tx: E,
        id: i64,
        workflowlevel1_id: i64,
    ) -> Result<bool> {
        sqlx::query(
            "INSERT OR IGNORE INTO `core_group_workflowlevel1s`
            (`core_group_id`, `workflowlevel1_id`) VALUES (?,?);",
        )
        .bind(id)
        .bind(workflowlevel1_id)
        .execute(tx)
        .await
        .map(|r| r.rows_affected() > 0)
        .map_err(BifrostError::DBError)
        .context(format!("error in add_workflowlevel1: id = {}", id))
    }

    async fn add_workflowlevel2<'c, E: Executor<'c, Database = Rdb>>(
        &self,
        tx: E,
        id: i64,
        workflowlevel2_id: i64,
    ) -> Result<bool> {
        sqlx::query(
            "INSERT OR IGNORE INTO `core_group_workflowlevel2s`
            (`core_group_id`, `workflowlevel2_id`) VALUES (?,?);",
        )
        .bind(id)
        .bind(workflowlevel2_id)
        .execute(tx)
        .await
        .map(|r| r.rows_affected() > 0)
        .map_err(BifrostError::DBError)
        .context(format!("error in add_workflowlevel2: id = {}", id))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.delete_tx(self.db_pool(), id).await
    }

    async fn delete_tx<'c, E: Executor<'c, Database = Rdb>>(&self, tx: E, id: i64) -> Result<bool> {
        sqlx::query::<Rdb>("DELETE FROM `core_group` WHERE `id` = ?;")
            .bind(id)
            .execute(tx)
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(BifrostError::DBError)
            .context(format!("error in delete core_group: id = {}", id))
    }

    // with relations loaded from the pool
    async fn to_model(&self, row: &CoreGroupRow) -> Result<CoreGroup> {
        let pool = self.db_pool();
        let wl1s: Vec<i64> = sqlx::query_scalar(
            "SELECT `workflowlevel1_id` FROM `core_group_workflowlevel1s`
             WHERE `core_group_id` = ? ORDER BY `workflowlevel1_id`;",
        )
        .bind(row.id)
        .fetch_all(pool)
        .await
        .map_err(BifrostError::DBError)?;
        let wl2s: Vec<i64> = sqlx::query_scalar(
            "SELECT `workflowlevel2_id` FROM `core_group_workflowlevel2s`
             WHERE `core_group_id` = ? ORDER BY `workflowlevel2_id`;",
        )
        .bind(row.id)
        .fetch_all(pool)
        .await
        .map_err(BifrostError::DBError)?;
        Ok(row.to_model(wl1s, wl2s))
    }

    async fn to_models(&self, rows: Vec<CoreGroupRow>) -> Result<Vec<CoreGroup>> {
        let mut res = Vec::with_capacity(rows.len());
        for row in rows.iter() {
            res.push(self.to_model(row).await?);
        }
        Ok(res)
    }

    async fn find(&self, id: i64) -> Result<Option<CoreGroup>> {
        let row = self.find_row_tx(self.db_pool(), id).await?;
        match row {
            Some(r) => self.to_model(&r).await.map(Some),
            None => Ok(None),
        }
    }

    async fn find_row_tx<'c, E: Executor<'c, Database = Rdb>>(
        &self,
        tx: E,
        id: i64,
    ) -> Result<Option<CoreGroupRow>> {
        sqlx::query_as::<Rdb, CoreGroupRow>("SELECT * FROM `core_group` WHERE `id` = ?;")
            .bind(id)
            .fetch_optional(tx)
            .await
            .map_err(BifrostError::DBError)
            .context(format!("error in find core_group: id = {}", id))
    }

    /// org level group with the given permissions of the organization
    async fn find_org_level_row_tx<'c, E: Executor<'c, Database = Rdb>>(
        &self,
        tx: E,
        organization_id: i64,
        permissions: i32,
    ) -> Result<Option<CoreGroupRow>> {
        sqlx::query_as::<Rdb, CoreGroupRow>(
            "SELECT * FROM `core_group`
             WHERE `organization_id` = ? AND `is_org_level` = 1 AND `permissions` = ?
             ORDER BY `id` LIMIT 1;",
        )
        .bind(organization_id)
        .bind(permissions)
        .fetch_optional(tx)
        .await
        .map_err(BifrostError::DBError)
        .context(format!(
            "error in find org level core_group: organization_id = {}",
            organization_id
        ))
    }

    async fn find_by_user(&self, core_user_id: i64) -> Result<Vec<CoreGroup>> {
        let rows = sqlx::query_as::<Rdb, CoreGroupRow>(
            "SELECT g.* FROM `core_group` g
             JOIN `core_user_core_groups` ug ON ug.`core_group_id` = g.`id`
             WHERE ug.`core_user_id` = ? ORDER BY g.`id`;",
        )
        .bind(core_user_id)
        .fetch_all(self.db_pool())
        .await
        .map_err(BifrostError::DBError)
        .context(format!("error in find core_group by user: {}", core_user_id))?;
        self.to_models(rows).await
    }

    /// organization_id: None for all
    async fn find_list(
        &self,
        organization_id: Option<i64>,
        limit: Option<&i32>,
        offset: Option<&i64>,
    ) -> Result<Vec<CoreGroup>> {
        let rows = sqlx::query_as::<Rdb, CoreGroupRow>(
            "SELECT * FROM `core_group` WHERE (? IS NULL OR `organization_id` = ?)
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
            "SELECT count(*) as count FROM `core_group` WHERE (? IS NULL OR `organization_id` = ?);",
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
pub struct CoreGroupRepositoryImpl {
    id_generator: Arc<IdGeneratorWrapper>,
    pool: RdbPool,
}

pub trait UseCoreGroupRepository {
    fn core_group_repository(&self) -> &CoreGroupRepositoryImpl;
}

impl CoreGroupRepositoryImpl {
    pub fn new(id_generator: Arc<IdGeneratorWrapper>, pool: RdbPool) -> Self {
        Self { id_generator, pool }
    }
}

impl UseRdbPool for CoreGroupRepositoryImpl {
    fn db_pool(&self) -> &RdbPool {
        &self.pool
    }
}

impl UseIdGenerator for CoreGroupRepositoryImpl {
    fn id_generator(&self) -> &IdGeneratorWrapper {
        &self.id_generator
    }
}

impl CoreGroupRepository for CoreGroupRepositoryImpl {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::infra::organization::rdb::{OrganizationRepository, OrganizationRepositoryImpl};
    use crate::infra::SCHEMA;
    use bifrost_base::permissions::{PERMISSIONS_ORG_ADMIN, PERMISSIONS_VIEW_ONLY};
    use infra_utils::infra::test::{setup_test_rdb, TEST_RUNTIME};
    use model::OrganizationData;

    async fn _test_repository(pool: RdbPool) -> Result<()> {
        let id_generator = Arc::new(IdGeneratorWrapper::new_mock());
        let org_repository = OrganizationRepositoryImpl::new(id_generator.clone(), pool.clone());
        let repository = CoreGroupRepositoryImpl::new(id_generator, pool);
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
        let admin = repository
            .create(
                &mut tx,
                &CoreGroupData {
                    name: "Admin".to_string(),
                    organization_id: Some(org.id),
                    is_global: false,
                    is_org_level: true,
                    permissions: PERMISSIONS_ORG_ADMIN,
                },
            )
            .await?;
        let member = repository
            .create(
                &mut tx,
                &CoreGroupData {
                    name: "Member".to_string(),
                    organization_id: Some(org.id),
                    is_global: false,
                    is_org_level: true,
                    permissions: PERMISSIONS_VIEW_ONLY,
                },
            )
            .await?;
        let found = repository
            .find_org_level_row_tx(&mut *tx, org.id, PERMISSIONS_ORG_ADMIN)
            .await?;
        assert_eq!(found.map(|r| r.id), Some(admin.id));
        tx.commit().await?;

        let found = repository.find(member.id).await?;
        assert_eq!(found.map(|g| (g.uuid, g.data)), Some((member.uuid, member.data.clone())));

        let mut update = member.data.clone();
        update.permissions = 9;
        update.name = "Reviewer".to_string();
        let mut tx = db.begin().await?;
        assert!(repository.update(&mut tx, member.id, &update).await?);
        tx.commit().await?;
        assert_eq!(repository.find(member.id).await?.unwrap().data, update);

        assert_eq!(repository.find_list(Some(org.id), None, None).await?.len(), 2);
        assert_eq!(repository.find_list(Some(org.id + 100), None, None).await?.len(), 0);
        assert_eq!(repository.count_list_tx(db, None).await?, 2);

        // relations
        sqlx::query(
            "INSERT INTO `core_user` (`id`, `core_user_uuid`, `username`, `email`, `date_joined`, `create_date`, `edit_date`)
             VALUES (1000, 'u', 'user', 'user@example.com', '2020-01-01T00:00:00Z', '2020-01-01T00:00:00Z', '2020-01-01T00:00:00Z');",
        )
        .execute(db)
        .await?;
        sqlx::query("INSERT INTO `core_user_core_groups` (`core_user_id`, `core_group_id`) VALUES (1000, ?);")
            .bind(admin.id)
            .execute(db)
            .await?;
        let groups = repository.find_by_user(1000).await?;
        assert_eq!(groups.iter().map(|g| g.id).collect::<Vec<_>>(), vec![admin.id]);

        assert!(repository.delete(admin.id).await?);
        assert!(repository.find_by_user(1000).await?.is_empty());
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
