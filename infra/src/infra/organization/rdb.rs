use super::rows::OrganizationRow;
use crate::infra::{limit_value, IdGeneratorWrapper, UseIdGenerator};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bifrost_base::error::BifrostError;
use command_utils::util::datetime;
use infra_utils::infra::rdb::{Rdb, RdbPool, UseRdbPool};
use model::{Organization, OrganizationData};
use sqlx::{Executor, Transaction};
use std::sync::Arc;
use uuid::Uuid;

#[async_trait]
pub trait OrganizationRepository: UseRdbPool + UseIdGenerator + Sync + Send {
    async fn create(
        &self,
        tx: &mut Transaction<'_, Rdb>,
        data: &OrganizationData,
    ) -> Result<Organization> {
        let id = self.id_generator().generate_id()?;
        let uuid = Uuid::new_v4();
        let now = datetime::now();
        sqlx::query::<Rdb>(
            "INSERT INTO `organization` (
            `id`,
            `organization_uuid`,
            `name`,
            `description`,
            `organization_url`,
            `industry`,
            `phone`,
            `create_date`,
            `edit_date`
            ) VALUES (?,?,?,?,?,?,?,?,?)",
        )
        .bind(id)
        .bind(uuid.to_string())
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.organization_url)
        .bind(&data.industry)
        .bind(&data.phone)
        .bind(now)
        .bind(now)
        .execute(&mut **tx)
        .await
        .map_err(BifrostError::DBError)
        .context(format!("error in create organization: {}", &data.name))?;
        Ok(Organization {
            id,
            organization_uuid: uuid,
            data: data.clone(),
            create_date: now,
            edit_date: now,
        })
    }

    async fn update(
        &self,
        tx: &mut Transaction<'_, Rdb>,
        id: i64,
        data: &OrganizationData,
    ) -> Result<bool> {
        sqlx::query(
            "UPDATE `organization` SET
            `name` = ?,
            `description` = ?,
            `organization_url` = ?,
            `industry` = ?,
            `phone` = ?,
            `edit_date` = ?
            WHERE `id` = ?;",
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.organization_url)
        .bind(&data.industry)
        .bind(&data.phone)
        .bind(datetime::now())
        .bind(id)
        .execute(&mut **tx)
        .await
        .map(|r| r.rows_affected() > 0)
        .map_err(BifrostError::DBError)
        .context(format!("error in update organization: id = {}", id))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.delete_tx(self.db_pool(), id).await
    }

    async fn delete_tx<'c, E: Executor<'c, Database = Rdb>>(&self, tx: E, id: i64) -> Result<bool> {
        sqlx::query::<Rdb>("DELETE FROM `organization` WHERE `id` = ?;")
            .bind(id)
            .execute(tx)
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(BifrostError::DBError)
            .context(format!("error in delete organization: id = {}", id))
    }

    async fn find(&self, id: i64) -> Result<Option<Organization>> {
        self.find_tx(self.db_pool(), id).await
    }

    async fn find_tx<'c, E: Executor<'c, Database = Rdb>>(
        &self,
        tx: E,
        id: i64,
    ) -> Result<Option<Organization>> {
        sqlx::query_as::<Rdb, OrganizationRow>("SELECT * FROM `organization` WHERE `id` = ?;")
            .bind(id)
            .fetch_optional(tx)
            .await
            .map(|r| r.map(|r| r.to_model()))
            .map_err(BifrostError::DBError)
            .context(format!("error in find organization: id = {}", id))
    }

    async fn find_by_uuid(&self, uuid: &Uuid) -> Result<Option<Organization>> {
        sqlx::query_as::<Rdb, OrganizationRow>(
            "SELECT * FROM `organization` WHERE `organization_uuid` = ?;",
        )
        .bind(uuid.to_string())
        .fetch_optional(self.db_pool())
        .await
        .map(|r| r.map(|r| r.to_model()))
        .map_err(BifrostError::DBError)
        .context(format!("error in find organization: uuid = {}", uuid))
    }

    async fn find_by_name_tx<'c, E: Executor<'c, Database = Rdb>>(
        &self,
        tx: E,
        name: &str,
    ) -> Result<Option<Organization>> {
        sqlx::query_as::<Rdb, OrganizationRow>("SELECT * FROM `organization` WHERE `name` = ?;")
            .bind(name)
            .fetch_optional(tx)
            .await
            .map(|r| r.map(|r| r.to_model()))
            .map_err(BifrostError::DBError)
            .context(format!("error in find organization: name = {}", name))
    }

    async fn find_list(
        &self,
        id: Option<i64>,
        limit: Option<&i32>,
        offset: Option<&i64>,
    ) -> Result<Vec<Organization>> {
        sqlx::query_as::<Rdb, OrganizationRow>(
            "SELECT * FROM `organization` WHERE (? IS NULL OR `id` = ?)
             ORDER BY `id` LIMIT ? OFFSET ?;",
        )
        .bind(id)
        .bind(id)
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
        id: Option<i64>,
    ) -> Result<i64> {
        sqlx::query_scalar("SELECT count(*) as count FROM `organization` WHERE (? IS NULL OR `id` = ?);")
            .bind(id)
            .bind(id)
            .fetch_one(tx)
            .await
            .map_err(BifrostError::DBError)
            .context("error in count_list".to_string())
    }
}

#[derive(Clone, Debug)]
pub struct OrganizationRepositoryImpl {
    id_generator: Arc<IdGeneratorWrapper>,
    pool: RdbPool,
}

pub trait UseOrganizationRepository {
    fn organization_repository(&self) -> &OrganizationRepositoryImpl;
}

impl OrganizationRepositoryImpl {
    pub fn new(id_generator: Arc<IdGeneratorWrapper>, pool: RdbPool) -> Self {
        Self { id_generator, pool }
    }
}

impl UseRdbPool for OrganizationRepositoryImpl {
    fn db_pool(&self) -> &RdbPool {
        &self.pool
    }
}

impl UseIdGenerator for OrganizationRepositoryImpl {
    fn id_generator(&self) -> &IdGeneratorWrapper {
        &self.id_generator
    }
}

impl OrganizationRepository for OrganizationRepositoryImpl {}
