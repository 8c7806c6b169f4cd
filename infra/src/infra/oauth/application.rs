use crate::infra::{limit_value, IdGeneratorWrapper, UseIdGenerator};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bifrost_base::error::BifrostError;
use chrono::{DateTime, Utc};
use command_utils::util::datetime;
use infra_utils::infra::rdb::{Rdb, RdbPool, UseRdbPool};
use model::{Application, ApplicationData, AuthorizationGrantType, ClientType};
use sqlx::Executor;
use std::str::FromStr;
use std::sync::Arc;

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct ApplicationRow {
    pub id: i64,
    pub client_id: String,
    pub client_secret: String,
    pub client_type: String,
    pub authorization_grant_type: String,
    pub name: String,
    pub redirect_uris: String,
    pub user_id: Option<i64>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl ApplicationRow {
    pub fn to_model(&self) -> Application {
        let client_type = ClientType::from_str(&self.client_type).unwrap_or_else(|_| {
            tracing::warn!(
                "unknown client_type: id={}, value={}",
                self.id,
                &self.client_type
            );
            ClientType::default()
        });
        let authorization_grant_type = AuthorizationGrantType::from_str(
            &self.authorization_grant_type,
        )
        .unwrap_or_else(|_| {
            tracing::warn!(
                "unknown authorization_grant_type: id={}, value={}",
                self.id,
                &self.authorization_grant_type
            );
            AuthorizationGrantType::default()
        });
        Application {
            id: self.id,
            data: ApplicationData {
                client_id: self.client_id.clone(),
                client_secret: self.client_secret.clone(),
                client_type,
                authorization_grant_type,
                name: self.name.clone(),
                redirect_uris: self.redirect_uris.clone(),
                user_id: self.user_id,
            },
            created: self.created,
            updated: self.updated,
        }
    }
}

#[async_trait]
pub trait ApplicationRepository: UseRdbPool + UseIdGenerator + Sync + Send {
    /// client_id and client_secret must be filled by the caller
    async fn create<'c, E: Executor<'c, Database = Rdb>>(
        &self,
        tx: E,
        data: &ApplicationData,
    ) -> Result<Application> {
        let id = self.id_generator().generate_id()?;
        let now = datetime::now();
        sqlx::query::<Rdb>(
            "INSERT INTO `oauth_application` (
            `id`,
            `client_id`,
            `client_secret`,
            `client_type`,
            `authorization_grant_type`,
            `name`,
            `redirect_uris`,
            `user_id`,
            `created`,
            `updated`
            ) VALUES (?,?,?,?,?,?,?,?,?,?)",
        )
        .bind(id)
        .bind(&data.client_id)
        .bind(&data.client_secret)
        .bind(data.client_type.to_string())
        .bind(data.authorization_grant_type.to_string())
        .bind(&data.name)
        .bind(&data.redirect_uris)
        .bind(data.user_id)
        .bind(now)
        .bind(now)
        .execute(tx)
        .await
        .map_err(BifrostError::DBError)
        .context(format!("error in create application: name = {}", &data.name))?;
        Ok(Application {
            id,
            data: data.clone(),
            created: now,
            updated: now,
        })
    }

    /// credentials are kept as they are
    async fn update<'c, E: Executor<'c, Database = Rdb>>(
        &self,
        tx: E,
        id: i64,
        data: &ApplicationData,
    ) -> Result<bool> {
        sqlx::query(
            "UPDATE `oauth_application` SET
            `client_type` = ?,
            `authorization_grant_type` = ?,
            `name` = ?,
            `redirect_uris` = ?,
            `user_id` = ?,
            `updated` = ?
            WHERE `id` = ?;",
        )
        .bind(data.client_type.to_string())
        .bind(data.authorization_grant_type.to_string())
        .bind(&data.name)
        .bind(&data.redirect_uris)
        .bind(data.user_id)
        .bind(datetime::now())
        .bind(id)
        .execute(tx)
        .await
        .map(|r| r.rows_affected() > 0)
        .map_err(BifrostError::DBError)
        .context(format!("error in update application: id = {}", id))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        sqlx::query::<Rdb>("DELETE FROM `oauth_application` WHERE `id` = ?;")
            .bind(id)
            .execute(self.db_pool())
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(BifrostError::DBError)
            .context(format!("error in delete application: id = {}", id))
    }

    async fn find(&self, id: i64) -> Result<Option<Application>> {
        sqlx::query_as::<Rdb, ApplicationRow>("SELECT * FROM `oauth_application` WHERE `id` = ?;")
            .bind(id)
            .fetch_optional(self.db_pool())
            .await
            .map(|r| r.map(|r| r.to_model()))
            .map_err(BifrostError::DBError)
            .context(format!("error in find application: id = {}", id))
    }

    async fn find_by_client_id(&self, client_id: &str) -> Result<Option<Application>> {
        sqlx::query_as::<Rdb, ApplicationRow>(
            "SELECT * FROM `oauth_application` WHERE `client_id` = ?;",
        )
        .bind(client_id)
        .fetch_optional(self.db_pool())
        .await
        .map(|r| r.map(|r| r.to_model()))
        .map_err(BifrostError::DBError)
        .context("error in find application by client_id".to_string())
    }

    /// user_id: None for all
    async fn find_list(
        &self,
        user_id: Option<i64>,
        limit: Option<&i32>,
        offset: Option<&i64>,
    ) -> Result<Vec<Application>> {
        sqlx::query_as::<Rdb, ApplicationRow>(
            "SELECT * FROM `oauth_application` WHERE (? IS NULL OR `user_id` = ?)
             ORDER BY `id` LIMIT ? OFFSET ?;",
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
        sqlx::query_scalar(
            "SELECT count(*) as count FROM `oauth_application` WHERE (? IS NULL OR `user_id` = ?);",
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_one(tx)
        .await
        .map_err(BifrostError::DBError)
        .context("error in count_list".to_string())
    }
}

#[derive(Clone, Debug)]
pub struct ApplicationRepositoryImpl {
    id_generator: Arc<IdGeneratorWrapper>,
    pool: RdbPool,
}

pub trait UseApplicationRepository {
    fn application_repository(&self) -> &ApplicationRepositoryImpl;
}

impl ApplicationRepositoryImpl {
    pub fn new(id_generator: Arc<IdGeneratorWrapper>, pool: RdbPool) -> Self {
        Self { id_generator, pool }
    }
}

impl UseRdbPool for ApplicationRepositoryImpl {
    fn db_pool(&self) -> &RdbPool {
        &self.pool
    }
}

impl UseIdGenerator for ApplicationRepositoryImpl {
    fn id_generator(&self) -> &IdGeneratorWrapper {
        &self.id_generator
    }
}

impl ApplicationRepository for ApplicationRepositoryImpl {}
