use crate::infra::{limit_value, IdGeneratorWrapper, UseIdGenerator};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bifrost_base::error::BifrostError;
use chrono::{DateTime, Utc};
use command_utils::util::datetime;
use infra_utils::infra::rdb::{Rdb, RdbPool, UseRdbPool};
use model::{RefreshToken, RefreshTokenData};
use sqlx::Executor;
use std::sync::Arc;

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct RefreshTokenRow {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub application_id: i64,
    pub access_token_id: Option<i64>,
    pub revoked: Option<DateTime<Utc>>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl RefreshTokenRow {
    pub fn to_model(&self) -> RefreshToken {
        RefreshToken {
            id: self.id,
            data: RefreshTokenData {
                user_id: self.user_id,
                token: self.token.clone(),
                application_id: self.application_id,
                access_token_id: self.access_token_id,
                revoked: self.revoked,
            },
            created: self.created,
            updated: self.updated,
        }
    }
}

#[async_trait]
pub trait RefreshTokenRepository: UseRdbPool + UseIdGenerator + Sync + Send {
    async fn create<'c, E: Executor<'c, Database = Rdb>>(
        &self,
        tx: E,
        data: &RefreshTokenData,
    ) -> Result<RefreshToken> {
        let id = self.id_generator().generate_id()?;
        let now = datetime::now();
        sqlx::query::<Rdb>(
            "INSERT INTO `oauth_refresh_token` (
            `id`, `user_id`, `token`, `application_id`, `access_token_id`, `revoked`, `created`, `updated`
            ) VALUES (?,?,?,?,?,?,?,?)",
        )
        .bind(id)
        .bind(data.user_id)
        .bind(&data.token)
        .bind(data.application_id)
        .bind(data.access_token_id)
        .bind(data.revoked)
        .bind(now)
        .bind(now)
        .execute(tx)
        .await
        .map_err(BifrostError::DBError)
        .context(format!(
            "error in create refresh token: user_id = {}",
            data.user_id
        ))?;
        Ok(RefreshToken {
            id,
            data: data.clone(),
            created: now,
            updated: now,
        })
    }

    /// marks the token revoked and detaches its access token
    async fn revoke(&self, id: i64, now: &DateTime<Utc>) -> Result<bool> {
        sqlx::query::<Rdb>(
            "UPDATE `oauth_refresh_token` SET `revoked` = ?, `access_token_id` = NULL, `updated` = ?
             WHERE `id` = ? AND `revoked` IS NULL;",
        )
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(self.db_pool())
        .await
        .map(|r| r.rows_affected() > 0)
        .map_err(BifrostError::DBError)
        .context(format!("error in revoke refresh token: id = {}", id))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        sqlx::query::<Rdb>("DELETE FROM `oauth_refresh_token` WHERE `id` = ?;")
            .bind(id)
            .execute(self.db_pool())
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(BifrostError::DBError)
            .context(format!("error in delete refresh token: id = {}", id))
    }

    async fn find(&self, id: i64) -> Result<Option<RefreshToken>> {
        sqlx::query_as::<Rdb, RefreshTokenRow>(
            "SELECT * FROM `oauth_refresh_token` WHERE `id` = ?;",
        )
        .bind(id)
        .fetch_optional(self.db_pool())
        .await
        .map(|r| r.map(|r| r.to_model()))
        .map_err(BifrostError::DBError)
        .context(format!("error in find refresh token: id = {}", id))
    }

    async fn find_list(
        &self,
        user_id: Option<i64>,
        limit: Option<&i32>,
        offset: Option<&i64>,
    ) -> Result<Vec<RefreshToken>> {
        sqlx::query_as::<Rdb, RefreshTokenRow>(
            "SELECT * FROM `oauth_refresh_token` WHERE (? IS NULL OR `user_id` = ?)
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
            "SELECT count(*) as count FROM `oauth_refresh_token` WHERE (? IS NULL OR `user_id` = ?);",
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
pub struct RefreshTokenRepositoryImpl {
    id_generator: Arc<IdGeneratorWrapper>,
    pool: RdbPool,
}

pub trait UseRefreshTokenRepository {
    fn refresh_token_repository(&self) -> &RefreshTokenRepositoryImpl;
}

impl RefreshTokenRepositoryImpl {
    pub fn new(id_generator: Arc<IdGeneratorWrapper>, pool: RdbPool) -> Self {
        Self { id_generator, pool }
    }
}

impl UseRdbPool for RefreshTokenRepositoryImpl {
    fn db_pool(&self) -> &RdbPool {
        &self.pool
    }
}

impl UseIdGenerator for RefreshTokenRepositoryImpl {
    fn id_generator(&self) -> &IdGeneratorWrapper {
        &self.id_generator
    }
}

impl RefreshTokenRepository for RefreshTokenRepositoryImpl {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::infra::core_user::rdb::{CoreUserRepository, CoreUserRepositoryImpl};
    use crate::infra::oauth::access_token::{AccessTokenRepository, AccessTokenRepositoryImpl};
    use crate::infra::oauth::application::{ApplicationRepository, ApplicationRepositoryImpl};
    use crate::infra::SCHEMA;
    use infra_utils::infra::test::{setup_test_rdb, TEST_RUNTIME};
    use model::{AccessTokenData, ApplicationData, CoreUserData};

    #[test]
    fn run_test() -> Result<()> {
        TEST_RUNTIME.block_on(async {
            let rdb = setup_test_rdb(SCHEMA).await;
            let id_generator = Arc::new(IdGeneratorWrapper::new_mock());
            let user_repository =
                CoreUserRepositoryImpl::new(id_generator.clone(), rdb.pool.clone());
            let app_repository =
                ApplicationRepositoryImpl::new(id_generator.clone(), rdb.pool.clone());
            let access_repository =
                AccessTokenRepositoryImpl::new(id_generator.clone(), rdb.pool.clone());
            let repository = RefreshTokenRepositoryImpl::new(id_generator, rdb.pool.clone());
            let db = repository.db_pool();

            let mut tx = db.begin().await?;
            let user = user_repository
                .create(
                    &mut tx,
                    &CoreUserData {
                        username: "refresher".to_string(),
                        email: "refresher@example.com".to_string(),
                        ..Default::default()
                    },
                    "",
                )
                .await?;
            tx.commit().await?;
            let app = app_repository
                .create(
                    db,
                    &ApplicationData {
                        client_id: "cid".to_string(),
                        client_secret: "secret".to_string(),
                        user_id: Some(user.id),
                        ..Default::default()
                    },
                )
                .await?;
            let access = access_repository
                .create(
                    db,
                    &AccessTokenData {
                        user_id: Some(user.id),
                        token: "access".to_string(),
                        application_id: Some(app.id),
                        expires: datetime::now(),
                        scope: String::new(),
                    },
                )
                .await?;

            let data = RefreshTokenData {
                user_id: user.id,
                token: "refresh".to_string(),
                application_id: app.id,
                access_token_id: Some(access.id),
                revoked: None,
            };
            let created = repository.create(db, &data).await?;
            assert_eq!(repository.find(created.id).await?.map(|t| t.data), Some(data));
            assert_eq!(repository.find_list(Some(user.id), None, None).await?.len(), 1);
            assert_eq!(repository.count_list_tx(db, None).await?, 1);

            let now = datetime::now();
            assert!(repository.revoke(created.id, &now).await?);
            // already revoked
            assert!(!repository.revoke(created.id, &now).await?);
            let revoked = repository.find(created.id).await?.unwrap();
            assert!(revoked.data.revoked.is_some());
            assert_eq!(revoked.data.access_token_id, None);

            // removing the access token keeps the refresh token
            access_repository.delete(access.id).await?;
            assert!(repository.find(created.id).await?.is_some());
            assert!(repository.delete(created.id).await?);
            Ok(())
        })
    }
}
