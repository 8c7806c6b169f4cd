use crate::infra::{limit_value, IdGeneratorWrapper, UseIdGenerator};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bifrost_base::error::BifrostError;
use chrono::{DateTime, Utc};
use command_utils::util::datetime;
use infra_utils::infra::rdb::{Rdb, RdbPool, UseRdbPool};
use model::{AccessToken, AccessTokenData};
use sqlx::Executor;
use std::sync::Arc;

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct AccessTokenRow {
    pub id: i64,
    pub user_id: Option<i64>,
    pub token: String,
    pub application_id: Option<i64>,
    pub expires: DateTime<Utc>,
    pub scope: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl AccessTokenRow {
    pub fn to_model(&self) -> AccessToken {
        AccessToken {
            id: self.id,
            data: AccessTokenData {
                user_id: self.user_id,
                token: self.token.clone(),
                application_id: self.application_id,
                expires: self.expires,
                scope: self.scope.clone(),
            },
            created: self.created,
            updated: self.updated,
        }
    }
}

#[async_trait]
pub trait AccessTokenRepository: UseRdbPool + UseIdGenerator + Sync + Send {
    async fn create<'c, E: Executor<'c, Database = Rdb>>(
        &self,
        tx: E,
        data: &AccessTokenData,
    ) -> Result<AccessToken> {
        let id = self.id_generator().generate_id()?;
        let now = datetime::now();
        sqlx::query::<Rdb>(
            "INSERT INTO `oauth_access_token` (
            `id`, `user_id`, `token`, `application_id`, `expires`, `scope`, `created`, `updated`
            ) VALUES (?,?,?,?,?,?,?,?)",
        )
        .bind(id)
        .bind(data.user_id)
        .bind(&data.token)
        .bind(data.application_id)
        .bind(data.expires)
        .bind(&data.scope)
        .bind(now)
        .bind(now)
        .execute(tx)
        .await
        .map_err(BifrostError::DBError)
        .context(format!(
            "error in create access token: user_id = {:?}",
            data.user_id
        ))?;
        Ok(AccessToken {
            id,
            data: data.clone(),
            created: now,
            updated: now,
        })
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        sqlx::query::<Rdb>("DELETE FROM `oauth_access_token` WHERE `id` = ?;")
            .bind(id)
            .execute(self.db_pool())
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(BifrostError::DBError)
            .context(format!("error in delete access token: id = {}", id))
    }

    async fn find(&self, id: i64) -> Result<Option<AccessToken>> {
        sqlx::query_as::<Rdb, AccessTokenRow>(
            "SELECT * FROM `oauth_access_token` WHERE `id` = ?;",
        )
        .bind(id)
        .fetch_optional(self.db_pool())
        .await
        .map(|r| r.map(|r| r.to_model()))
        .map_err(BifrostError::DBError)
        .context(format!("error in find access token: id = {}", id))
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<AccessToken>> {
        sqlx::query_as::<Rdb, AccessTokenRow>(
            "SELECT * FROM `oauth_access_token` WHERE `token` = ?;",
        )
        .bind(token)
        .fetch_optional(self.db_pool())
        .await
        .map(|r| r.map(|r| r.to_model()))
        .map_err(BifrostError::DBError)
        .context("error in find access token by token".to_string())
    }

    async fn find_list(
        &self,
        user_id: Option<i64>,
        limit: Option<&i32>,
        offset: Option<&i64>,
    ) -> Result<Vec<AccessToken>> {
        sqlx::query_as::<Rdb, AccessTokenRow>(
            "SELECT * FROM `oauth_access_token` WHERE (? IS NULL OR `user_id` = ?)
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
            "SELECT count(*) as count FROM `oauth_access_token` WHERE (? IS NULL OR `user_id` = ?);",
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_one(tx)
        .await
        .map_err(BifrostError::DBError)
        .context("error in count_list".to_string())
    }

    /// remove tokens expired before `now`
    async fn delete_expired(&self, now: &DateTime<Utc>) -> Result<u64> {
        sqlx::query::<Rdb>("DELETE FROM `oauth_access_token` WHERE `expires` <= ?;")
            .bind(now)
            .execute(self.db_pool())
            .await
            .map(|r| r.rows_affected())
            .map_err(BifrostError::DBError)
            .context("error in delete expired access tokens".to_string())
    }
}

#[derive(Clone, Debug)]
pub struct AccessTokenRepositoryImpl {
    id_generator: Arc<IdGeneratorWrapper>,
    pool: RdbPool,
}

pub trait UseAccessTokenRepository {
    fn access_token_repository(&self) -> &AccessTokenRepositoryImpl;
}

impl AccessTokenRepositoryImpl {
    pub fn new(id_generator: Arc<IdGeneratorWrapper>, pool: RdbPool) -> Self {
        Self { id_generator, pool }
    }
}

impl UseRdbPool for AccessTokenRepositoryImpl {
    fn db_pool(&self) -> &RdbPool {
        &self.pool
    }
}

impl UseIdGenerator for AccessTokenRepositoryImpl {
    fn id_generator(&self) -> &IdGeneratorWrapper {
        &self.id_generator
    }
}

impl AccessTokenRepository for AccessTokenRepositoryImpl {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::infra::core_user::rdb::{CoreUserRepository, CoreUserRepositoryImpl};
    use crate::infra::SCHEMA;
    use chrono::Duration;
    use infra_utils::infra::test::{setup_test_rdb, TEST_RUNTIME};
    use model::CoreUserData;

    #[test]
    fn run_test() -> Result<()> {
        TEST_RUNTIME.block_on(async {
            let rdb = setup_test_rdb(SCHEMA).await;
            let id_generator = Arc::new(IdGeneratorWrapper::new_mock());
            let user_repository =
                CoreUserRepositoryImpl::new(id_generator.clone(), rdb.pool.clone());
            let repository = AccessTokenRepositoryImpl::new(id_generator, rdb.pool.clone());
            let db = repository.db_pool();

            let mut tx = db.begin().await?;
            let user = user_repository
                .create(
                    &mut tx,
                    &CoreUserData {
                        username: "token-owner".to_string(),
                        email: "owner@example.com".to_string(),
                        ..Default::default()
                    },
                    "",
                )
                .await?;
            tx.commit().await?;

            let now = datetime::now();
            let data = AccessTokenData {
                user_id: Some(user.id),
                token: "valid-token".to_string(),
                application_id: None,
                expires: now + Duration::hours(1),
                scope: "read write".to_string(),
            };
            let created = repository.create(db, &data).await?;
            let expired = repository
                .create(
                    db,
                    &AccessTokenData {
                        token: "expired-token".to_string(),
                        expires: now - Duration::hours(1),
                        ..data.clone()
                    },
                )
                .await?;
            let found = repository.find_by_token("valid-token").await?.unwrap();
            assert_eq!(found.id, created.id);
            assert!(!found.is_expired(&now));
            assert!(repository
                .find_by_token("expired-token")
                .await?
                .unwrap()
                .is_expired(&now));
            assert!(repository.find_by_token("unknown").await?.is_none());

            assert_eq!(repository.find_list(Some(user.id), None, None).await?.len(), 2);
            assert_eq!(repository.count_list_tx(db, Some(user.id + 1)).await?, 0);
            assert_eq!(repository.delete_expired(&now).await?, 1);
            assert!(repository.find(expired.id).await?.is_none());
            assert!(repository.delete(created.id).await?);
            assert!(!repository.delete(created.id).await?);
            Ok(())
        })
    }
}
