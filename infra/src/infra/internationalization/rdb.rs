use super::rows::InternationalizationRow;
use crate::infra::{limit_value, IdGeneratorWrapper, UseIdGenerator};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bifrost_base::error::BifrostError;
use command_utils::util::datetime;
use infra_utils::infra::rdb::{Rdb, RdbPool, UseRdbPool};
use model::{Internationalization, InternationalizationData};
use sqlx::Executor;
use std::sync::Arc;

#[async_trait]
pub trait InternationalizationRepository: UseRdbPool + UseIdGenerator + Sync + Send {
    async fn create<'c, E: Executor<'c, Database = Rdb>>(
        &self,
        tx: E,
        data: &InternationalizationData,
    ) -> Result<Internationalization> {
        let id = self.id_generator().generate_id()?;
        let now = datetime::now();
        sqlx::query::<Rdb>(
            "INSERT INTO `internationalization` (`id`, `language`, `language_file`, `create_date`, `edit_date`)
             VALUES (?,?,?,?,?)",
        )
        .bind(id)
        .bind(&data.language)
        .bind(&data.language_file)
        .bind(now)
        .bind(now)
        .execute(tx)
        .await
        .map_err(BifrostError::DBError)
        .context(format!("error in create internationalization: {}", &data.language))?;
        Ok(Internationalization {
            id,
            data: data.clone(),
            create_date: now,
            edit_date: now,
        })
    }

    async fn update<'c, E: Executor<'c, Database = Rdb>>(
        &self,
        tx: E,
        id: i64,
        data: &InternationalizationData,
    ) -> Result<bool> {
        sqlx::query(
            "UPDATE `internationalization` SET `language` = ?, `language_file` = ?, `edit_date` = ?
             WHERE `id` = ?;",
        )
        .bind(&data.language)
        .bind(&data.language_file)
        .bind(datetime::now())
        .bind(id)
        .execute(tx)
        .await
        .map(|r| r.rows_affected() > 0)
        .map_err(BifrostError::DBError)
        .context(format!("error in update internationalization: id = {}", id))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        sqlx::query::<Rdb>("DELETE FROM `internationalization` WHERE `id` = ?;")
            .bind(id)
            .execute(self.db_pool())
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(BifrostError::DBError)
            .context(format!("error in delete internationalization: id = {}", id))
    }

    async fn find(&self, id: i64) -> Result<Option<Internationalization>> {
        sqlx::query_as::<Rdb, InternationalizationRow>(
            "SELECT * FROM `internationalization` WHERE `id` = ?;",
        )
        .bind(id)
        .fetch_optional(self.db_pool())
        .await
        .map(|r| r.map(|r| r.to_model()))
        .map_err(BifrostError::DBError)
        .context(format!("error in find internationalization: id = {}", id))
    }

    async fn find_by_language(&self, language: &str) -> Result<Option<Internationalization>> {
        sqlx::query_as::<Rdb, InternationalizationRow>(
            "SELECT * FROM `internationalization` WHERE `language` = ? ORDER BY `id` LIMIT 1;",
        )
        .bind(language)
        .fetch_optional(self.db_pool())
        .await
        .map(|r| r.map(|r| r.to_model()))
        .map_err(BifrostError::DBError)
        .context(format!("error in find internationalization: language = {}", language))
    }

    async fn find_list(
        &self,
        language: Option<&str>,
        limit: Option<&i32>,
        offset: Option<&i64>,
    ) -> Result<Vec<Internationalization>> {
        sqlx::query_as::<Rdb, InternationalizationRow>(
            "SELECT * FROM `internationalization` WHERE (? IS NULL OR `language` = ?)
             ORDER BY `id` LIMIT ? OFFSET ?;",
        )
        .bind(language)
        .bind(language)
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
        language: Option<&str>,
    ) -> Result<i64> {
        sqlx::query_scalar(
            "SELECT count(*) as count FROM `internationalization` WHERE (? IS NULL OR `language` = ?);",
        )
        .bind(language)
        .bind(language)
        .fetch_one(tx)
        .await
        .map_err(BifrostError::DBError)
        .context("error in count_list".to_string())
    }
}

#[derive(Clone, Debug)]
pub struct InternationalizationRepositoryImpl {
    id_generator: Arc<IdGeneratorWrapper>,
    pool: RdbPool,
}

pub trait UseInternationalizationRepository {
    fn internationalization_repository(&self) -> &InternationalizationRepositoryImpl;
}

impl InternationalizationRepositoryImpl {
    pub fn new(id_generator: Arc<IdGeneratorWrapper>, pool: RdbPool) -> Self {
        Self { id_generator, pool }
    }
}

impl UseRdbPool for InternationalizationRepositoryImpl {
    fn db_pool(&self) -> &RdbPool {
        &self.pool
    }
}

impl UseIdGenerator for InternationalizationRepositoryImpl {
    fn id_generator(&self) -> &IdGeneratorWrapper {
        &self.id_generator
    }
}

impl InternationalizationRepository for InternationalizationRepositoryImpl {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::infra::SCHEMA;
    use infra_utils::infra::test::{setup_test_rdb, TEST_RUNTIME};

    #[test]
    fn run_test() -> Result<()> {
        TEST_RUNTIME.block_on(async {
            let rdb = setup_test_rdb(SCHEMA).await;
            let repository = InternationalizationRepositoryImpl::new(
                Arc::new(IdGeneratorWrapper::new_mock()),
                rdb.pool.clone(),
            );
            let db = repository.db_pool();
            let data = InternationalizationData {
                language: "pt_BR".to_string(),
                language_file: r#"{"name": "Nome", "gender": "Gênero"}"#.to_string(),
            };
            let created = repository.create(db, &data).await?;
            assert_eq!(
                repository.find_by_language("pt_BR").await?.map(|i| i.id),
                Some(created.id)
            );
            assert!(repository.find_by_language("de").await?.is_none());
            let update = InternationalizationData {
                language: "pt".to_string(),
                ..data.clone()
            };
            assert!(repository.update(db, created.id, &update).await?);
            assert_eq!(repository.find(created.id).await?.unwrap().data, update);
            assert_eq!(repository.find_list(Some("pt"), None, None).await?.len(), 1);
            assert_eq!(repository.count_list_tx(db, None).await?, 1);
            assert!(repository.delete(created.id).await?);
            Ok(())
        })
    }
}
