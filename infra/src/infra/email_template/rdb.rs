use super::rows::EmailTemplateRow;
use crate::infra::{IdGeneratorWrapper, UseIdGenerator};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bifrost_base::error::BifrostError;
use command_utils::util::datetime;
use infra_utils::infra::rdb::{Rdb, RdbPool, UseRdbPool};
use model::{EmailTemplate, EmailTemplateData, EmailTemplateType};
use sqlx::Executor;
use std::sync::Arc;

#[async_trait]
pub trait EmailTemplateRepository: UseRdbPool + UseIdGenerator + Sync + Send {
    async fn create<'c, E: Executor<'c, Database = Rdb>>(
        &self,
        tx: E,
        data: &EmailTemplateData,
    ) -> Result<EmailTemplate> {
        let id = self.id_generator().generate_id()?;
        let now = datetime::now();
        sqlx::query::<Rdb>(
            "INSERT INTO `email_template` (
            `id`,
            `organization_id`,
            `type`,
            `subject`,
            `template`,
            `template_html`,
            `create_date`,
            `edit_date`
            ) VALUES (?,?,?,?,?,?,?,?)",
        )
        .bind(id)
        .bind(data.organization_id)
        .bind(data.r#type.to_string())
        .bind(&data.subject)
        .bind(&data.template)
        .bind(&data.template_html)
        .bind(now)
        .bind(now)
        .execute(tx)
        .await
        .map_err(BifrostError::DBError)
        .context(format!(
            "error in create email_template: organization_id = {}, type = {}",
            data.organization_id, data.r#type
        ))?;
        Ok(EmailTemplate {
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
        data: &EmailTemplateData,
    ) -> Result<bool> {
        sqlx::query(
            "UPDATE `email_template` SET
            `organization_id` = ?,
            `type` = ?,
            `subject` = ?,
            `template` = ?,
            `template_html` = ?,
            `edit_date` = ?
            WHERE `id` = ?;",
        )
        .bind(data.organization_id)
        .bind(data.r#type.to_string())
        .bind(&data.subject)
        .bind(&data.template)
        .bind(&data.template_html)
        .bind(datetime::now())
        .bind(id)
        .execute(tx)
        .await
        .map(|r| r.rows_affected() > 0)
        .map_err(BifrostError::DBError)
        .context(format!("error in update email_template: id = {}", id))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        sqlx::query::<Rdb>("DELETE FROM `email_template` WHERE `id` = ?;")
            .bind(id)
            .execute(self.db_pool())
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(BifrostError::DBError)
            .context(format!("error in delete email_template: id = {}", id))
    }

    async fn find_by_organization(
        &self,
        organization_id: i64,
        r#type: EmailTemplateType,
    ) -> Result<Option<EmailTemplate>> {
        sqlx::query_as::<Rdb, EmailTemplateRow>(
            "SELECT * FROM `email_template` WHERE `organization_id` = ? AND `type` = ?;",
        )
        .bind(organization_id)
        .bind(r#type.to_string())
        .fetch_optional(self.db_pool())
        .await
        .map(|r| r.map(|r| r.to_model()))
        .map_err(BifrostError::DBError)
        .context(format!(
            "error in find email_template: organization_id = {}, type = {}",
            organization_id, r#type
        ))
    }

    async fn find_by_organization_name(
        &self,
        organization_name: &str,
        r#type: EmailTemplateType,
    ) -> Result<Option<EmailTemplate>> {
        sqlx::query_as::<Rdb, EmailTemplateRow>(
            "SELECT t.* FROM `email_template` t
             JOIN `organization` o ON o.`id` = t.`organization_id`
             WHERE o.`name` = ? AND t.`type` = ?;",
        )
        .bind(organization_name)
        .bind(r#type.to_string())
        .fetch_optional(self.db_pool())
        .await
        .map(|r| r.map(|r| r.to_model()))
        .map_err(BifrostError::DBError)
        .context(format!(
            "error in find email_template: organization = {}, type = {}",
            organization_name, r#type
        ))
    }
}

#[derive(Clone, Debug)]
pub struct EmailTemplateRepositoryImpl {
    id_generator: Arc<IdGeneratorWrapper>,
    pool: RdbPool,
}

pub trait UseEmailTemplateRepository {
    fn email_template_repository(&self) -> &EmailTemplateRepositoryImpl;
}

impl EmailTemplateRepositoryImpl {
    pub fn new(id_generator: Arc<IdGeneratorWrapper>, pool: RdbPool) -> Self {
        Self { id_generator, pool }
    }
}

impl UseRdbPool for EmailTemplateRepositoryImpl {
    fn db_pool(&self) -> &RdbPool {
        &self.pool
    }
}

impl UseIdGenerator for EmailTemplateRepositoryImpl {
    fn id_generator(&self) -> &IdGeneratorWrapper {
        &self.id_generator
    }
}

impl EmailTemplateRepository for EmailTemplateRepositoryImpl {}
