use super::auth::Requester;
use anyhow::Result;
use async_trait::async_trait;
use bifrost_base::error::{BifrostError, ValidationErrors};
use bifrost_base::permissions::PermissionAction;
use infra::infra::internationalization::rdb::{
    InternationalizationRepository, UseInternationalizationRepository,
};
use infra::infra::module::{RdbRepositoryModule, UseRdbRepositoryModule};
use infra_utils::infra::rdb::UseRdbPool;
use model::{Internationalization, InternationalizationData};
use std::sync::Arc;

fn validate_internationalization(data: &InternationalizationData) -> Result<()> {
    let mut errors = ValidationErrors::new();
    if data.language.trim().is_empty() {
        errors.add("language", "This field may not be blank.");
    }
    if serde_json::from_str::<serde_json::Value>(&data.language_file).is_err() {
        errors.add("language_file", "Value must be valid JSON.");
    }
    errors.into_result().map_err(|e| e.into())
}

/// translation files shared by every organization (readable by any user)
#[async_trait]
pub trait InternationalizationApp: UseInternationalizationRepository + Send + Sync {
    async fn create_internationalization(
        &self,
        requester: &Requester,
        data: &InternationalizationData,
    ) -> Result<Internationalization> {
        requester.authorize(PermissionAction::Create)?;
        validate_internationalization(data)?;
        let repo = self.internationalization_repository();
        repo.create(repo.db_pool(), data).await
    }

    async fn update_internationalization(
        &self,
        requester: &Requester,
        id: i64,
        data: &InternationalizationData,
    ) -> Result<Internationalization> {
        requester.authorize(PermissionAction::Update)?;
        validate_internationalization(data)?;
        let repo = self.internationalization_repository();
        if !repo.update(repo.db_pool(), id, data).await? {
            return Err(
                BifrostError::NotFound(format!("internationalization not found: id = {}", id)).into(),
            );
        }
        repo.find(id).await?.ok_or_else(|| {
            BifrostError::NotFound(format!("internationalization not found: id = {}", id)).into()
        })
    }

    async fn delete_internationalization(&self, requester: &Requester, id: i64) -> Result<bool> {
        requester.authorize(PermissionAction::Delete)?;
        self.internationalization_repository().delete(id).await
    }

    async fn find_internationalization(&self, id: i64) -> Result<Option<Internationalization>> {
        self.internationalization_repository().find(id).await
    }

    async fn find_internationalization_list(
        &self,
        language: Option<&str>,
        limit: Option<&i32>,
        offset: Option<&i64>,
    ) -> Result<Vec<Internationalization>> {
        self.internationalization_repository()
            .find_list(language, limit, offset)
            .await
    }

    async fn count_internationalizations(&self, language: Option<&str>) -> Result<i64> {
        let repo = self.internationalization_repository();
        repo.count_list_tx(repo.db_pool(), language).await
    }
}

#[derive(Debug, Clone)]
pub struct InternationalizationAppImpl {
    repositories: Arc<RdbRepositoryModule>,
}

impl InternationalizationAppImpl {
    pub fn new(repositories: Arc<RdbRepositoryModule>) -> Self {
        Self { repositories }
    }
}

impl UseRdbRepositoryModule for InternationalizationAppImpl {
    fn rdb_repository_module(&self) -> &RdbRepositoryModule {
        &self.repositories
    }
}

impl InternationalizationApp for InternationalizationAppImpl {}

pub trait UseInternationalizationApp {
    fn internationalization_app(&self) -> &InternationalizationAppImpl;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::auth::test::{group, user};
    use bifrost_base::permissions::PERMISSIONS_VIEW_ONLY;
    use infra::infra::module::test::setup_test_rdb_module;
    use infra_utils::infra::test::TEST_RUNTIME;

    #[test]
    fn test_crud() -> Result<()> {
        TEST_RUNTIME.block_on(async {
            let (module, _rdb) = setup_test_rdb_module().await;
            let app = InternationalizationAppImpl::new(Arc::new(module));
            let superuser = Requester::new(user(None, true), vec![]);
            let viewer = Requester::new(
                user(Some(1), false),
                vec![group(PERMISSIONS_VIEW_ONLY, true, false)],
            );
            let data = InternationalizationData {
                language: "pt_BR".to_string(),
                language_file: r#"{"name": "Nome", "gender": "Gênero"}"#.to_string(),
            };
            assert!(app.create_internationalization(&viewer, &data).await.is_err());
            let created = app.create_internationalization(&superuser, &data).await?;
            let broken = InternationalizationData {
                language_file: "{not json".to_string(),
                ..data.clone()
            };
            match app
                .create_internationalization(&superuser, &broken)
                .await
                .unwrap_err()
                .downcast_ref::<BifrostError>()
            {
                Some(BifrostError::ValidationError(e)) => assert!(e.get("language_file").is_some()),
                e => panic!("unexpected error: {:?}", e),
            }

            assert_eq!(
                app.find_internationalization_list(Some("pt_BR"), None, None)
                    .await?
                    .len(),
                1
            );
            assert_eq!(app.count_internationalizations(Some("de")).await?, 0);
            let updated = app
                .update_internationalization(
                    &superuser,
                    created.id,
                    &InternationalizationData {
                        language: "pt_PT".to_string(),
                        ..data.clone()
                    },
                )
                .await?;
            assert_eq!(updated.data.language, "pt_PT");
            assert!(app
                .update_internationalization(&superuser, created.id + 1, &data)
                .await
                .is_err());
            assert!(app
                .delete_internationalization(&superuser, created.id)
                .await?);
            assert!(app.find_internationalization(created.id).await?.is_none());
            Ok(())
        })
    }
}
