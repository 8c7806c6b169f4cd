use crate::Factory;
use anyhow::Result;
use async_trait::async_trait;
use infra::infra::internationalization::rdb::{
    InternationalizationRepository, UseInternationalizationRepository,
};
use infra::infra::module::RdbRepositoryModule;
use infra_utils::infra::rdb::UseRdbPool;
use model::{Internationalization, InternationalizationData};

#[derive(Debug, Clone)]
pub struct InternationalizationFactory {
    pub data: InternationalizationData,
}

impl Default for InternationalizationFactory {
    fn default() -> Self {
        Self {
            data: InternationalizationData {
                language: "pt-BR".to_string(),
                language_file: r#"{"name": "Nome", "gender": "Gênero"}"#.to_string(),
            },
        }
    }
}

#[async_trait]
impl Factory for InternationalizationFactory {
    type Output = Internationalization;

    async fn create(self, module: &RdbRepositoryModule) -> Result<Internationalization> {
        let repo = module.internationalization_repository();
        repo.create(repo.db_pool(), &self.data).await
    }

    fn output_id(output: &Internationalization) -> i64 {
        output.id
    }
}
