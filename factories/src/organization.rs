use crate::Factory;
use anyhow::Result;
use async_trait::async_trait;
use bifrost_base::error::BifrostError;
use infra::infra::module::RdbRepositoryModule;
use infra::infra::organization::rdb::{OrganizationRepository, UseOrganizationRepository};
use infra_utils::infra::rdb::UseRdbPool;
use model::{Organization, OrganizationData};

pub const DEFAULT_ORGANIZATION_NAME: &str = "Default Organization";

/// get-or-create by name
#[derive(Debug, Clone)]
pub struct OrganizationFactory {
    pub data: OrganizationData,
}

impl Default for OrganizationFactory {
    fn default() -> Self {
        Self {
            data: OrganizationData {
                name: DEFAULT_ORGANIZATION_NAME.to_string(),
                ..Default::default()
            },
        }
    }
}

impl OrganizationFactory {
    pub fn named(name: &str) -> Self {
        Self {
            data: OrganizationData {
                name: name.to_string(),
                ..Default::default()
            },
        }
    }
}

#[async_trait]
impl Factory for OrganizationFactory {
    type Output = Organization;

    async fn create(self, module: &RdbRepositoryModule) -> Result<Organization> {
        let repo = module.organization_repository();
        let mut tx = repo.db_pool().begin().await.map_err(BifrostError::DBError)?;
        let org = match repo.find_by_name_tx(&mut *tx, &self.data.name).await? {
            Some(org) => org,
            None => repo.create(&mut tx, &self.data).await?,
        };
        tx.commit().await.map_err(BifrostError::DBError)?;
        Ok(org)
    }

    fn output_id(output: &Organization) -> i64 {
        output.id
    }
}
