//! Factories creating persisted model rows with reasonable defaults.
//!
//! Every factory is a plain struct: override fields with struct update
//! syntax and call [`Factory::create`]. Related rows are built through a
//! [`SubFactory`] unless an existing id is given.

pub mod core;
pub mod internationalization;
pub mod organization;
pub mod workflow;

pub use self::core::{CoreGroupFactory, CoreUserFactory};
pub use internationalization::InternationalizationFactory;
pub use organization::OrganizationFactory;
pub use workflow::{
    WorkflowLevel1Factory, WorkflowLevel2Factory, WorkflowLevel2SortFactory, WorkflowTeamFactory,
};

use anyhow::Result;
use async_trait::async_trait;
use bifrost_base::error::BifrostError;
use infra::infra::module::RdbRepositoryModule;

#[async_trait]
pub trait Factory: Send + Sized {
    type Output: Send;

    async fn create(self, module: &RdbRepositoryModule) -> Result<Self::Output>;

    /// primary key of a created row (referenced by other factories)
    fn output_id(output: &Self::Output) -> i64;
}

/// related row of a factory
#[derive(Debug, Clone)]
pub enum SubFactory<F> {
    Build(F),
    Existing(i64),
    Empty,
}

impl<F: Factory + Default> Default for SubFactory<F> {
    fn default() -> Self {
        SubFactory::Build(F::default())
    }
}

impl<F: Factory> SubFactory<F> {
    pub async fn resolve(self, module: &RdbRepositoryModule) -> Result<Option<i64>> {
        match self {
            SubFactory::Build(factory) => {
                let created = factory.create(module).await?;
                Ok(Some(F::output_id(&created)))
            }
            SubFactory::Existing(id) => Ok(Some(id)),
            SubFactory::Empty => Ok(None),
        }
    }

    /// for not null references
    pub async fn resolve_required(self, module: &RdbRepositoryModule, name: &str) -> Result<i64> {
        self.resolve(module)
            .await?
            .ok_or_else(|| BifrostError::InvalidParameter(format!("{} is required", name)).into())
    }
}
