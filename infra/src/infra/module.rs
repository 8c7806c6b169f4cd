use super::core_group::rdb::{CoreGroupRepositoryImpl, UseCoreGroupRepository};
use super::core_user::rdb::{CoreUserRepositoryImpl, UseCoreUserRepository};
use super::email::{EmailSender, UseEmailSender};
use super::email_template::rdb::{EmailTemplateRepositoryImpl, UseEmailTemplateRepository};
use super::hook::client::{UseWebhookClient, WebhookClientImpl};
use super::hook::rdb::{HookRepositoryImpl, UseHookRepository};
use super::internationalization::rdb::{
    InternationalizationRepositoryImpl, UseInternationalizationRepository,
};
use super::oauth::access_token::{AccessTokenRepositoryImpl, UseAccessTokenRepository};
use super::oauth::application::{ApplicationRepositoryImpl, UseApplicationRepository};
use super::oauth::refresh_token::{RefreshTokenRepositoryImpl, UseRefreshTokenRepository};
use super::organization::rdb::{OrganizationRepositoryImpl, UseOrganizationRepository};
use super::workflow_level1::rdb::{UseWorkflowLevel1Repository, WorkflowLevel1RepositoryImpl};
use super::workflow_level2::rdb::{UseWorkflowLevel2Repository, WorkflowLevel2RepositoryImpl};
use super::workflow_level2_sort::rdb::{
    UseWorkflowLevel2SortRepository, WorkflowLevel2SortRepositoryImpl,
};
use super::workflow_level_status::rdb::{
    UseWorkflowLevelStatusRepository, WorkflowLevelStatusRepositoryImpl,
};
use super::workflow_level_type::rdb::{
    UseWorkflowLevelTypeRepository, WorkflowLevelTypeRepositoryImpl,
};
use super::workflow_team::rdb::{UseWorkflowTeamRepository, WorkflowTeamRepositoryImpl};
use super::{IdGeneratorWrapper, InfraConfigModule, SCHEMA};
use anyhow::Result;
use infra_utils::infra::rdb::{new_rdb_pool, RdbPool, UseRdbPool};
use std::sync::Arc;

pub trait UseRdbRepositoryModule {
    fn rdb_repository_module(&self) -> &RdbRepositoryModule;
}

// repositories (and outbound clients) for DI
#[derive(Clone, Debug)]
pub struct RdbRepositoryModule {
    pub pool: RdbPool,
    pub organization_repository: OrganizationRepositoryImpl,
    pub core_group_repository: CoreGroupRepositoryImpl,
    pub core_user_repository: CoreUserRepositoryImpl,
    pub workflow_level_type_repository: WorkflowLevelTypeRepositoryImpl,
    pub workflow_level_status_repository: WorkflowLevelStatusRepositoryImpl,
    pub workflow_level1_repository: WorkflowLevel1RepositoryImpl,
    pub workflow_level2_repository: WorkflowLevel2RepositoryImpl,
    pub workflow_level2_sort_repository: WorkflowLevel2SortRepositoryImpl,
    pub workflow_team_repository: WorkflowTeamRepositoryImpl,
    pub internationalization_repository: InternationalizationRepositoryImpl,
    pub email_template_repository: EmailTemplateRepositoryImpl,
    pub hook_repository: HookRepositoryImpl,
    pub application_repository: ApplicationRepositoryImpl,
    pub access_token_repository: AccessTokenRepositoryImpl,
    pub refresh_token_repository: RefreshTokenRepositoryImpl,
    pub webhook_client: WebhookClientImpl,
    pub email_sender: EmailSender,
}

impl RdbRepositoryModule {
    pub async fn new(
        config_module: &InfraConfigModule,
        id_generator: Arc<IdGeneratorWrapper>,
    ) -> Result<Self> {
        let pool = new_rdb_pool(&config_module.rdb_config, Some(SCHEMA)).await?;
        let email_sender = EmailSender::new(&config_module.email_config)?;
        Self::new_by_pool(pool, id_generator, email_sender)
    }

    pub fn new_by_pool(
        pool: RdbPool,
        id_generator: Arc<IdGeneratorWrapper>,
        email_sender: EmailSender,
    ) -> Result<Self> {
        Ok(RdbRepositoryModule {
            organization_repository: OrganizationRepositoryImpl::new(
                id_generator.clone(),
                pool.clone(),
            ),
            core_group_repository: CoreGroupRepositoryImpl::new(id_generator.clone(), pool.clone()),
            core_user_repository: CoreUserRepositoryImpl::new(id_generator.clone(), pool.clone()),
            workflow_level_type_repository: WorkflowLevelTypeRepositoryImpl::new(
                id_generator.clone(),
                pool.clone(),
            ),
            workflow_level_status_repository: WorkflowLevelStatusRepositoryImpl::new(
                id_generator.clone(),
                pool.clone(),
            ),
            workflow_level1_repository: WorkflowLevel1RepositoryImpl::new(
                id_generator.clone(),
                pool.clone(),
            ),
            workflow_level2_repository: WorkflowLevel2RepositoryImpl::new(
                id_generator.clone(),
                pool.clone(),
            ),
            workflow_level2_sort_repository: WorkflowLevel2SortRepositoryImpl::new(
                id_generator.clone(),
                pool.clone(),
            ),
            workflow_team_repository: WorkflowTeamRepositoryImpl::new(
                id_generator.clone(),
                pool.clone(),
            ),
            internationalization_repository: InternationalizationRepositoryImpl::new(
                id_generator.clone(),
                pool.clone(),
            ),
            email_template_repository: EmailTemplateRepositoryImpl::new(
                id_generator.clone(),
                pool.clone(),
            ),
            hook_repository: HookRepositoryImpl::new(id_generator.clone(), pool.clone()),
            application_repository: ApplicationRepositoryImpl::new(
                id_generator.clone(),
                pool.clone(),
            ),
            access_token_repository: AccessTokenRepositoryImpl::new(
                id_generator.clone(),
                pool.clone(),
            ),
            refresh_token_repository: RefreshTokenRepositoryImpl::new(id_generator, pool.clone()),
            webhook_client: WebhookClientImpl::new()?,
            email_sender,
            pool,
        })
    }
}

impl UseRdbRepositoryModule for RdbRepositoryModule {
    fn rdb_repository_module(&self) -> &RdbRepositoryModule {
        self
    }
}

impl UseRdbPool for RdbRepositoryModule {
    fn db_pool(&self) -> &RdbPool {
        &self.pool
    }
}

impl<T: UseRdbRepositoryModule> UseOrganizationRepository for T {
    fn organization_repository(&self) -> &OrganizationRepositoryImpl {
        &self.rdb_repository_module().organization_repository
    }
}
impl<T: UseRdbRepositoryModule> UseCoreGroupRepository for T {
    fn core_group_repository(&self) -> &CoreGroupRepositoryImpl {
        &self.rdb_repository_module().core_group_repository
    }
}
impl<T: UseRdbRepositoryModule> UseCoreUserRepository for T {
    fn core_user_repository(&self) -> &CoreUserRepositoryImpl {
        &self.rdb_repository_module().core_user_repository
    }
}
impl<T: UseRdbRepositoryModule> UseWorkflowLevelTypeRepository for T {
    fn workflow_level_type_repository(&self) -> &WorkflowLevelTypeRepositoryImpl {
        &self.rdb_repository_module().workflow_level_type_repository
    }
}
impl<T: UseRdbRepositoryModule> UseWorkflowLevelStatusRepository for T {
    fn workflow_level_status_repository(&self) -> &WorkflowLevelStatusRepositoryImpl {
        &self.rdb_repository_module().workflow_level_status_repository
    }
}
impl<T: UseRdbRepositoryModule> UseWorkflowLevel1Repository for T {
    fn workflow_level1_repository(&self) -> &WorkflowLevel1RepositoryImpl {
        &self.rdb_repository_module().workflow_level1_repository
    }
}
impl<T: UseRdbRepositoryModule> UseWorkflowLevel2Repository for T {
    fn workflow_level2_repository(&self) -> &WorkflowLevel2RepositoryImpl {
        &self.rdb_repository_module().workflow_level2_repository
    }
}
impl<T: UseRdbRepositoryModule> UseWorkflowLevel2SortRepository for T {
    fn workflow_level2_sort_repository(&self) -> &WorkflowLevel2SortRepositoryImpl {
        &self.rdb_repository_module().workflow_level2_sort_repository
    }
}
impl<T: UseRdbRepositoryModule> UseWorkflowTeamRepository for T {
    fn workflow_team_repository(&self) -> &WorkflowTeamRepositoryImpl {
        &self.rdb_repository_module().workflow_team_repository
    }
}
impl<T: UseRdbRepositoryModule> UseInternationalizationRepository for T {
    fn internationalization_repository(&self) -> &InternationalizationRepositoryImpl {
        &self.rdb_repository_module().internationalization_repository
    }
}
impl<T: UseRdbRepositoryModule> UseEmailTemplateRepository for T {
    fn email_template_repository(&self) -> &EmailTemplateRepositoryImpl {
        &self.rdb_repository_module().email_template_repository
    }
}
impl<T: UseRdbRepositoryModule> UseHookRepository for T {
    fn hook_repository(&self) -> &HookRepositoryImpl {
        &self.rdb_repository_module().hook_repository
    }
}
impl<T: UseRdbRepositoryModule> UseApplicationRepository for T {
    fn application_repository(&self) -> &ApplicationRepositoryImpl {
        &self.rdb_repository_module().application_repository
    }
}
impl<T: UseRdbRepositoryModule> UseAccessTokenRepository for T {
    fn access_token_repository(&self) -> &AccessTokenRepositoryImpl {
        &self.rdb_repository_module().access_token_repository
    }
}
impl<T: UseRdbRepositoryModule> UseRefreshTokenRepository for T {
    fn refresh_token_repository(&self) -> &RefreshTokenRepositoryImpl {
        &self.rdb_repository_module().refresh_token_repository
    }
}
impl<T: UseRdbRepositoryModule> UseWebhookClient for T {
    fn webhook_client(&self) -> &WebhookClientImpl {
        &self.rdb_repository_module().webhook_client
    }
}
impl<T: UseRdbRepositoryModule> UseEmailSender for T {
    fn email_sender(&self) -> &EmailSender {
        &self.rdb_repository_module().email_sender
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod test {
    use super::*;
    use infra_utils::infra::test::{setup_test_rdb, TestRdb};

    /// repositories on a temporary database with the memory mail backend
    pub async fn setup_test_rdb_module() -> (RdbRepositoryModule, TestRdb) {
        let rdb = setup_test_rdb(SCHEMA).await;
        let module = RdbRepositoryModule::new_by_pool(
            rdb.pool.clone(),
            Arc::new(IdGeneratorWrapper::new_mock()),
            EmailSender::new_memory(),
        )
        .unwrap();
        (module, rdb)
    }
}
