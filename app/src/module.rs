use crate::app::auth::TokenCache;
use crate::app::core_group::CoreGroupAppImpl;
use crate::app::core_user::CoreUserAppImpl;
use crate::app::email::EmailAppImpl;
use crate::app::hook::HookAppImpl;
use crate::app::internationalization::InternationalizationAppImpl;
use crate::app::oauth::OAuthAppImpl;
use crate::app::organization::OrganizationAppImpl;
use crate::app::workflow::level1::WorkflowLevel1AppImpl;
use crate::app::workflow::level2::WorkflowLevel2AppImpl;
use crate::app::workflow::level2_sort::WorkflowLevel2SortAppImpl;
use crate::app::workflow::level_status::WorkflowLevelStatusAppImpl;
use crate::app::workflow::level_type::WorkflowLevelTypeAppImpl;
use crate::app::workflow::team::WorkflowTeamAppImpl;
use anyhow::Result;
use bifrost_base::settings::Settings;
use infra::infra::module::RdbRepositoryModule;
use infra::infra::{IdGeneratorWrapper, InfraConfigModule};
use infra_utils::infra::cache::{load_cache_config_from_env, MokaCacheConfig};
use serde::Deserialize;
use std::sync::Arc;

/// bearer token resolution
///
/// # Environment Variables
/// - `AUTH_TOKEN_CACHE_TTL_SEC`: lifetime of a resolved token in memory (default: 30)
/// - `AUTH_TOKEN_CACHE_SIZE`: max number of resolved tokens (default: 10000)
#[derive(Deserialize, Clone, Debug)]
pub struct AuthConfig {
    #[serde(default = "default_token_cache_ttl_sec")]
    pub token_cache_ttl_sec: u64,
    #[serde(default = "default_token_cache_size")]
    pub token_cache_size: u64,
}

fn default_token_cache_ttl_sec() -> u64 {
    30
}
fn default_token_cache_size() -> u64 {
    10000
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_cache_ttl_sec: default_token_cache_ttl_sec(),
            token_cache_size: default_token_cache_size(),
        }
    }
}

impl AuthConfig {
    pub fn token_cache_config(&self) -> MokaCacheConfig {
        MokaCacheConfig {
            num_counters: self.token_cache_size,
            ttl_sec: Some(self.token_cache_ttl_sec),
        }
    }
}

pub fn load_auth_config() -> AuthConfig {
    envy::prefixed("AUTH_")
        .from_env::<AuthConfig>()
        .unwrap_or_default()
}

#[derive(Clone, Debug)]
pub struct AppConfigModule {
    pub settings: Arc<Settings>,
    pub auth_config: Arc<AuthConfig>,
    pub cache_config: Arc<MokaCacheConfig>,
}

impl AppConfigModule {
    pub fn new_by_env() -> Result<Self> {
        Ok(Self {
            settings: Arc::new(Settings::from_env()?),
            auth_config: Arc::new(load_auth_config()),
            cache_config: Arc::new(load_cache_config_from_env()),
        })
    }

    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
            auth_config: Arc::new(AuthConfig::default()),
            cache_config: Arc::new(MokaCacheConfig::default()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppModule {
    pub config_module: Arc<AppConfigModule>,
    pub repositories: Arc<RdbRepositoryModule>,
    pub organization_app: Arc<OrganizationAppImpl>,
    pub core_group_app: Arc<CoreGroupAppImpl>,
    pub core_user_app: Arc<CoreUserAppImpl>,
    pub email_app: Arc<EmailAppImpl>,
    pub hook_app: Arc<HookAppImpl>,
    pub internationalization_app: Arc<InternationalizationAppImpl>,
    pub workflow_level_type_app: Arc<WorkflowLevelTypeAppImpl>,
    pub workflow_level_status_app: Arc<WorkflowLevelStatusAppImpl>,
    pub workflow_level1_app: Arc<WorkflowLevel1AppImpl>,
    pub workflow_level2_app: Arc<WorkflowLevel2AppImpl>,
    pub workflow_level2_sort_app: Arc<WorkflowLevel2SortAppImpl>,
    pub workflow_team_app: Arc<WorkflowTeamAppImpl>,
    pub oauth_app: Arc<OAuthAppImpl>,
}

impl AppModule {
    pub async fn new_by_env(config_module: Arc<AppConfigModule>) -> Result<Self> {
        let infra_config = InfraConfigModule::new_by_env();
        let id_generator = Arc::new(IdGeneratorWrapper::new());
        let repositories = Arc::new(RdbRepositoryModule::new(&infra_config, id_generator).await?);
        Ok(Self::new_by_repositories(config_module, repositories))
    }

    pub fn new_by_repositories(
        config_module: Arc<AppConfigModule>,
        repositories: Arc<RdbRepositoryModule>,
    ) -> Self {
        let settings = config_module.settings.clone();
        let hook_app = Arc::new(HookAppImpl::new(settings.clone(), repositories.clone()));
        let organization_app = Arc::new(OrganizationAppImpl::new(
            repositories.clone(),
            hook_app.clone(),
            &config_module.cache_config,
        ));
        let email_app = Arc::new(EmailAppImpl::new(settings.clone(), repositories.clone()));
        // shared so that user and group changes drop resolved tokens
        let token_cache = TokenCache::new(&config_module.auth_config.token_cache_config());
        let core_user_app = Arc::new(CoreUserAppImpl::new(
            settings.clone(),
            repositories.clone(),
            organization_app.clone(),
            email_app.clone(),
            token_cache.clone(),
        ));
        let oauth_app = Arc::new(OAuthAppImpl::new(
            settings,
            repositories.clone(),
            core_user_app.clone(),
            token_cache.clone(),
        ));
        AppModule {
            core_group_app: Arc::new(CoreGroupAppImpl::new(repositories.clone(), token_cache)),
            internationalization_app: Arc::new(InternationalizationAppImpl::new(
                repositories.clone(),
            )),
            workflow_level_type_app: Arc::new(WorkflowLevelTypeAppImpl::new(repositories.clone())),
            workflow_level_status_app: Arc::new(WorkflowLevelStatusAppImpl::new(
                repositories.clone(),
            )),
            workflow_level1_app: Arc::new(WorkflowLevel1AppImpl::new(
                repositories.clone(),
                hook_app.clone(),
            )),
            workflow_level2_app: Arc::new(WorkflowLevel2AppImpl::new(
                repositories.clone(),
                hook_app.clone(),
            )),
            workflow_level2_sort_app: Arc::new(WorkflowLevel2SortAppImpl::new(
                repositories.clone(),
            )),
            workflow_team_app: Arc::new(WorkflowTeamAppImpl::new(
                repositories.clone(),
                hook_app.clone(),
            )),
            config_module,
            repositories,
            organization_app,
            core_user_app,
            email_app,
            hook_app,
            oauth_app,
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod test {
    use super::*;
    use infra::infra::module::test::setup_test_rdb_module;
    use infra_utils::infra::test::TestRdb;

    /// fast password hashing for tests
    pub fn test_settings() -> Settings {
        Settings {
            password_hash_iterations: 1000,
            ..Settings::default()
        }
    }

    /// app module on a temporary database (memory mail backend, mock ids)
    pub async fn setup_test_app_module() -> (AppModule, TestRdb) {
        let (repositories, rdb) = setup_test_rdb_module().await;
        let module = AppModule::new_by_repositories(
            Arc::new(AppConfigModule::new(test_settings())),
            Arc::new(repositories),
        );
        (module, rdb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_config_defaults() {
        let config = AuthConfig::default();
        let cache = config.token_cache_config();
        assert_eq!(cache.ttl_sec, Some(30));
        assert_eq!(cache.num_counters, 10000);
    }
}
