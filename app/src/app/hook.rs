use super::auth::Requester;
use super::UseSettings;
use anyhow::Result;
use async_trait::async_trait;
use bifrost_base::error::BifrostError;
use bifrost_base::hook_event::is_hook_event;
use bifrost_base::settings::Settings;
use infra::infra::hook::client::{HookPayload, UseWebhookClient};
use infra::infra::hook::rdb::{HookRepository, UseHookRepository};
use infra::infra::module::{RdbRepositoryModule, UseRdbRepositoryModule};
use infra_utils::infra::rdb::UseRdbPool;
use model::{Hook, HookData};
use std::sync::Arc;

#[async_trait]
pub trait HookApp: UseHookRepository + UseWebhookClient + UseSettings + Send + Sync {
    fn validate_event(event: &str) -> Result<()> {
        if is_hook_event(event) {
            Ok(())
        } else {
            Err(BifrostError::validation_field("event", format!("Unexpected event {}", event)).into())
        }
    }

    fn validate_target(target: &str) -> Result<()> {
        url::Url::parse(target)
            .map(|_| ())
            .map_err(|_| BifrostError::validation_field("target", "Enter a valid URL.").into())
    }

    /// the subscription belongs to the requester
    async fn create_hook(&self, requester: &Requester, event: &str, target: &str) -> Result<Hook> {
        Self::validate_event(event)?;
        Self::validate_target(target)?;
        let data = HookData {
            user_id: requester.id(),
            event: event.to_string(),
            target: target.to_string(),
        };
        self.hook_repository()
            .create(self.hook_repository().db_pool(), &data)
            .await
    }

    async fn update_hook(
        &self,
        requester: &Requester,
        id: i64,
        event: &str,
        target: &str,
    ) -> Result<Hook> {
        let current = self.find_hook(requester, id).await?.ok_or_else(|| {
            BifrostError::NotFound(format!("hook not found: id = {}", id))
        })?;
        Self::validate_event(event)?;
        Self::validate_target(target)?;
        let data = HookData {
            user_id: current.data.user_id,
            event: event.to_string(),
            target: target.to_string(),
        };
        self.hook_repository()
            .update(self.hook_repository().db_pool(), id, &data)
            .await?;
        self.find_hook(requester, id)
            .await?
            .ok_or_else(|| BifrostError::NotFound(format!("hook not found: id = {}", id)).into())
    }

    async fn delete_hook(&self, requester: &Requester, id: i64) -> Result<bool> {
        match self.find_hook(requester, id).await? {
            Some(_) => self.hook_repository().delete(id).await,
            None => Ok(false),
        }
    }

    /// other users' hooks are invisible except for superusers
    async fn find_hook(&self, requester: &Requester, id: i64) -> Result<Option<Hook>> {
        Ok(self
            .hook_repository()
            .find(id)
            .await?
            .filter(|h| requester.is_superuser() || h.data.user_id == requester.id()))
    }

    async fn find_hook_list(
        &self,
        requester: &Requester,
        limit: Option<&i32>,
        offset: Option<&i64>,
    ) -> Result<Vec<Hook>> {
        self.hook_repository()
            .find_list(Self::user_filter(requester), limit, offset)
            .await
    }

    async fn count_hooks(&self, requester: &Requester) -> Result<i64> {
        self.hook_repository()
            .count_list_tx(
                self.hook_repository().db_pool(),
                Self::user_filter(requester),
            )
            .await
    }

    fn user_filter(requester: &Requester) -> Option<i64> {
        if requester.is_superuser() {
            None
        } else {
            Some(requester.id())
        }
    }

    /// Deliver `data` to every subscriber of the event. The target of each
    /// hook is replaced with WEBHOOK_TARGET_URL and deliveries run on spawned
    /// tasks (failures are only logged). Returns the number of deliveries.
    async fn find_and_fire_hook(&self, event_name: &str, data: serde_json::Value) -> Result<usize> {
        if !is_hook_event(event_name) {
            return Err(BifrostError::ConfigurationError(format!(
                "\"{}\" does not exist in HOOK_EVENTS.",
                event_name
            ))
            .into());
        }
        let hooks = self.hook_repository().find_by_event(event_name).await?;
        let target = self.settings().webhook_target_url.clone();
        for hook in hooks.iter() {
            let payload = HookPayload::new(hook, &target, data.clone());
            let client = self.webhook_client().clone();
            tokio::spawn(async move {
                match client.deliver(&payload).await {
                    Ok(status) => tracing::debug!(
                        "delivered hook {} ({}): status={}",
                        payload.hook.id,
                        &payload.hook.event,
                        status
                    ),
                    Err(e) => tracing::warn!(
                        "failed to deliver hook {} ({}) to {}: {:?}",
                        payload.hook.id,
                        &payload.hook.event,
                        &payload.hook.target,
                        e
                    ),
                }
            });
        }
        Ok(hooks.len())
    }
}

#[derive(Debug, Clone)]
pub struct HookAppImpl {
    settings: Arc<Settings>,
    repositories: Arc<RdbRepositoryModule>,
}

impl HookAppImpl {
    pub fn new(settings: Arc<Settings>, repositories: Arc<RdbRepositoryModule>) -> Self {
        Self {
            settings,
            repositories,
        }
    }
}

impl UseRdbRepositoryModule for HookAppImpl {
    fn rdb_repository_module(&self) -> &RdbRepositoryModule {
        &self.repositories
    }
}

impl UseSettings for HookAppImpl {
    fn settings(&self) -> &Settings {
        &self.settings
    }
}

impl HookApp for HookAppImpl {}

pub trait UseHookApp {
    fn hook_app(&self) -> &HookAppImpl;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::auth::test::user;
    use infra::infra::core_user::rdb::{CoreUserRepository, UseCoreUserRepository};
    use infra::infra::module::test::setup_test_rdb_module;
    use infra_utils::infra::test::TEST_RUNTIME;
    use model::CoreUserData;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    async fn create_requester(module: &RdbRepositoryModule, name: &str) -> Result<Requester> {
        let mut tx = module.db_pool().begin().await?;
        let created = module
            .core_user_repository()
            .create(
                &mut tx,
                &CoreUserData {
                    username: name.to_string(),
                    email: format!("{}@example.com", name),
                    is_active: true,
                    ..Default::default()
                },
                "",
            )
            .await?;
        tx.commit().await?;
        let mut u = user(None, false);
        u.id = created.id;
        Ok(Requester::new(u, vec![]))
    }

    #[test]
    fn test_hook_crud_is_scoped_to_user() -> Result<()> {
        TEST_RUNTIME.block_on(async {
            let (module, _rdb) = setup_test_rdb_module().await;
            let repositories = Arc::new(module);
            let app = HookAppImpl::new(Arc::new(Settings::default()), repositories.clone());
            let owner = create_requester(&repositories, "owner").await?;
            let other = create_requester(&repositories, "other").await?;

            let err = app
                .create_hook(&owner, "workflowlevel3.added", "http://example.com/")
                .await
                .unwrap_err();
            match err.downcast_ref::<BifrostError>() {
                Some(BifrostError::ValidationError(e)) => assert_eq!(
                    e.get("event"),
                    Some(&vec!["Unexpected event workflowlevel3.added".to_string()])
                ),
                e => panic!("unexpected error: {:?}", e),
            }
            assert!(app
                .create_hook(&owner, "workflowlevel1.added", "not a url")
                .await
                .is_err());

            let hook = app
                .create_hook(&owner, "workflowlevel1.added", "http://example.com/")
                .await?;
            assert_eq!(hook.data.user_id, owner.id());
            assert!(app.find_hook(&other, hook.id).await?.is_none());
            assert_eq!(app.count_hooks(&other).await?, 0);
            assert_eq!(app.find_hook_list(&owner, None, None).await?.len(), 1);
            assert!(!app.delete_hook(&other, hook.id).await?);

            let updated = app
                .update_hook(&owner, hook.id, "workflowteam.removed", "http://example.com/x")
                .await?;
            assert_eq!(updated.data.event, "workflowteam.removed");
            assert!(app.delete_hook(&owner, hook.id).await?);
            Ok(())
        })
    }

    #[test]
    fn test_find_and_fire_hook_unknown_event() {
        TEST_RUNTIME.block_on(async {
            let (module, _rdb) = setup_test_rdb_module().await;
            let app = HookAppImpl::new(Arc::new(Settings::default()), Arc::new(module));
            let err = app
                .find_and_fire_hook("unknown.event", serde_json::Value::Null)
                .await
                .unwrap_err();
            assert_eq!(
                err.to_string(),
                "ConfigurationError(\"unknown.event\" does not exist in HOOK_EVENTS.)"
            );
        })
    }

    #[test]
    fn test_find_and_fire_hook_delivers_to_fixed_target() -> Result<()> {
        TEST_RUNTIME.block_on(async {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
            let addr = listener.local_addr()?;
            let server = tokio::spawn(async move {
                let (mut socket, _) = listener.accept().await?;
                let mut buf = vec![0u8; 8192];
                let mut received = Vec::new();
                loop {
                    let n = socket.read(&mut buf).await?;
                    if n == 0 {
                        break;
                    }
                    received.extend_from_slice(&buf[..n]);
                    if received.ends_with(b"}}") {
                        break;
                    }
                }
                socket
                    .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                    .await?;
                Ok::<_, std::io::Error>(String::from_utf8_lossy(&received).to_string())
            });

            let (module, _rdb) = setup_test_rdb_module().await;
            let repositories = Arc::new(module);
            let settings = Settings {
                webhook_target_url: format!("http://{}/webhook/", addr),
                ..Default::default()
            };
            let app = HookAppImpl::new(Arc::new(settings), repositories.clone());
            let owner = create_requester(&repositories, "subscriber").await?;
            // registered target is not used
            app.create_hook(&owner, "workflowlevel1.added", "http://unreachable.invalid/")
                .await?;
            app.create_hook(&owner, "workflowlevel1.removed", "http://unreachable.invalid/")
                .await?;

            let fired = app
                .find_and_fire_hook("workflowlevel1.added", serde_json::json!({"name": "wl1"}))
                .await?;
            assert_eq!(fired, 1);
            let request = tokio::time::timeout(Duration::from_secs(10), server).await???;
            assert!(request.starts_with("POST /webhook/ HTTP/1.1"));
            assert!(request.contains("\"event\":\"workflowlevel1.added\""));
            assert!(request.contains(&format!("\"target\":\"http://{}/webhook/\"", addr)));
            assert!(request.contains("\"data\":{\"name\":\"wl1\"}"));

            assert_eq!(
                app.find_and_fire_hook("workflowteam.added", serde_json::Value::Null)
                    .await?,
                0
            );
            Ok(())
        })
    }
}
