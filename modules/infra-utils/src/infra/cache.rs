use anyhow::Result;
use moka::future::Cache;
use serde::Deserialize;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;

pub type MokaCache<K, V> = Cache<K, V>;

#[derive(Deserialize, Clone, Debug)]
pub struct MokaCacheConfig {
    pub num_counters: u64,
    pub ttl_sec: Option<u64>,
}

impl Default for MokaCacheConfig {
    fn default() -> Self {
        Self {
            num_counters: 10000,
            ttl_sec: Some(60),
        }
    }
}

pub fn load_cache_config_from_env() -> MokaCacheConfig {
    envy::prefixed("MEMORY_CACHE_")
        .from_env::<MokaCacheConfig>()
        .unwrap_or_default()
}

#[derive(Clone)]
pub struct MokaCacheImpl<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    cache: MokaCache<K, V>,
}

impl<K, V> fmt::Debug for MokaCacheImpl<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MokaCacheImpl")
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}

impl<K, V> MokaCacheImpl<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(config: &MokaCacheConfig) -> Self {
        let mut builder = Cache::builder().max_capacity(config.num_counters);
        if let Some(ttl) = config.ttl_sec {
            builder = builder.time_to_live(Duration::from_secs(ttl));
        }
        Self {
            cache: builder.build(),
        }
    }
    pub fn cache(&self) -> &MokaCache<K, V> {
        &self.cache
    }
}

#[async_trait::async_trait]
pub trait UseMokaCache<K, V>: Send + Sync
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn cache(&self) -> &MokaCache<K, V>;

    // cache only found values (None is not cached)
    async fn with_cache_if_some<F, Fut>(&self, key: &K, not_found_case: F) -> Result<Option<V>>
    where
        K: Clone,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<Option<V>>> + Send,
    {
        if let Some(v) = self.cache().get(key).await {
            return Ok(Some(v));
        }
        let found = not_found_case().await?;
        if let Some(v) = found.as_ref() {
            self.cache().insert(key.clone(), v.clone()).await;
        }
        Ok(found)
    }

    async fn delete_cache(&self, key: &K) -> Option<V> {
        self.cache().remove(key).await
    }

    async fn clear_cache(&self) {
        self.cache().invalidate_all();
    }
}
