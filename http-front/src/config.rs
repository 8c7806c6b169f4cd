//! Configuration of the http front.

use bifrost_base::limits::MAX_LIMIT;
use serde::Deserialize;

/// # Environment Variables
/// - `HTTP_ADDR`: bind address (default: 127.0.0.1:8000)
/// - `HTTP_CORS_ALLOW_ORIGINS`: comma separated allowed origins (default: any)
/// - `HTTP_MAX_LIMIT`: cap of the `limit` list parameter (default: 1000)
/// - `HTTP_GRAPHIQL`: serve GraphiQL on `GET /graphql/` (default: true)
#[derive(Clone, Debug, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default)]
    pub cors_allow_origins: Option<String>,
    #[serde(default = "default_max_limit")]
    pub max_limit: i32,
    #[serde(default = "default_graphiql")]
    pub graphiql: bool,
}

fn default_addr() -> String {
    "127.0.0.1:8000".to_string()
}
fn default_max_limit() -> i32 {
    MAX_LIMIT
}
fn default_graphiql() -> bool {
    true
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            cors_allow_origins: None,
            max_limit: default_max_limit(),
            graphiql: default_graphiql(),
        }
    }
}

impl HttpServerConfig {
    pub fn from_env() -> Self {
        envy::prefixed("HTTP_")
            .from_env::<HttpServerConfig>()
            .unwrap_or_else(|e| {
                tracing::warn!("cannot read http config from env, use default: {:?}", e);
                HttpServerConfig::default()
            })
    }

    /// None: any origin
    pub fn allowed_origins(&self) -> Option<Vec<String>> {
        self.cors_allow_origins.as_ref().map(|s| {
            s.split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect()
        })
    }
}
