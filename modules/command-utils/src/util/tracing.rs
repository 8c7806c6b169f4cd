use anyhow::Result;
use serde::Deserialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Deserialize, Clone, Debug)]
pub struct LoggingConfig {
    /// default filter directive (overridden by RUST_LOG)
    pub level: Option<String>,
    /// "json" or "plain"
    pub format: Option<String>,
    pub use_stdout: Option<bool>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Some("info".to_string()),
            format: Some("plain".to_string()),
            use_stdout: Some(true),
        }
    }
}

pub fn load_tracing_config_from_env() -> Result<LoggingConfig> {
    envy::prefixed("LOG_")
        .from_env::<LoggingConfig>()
        .map_err(|e| anyhow::anyhow!("cannot read logging config from env: {:?}", e))
}

fn env_filter(conf: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(conf.level.clone().unwrap_or("info".to_string())))
}

pub fn tracing_init(conf: LoggingConfig) -> Result<()> {
    let filter = env_filter(&conf);
    let json = conf
        .format
        .as_deref()
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let registry = tracing_subscriber::registry().with(filter);
    let res = if json {
        if conf.use_stdout.unwrap_or(true) {
            registry.with(fmt::layer().json()).try_init()
        } else {
            registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
        }
    } else if conf.use_stdout.unwrap_or(true) {
        registry.with(fmt::layer()).try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    res.map_err(|e| anyhow::anyhow!("tracing init error: {:?}", e))
}

// for test (ignore duplicate init)
pub fn tracing_init_test(level: tracing::Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_test_writer()
        .try_init();
}
