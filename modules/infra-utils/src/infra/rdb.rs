use anyhow::{Context, Result};
use serde::Deserialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;

pub type Rdb = Sqlite;
pub type RdbPool = Pool<Rdb>;

#[derive(Deserialize, Clone, Debug)]
pub struct RdbConfig {
    /// database file path for sqlite
    pub dbname: String,
    pub max_connections: u32,
    pub acquire_timeout_sec: Option<u64>,
}

impl Default for RdbConfig {
    fn default() -> Self {
        tracing::info!("Use default RdbConfig.");
        Self {
            dbname: "./bifrost.sqlite3".to_string(),
            max_connections: 20,
            acquire_timeout_sec: Some(10),
        }
    }
}

impl RdbConfig {
    pub fn url(&self) -> String {
        format!("sqlite://{}", self.dbname)
    }
}

pub trait UseRdbPool {
    fn db_pool(&self) -> &RdbPool;
}

pub fn load_db_config_from_env() -> Result<RdbConfig> {
    envy::prefixed("SQLITE_")
        .from_env::<RdbConfig>()
        .context("cannot read sqlite config from env")
}

// create pool and apply schema (statements must be idempotent)
pub async fn new_rdb_pool(config: &RdbConfig, init_schema: Option<&str>) -> Result<RdbPool> {
    let options = SqliteConnectOptions::from_str(&config.url())
        .with_context(|| format!("invalid sqlite url: {}", config.url()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(
            config.acquire_timeout_sec.unwrap_or(10),
        ))
        .connect_with(options)
        .await
        .with_context(|| format!("cannot connect sqlite: {}", config.dbname))?;
    if let Some(schema) = init_schema {
        sqlx::raw_sql(schema)
            .execute(&pool)
            .await
            .context("error in applying schema")?;
    }
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_pool_applies_schema() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let conf = RdbConfig {
            dbname: dir.path().join("t.sqlite3").to_string_lossy().to_string(),
            max_connections: 2,
            acquire_timeout_sec: None,
        };
        let pool = new_rdb_pool(
            &conf,
            Some("CREATE TABLE IF NOT EXISTS `t` (`id` INTEGER PRIMARY KEY);"),
        )
        .await?;
        sqlx::query("INSERT INTO `t` (`id`) VALUES (1);")
            .execute(&pool)
            .await?;
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM `t`;")
            .fetch_one(&pool)
            .await?;
        assert_eq!(count, 1);
        Ok(())
    }
}
