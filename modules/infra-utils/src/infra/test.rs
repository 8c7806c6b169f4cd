// for test only
use super::rdb::{new_rdb_pool, RdbConfig, RdbPool};
use command_utils::util::result::TapErr;
use once_cell::sync::Lazy;
use tempfile::TempDir;

pub static TEST_RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
});

/// sqlite database in a temporary directory (removed on drop)
pub struct TestRdb {
    pub pool: RdbPool,
    _dir: TempDir,
}

pub async fn setup_test_rdb(schema: &str) -> TestRdb {
    let dir = tempfile::tempdir().unwrap();
    let conf = RdbConfig {
        dbname: dir
            .path()
            .join("test_db.sqlite3")
            .to_string_lossy()
            .to_string(),
        max_connections: 5,
        acquire_timeout_sec: Some(5),
    };
    let pool = new_rdb_pool(&conf, Some(schema))
        .await
        .tap_err(|e| tracing::error!("error: {:?}", e))
        .unwrap();
    TestRdb { pool, _dir: dir }
}
