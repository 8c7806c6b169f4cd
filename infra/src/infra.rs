pub mod core_group;
pub mod core_user;
pub mod email;
pub mod email_template;
pub mod hook;
pub mod internationalization;
pub mod module;
pub mod oauth;
pub mod organization;
pub mod workflow_level1;
pub mod workflow_level2;
pub mod workflow_level2_sort;
pub mod workflow_level_status;
pub mod workflow_level_type;
pub mod workflow_team;

use anyhow::Result;
use bifrost_base::error::BifrostError;
use command_utils::util::id_generator::{self, IDGenerator, MockIdGenerator};
use debug_stub_derive::DebugStub;
use email::{load_email_config_from_env, EmailConfig};
use infra_utils::infra::rdb::{load_db_config_from_env, RdbConfig};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// schema of all tables (idempotent, applied at pool creation)
pub const SCHEMA: &str = include_str!("../sql/sqlite/001_schema.sql");

#[derive(Clone, DebugStub)]
pub struct IdGeneratorWrapper {
    #[debug_stub = "IDGenerator"]
    id_generator: Arc<Mutex<IDGenerator>>,
}

impl IdGeneratorWrapper {
    pub fn new() -> Self {
        IdGeneratorWrapper {
            id_generator: Arc::new(Mutex::new(id_generator::new_generator_by_env())),
        }
    }
    // for test
    pub fn new_mock() -> Self {
        IdGeneratorWrapper {
            id_generator: Arc::new(Mutex::new(IDGenerator::Mock(MockIdGenerator::new()))),
        }
    }
    // thread safe
    pub fn generate_id(&self) -> Result<i64> {
        self.id_generator
            .lock()
            .map_err(|e| BifrostError::GenerateIdError(e.to_string()).into())
            .and_then(|mut g| g.generate())
    }
}

impl Default for IdGeneratorWrapper {
    fn default() -> Self {
        Self::new()
    }
}

pub trait UseIdGenerator {
    fn id_generator(&self) -> &IdGeneratorWrapper;
}

/// uuid column text to Uuid (nil with a warning if broken)
pub fn parse_uuid_column(table: &str, id: i64, value: &str) -> Uuid {
    Uuid::parse_str(value).unwrap_or_else(|e| {
        tracing::warn!("broken uuid in {}: id={}, value={}: {:?}", table, id, value, e);
        Uuid::nil()
    })
}

/// sqlite LIMIT value (-1: unlimited)
pub(crate) fn limit_value(limit: Option<&i32>) -> i64 {
    limit.map(|l| *l as i64).unwrap_or(-1)
}

#[derive(Clone, Debug)]
pub struct InfraConfigModule {
    pub rdb_config: RdbConfig,
    pub email_config: EmailConfig,
}

impl InfraConfigModule {
    pub fn new_by_env() -> Self {
        Self {
            rdb_config: load_db_config_from_env().unwrap_or_default(),
            email_config: load_email_config_from_env().unwrap_or_else(|e| {
                tracing::warn!("use default email config: {:?}", e);
                EmailConfig::default()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_id_generator_is_sequential() -> Result<()> {
        let g = IdGeneratorWrapper::new_mock();
        let a = g.generate_id()?;
        let b = g.clone().generate_id()?;
        assert_eq!(b, a + 1);
        Ok(())
    }

    #[test]
    fn test_parse_uuid_column() {
        let u = Uuid::new_v4();
        assert_eq!(parse_uuid_column("t", 1, &u.to_string()), u);
        assert_eq!(parse_uuid_column("t", 1, "broken"), Uuid::nil());
    }
}
