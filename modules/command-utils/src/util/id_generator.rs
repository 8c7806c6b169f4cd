use anyhow::Result;
use serde::Deserialize;
use snowflake::SnowflakeIdGenerator;

#[derive(Deserialize, Clone, Debug)]
pub struct IdGeneratorConfig {
    pub machine_id: i32,
    pub node_id: i32,
}

impl Default for IdGeneratorConfig {
    fn default() -> Self {
        Self {
            machine_id: 1,
            node_id: 1,
        }
    }
}

pub fn load_id_generator_config_from_env() -> IdGeneratorConfig {
    envy::prefixed("SNOWFLAKE_")
        .from_env::<IdGeneratorConfig>()
        .unwrap_or_default()
}

pub enum IDGenerator {
    Snowflake(SnowflakeIdGenerator),
    Mock(MockIdGenerator),
}

impl IDGenerator {
    pub fn generate(&mut self) -> Result<i64> {
        match self {
            IDGenerator::Snowflake(g) => Ok(g.real_time_generate()),
            IDGenerator::Mock(g) => Ok(g.generate()),
        }
    }
}

// machine id and node id (5bit each) from env
pub fn new_generator_by_env() -> IDGenerator {
    let conf = load_id_generator_config_from_env();
    IDGenerator::Snowflake(SnowflakeIdGenerator::new(
        conf.machine_id & 0x1f,
        conf.node_id & 0x1f,
    ))
}

// sequential id (for test)
#[derive(Debug, Default)]
pub struct MockIdGenerator {
    current: i64,
}

impl MockIdGenerator {
    pub fn new() -> Self {
        Self { current: 0 }
    }
    pub fn generate(&mut self) -> i64 {
        self.current += 1;
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snowflake_ids_are_increasing() {
        let mut g = new_generator_by_env();
        let a = g.generate().unwrap();
        let b = g.generate().unwrap();
        assert!(a > 0);
        assert!(b > a);
    }

    #[test]
    fn test_mock_ids() {
        let mut g = IDGenerator::Mock(MockIdGenerator::new());
        assert_eq!(g.generate().unwrap(), 1);
        assert_eq!(g.generate().unwrap(), 2);
    }
}
