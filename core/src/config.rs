//! Engine tuning loaded from `data/engine_config.json`.
//!
//! Quota and level tables are NOT configuration. They live in
//! `entitlements.rs` and `level.rs` as the single source of truth.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Standing goal for each day's mission.
    pub mission_goal: u32,
    /// How many vote ids are remembered for deduplication.
    pub dedup_capacity: usize,
    /// How many activity entries are kept, newest first.
    pub event_log_capacity: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            mission_goal:       3,
            dedup_capacity:     1000,
            event_log_capacity: 50,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub ledger: LedgerConfig,
}

impl EngineConfig {
    /// Load from a JSON file.
    /// In tests, use `EngineConfig::default()`.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: EngineConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let l = &self.ledger;
        if l.mission_goal == 0 {
            anyhow::bail!("ledger.mission_goal must be at least 1");
        }
        if l.dedup_capacity == 0 || l.event_log_capacity == 0 {
            anyhow::bail!(
                "ledger capacities must be positive (dedup={}, event_log={})",
                l.dedup_capacity,
                l.event_log_capacity
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.ledger.dedup_capacity, 1000);
    }

    #[test]
    fn shipped_config_loads_and_matches_defaults() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../data/engine_config.json");
        let config = EngineConfig::load(path).expect("load data/engine_config.json");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = EngineConfig::load("/nonexistent/engine_config.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/engine_config.json"));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let mut config = EngineConfig::default();
        config.ledger.event_log_capacity = 0;
        assert!(config.validate().is_err());
    }
}
