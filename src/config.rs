use crate::error::ConfigError;
use crate::scoring::ScoringPolicy;
use serde::{Deserialize, Serialize};
use std::fs;

/// Tunable engine behaviour. Every field has a default, so a partial JSON file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub scoring: ScoringPolicy,
    /// Run the fixer when a validation pass reports fixable issues.
    pub auto_fix: bool,
    /// Treat connections to missing nodes as repairable by deleting them.
    pub remove_dangling_connections: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringPolicy::default(),
            auto_fix: true,
            remove_dangling_connections: true,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::JsonParseError(e.to_string()))
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&content)
    }
}
