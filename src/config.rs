// ⚙️ Configuration
//
// Defaults, then an optional YAML file named by LEDGER_CONFIG, then
// LEDGER_* environment overrides.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use crate::reference::ReferenceMode;

pub const CONFIG_FILE_VAR: &str = "LEDGER_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the API server listens on
    pub bind_addr: String,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Default tracing filter (RUST_LOG takes precedence)
    pub log_level: String,

    /// Emit logs as JSON lines instead of plain text
    pub log_json: bool,

    /// Opening balance used when the server starts without an account
    pub initial_balance: Option<Decimal>,

    pub reference_mode: ReferenceMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            database_path: PathBuf::from("ledger.db"),
            log_level: "info".to_string(),
            log_json: false,
            initial_balance: None,
            reference_mode: ReferenceMode::Sequenced,
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Load configuration from an explicit set of variables
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        let mut config = match vars.get(CONFIG_FILE_VAR) {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(vars)?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse config file: {}", path))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    fn apply_overrides(&mut self, vars: &HashMap<String, String>) -> Result<()> {
        if let Some(addr) = vars.get("LEDGER_BIND_ADDR") {
            self.bind_addr = addr.clone();
        }
        if let Some(path) = vars.get("LEDGER_DB_PATH") {
            self.database_path = PathBuf::from(path);
        }
        if let Some(level) = vars.get("LEDGER_LOG_LEVEL") {
            self.log_level = level.clone();
        }
        if let Some(json) = vars.get("LEDGER_LOG_JSON") {
            self.log_json = parse_bool(json)
                .with_context(|| format!("Invalid LEDGER_LOG_JSON: {}", json))?;
        }
        if let Some(balance) = vars.get("LEDGER_INITIAL_BALANCE") {
            self.initial_balance = Some(
                Decimal::from_str(balance)
                    .with_context(|| format!("Invalid LEDGER_INITIAL_BALANCE: {}", balance))?,
            );
        }
        if let Some(mode) = vars.get("LEDGER_REFERENCE_MODE") {
            self.reference_mode = ReferenceMode::from_str(mode)
                .map_err(anyhow::Error::msg)
                .context("Invalid LEDGER_REFERENCE_MODE")?;
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(&HashMap::new()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.reference_mode, ReferenceMode::Sequenced);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_vars(&vars(&[
            ("LEDGER_BIND_ADDR", "127.0.0.1:8080"),
            ("LEDGER_DB_PATH", "/tmp/test.db"),
            ("LEDGER_LOG_JSON", "true"),
            ("LEDGER_INITIAL_BALANCE", "100.00"),
            ("LEDGER_REFERENCE_MODE", "legacy"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.database_path, PathBuf::from("/tmp/test.db"));
        assert!(config.log_json);
        assert_eq!(config.initial_balance, Some(dec!(100.00)));
        assert_eq!(config.reference_mode, ReferenceMode::Legacy);
    }

    #[test]
    fn test_invalid_override_is_an_error() {
        assert!(Config::from_vars(&vars(&[("LEDGER_INITIAL_BALANCE", "lots")])).is_err());
        assert!(Config::from_vars(&vars(&[("LEDGER_LOG_JSON", "maybe")])).is_err());
        assert!(Config::from_vars(&vars(&[("LEDGER_REFERENCE_MODE", "random")])).is_err());
    }

    #[test]
    fn test_yaml_with_partial_fields() {
        let config = Config::from_yaml(
            "database_path: data/ledger.db\ninitial_balance: \"250.5\"\nreference_mode: legacy\n",
        )
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("data/ledger.db"));
        assert_eq!(config.initial_balance, Some(dec!(250.5)));
        assert_eq!(config.reference_mode, ReferenceMode::Legacy);
        assert_eq!(config.log_level, "info", "Missing fields keep defaults");
    }

    #[test]
    fn test_missing_config_file() {
        let err = Config::from_vars(&vars(&[(CONFIG_FILE_VAR, "/nonexistent/ledger.yaml")]));
        assert!(err.is_err());
    }
}
