//! Import configuration
//!
//! Built-in defaults, then an optional TOML file, then environment variables.
//! Command-line flags are applied last by the command handlers.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// File picked up from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "order-import.toml";

pub const ENV_INPUT: &str = "ORDER_IMPORT_FILE";
pub const ENV_DATABASE: &str = "ORDER_IMPORT_DB";
pub const ENV_LOG_FILE: &str = "ORDER_IMPORT_LOG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Spreadsheet to import
    pub input_path: PathBuf,
    /// SQLite database holding the `Order` table
    pub database_path: PathBuf,
    /// Append log lines here instead of stderr
    pub log_file: Option<PathBuf>,
    /// Drop rows whose `order_id` lacks `id_prefix`
    pub validate_ids: bool,
    pub id_prefix: String,
    /// Written to `created_by`/`updated_by`
    pub system_user: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("mm.xlsx"),
            database_path: PathBuf::from("orders.db"),
            log_file: Some(PathBuf::from("import.log")),
            validate_ids: true,
            id_prefix: "OR".to_string(),
            system_user: "system".to_string(),
        }
    }
}

impl ImportConfig {
    /// Parse a TOML document; absent keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }

    /// Load from `path`, or from `order-import.toml` if it exists
    ///
    /// An explicitly given file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !required && !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Override paths from environment variables
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_INPUT).filter(|v| !v.is_empty()) {
            self.input_path = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_DATABASE).filter(|v| !v.is_empty()) {
            self.database_path = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_LOG_FILE).filter(|v| !v.is_empty()) {
            self.log_file = Some(PathBuf::from(v));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ImportConfig::from_toml_str(
            r#"
            database_path = "/data/orders.db"
            validate_ids = false
            "#,
        )
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/data/orders.db"));
        assert!(!config.validate_ids);
        assert_eq!(config.input_path, PathBuf::from("mm.xlsx"));
        assert_eq!(config.id_prefix, "OR");
        assert_eq!(config.system_user, "system");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(ImportConfig::from_toml_str("validate_ids = \"maybe\"").is_err());
    }

    #[test]
    fn test_explicit_config_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(ImportConfig::load(Some(&missing)).is_err());

        let present = dir.path().join("import.toml");
        fs::write(&present, "id_prefix = \"PO\"\n").unwrap();
        let config = ImportConfig::load(Some(&present)).unwrap();
        assert_eq!(config.id_prefix, "PO");
    }

    #[test]
    fn test_env_overrides_paths() {
        let vars: HashMap<&str, &str> = [(ENV_DATABASE, "other.db"), (ENV_INPUT, "")]
            .into_iter()
            .collect();

        let mut config = ImportConfig::default();
        config.apply_env_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.database_path, PathBuf::from("other.db"));
        assert_eq!(config.input_path, PathBuf::from("mm.xlsx"));
    }

    #[test]
    fn test_env_overrides_log_file() {
        let mut config = ImportConfig {
            log_file: None,
            ..ImportConfig::default()
        };
        config.apply_env_from(|key| (key == ENV_LOG_FILE).then(|| "/var/log/orders.log".to_string()));
        assert_eq!(config.log_file, Some(PathBuf::from("/var/log/orders.log")));

        config.apply_env_from(|key| (key == ENV_LOG_FILE).then(String::new));
        assert_eq!(config.log_file, Some(PathBuf::from("/var/log/orders.log")));
    }
}
