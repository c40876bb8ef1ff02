use crate::core::DatabaseError;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "tate.toml";

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TateConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_history_file")]
    pub history_file: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir().map_or_else(|| PathBuf::from(".tate"), |home| home.join(".tate"))
}

fn default_history_file() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".tate_history"))
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for TateConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            history_file: default_history_file(),
            log_level: default_log_level(),
        }
    }
}

/// Values given on the command line. They win over every other source.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl TateConfig {
    /// Load configuration with priority: CLI args > ENV (`TATE_*`) > config file > defaults
    ///
    /// An explicitly named config file must exist; `./tate.toml` is optional.
    pub fn load(overrides: &ConfigOverrides) -> Result<Self, DatabaseError> {
        let mut builder = Config::builder();

        // 1. Config file
        builder = match overrides.config_file {
            Some(ref path) => builder.add_source(File::from(path.as_path()).required(true)),
            None => builder.add_source(File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false)),
        };

        // 2. Environment variables, e.g. TATE_DATA_DIR
        builder = builder.add_source(Environment::with_prefix("TATE"));

        let base = builder
            .build()
            .and_then(|c| c.try_deserialize::<Self>())
            .map_err(|e| DatabaseError::Config(e.to_string()))?;

        // 3. CLI args override everything
        Ok(Self {
            data_dir: overrides.data_dir.clone().unwrap_or(base.data_dir),
            history_file: base.history_file,
            log_level: overrides.log_level.clone().unwrap_or(base.log_level),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = TateConfig::default();
        assert!(config.data_dir.ends_with(".tate"));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_config_file_then_cli_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        fs::write(
            &path,
            "data_dir = \"/srv/tate\"\nlog_level = \"debug\"\nhistory_file = \"/tmp/h\"\n",
        )
        .unwrap();

        let overrides = ConfigOverrides {
            config_file: Some(path.clone()),
            ..ConfigOverrides::default()
        };
        let config = TateConfig::load(&overrides).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/tate"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.history_file, Some(PathBuf::from("/tmp/h")));

        let overrides = ConfigOverrides {
            config_file: Some(path),
            data_dir: Some(PathBuf::from("/elsewhere")),
            log_level: None,
        };
        let config = TateConfig::load(&overrides).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/elsewhere"));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_missing_explicit_config_file() {
        let overrides = ConfigOverrides {
            config_file: Some(PathBuf::from("/definitely/not/here.toml")),
            ..ConfigOverrides::default()
        };
        assert!(matches!(TateConfig::load(&overrides), Err(DatabaseError::Config(_))));
    }
}
