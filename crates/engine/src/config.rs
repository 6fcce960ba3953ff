// Engine configuration.
//
// File: `~/.docket/config.toml`, then environment overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::history::DEFAULT_MAX_REPLAY_OPS;

pub const DEFAULT_LOG_FILTER: &str = "info";
pub const DEFAULT_STRAND_CAPACITY: usize = 256;

/// Root directory for docket state: `~/.docket/`.
pub fn global_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".docket"))
}

/// Path to the config file: `~/.docket/config.toml`.
pub fn global_config_path() -> Option<PathBuf> {
    global_dir().map(|dir| dir.join("config.toml"))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Journal directory. No journal is kept when unset.
    pub data_dir: Option<PathBuf>,
    /// Tracing filter directive (e.g. `info`, `docket_engine=debug`).
    pub log_filter: String,
    pub history: HistoryConfig,
    pub projection: ProjectionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_filter: DEFAULT_LOG_FILTER.into(),
            history: HistoryConfig::default(),
            projection: ProjectionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    /// Upper bound on operations replayed per history query.
    pub max_replay_ops: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_replay_ops: DEFAULT_MAX_REPLAY_OPS }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Capacity of the strand broadcast channel.
    pub strand_capacity: usize,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self { strand_capacity: DEFAULT_STRAND_CAPACITY }
    }
}

impl EngineConfig {
    /// Config file (defaults if missing or unreadable) plus environment.
    pub fn load() -> Self {
        global_config_path()
            .and_then(|path| Self::load_from(&path).ok())
            .unwrap_or_default()
            .with_env()
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save to a specific path (creates parent directories).
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply environment overrides.
    ///
    /// | Variable | Overrides |
    /// |---|---|
    /// | `DOCKET_DATA_DIR` | `data_dir` |
    /// | `DOCKET_LOG_FILTER` | `log_filter` |
    /// | `DOCKET_MAX_REPLAY_OPS` | `history.max_replay_ops` |
    /// | `DOCKET_STRAND_CAPACITY` | `projection.strand_capacity` |
    pub fn with_env(self) -> Self {
        self.with_env_fn(|key| std::env::var(key))
    }

    /// Testable override step that accepts an environment lookup function.
    /// Unparseable or zero numeric values keep the current setting.
    fn with_env_fn<F>(mut self, env: F) -> Self
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        if let Some(dir) = env("DOCKET_DATA_DIR").ok().filter(|value| !value.is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(filter) = env("DOCKET_LOG_FILTER").ok().filter(|value| !value.is_empty()) {
            self.log_filter = filter;
        }
        if let Some(max) = positive(&env, "DOCKET_MAX_REPLAY_OPS") {
            self.history.max_replay_ops = max;
        }
        if let Some(capacity) = positive(&env, "DOCKET_STRAND_CAPACITY") {
            self.projection.strand_capacity = capacity;
        }
        self
    }
}

fn positive<F>(env: &F, key: &str) -> Option<usize>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    env(key).ok().and_then(|value| value.trim().parse::<usize>().ok()).filter(|value| *value > 0)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;

    fn env_from_map(
        map: HashMap<&'static str, &'static str>,
    ) -> impl Fn(&str) -> Result<String, std::env::VarError> {
        move |key: &str| map.get(key).map(|v| v.to_string()).ok_or(std::env::VarError::NotPresent)
    }

    #[test]
    fn defaults() {
        let cfg = EngineConfig::default().with_env_fn(env_from_map(HashMap::new()));
        assert_eq!(cfg.data_dir, None);
        assert_eq!(cfg.log_filter, "info");
        assert_eq!(cfg.history.max_replay_ops, 10_000);
        assert_eq!(cfg.projection.strand_capacity, 256);
    }

    #[test]
    fn env_overrides_file_values() {
        let cfg = EngineConfig { log_filter: "warn".into(), ..EngineConfig::default() };
        let cfg = cfg.with_env_fn(env_from_map(HashMap::from([
            ("DOCKET_DATA_DIR", "/var/lib/docket"),
            ("DOCKET_LOG_FILTER", "docket_engine=debug"),
            ("DOCKET_MAX_REPLAY_OPS", "50"),
            ("DOCKET_STRAND_CAPACITY", "8"),
        ])));
        assert_eq!(cfg.data_dir, Some(PathBuf::from("/var/lib/docket")));
        assert_eq!(cfg.log_filter, "docket_engine=debug");
        assert_eq!(cfg.history.max_replay_ops, 50);
        assert_eq!(cfg.projection.strand_capacity, 8);
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let cfg = EngineConfig::default().with_env_fn(env_from_map(HashMap::from([
            ("DOCKET_MAX_REPLAY_OPS", "lots"),
            ("DOCKET_STRAND_CAPACITY", "0"),
        ])));
        assert_eq!(cfg.history.max_replay_ops, 10_000);
        assert_eq!(cfg.projection.strand_capacity, 256);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let cfg: EngineConfig = toml::from_str(
            r#"
log_filter = "debug"

[history]
max_replay_ops = 100
"#,
        )
        .expect("parse");
        assert_eq!(cfg.log_filter, "debug");
        assert_eq!(cfg.history.max_replay_ops, 100);
        assert_eq!(cfg.projection, ProjectionConfig::default());
    }

    #[test]
    fn roundtrip_through_file() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");
        let cfg =
            EngineConfig { data_dir: Some(dir.path().join("journal")), ..EngineConfig::default() };
        cfg.save_to(&path).expect("save");
        assert_eq!(EngineConfig::load_from(&path).expect("load"), cfg);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        let err = EngineConfig::load_from(&dir.path().join("missing.toml")).expect_err("missing");
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn global_dir_is_under_home() {
        if let Some(dir) = global_dir() {
            assert!(dir.ends_with(".docket"));
        }
    }
}
