//! `chainabi --config <file.yaml>` settings.

use anyhow::{Context, Result};
use chainabi_observability::LogConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// ```yaml
/// prepare: true
/// log:
///   level: info
///   json: false
///   components:
///     chainabi-evm: debug
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Compute selector / topic hashes when loading an ABI
    #[serde(default = "default_prepare")]
    pub prepare: bool,
    #[serde(default)]
    pub log: LogConfig,
}

fn default_prepare() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prepare: default_prepare(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Load `path`, or the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config file '{}'", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("parse config file '{}'", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Apply `--log-level` / `--log-json` on top of the file settings.
    pub fn with_overrides(mut self, level: Option<&str>, json: bool) -> Self {
        if let Some(level) = level {
            self.log.level = level.to_string();
        }
        self.log.json |= json;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_file() {
        let config = Config::from_yaml(
            "prepare: false\nlog:\n  level: debug\n  json: true\n  components:\n    chainabi-evm: trace\n",
        )
        .unwrap();
        assert!(!config.prepare);
        assert_eq!(config.log.level, "debug");
        assert!(config.log.json);
        assert_eq!(config.log.components["chainabi-evm"], "trace");
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.prepare);
    }

    #[test]
    fn flags_override_file() {
        let config = Config::default().with_overrides(Some("trace"), true);
        assert_eq!(config.log.level, "trace");
        assert!(config.log.json);
        assert_eq!(Config::default().with_overrides(None, false), Config::default());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Config::load(Some(Path::new("/nonexistent/chainabi.yaml"))).is_err());
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }
}
