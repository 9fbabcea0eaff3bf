//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/mbtree/mbtree.toml`
//! 3. Explicit config file (e.g. `--config` on the command line)
//! 4. Environment variables: `MBTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{TreeError, TreeResult};
use crate::store::DEFAULT_SHARD_COUNT;

/// Unified configuration for mbtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Number of lock shards in a node store (rounded up to a power of two)
    pub shard_count: usize,
    /// Upper bound on parent-link walks and on traversal depth, None bounds walks by the store size
    pub max_depth: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            shard_count: DEFAULT_SHARD_COUNT,
            max_depth: None,
        }
    }
}

/// Raw settings for intermediate parsing (Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub shard_count: Option<usize>,
    pub max_depth: Option<usize>,
}

/// Get the XDG config directory for mbtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "mbtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("mbtree.toml"))
}

fn load_raw_settings(path: &Path) -> TreeResult<RawSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| TreeError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| TreeError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> TreeError {
    TreeError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            shard_count: overlay.shard_count.unwrap_or(self.shard_count),
            max_depth: overlay.max_depth.or(self.max_depth),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file, must exist when given
    #[instrument(level = "debug")]
    pub fn load(config_file: Option<&Path>) -> TreeResult<Self> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(path) = config_file {
            current = current.merge_with(&load_raw_settings(path)?);
        }

        current = Self::apply_env_overrides(current)?;
        current.validate()?;
        debug!(?current, "settings loaded");
        Ok(current)
    }

    /// Load from a single file on top of defaults, without global config or env vars.
    pub fn from_file(path: &Path) -> TreeResult<Self> {
        let settings = Self::default().merge_with(&load_raw_settings(path)?);
        settings.validate()?;
        Ok(settings)
    }

    /// Apply MBTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> TreeResult<Self> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("MBTREE").try_parsing(true))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get::<usize>("shard_count") {
            settings.shard_count = val;
        }
        if let Ok(val) = config.get::<usize>("max_depth") {
            settings.max_depth = Some(val);
        }
        Ok(settings)
    }

    fn validate(&self) -> TreeResult<()> {
        if self.shard_count == 0 {
            return Err(TreeError::Config {
                message: "shard_count must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Render as TOML, e.g. for `config show`.
    pub fn to_toml(&self) -> TreeResult<String> {
        toml::to_string_pretty(self).map_err(|e| TreeError::Config {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_partial_overlay_when_merging_then_keeps_unspecified_values() {
        let base = Settings {
            shard_count: 8,
            max_depth: Some(10),
        };
        let overlay = RawSettings {
            shard_count: Some(32),
            max_depth: None,
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.shard_count, 32);
        assert_eq!(merged.max_depth, Some(10));
    }

    #[test]
    fn given_zero_shards_when_validating_then_errors() {
        let settings = Settings {
            shard_count: 0,
            max_depth: None,
        };
        assert!(matches!(settings.validate(), Err(TreeError::Config { .. })));
    }
}
