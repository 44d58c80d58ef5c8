//! Configuration management for ckpt

pub mod schema;

pub use schema::Config;

use crate::error::{CheckpointError, CkptResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Project-local configuration filename
pub const LOCAL_CONFIG_NAME: &str = ".ckpt.toml";

/// Environment variable overriding `cache.root`
pub const ROOT_ENV: &str = "CKPT_ROOT";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ckpt")
            .join("config.toml")
    }

    /// Find `.ckpt.toml` in `start` or the nearest ancestor holding one
    pub fn find_local_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(LOCAL_CONFIG_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Load the global configuration, defaults if the file does not exist
    pub fn load(&self) -> CkptResult<Config> {
        self.load_merged(None)
    }

    /// Load the global configuration with a local file layered on top
    ///
    /// Tables are merged key by key, local values winning. A relative
    /// `cache.root` in the local file is resolved against that file's
    /// directory. `CKPT_ROOT` overrides the result.
    pub fn load_merged(&self, local: Option<&Path>) -> CkptResult<Config> {
        let mut merged = if self.config_path.exists() {
            read_table(&self.config_path)?
        } else {
            debug!("Config file not found, using defaults");
            toml::Table::new()
        };

        if let Some(local_path) = local {
            let mut overlay = read_table(local_path)?;
            if let Some(base) = local_path.parent() {
                anchor_root(&mut overlay, base);
            }
            merge_tables(&mut merged, overlay);
        }

        let source = local.unwrap_or(&self.config_path);
        let mut config: Config =
            toml::Value::Table(merged)
                .try_into()
                .map_err(|e: toml::de::Error| CheckpointError::ConfigInvalid {
                    path: source.to_path_buf(),
                    reason: e.to_string(),
                })?;

        if let Some(root) = std::env::var_os(ROOT_ENV).filter(|v| !v.is_empty()) {
            debug!("Cache root overridden by {}", ROOT_ENV);
            config.cache.root = PathBuf::from(root);
        }
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &Config) -> CkptResult<()> {
        self.ensure_config_dir()?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).map_err(|e| {
            CheckpointError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    fn ensure_config_dir(&self) -> CkptResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| CheckpointError::ConfigDirCreate {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

fn read_table(path: &Path) -> CkptResult<toml::Table> {
    let content = fs::read_to_string(path)
        .map_err(|e| CheckpointError::io(format!("reading config from {}", path.display()), e))?;

    toml::from_str(&content).map_err(|e: toml::de::Error| CheckpointError::ConfigInvalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming) => {
                if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                    merge_tables(existing, incoming);
                } else {
                    base.insert(key, toml::Value::Table(incoming));
                }
            }
            other => {
                base.insert(key, other);
            }
        }
    }
}

fn anchor_root(table: &mut toml::Table, base: &Path) {
    let Some(toml::Value::Table(cache)) = table.get_mut("cache") else {
        return;
    };
    let anchored = match cache.get("root") {
        Some(toml::Value::String(root)) if Path::new(root).is_relative() => {
            base.join(root).to_string_lossy().into_owned()
        }
        _ => return,
    };
    cache.insert("root".to_string(), toml::Value::String(anchored));
}
