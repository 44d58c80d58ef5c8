//! Configuration schema for ckpt
//!
//! Global configuration is stored at `~/.config/ckpt/config.toml`; a
//! project may override it with a `.ckpt.toml` in any ancestor directory.

use crate::codec::{CodecOptions, SerializationKind};
use crate::store::DEFAULT_NOTICE_TEMPLATE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cache settings
    pub cache: CacheConfig,

    /// Serialization strategy options
    pub codec: CodecOptions,
}

/// General application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding cache directories
    pub root: PathBuf,

    /// Built-in serialization strategy
    pub serialization: SerializationKind,

    /// Bind arguments to parameter names before hashing
    pub canonical_args: bool,

    /// Message logged when a call is served from the cache
    pub notice_template: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(".checkpoint"),
            serialization: SerializationKind::default(),
            canonical_args: true,
            notice_template: DEFAULT_NOTICE_TEMPLATE.to_string(),
        }
    }
}
