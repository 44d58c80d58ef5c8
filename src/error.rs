//! Error types for ckpt
//!
//! Library operations return `CkptResult<T>`. A memoized call returns
//! `Result<T, CallError<E>>` so the computation's own error reaches the caller
//! untouched.

use crate::fingerprint::LogicViolation;
use std::convert::Infallible;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ckpt operations
pub type CkptResult<T> = Result<T, CheckpointError>;

/// Boxed error produced by serialization strategies
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// All errors that can occur while checkpointing
#[derive(Error, Debug)]
pub enum CheckpointError {
    // Logic errors
    #[error("Function `{name}` cannot be checkpointed: {violation}")]
    UnsupportedLogic {
        name: String,
        violation: LogicViolation,
    },

    #[error("Source of `{name}` could not be parsed: {reason}")]
    InvalidSource { name: String, reason: String },

    // Argument errors
    #[error("Arguments do not bind to `{name}`: {reason}")]
    ArgumentBinding { name: String, reason: String },

    // Store errors
    #[error("Corrupt checkpoint entry {path}: {reason}")]
    CorruptEntry { path: PathBuf, reason: String },

    // Serialization errors
    #[error("Failed to encode checkpoint {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("Failed to decode checkpoint {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("Invalid option `{key}` for {strategy} serialization: {reason}")]
    InvalidOption {
        strategy: String,
        key: String,
        reason: String,
    },

    #[error("Invalid notice template: {0}")]
    Template(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache root not found: {0}")]
    RootNotFound(PathBuf),

    #[error("Verification failed: {0} corrupt file(s) under {1}")]
    VerifyFailed(usize, PathBuf),

    // Serialization of internal records
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("{0}")]
    User(String),
}

impl CheckpointError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a corrupt entry error
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CorruptEntry {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an encode error wrapping a strategy failure
    pub fn encode(path: impl Into<PathBuf>, source: impl Into<BoxError>) -> Self {
        Self::Encode {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Create a decode error wrapping a strategy failure
    pub fn decode(path: impl Into<PathBuf>, source: impl Into<BoxError>) -> Self {
        Self::Decode {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::UnsupportedLogic { .. } => {
                Some("Pass every input as a parameter; module-level state and captures are not tracked")
            }
            Self::CorruptEntry { .. } => Some("Run: ckpt verify, then remove the listed files"),
            Self::RootNotFound(_) => Some("Pass --root or set cache.root in the configuration"),
            Self::VerifyFailed(..) => Some("Corrupt files are never served; delete them to reclaim space"),
            Self::ConfigInvalid { .. } => Some("Run: ckpt config init --force"),
            _ => None,
        }
    }
}

/// Failure of a memoized call
#[derive(Error, Debug)]
pub enum CallError<E> {
    /// Key derivation, lookup or publish failed
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    /// The wrapped computation returned an error; nothing was published
    #[error("{0}")]
    Computation(E),
}

impl<E> CallError<E> {
    /// Borrow the checkpoint error, if this is one
    pub fn as_checkpoint(&self) -> Option<&CheckpointError> {
        match self {
            Self::Checkpoint(e) => Some(e),
            Self::Computation(_) => None,
        }
    }
}

impl From<CallError<Infallible>> for CheckpointError {
    fn from(err: CallError<Infallible>) -> Self {
        match err {
            CallError::Checkpoint(e) => e,
            CallError::Computation(never) => match never {},
        }
    }
}
