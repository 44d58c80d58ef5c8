//! Logic identity of a computation
//!
//! A computation's fingerprint is derived from its source text, not from the
//! compiled code. The source is parsed as a `fn` item, checked for hidden
//! dependencies and normalized so that comments, formatting and local
//! variable names do not affect it, while literals, referenced names and
//! control flow do.

mod analysis;

use crate::error::{CheckpointError, CkptResult};
use crate::store::naming::sanitize_filename;
use analysis::SourceModel;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Why a computation's logic cannot be checkpointed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogicViolation {
    #[error("references `{name}`, which is neither a parameter nor a local binding")]
    CapturedVariable { name: String },

    #[error("reads state through `self`")]
    ReceiverState,

    #[error("load of module-level `{name}`")]
    GlobalRead { name: String },

    #[error("store to module-level `{name}`")]
    GlobalWrite { name: String },

    #[error("declares static `{name}`")]
    StaticDeclaration { name: String },

    #[error("declares thread-local storage")]
    ThreadLocal,
}

/// Stable identity of a computation's logic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicIdentity {
    /// Sanitized computation name, used as the directory identifier
    pub name: String,
    /// Lowercase hex SHA-256 of the normalized source
    pub fingerprint: String,
}

impl LogicIdentity {
    /// Derive the identity of a computation from its name and source
    pub fn derive(name: &str, source: &str) -> CkptResult<Self> {
        let model = SourceModel::parse(source).map_err(|e| CheckpointError::InvalidSource {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

        model
            .check()
            .map_err(|violation| CheckpointError::UnsupportedLogic {
                name: name.to_string(),
                violation,
            })?;

        let pools = model.pools();
        let encoded = serde_json::to_vec(&(&pools.constants, &pools.names, &pools.instructions))?;

        Ok(Self {
            name: sanitize_filename(name),
            fingerprint: sha256_hex(&encoded),
        })
    }

    /// Abbreviated fingerprint for display
    pub fn short(&self) -> &str {
        &self.fingerprint[..12.min(self.fingerprint.len())]
    }
}

/// Lowercase hex SHA-256 of a byte slice
pub(crate) fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
