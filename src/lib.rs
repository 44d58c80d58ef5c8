//! ckpt - persistent checkpointing of deterministic computations
//!
//! Results are stored on disk under a directory named after the
//! computation's logic fingerprint, one file per argument set, and are
//! published atomically so readers never observe a partial entry.

pub mod args;
pub mod checkpoint;
pub mod cli;
pub mod codec;
pub mod computation;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod store;
pub mod ui;

pub use args::ArgumentKey;
pub use checkpoint::{checkpoint, Checkpoint, Memoized, Outcome};
pub use codec::{
    Binary, CodecOptions, Columnar, Csv, Custom, Json, Options, Serialization, SerializationKind,
};
pub use computation::Computation;
pub use error::{CallError, CheckpointError, CkptResult};
pub use fingerprint::{LogicIdentity, LogicViolation};
