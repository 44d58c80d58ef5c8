//! Caller-supplied strategies

use super::{Options, Serialization};
use crate::error::CkptResult;
use crate::store::naming::sanitize_filename;
use std::fmt;
use std::path::Path;

type EncodeFn<T> = Box<dyn Fn(&T, &Path, &Options) -> CkptResult<()> + Send + Sync>;
type DecodeFn<T> = Box<dyn Fn(&Path, &Options) -> CkptResult<T> + Send + Sync>;

/// Strategy built from an `(encode, decode, extension)` triple
///
/// Option validation is left to the supplied functions.
pub struct Custom<T> {
    encode: EncodeFn<T>,
    decode: DecodeFn<T>,
    extension: String,
}

impl<T> Custom<T> {
    pub fn new<E, D>(encode: E, decode: D, extension: &str) -> Self
    where
        E: Fn(&T, &Path, &Options) -> CkptResult<()> + Send + Sync + 'static,
        D: Fn(&Path, &Options) -> CkptResult<T> + Send + Sync + 'static,
    {
        Self {
            encode: Box::new(encode),
            decode: Box::new(decode),
            extension: sanitize_filename(extension.trim_start_matches('.')),
        }
    }
}

impl<T> fmt::Debug for Custom<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Custom")
            .field("extension", &self.extension)
            .finish_non_exhaustive()
    }
}

impl<T> Serialization<T> for Custom<T> {
    fn extension(&self) -> &str {
        &self.extension
    }

    fn serialize(&self, value: &T, path: &Path, options: &Options) -> CkptResult<()> {
        (self.encode)(value, path, options)
    }

    fn deserialize(&self, path: &Path, options: &Options) -> CkptResult<T> {
        (self.decode)(path, options)
    }
}
