//! The checkpoint combinator
//!
//! [`Checkpoint`] holds the settings shared by every wrapped computation:
//! cache root, serialization strategy and options, argument mode and notice
//! template. [`Checkpoint::wrap`] turns a [`Computation`] into a
//! [`Memoized`] one with the same call signature.
//!
//! ```no_run
//! use ckpt::{computation, Checkpoint, SerializationKind};
//!
//! computation! {
//!     fn add(a: i64, b: i64) -> i64 {
//!         a + b
//!     }
//! }
//!
//! # fn main() -> ckpt::CkptResult<()> {
//! let cached_add = Checkpoint::new(".checkpoint")
//!     .serialization(SerializationKind::Json)
//!     .wrap(add)?;
//! assert_eq!(cached_add.call((1, 2))?, 3);
//! assert_eq!(cached_add.call((1, 2))?, 3); // served from disk
//! # Ok(())
//! # }
//! ```

use crate::args::ArgumentKey;
use crate::codec::{CodecOptions, Options, Serialization, SerializationKind};
use crate::computation::Computation;
use crate::config::Config;
use crate::error::{CallError, CkptResult};
use crate::fingerprint::LogicIdentity;
use crate::store::{CacheDirectory, CacheEntry, CheckpointStore, Notice, NoticeTemplate};
use chrono::Local;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Shared checkpoint settings
#[derive(Debug)]
pub struct Checkpoint<S = SerializationKind> {
    root: PathBuf,
    strategy: Arc<S>,
    options: CodecOptions,
    canonical_args: bool,
    template: NoticeTemplate,
}

impl<S> Clone for Checkpoint<S> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            strategy: Arc::clone(&self.strategy),
            options: self.options.clone(),
            canonical_args: self.canonical_args,
            template: self.template.clone(),
        }
    }
}

/// Build a [`Checkpoint`] from every setting at once
///
/// `notice_template` of `None` selects the default template.
pub fn checkpoint<S>(
    root: impl Into<PathBuf>,
    strategy: S,
    (encode, decode): (Options, Options),
    canonical_args: bool,
    notice_template: Option<&str>,
) -> CkptResult<Checkpoint<S>> {
    let template = match notice_template {
        Some(text) => NoticeTemplate::parse(text)?,
        None => NoticeTemplate::default(),
    };
    Ok(Checkpoint::new(root)
        .serialization(strategy)
        .options(CodecOptions { encode, decode })
        .canonical_args(canonical_args)
        .notice_template(template))
}

impl Checkpoint<SerializationKind> {
    /// Defaults: binary strategy, canonical arguments, default template
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            strategy: Arc::new(SerializationKind::default()),
            options: CodecOptions::default(),
            canonical_args: true,
            template: NoticeTemplate::default(),
        }
    }

    /// Settings from a loaded configuration
    pub fn from_config(config: &Config) -> CkptResult<Self> {
        let template = NoticeTemplate::parse(&config.cache.notice_template)?;
        Ok(Self::new(&config.cache.root)
            .serialization(config.cache.serialization)
            .options(config.codec.clone())
            .canonical_args(config.cache.canonical_args)
            .notice_template(template))
    }
}

impl<S> Checkpoint<S> {
    /// Replace the serialization strategy
    pub fn serialization<S2>(self, strategy: S2) -> Checkpoint<S2> {
        Checkpoint {
            root: self.root,
            strategy: Arc::new(strategy),
            options: self.options,
            canonical_args: self.canonical_args,
            template: self.template,
        }
    }

    /// Strategy options for encode and decode
    pub fn options(mut self, options: CodecOptions) -> Self {
        self.options = options;
        self
    }

    /// Bind arguments to parameter names before hashing (default `true`)
    pub fn canonical_args(mut self, canonical: bool) -> Self {
        self.canonical_args = canonical;
        self
    }

    /// Message logged on a cache hit
    pub fn notice_template(mut self, template: NoticeTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Wrap a computation
    ///
    /// Strategy options are validated here. The logic fingerprint is derived
    /// lazily on the first call.
    pub fn wrap<C>(&self, computation: C) -> CkptResult<Memoized<C, S>>
    where
        C: Computation,
        S: Serialization<C::Output>,
    {
        self.strategy.validate(&self.options)?;
        Ok(Memoized {
            computation,
            settings: self.clone(),
            identity: OnceCell::new(),
        })
    }
}

/// How a memoized call was served
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Loaded from an existing entry
    Hit(Notice),
    /// Computed and published
    Miss(CacheEntry),
    /// Computed, but another writer was publishing the same key
    Unpublished,
}

/// A computation whose results are persisted
#[derive(Debug)]
pub struct Memoized<C, S = SerializationKind> {
    computation: C,
    settings: Checkpoint<S>,
    identity: OnceCell<LogicIdentity>,
}

impl<C, S> Memoized<C, S>
where
    C: Computation,
    S: Serialization<C::Output>,
{
    /// Call through the cache
    pub fn call(&self, args: C::Args) -> Result<C::Output, CallError<C::Error>> {
        self.call_traced(args).map(|(value, _)| value)
    }

    /// Call through the cache, reporting whether the result was loaded
    pub fn call_traced(&self, args: C::Args) -> Result<(C::Output, Outcome), CallError<C::Error>> {
        let identity = self.identity()?;
        let key = ArgumentKey::derive(
            self.computation.name(),
            self.computation.params(),
            &args,
            self.settings.canonical_args,
        )?;

        let dir = CacheDirectory::resolve(
            &self.settings.root,
            identity,
            self.computation.source(),
            self.computation.source_extension(),
        )?;
        let store = CheckpointStore::new(&dir);
        let strategy = self.settings.strategy.as_ref();

        if let Some(hit) = store.lookup::<C::Output, S>(&key, strategy, &self.settings.options.decode)? {
            hit.notice
                .emit(&self.settings.template, Local::now().naive_local());
            return Ok((hit.value, Outcome::Hit(hit.notice)));
        }

        debug!(
            "No checkpoint for {}({}); computing",
            identity.name, key.representation
        );
        let value = self
            .computation
            .call(args)
            .map_err(CallError::Computation)?;

        let outcome = match store.publish(&key, &value, strategy, &self.settings.options.encode)? {
            Some(entry) => Outcome::Miss(entry),
            None => Outcome::Unpublished,
        };
        Ok((value, outcome))
    }

    /// Logic identity, derived once and cached
    pub fn identity(&self) -> CkptResult<&LogicIdentity> {
        self.identity.get_or_try_init(|| {
            LogicIdentity::derive(self.computation.name(), self.computation.source())
        })
    }

    /// The wrapped computation
    pub fn computation(&self) -> &C {
        &self.computation
    }

    /// Settings this computation was wrapped with
    pub fn settings(&self) -> &Checkpoint<S> {
        &self.settings
    }
}
