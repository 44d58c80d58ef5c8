//! On-disk naming grammar
//!
//! ```text
//! {identifier}_[{date}]_{fingerprint}_checkpoint/
//!     {identifier}_source.{ext}
//!     {arg_repr}_[{date}]_{arg_hash}_checkpoint.{ext}
//!     {arg_repr}_[{date}]_{arg_hash}_checkpoint.incomplete.{ext}
//!     manifest/{arg_hash}.{ext}.json
//! ```
//!
//! Dates are local wall-clock time formatted as `MM-DD-YYYY-HH-MM-SS`.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// strftime format of the bracketed date
pub const DATE_FORMAT: &str = "%m-%d-%Y-%H-%M-%S";

/// Length of a formatted date
pub const DATE_LEN: usize = 19;

/// Suffix shared by directory and entry names
pub const CHECKPOINT_SUFFIX: &str = "_checkpoint";

/// Marker inserted before the extension of an unpublished entry
pub const INCOMPLETE_MARKER: &str = "incomplete";

/// Manifest subdirectory inside every cache directory
pub const MANIFEST_DIR: &str = "manifest";

/// Longest filename, in bytes, common filesystems accept
pub const NAME_MAX: usize = 255;

/// Length of a SHA-256 hex digest
const DIGEST_LEN: usize = 64;

static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\-.()\[\]{}+=,~]").expect("Invalid UNSAFE_CHARS regex"));

/// Remove every character that is unsafe in a filename
pub fn sanitize_filename(raw: &str) -> String {
    UNSAFE_CHARS.replace_all(raw, "").into_owned()
}

/// Format a timestamp for a directory or entry name
pub fn format_date(at: &NaiveDateTime) -> String {
    at.format(DATE_FORMAT).to_string()
}

/// Parse a bracketed date body
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    if text.len() != DATE_LEN {
        return None;
    }
    NaiveDateTime::parse_from_str(text, DATE_FORMAT).ok()
}

/// Name of a cache directory
pub fn directory_name(identifier: &str, date: &str, fingerprint: &str) -> String {
    format!("{identifier}_[{date}]_{fingerprint}{CHECKPOINT_SUFFIX}")
}

/// Argument representation as it appears in entry names
///
/// Cut on a character boundary so the temporary name of the entry stays
/// within [`NAME_MAX`] bytes. The hash keeps truncated keys apart.
pub fn fit_repr<'a>(arg_repr: &'a str, extension: &str) -> &'a str {
    let fixed = "_[".len()
        + DATE_LEN
        + "]_".len()
        + DIGEST_LEN
        + CHECKPOINT_SUFFIX.len()
        + 1
        + INCOMPLETE_MARKER.len()
        + 1
        + extension.len();
    let budget = NAME_MAX.saturating_sub(fixed);
    if arg_repr.len() <= budget {
        return arg_repr;
    }
    let mut end = budget;
    while !arg_repr.is_char_boundary(end) {
        end -= 1;
    }
    &arg_repr[..end]
}

/// Name of a published entry
pub fn entry_name(arg_repr: &str, date: &str, arg_hash: &str, extension: &str) -> String {
    let arg_repr = fit_repr(arg_repr, extension);
    format!("{arg_repr}_[{date}]_{arg_hash}{CHECKPOINT_SUFFIX}.{extension}")
}

/// Name of an entry while it is being written
pub fn temp_entry_name(arg_repr: &str, date: &str, arg_hash: &str, extension: &str) -> String {
    let arg_repr = fit_repr(arg_repr, extension);
    format!("{arg_repr}_[{date}]_{arg_hash}{CHECKPOINT_SUFFIX}.{INCOMPLETE_MARKER}.{extension}")
}

/// Name of the audit copy of a computation's source
pub fn source_name(identifier: &str, extension: &str) -> String {
    format!("{identifier}_source.{extension}")
}

/// Name of a manifest record
pub fn manifest_name(arg_hash: &str, extension: &str) -> String {
    format!("{arg_hash}.{extension}.json")
}

/// Why a filename does not parse as an entry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("not a checkpoint entry")]
    NotAnEntry,

    #[error("missing brackets around the date")]
    MissingBrackets,

    #[error("malformed date `{0}`")]
    MalformedDate(String),
}

/// Parts of a cache directory name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryName {
    pub identifier: String,
    pub created_at: NaiveDateTime,
    pub fingerprint: String,
}

/// Parts of an entry filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryName {
    pub arg_repr: String,
    pub created_at: NaiveDateTime,
    pub arg_hash: String,
    pub extension: String,
    /// Whether this is an unpublished temporary file
    pub incomplete: bool,
}

fn is_digest(text: &str) -> bool {
    text.len() == DIGEST_LEN && text.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Split `{head}_[{date}]` into head and parsed date
fn split_dated(text: &str) -> Result<(&str, NaiveDateTime), NameError> {
    let Some(before_close) = text.strip_suffix(']') else {
        return Err(NameError::MissingBrackets);
    };
    let Some(open) = before_close.rfind("_[") else {
        return Err(NameError::MissingBrackets);
    };
    let date = &before_close[open + 2..];
    let created_at = parse_date(date).ok_or_else(|| NameError::MalformedDate(date.to_string()))?;
    Ok((&before_close[..open], created_at))
}

/// Parse a cache directory name
pub fn parse_directory_name(name: &str) -> Option<DirectoryName> {
    let stem = name.strip_suffix(CHECKPOINT_SUFFIX)?;
    let (dated, fingerprint) = stem.rsplit_once('_')?;
    if !is_digest(fingerprint) {
        return None;
    }
    let (identifier, created_at) = split_dated(dated).ok()?;
    Some(DirectoryName {
        identifier: identifier.to_string(),
        created_at,
        fingerprint: fingerprint.to_string(),
    })
}

/// Parse an entry filename without knowing its key
pub fn parse_entry_name(name: &str) -> Result<EntryName, NameError> {
    let marker = format!("{CHECKPOINT_SUFFIX}.");
    let Some(at) = name.rfind(&marker) else {
        return Err(NameError::NotAnEntry);
    };
    let (stem, tail) = (&name[..at], &name[at + marker.len()..]);

    let (incomplete, extension) = match tail.split_once('.') {
        Some((INCOMPLETE_MARKER, ext)) => (true, ext),
        _ => (false, tail),
    };
    if extension.is_empty() {
        return Err(NameError::NotAnEntry);
    }

    let Some((dated, arg_hash)) = stem.rsplit_once('_') else {
        return Err(NameError::NotAnEntry);
    };
    if !is_digest(arg_hash) {
        return Err(NameError::NotAnEntry);
    }

    let (arg_repr, created_at) = split_dated(dated)?;
    Ok(EntryName {
        arg_repr: arg_repr.to_string(),
        created_at,
        arg_hash: arg_hash.to_string(),
        extension: extension.to_string(),
        incomplete,
    })
}

/// Match a filename against a known key, returning the raw date section
///
/// A name matches when it starts with `{arg_repr}_` and ends with
/// `_{arg_hash}_checkpoint.{ext}`; what lies between must then be a
/// bracketed date for the entry to be readable.
pub fn match_entry<'a>(name: &'a str, arg_repr: &str, arg_hash: &str, extension: &str) -> Option<&'a str> {
    let prefix = format!("{}_", fit_repr(arg_repr, extension));
    let suffix = format!("_{arg_hash}{CHECKPOINT_SUFFIX}.{extension}");
    if name.len() < prefix.len() + suffix.len() {
        return None;
    }
    name.strip_prefix(&prefix)?.strip_suffix(&suffix)
}

/// Parse the date section returned by [`match_entry`]
pub fn parse_entry_date(section: &str) -> Result<NaiveDateTime, NameError> {
    let body = section
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or(NameError::MissingBrackets)?;
    parse_date(body).ok_or_else(|| NameError::MalformedDate(body.to_string()))
}
