//! Argument keys
//!
//! Arguments are serialized into a CBOR value tree before hashing. An array
//! holds positional arguments, a map holds keyword arguments, `null` means no
//! arguments and any other value is a single positional argument. Hashes are
//! taken over the CBOR encoding, which keeps values such as `NaN` and the
//! infinities apart.

use crate::error::{CheckpointError, CkptResult};
use crate::fingerprint::sha256_hex;
use crate::store::naming::sanitize_filename;
use ciborium::Value;
use serde::Serialize;

/// Maximum characters of a canonical representation
const CANONICAL_REPR_LIMIT: usize = 160;

/// Maximum characters of each half of a positional representation
const POSITIONAL_REPR_LIMIT: usize = 80;

/// Identity of one call's inputs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArgumentKey {
    /// Sanitized, length-capped human-readable tag
    pub representation: String,
    /// Lowercase hex SHA-256
    pub hash: String,
}

impl ArgumentKey {
    /// Derive the key of a call
    ///
    /// In canonical mode arguments are bound to `params` first, so passing a
    /// value positionally or by name yields the same key.
    pub fn derive<A: Serialize + ?Sized>(
        name: &str,
        params: &[&str],
        args: &A,
        canonical: bool,
    ) -> CkptResult<Self> {
        let value = Value::serialized(args).map_err(|e| CheckpointError::ArgumentBinding {
            name: name.to_string(),
            reason: format!("arguments are not serializable: {}", e),
        })?;
        let (positional, keywords) = split(name, value)?;

        if canonical {
            Self::canonical(name, params, positional, keywords)
        } else {
            Self::positional(name, positional, keywords)
        }
    }

    /// Key over the arguments bound to parameter names
    pub fn canonical(
        name: &str,
        params: &[&str],
        positional: Vec<Value>,
        keywords: Vec<(String, Value)>,
    ) -> CkptResult<Self> {
        let bound = bind(name, params, positional, keywords)?;

        let joined = bound
            .iter()
            .map(|(param, value)| format!("{}={}", param, repr(value)))
            .collect::<Vec<_>>()
            .join(",");
        let representation = sanitize_filename(&truncate(&joined, CANONICAL_REPR_LIMIT));
        let hash = digest(name, &bound)?;

        Ok(Self {
            representation,
            hash,
        })
    }

    /// Key over the arguments exactly as passed
    pub fn positional(
        name: &str,
        positional: Vec<Value>,
        mut keywords: Vec<(String, Value)>,
    ) -> CkptResult<Self> {
        keywords.sort_by(|a, b| a.0.cmp(&b.0));

        let args = positional.iter().map(display).collect::<Vec<_>>().join(",");
        let kwargs = keywords
            .iter()
            .map(|(key, value)| format!("{}-{}", key, repr(value)))
            .collect::<Vec<_>>()
            .join(",");
        let representation = sanitize_filename(&format!(
            "{}_{}",
            truncate(&args, POSITIONAL_REPR_LIMIT),
            truncate(&kwargs, POSITIONAL_REPR_LIMIT)
        ));
        let hash = digest(name, &(&positional, &keywords))?;

        Ok(Self {
            representation,
            hash,
        })
    }
}

/// SHA-256 over the CBOR encoding of `value`
fn digest<T: Serialize + ?Sized>(name: &str, value: &T) -> CkptResult<String> {
    let mut encoded = Vec::new();
    ciborium::into_writer(value, &mut encoded).map_err(|e| CheckpointError::ArgumentBinding {
        name: name.to_string(),
        reason: format!("arguments could not be encoded: {}", e),
    })?;
    Ok(sha256_hex(&encoded))
}

/// Split a serialized argument value into positional and keyword parts
fn split(name: &str, value: Value) -> CkptResult<(Vec<Value>, Vec<(String, Value)>)> {
    match value {
        Value::Null => Ok((Vec::new(), Vec::new())),
        Value::Array(items) => Ok((items, Vec::new())),
        Value::Map(entries) => {
            let keywords = entries
                .into_iter()
                .map(|(key, value)| match key {
                    Value::Text(key) => Ok((key, value)),
                    other => Err(CheckpointError::ArgumentBinding {
                        name: name.to_string(),
                        reason: format!("keyword names must be strings, got {}", repr(&other)),
                    }),
                })
                .collect::<CkptResult<Vec<_>>>()?;
            Ok((Vec::new(), keywords))
        }
        other => Ok((vec![other], Vec::new())),
    }
}

/// Bind arguments to parameter names, in parameter order
fn bind(
    name: &str,
    params: &[&str],
    positional: Vec<Value>,
    keywords: Vec<(String, Value)>,
) -> CkptResult<Vec<(String, Value)>> {
    let binding_error = |reason: String| CheckpointError::ArgumentBinding {
        name: name.to_string(),
        reason,
    };

    if positional.len() > params.len() {
        return Err(binding_error(format!(
            "takes {} arguments but {} were given",
            params.len(),
            positional.len()
        )));
    }

    let mut slots: Vec<Option<Value>> = vec![None; params.len()];
    for (slot, value) in slots.iter_mut().zip(positional) {
        *slot = Some(value);
    }

    for (key, value) in keywords {
        let Some(index) = params.iter().position(|p| *p == key) else {
            return Err(binding_error(format!("unexpected argument `{}`", key)));
        };
        if slots[index].is_some() {
            return Err(binding_error(format!("multiple values for argument `{}`", key)));
        }
        slots[index] = Some(value);
    }

    params
        .iter()
        .zip(slots)
        .map(|(param, slot)| {
            slot.map(|value| (param.to_string(), value))
                .ok_or_else(|| binding_error(format!("missing argument `{}`", param)))
        })
        .collect()
}

/// Compact JSON-style text of a value; non-finite floats read `NaN`, `inf`, `-inf`
fn repr(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Integer(i) => i128::from(*i).to_string(),
        Value::Float(f) if f.is_nan() => "NaN".to_string(),
        Value::Float(f) if f.is_infinite() => {
            let text = if f.is_sign_positive() { "inf" } else { "-inf" };
            text.to_string()
        }
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map_or_else(|| f.to_string(), |n| n.to_string()),
        Value::Text(s) => serde_json::Value::String(s.clone()).to_string(),
        Value::Bytes(bytes) => join_list(bytes.iter().map(u8::to_string), '[', ']'),
        Value::Array(items) => join_list(items.iter().map(repr), '[', ']'),
        Value::Map(entries) => join_list(
            entries.iter().map(|(k, v)| format!("{}:{}", repr(k), repr(v))),
            '{',
            '}',
        ),
        Value::Tag(_, inner) => repr(inner),
        _ => String::new(),
    }
}

fn join_list(items: impl Iterator<Item = String>, open: char, close: char) -> String {
    format!("{}{}{}", open, items.collect::<Vec<_>>().join(","), close)
}

/// Raw text for strings, [`repr`] otherwise
fn display(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        other => repr(other),
    }
}

fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
