//! Cache Key Module
//!
//! Derives stable cache keys from an operation name and its parameters.
//!
//! A key has the form `operation:canonical-params`, where the parameters are
//! sorted by name (byte order) and rendered as `name=value` pairs joined by
//! `&`. String values are JSON-quoted so `&` or `=` inside a value cannot be
//! mistaken for a separator, and `"1"` never collides with `1`.
//!
//! When the full key exceeds [`KEY_DIGEST_THRESHOLD`] UTF-8 bytes (not
//! characters) the parameter part is replaced by `#` and a 128-bit hex
//! digest (truncated SHA-256) of the full key. Digested keys are unique
//! only with overwhelming probability, not by construction.
//!
//! Credentials must be stripped by the caller; the deriver cannot tell which
//! parameters are secret.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

// == Public Constants ==
/// Keys longer than this many UTF-8 bytes (not characters) are shortened
/// with a digest.
pub const KEY_DIGEST_THRESHOLD: usize = 200;

/// Number of digest bytes kept (128 bits, 32 hex characters).
pub const KEY_DIGEST_BYTES: usize = 16;

const OPERATION_SEPARATOR: char = ':';
const PAIR_SEPARATOR: char = '&';
const DIGEST_MARKER: char = '#';

// == Param Value ==
/// A scalar parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl ParamValue {
    /// Renders the value for use inside a cache key.
    fn canonical(&self) -> String {
        match self {
            ParamValue::Str(s) => serde_json::Value::String(s.clone()).to_string(),
            ParamValue::Int(i) => i.to_string(),
            ParamValue::Bool(b) => b.to_string(),
        }
    }
}

/// Plain rendering, as sent in a query string.
impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(s) => f.write_str(s),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Str(s)
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        ParamValue::Int(i)
    }
}

impl From<u32> for ParamValue {
    fn from(i: u32) -> Self {
        ParamValue::Int(i64::from(i))
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

// == Param Set ==
/// Named parameters of one invocation. Insertion order is irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParamSet(BTreeMap<String, ParamValue>);

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts or replaces a parameter.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    /// Parameters as plain `(name, value)` pairs for a query string.
    pub fn to_query(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect()
    }

    /// Sorted `name=value` pairs joined by `&`.
    pub fn canonical(&self) -> String {
        let mut out = String::new();
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(PAIR_SEPARATOR);
            }
            out.push_str(&canonical_name(name));
            out.push('=');
            out.push_str(&value.canonical());
        }
        out
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParamSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = ParamSet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

// Identifier-like names stay bare; anything else is JSON-quoted.
fn canonical_name(name: &str) -> String {
    let plain = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'.');
    if plain {
        name.to_string()
    } else {
        serde_json::Value::String(name.to_string()).to_string()
    }
}

// == Derive ==
/// Derives the cache key for `operation` invoked with `params`.
///
/// Deterministic across calls and process restarts. The operation name is
/// always kept as a visible prefix, so keys of different operations never
/// collide and can be invalidated with `operation:*`.
pub fn derive_key(operation: &str, params: &ParamSet) -> String {
    let full = format!("{}{}{}", operation, OPERATION_SEPARATOR, params.canonical());
    if full.len() <= KEY_DIGEST_THRESHOLD {
        return full;
    }

    format!(
        "{}{}{}{}",
        operation,
        OPERATION_SEPARATOR,
        DIGEST_MARKER,
        hex_digest(&full)
    )
}

/// Glob pattern matching every key derived for `operation`.
pub fn operation_pattern(operation: &str) -> String {
    format!("{}{}*", glob::Pattern::escape(operation), OPERATION_SEPARATOR)
}

fn hex_digest(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    digest[..KEY_DIGEST_BYTES]
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
