//! Error normalization and canonical identity.
//!
//! [`ErrorNormalizer`] turns any [`QueryError`] into the ordered wire map
//!
//! ```text
//! { "message", "locations"?, "path"?, "extensions"? }
//! ```
//!
//! and defines the equality and hash used to deduplicate errors. Extensions
//! never take part in identity: an error is the same error whether or not
//! its classification has been copied into its extensions yet.

use crate::classification::{ClassificationError, ClassificationKey};
use crate::error::{Extensions, QueryError};
use crate::location::{SourceLocation, locations_to_specification};
use crate::path::{PathSegment, path_to_specification};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace};

/// Extensions key under which the classification is surfaced.
pub const CLASSIFICATION_EXTENSION: &str = "classification";

const MULTIPLIER: u64 = 31;

/// How an error without a message is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessagePolicy {
    /// Always emit `message`, as `null` when the error has none.
    #[default]
    Always,
    /// Leave `message` out when the error has none.
    OmitAbsent,
}

impl MessagePolicy {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::OmitAbsent => "omit_absent",
        }
    }
}

impl fmt::Display for MessagePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown message policy '{0}' (expected always or omit_absent)")]
pub struct UnknownMessagePolicy(pub String);

impl FromStr for MessagePolicy {
    type Err = UnknownMessagePolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "omit_absent" | "omit-absent" => Ok(Self::OmitAbsent),
            _ => Err(UnknownMessagePolicy(s.to_string())),
        }
    }
}

/// Stateless normalizer over the [`QueryError`] capability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorNormalizer {
    message_policy: MessagePolicy,
}

impl ErrorNormalizer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            message_policy: MessagePolicy::Always,
        }
    }

    #[must_use]
    pub const fn with_message_policy(mut self, policy: MessagePolicy) -> Self {
        self.message_policy = policy;
        self
    }

    #[must_use]
    pub const fn message_policy(&self) -> MessagePolicy {
        self.message_policy
    }

    /// Build the wire map for `error`.
    ///
    /// Keys appear in the order `message`, `locations`, `path`, `extensions`.
    /// When the error carries a classification, `extensions` is a fresh copy
    /// of the error's extensions with the rendered classification added
    /// unless a `classification` entry is already present.
    ///
    /// # Errors
    ///
    /// Returns whatever the classification's own rendering returns, unchanged.
    pub fn to_specification(
        &self,
        error: &dyn QueryError,
    ) -> Result<Map<String, Value>, ClassificationError> {
        let mut spec = Map::new();

        match (error.message(), self.message_policy) {
            (Some(message), _) => {
                spec.insert("message".to_string(), Value::String(message.to_string()));
            }
            (None, MessagePolicy::Always) => {
                spec.insert("message".to_string(), Value::Null);
            }
            (None, MessagePolicy::OmitAbsent) => {}
        }

        if let Some(locations) = error.locations() {
            spec.insert(
                "locations".to_string(),
                locations_to_specification(locations),
            );
        }

        if let Some(path) = error.path() {
            spec.insert("path".to_string(), path_to_specification(path));
        }

        if let Some(extensions) = merged_extensions(error)? {
            spec.insert("extensions".to_string(), Value::Object(extensions));
        }

        Ok(spec)
    }

    /// Canonical equality; see [`equals`].
    #[must_use]
    pub fn equals(&self, a: &dyn QueryError, b: &dyn QueryError) -> bool {
        equals(a, b)
    }

    /// Canonical hash; see [`hash_code`].
    #[must_use]
    pub fn hash_code(&self, error: &dyn QueryError) -> u64 {
        hash_code(error)
    }
}

/// Normalize with the default policy.
///
/// # Errors
///
/// Propagates the classification's rendering failure.
pub fn to_specification(error: &dyn QueryError) -> Result<Map<String, Value>, ClassificationError> {
    ErrorNormalizer::new().to_specification(error)
}

fn merged_extensions(error: &dyn QueryError) -> Result<Option<Extensions>, ClassificationError> {
    let Some(classification) = error.classification() else {
        return Ok(error.extensions().cloned());
    };

    let mut extensions = error.extensions().cloned().unwrap_or_default();
    if extensions.contains_key(CLASSIFICATION_EXTENSION) {
        debug!(
            classification = %classification.key(),
            "extensions already carry a classification entry, keeping it"
        );
    } else {
        let rendered = classification.to_specification(error)?;
        trace!(classification = %classification.key(), "surfacing classification in extensions");
        extensions.insert(CLASSIFICATION_EXTENSION.to_string(), rendered);
    }
    Ok(Some(extensions))
}

/// Canonical equality.
///
/// Same reference is equal. Errors of different concrete types are never
/// equal. Otherwise message, locations, path and classification identity
/// must all match; extensions are ignored.
#[must_use]
pub fn equals(a: &dyn QueryError, b: &dyn QueryError) -> bool {
    if std::ptr::addr_eq(a, b) {
        return true;
    }
    if a.as_any().type_id() != b.as_any().type_id() {
        return false;
    }
    a.message() == b.message()
        && a.locations() == b.locations()
        && a.path() == b.path()
        && classification_key(a) == classification_key(b)
}

/// Canonical hash, consistent with [`equals`].
///
/// Polynomial accumulation over message, locations, path and classification
/// identity, in that order; an absent component contributes 0.
#[must_use]
pub fn hash_code(error: &dyn QueryError) -> u64 {
    let mut result = error.message().map_or(0, |m| digest(m.as_bytes()));
    result = mix(result, error.locations().map_or(0, locations_hash));
    result = mix(result, error.path().map_or(0, path_hash));
    mix(
        result,
        classification_key(error).map_or(0, |key| digest(key.name().as_bytes())),
    )
}

fn classification_key(error: &dyn QueryError) -> Option<ClassificationKey> {
    error.classification().map(|c| c.key())
}

fn mix(acc: u64, value: u64) -> u64 {
    acc.wrapping_mul(MULTIPLIER).wrapping_add(value)
}

fn locations_hash(locations: &[SourceLocation]) -> u64 {
    locations.iter().fold(1, |acc, location| {
        mix(
            acc,
            mix(u64::from(location.line), u64::from(location.column)),
        )
    })
}

fn path_hash(path: &[PathSegment]) -> u64 {
    path.iter().fold(1, |acc, segment| {
        let h = match segment {
            PathSegment::Index(index) => mix(1, *index as u64),
            PathSegment::Field(name) => mix(2, digest(name.as_bytes())),
        };
        mix(acc, h)
    })
}

fn digest(bytes: &[u8]) -> u64 {
    let hash = blake3::hash(bytes);
    let mut word = [0u8; 8];
    word.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(word)
}

/// Implement `PartialEq`, `Eq` and `Hash` for [`QueryError`] types in terms
/// of the canonical identity.
#[macro_export]
macro_rules! canonical_identity {
    ($($ty:ty),+ $(,)?) => {$(
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                $crate::normalizer::equals(self, other)
            }
        }

        impl Eq for $ty {}

        impl ::std::hash::Hash for $ty {
            fn hash<H: ::std::hash::Hasher>(&self, state: &mut H) {
                state.write_u64($crate::normalizer::hash_code(self));
            }
        }
    )+};
}

/// Hash-container key for type-erased errors.
#[derive(Debug, Clone)]
pub struct CanonicalError(Arc<dyn QueryError>);

impl CanonicalError {
    pub fn new(error: Arc<dyn QueryError>) -> Self {
        Self(error)
    }

    pub fn from_error<E: QueryError>(error: E) -> Self {
        Self(Arc::new(error))
    }

    #[must_use]
    pub fn get(&self) -> &dyn QueryError {
        self.0.as_ref()
    }

    #[must_use]
    pub fn into_inner(self) -> Arc<dyn QueryError> {
        self.0
    }
}

impl PartialEq for CanonicalError {
    fn eq(&self, other: &Self) -> bool {
        equals(self.get(), other.get())
    }
}

impl Eq for CanonicalError {}

impl Hash for CanonicalError {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(hash_code(self.get()));
    }
}
