//! Error classifications.
//!
//! A classification is a categorical tag attached to an error. It knows how
//! to render itself for the wire and exposes a [`ClassificationKey`] used by
//! canonical equality and hashing.
//!
//! The built-in set lives in [`catalog`]; [`NamedClassification`] covers
//! ad-hoc tags that do not warrant their own type.

pub mod catalog;

pub use catalog::ErrorType;

use crate::error::QueryError;
use serde_json::Value;
use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Failure raised by a classification while rendering itself.
///
/// The normalizer forwards these untouched.
#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("classification {classification} cannot render error: {reason}")]
    Render {
        classification: String,
        reason: String,
    },

    #[error("classification value is not serializable: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Identity of a classification variant.
///
/// Two keys match only when both the concrete classification type and the
/// variant name match, so `ErrorType::ValidationError` never equals a named
/// classification spelled `"ValidationError"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassificationKey {
    type_id: TypeId,
    name: Cow<'static, str>,
}

impl ClassificationKey {
    pub fn of<T: 'static>(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
}

impl fmt::Display for ClassificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The classification capability.
pub trait ErrorClassification: fmt::Debug + Send + Sync {
    fn key(&self) -> ClassificationKey;

    /// Wire form of this classification for `error`.
    ///
    /// Defaults to the variant name as a JSON string.
    fn to_specification(&self, error: &dyn QueryError) -> Result<Value, ClassificationError> {
        let _ = error;
        Ok(Value::String(self.key().name().to_string()))
    }
}

/// Ad-hoc classification identified only by its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedClassification {
    name: Cow<'static, str>,
}

impl NamedClassification {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self { name: name.into() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ErrorClassification for NamedClassification {
    fn key(&self) -> ClassificationKey {
        ClassificationKey::of::<Self>(self.name.clone())
    }
}

impl fmt::Display for NamedClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
