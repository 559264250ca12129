//! Built-in classification catalog.
//!
//! These are the classifications the query engine itself attaches to the
//! errors it raises. Each variant renders on the wire as its name.
//!
//! | Variant                       | Raised by  |
//! |-------------------------------|------------|
//! | `InvalidSyntax`               | Parser     |
//! | `ValidationError`             | Validator  |
//! | `DataFetchingException`       | Executor   |
//! | `NullValueInNonNullableField` | Executor   |
//! | `OperationNotSupported`       | Executor   |
//! | `ExecutionAborted`            | Executor   |

use super::{ClassificationKey, ErrorClassification};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Standard classification set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum ErrorType {
    /// Query text could not be parsed
    InvalidSyntax,
    /// Query failed validation against the schema
    ValidationError,
    /// A resolver failed while fetching data
    DataFetchingException,
    /// A non-null field resolved to null
    NullValueInNonNullableField,
    /// The requested operation type is not supported
    OperationNotSupported,
    /// Execution was aborted before completion
    ExecutionAborted,
}

impl ErrorType {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::InvalidSyntax => "InvalidSyntax",
            Self::ValidationError => "ValidationError",
            Self::DataFetchingException => "DataFetchingException",
            Self::NullValueInNonNullableField => "NullValueInNonNullableField",
            Self::OperationNotSupported => "OperationNotSupported",
            Self::ExecutionAborted => "ExecutionAborted",
        }
    }

    /// Returns a short description of the classification.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidSyntax => "The query text is not syntactically valid",
            Self::ValidationError => "The query is not valid against the schema",
            Self::DataFetchingException => "A field resolver raised an error while fetching data",
            Self::NullValueInNonNullableField => {
                "A field declared non-null resolved to a null value"
            }
            Self::OperationNotSupported => "The operation type is not supported by the schema",
            Self::ExecutionAborted => "Execution was aborted before it completed",
        }
    }

    /// Returns all built-in classifications in catalog order.
    #[must_use]
    pub const fn all() -> &'static [ErrorType] {
        &[
            Self::InvalidSyntax,
            Self::ValidationError,
            Self::DataFetchingException,
            Self::NullValueInNonNullableField,
            Self::OperationNotSupported,
            Self::ExecutionAborted,
        ]
    }
}

impl ErrorClassification for ErrorType {
    fn key(&self) -> ClassificationKey {
        ClassificationKey::of::<Self>(self.name())
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown error type: {0}")]
pub struct UnknownErrorType(pub String);

impl FromStr for ErrorType {
    type Err = UnknownErrorType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| UnknownErrorType(s.to_string()))
    }
}
