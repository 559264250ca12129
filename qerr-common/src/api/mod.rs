//! Typed view of the normalized error wire form and its machine-readable
//! schema.

pub mod schema;

use crate::error::Extensions;
use crate::location::SourceLocation;
use crate::path::PathSegment;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Version of the generated schema and catalog documents.
pub const SCHEMA_VERSION: &str = "1.0";

/// One entry of a response's `errors` list, as produced by
/// [`ErrorNormalizer::to_specification`](crate::normalizer::ErrorNormalizer::to_specification).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ErrorSpecification {
    /// Human-readable description of the error.
    #[serde(default)]
    pub message: Option<String>,
    /// Positions in the query text the error refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<SourceLocation>>,
    /// Steps from the response root to the failing value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathSegment>>,
    /// Implementation-defined metadata, including the classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Extensions>,
}

impl ErrorSpecification {
    /// The `classification` entry of `extensions`, if any.
    #[must_use]
    pub fn classification(&self) -> Option<&Value> {
        self.extensions
            .as_ref()
            .and_then(|ext| ext.get(crate::normalizer::CLASSIFICATION_EXTENSION))
    }
}

impl TryFrom<Map<String, Value>> for ErrorSpecification {
    type Error = serde_json::Error;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        serde_json::from_value(Value::Object(map))
    }
}
