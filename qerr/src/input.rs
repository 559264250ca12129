//! Raw error input accepted by the CLI.
//!
//! ```json
//! {
//!   "message": "Validation error",
//!   "locations": [{"line": 3, "column": 9}],
//!   "path": ["user", "name"],
//!   "extensions": {"code": "E1"},
//!   "classification": "ValidationError"
//! }
//! ```
//!
//! `classification` names a built-in error type; any other name becomes an
//! ad-hoc classification.

use anyhow::{Context, Result};
use qerr_common::classification::ErrorClassification;
use qerr_common::{
    ErrorType, Extensions, NamedClassification, PathSegment, QueryError, SourceLocation,
    canonical_identity,
};
use serde::Deserialize;
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawQueryError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    locations: Option<Vec<SourceLocation>>,
    #[serde(default)]
    path: Option<Vec<PathSegment>>,
    #[serde(default)]
    extensions: Option<Extensions>,
    #[serde(default)]
    classification: Option<String>,
}

/// An error read from JSON input.
#[derive(Debug, Clone)]
pub struct InputError {
    message: Option<String>,
    locations: Option<Vec<SourceLocation>>,
    path: Option<Vec<PathSegment>>,
    extensions: Option<Extensions>,
    classification: Option<Arc<dyn ErrorClassification>>,
}

impl From<RawQueryError> for InputError {
    fn from(raw: RawQueryError) -> Self {
        let classification = raw.classification.map(|name| -> Arc<dyn ErrorClassification> {
            match name.parse::<ErrorType>() {
                Ok(builtin) => Arc::new(builtin),
                Err(_) => Arc::new(NamedClassification::new(name)),
            }
        });
        Self {
            message: raw.message,
            locations: raw.locations,
            path: raw.path,
            extensions: raw.extensions,
            classification,
        }
    }
}

impl QueryError for InputError {
    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    fn locations(&self) -> Option<&[SourceLocation]> {
        self.locations.as_deref()
    }

    fn path(&self) -> Option<&[PathSegment]> {
        self.path.as_deref()
    }

    fn extensions(&self) -> Option<&Extensions> {
        self.extensions.as_ref()
    }

    fn classification(&self) -> Option<&dyn ErrorClassification> {
        self.classification.as_deref()
    }
}

canonical_identity!(InputError);

/// Parsed input: a single error or a list of them.
#[derive(Debug)]
pub enum Input {
    One(InputError),
    Many(Vec<InputError>),
}

impl Input {
    pub fn parse(value: Value) -> Result<Self> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| parse_one(item).with_context(|| format!("error #{i}")))
                .collect::<Result<Vec<_>>>()
                .map(Self::Many),
            other => parse_one(other).map(Self::One),
        }
    }

    /// Exactly one error, or a context-rich failure.
    pub fn into_single(self) -> Result<InputError> {
        match self {
            Self::One(error) => Ok(error),
            Self::Many(mut errors) if errors.len() == 1 => Ok(errors.remove(0)),
            Self::Many(errors) => anyhow::bail!("expected a single error, got {}", errors.len()),
        }
    }
}

fn parse_one(value: Value) -> Result<InputError> {
    let raw: RawQueryError =
        serde_json::from_value(value).context("input is not a query error object")?;
    Ok(raw.into())
}

/// Read JSON from `path`, or stdin when `path` is `None` or `-`.
pub fn read_input(path: Option<&Path>) -> Result<Input> {
    let text = match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };
    let value: Value = serde_json::from_str(&text).context("input is not valid JSON")?;
    Input::parse(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qerr_common::ErrorNormalizer;
    use serde_json::json;

    #[test]
    fn test_parse_single() {
        let input = Input::parse(json!({
            "message": "Validation error",
            "locations": [{"line": 3, "column": 9}],
            "path": ["user", "name"],
            "classification": "ValidationError"
        }))
        .unwrap();
        let error = input.into_single().unwrap();
        let spec = ErrorNormalizer::new().to_specification(&error).unwrap();
        assert_eq!(
            Value::Object(spec),
            json!({
                "message": "Validation error",
                "locations": [{"line": 3, "column": 9}],
                "path": ["user", "name"],
                "extensions": {"classification": "ValidationError"}
            })
        );
    }

    #[test]
    fn test_unknown_classification_is_named() {
        let error = Input::parse(json!({"message": "m", "classification": "RateLimited"}))
            .unwrap()
            .into_single()
            .unwrap();
        let key = error.classification().unwrap().key();
        assert_eq!(key.name(), "RateLimited");
        assert_ne!(key, ErrorType::ValidationError.key());
    }

    #[test]
    fn test_parse_many_reports_index() {
        let err = Input::parse(json!([{"message": "ok"}, {"message": 5}])).unwrap_err();
        assert!(format!("{err:#}").contains("error #1"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(Input::parse(json!({"message": "m", "severity": "high"})).is_err());
    }

    #[test]
    fn test_into_single_rejects_lists() {
        let input = Input::parse(json!([{"message": "a"}, {"message": "b"}])).unwrap();
        assert!(input.into_single().is_err());
    }

    #[test]
    fn test_input_identity_ignores_extensions() {
        let a = Input::parse(json!({"message": "m", "extensions": {"x": 1}}))
            .unwrap()
            .into_single()
            .unwrap();
        let b = Input::parse(json!({"message": "m"}))
            .unwrap()
            .into_single()
            .unwrap();
        assert_eq!(a, b);
    }
}
