//! Built-in error kinds.
//!
//! Each kind is its own concrete type so that canonical equality can tell
//! them apart even when every reported field matches. All of them get
//! `PartialEq`, `Eq` and `Hash` from [`canonical_identity!`].

use crate::canonical_identity;
use crate::classification::{ErrorClassification, ErrorType};
use crate::error::{Extensions, QueryError};
use crate::location::SourceLocation;
use crate::path::{PathSegment, display_path};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

// =============================================================================
// Generic errors
// =============================================================================

/// General-purpose error assembled with [`QueryErrorBuilder`].
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct GenericQueryError {
    message: String,
    locations: Option<Vec<SourceLocation>>,
    path: Option<Vec<PathSegment>>,
    extensions: Option<Extensions>,
    classification: Option<Arc<dyn ErrorClassification>>,
}

impl GenericQueryError {
    pub fn builder(message: impl Into<String>) -> QueryErrorBuilder {
        QueryErrorBuilder::new(message)
    }
}

impl QueryError for GenericQueryError {
    fn message(&self) -> Option<&str> {
        Some(&self.message)
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

/// Builder for [`GenericQueryError`].
///
/// The classification defaults to [`ErrorType::DataFetchingException`];
/// call [`without_classification`](Self::without_classification) to build
/// an unclassified error.
#[derive(Debug, Clone)]
pub struct QueryErrorBuilder {
    message: String,
    locations: Option<Vec<SourceLocation>>,
    path: Option<Vec<PathSegment>>,
    extensions: Option<Extensions>,
    classification: Option<Arc<dyn ErrorClassification>>,
}

impl QueryErrorBuilder {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: None,
            path: None,
            extensions: None,
            classification: Some(Arc::new(ErrorType::DataFetchingException)),
        }
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Append one location.
    #[must_use]
    pub fn location(mut self, line: u32, column: u32) -> Self {
        self.locations
            .get_or_insert_with(Vec::new)
            .push(SourceLocation::new(line, column));
        self
    }

    /// Replace all locations; an empty vector is kept as an empty list.
    #[must_use]
    pub fn locations(mut self, locations: Vec<SourceLocation>) -> Self {
        self.locations = Some(locations);
        self
    }

    #[must_use]
    pub fn path<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        self.path = Some(path.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn extension(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extensions
            .get_or_insert_with(Extensions::new)
            .insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = Some(extensions);
        self
    }

    #[must_use]
    pub fn classification<C: ErrorClassification + 'static>(mut self, classification: C) -> Self {
        self.classification = Some(Arc::new(classification));
        self
    }

    #[must_use]
    pub fn shared_classification(mut self, classification: Arc<dyn ErrorClassification>) -> Self {
        self.classification = Some(classification);
        self
    }

    #[must_use]
    pub fn without_classification(mut self) -> Self {
        self.classification = None;
        self
    }

    #[must_use]
    pub fn build(self) -> GenericQueryError {
        GenericQueryError {
            message: self.message,
            locations: self.locations,
            path: self.path,
            extensions: self.extensions,
            classification: self.classification,
        }
    }
}

// =============================================================================
// Parser errors
// =============================================================================

/// The query text could not be parsed.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct InvalidSyntaxError {
    message: String,
    locations: Vec<SourceLocation>,
    extensions: Option<Extensions>,
}

impl InvalidSyntaxError {
    pub fn new(detail: impl fmt::Display, locations: Vec<SourceLocation>) -> Self {
        Self {
            message: format!("Invalid syntax : {detail}"),
            locations,
            extensions: None,
        }
    }

    /// Record the token the parser stopped at.
    #[must_use]
    pub fn with_offending_token(mut self, token: impl Into<String>) -> Self {
        self.extensions
            .get_or_insert_with(Extensions::new)
            .insert("offendingToken".to_string(), Value::String(token.into()));
        self
    }
}

impl QueryError for InvalidSyntaxError {
    fn message(&self) -> Option<&str> {
        Some(&self.message)
    }

    fn locations(&self) -> Option<&[SourceLocation]> {
        Some(&self.locations)
    }

    fn extensions(&self) -> Option<&Extensions> {
        self.extensions.as_ref()
    }

    fn classification(&self) -> Option<&dyn ErrorClassification> {
        Some(&ErrorType::InvalidSyntax)
    }
}

// =============================================================================
// Validation errors
// =============================================================================

/// The query violates a validation rule.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ValidationError {
    rule: String,
    description: String,
    query_path: Vec<String>,
    locations: Vec<SourceLocation>,
    message: String,
}

impl ValidationError {
    pub fn new(rule: impl Into<String>, description: impl Into<String>) -> Self {
        let mut error = Self {
            rule: rule.into(),
            description: description.into(),
            query_path: Vec::new(),
            locations: Vec::new(),
            message: String::new(),
        };
        error.message = error.render_message();
        error
    }

    #[must_use]
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.locations.push(location);
        self
    }

    /// Set the path through the query document (not the result).
    #[must_use]
    pub fn with_query_path<I, S>(mut self, query_path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query_path = query_path.into_iter().map(Into::into).collect();
        self.message = self.render_message();
        self
    }

    #[must_use]
    pub fn rule(&self) -> &str {
        &self.rule
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn query_path(&self) -> &[String] {
        &self.query_path
    }

    fn render_message(&self) -> String {
        if self.query_path.is_empty() {
            format!("Validation error ({}) : {}", self.rule, self.description)
        } else {
            format!(
                "Validation error ({}@[{}]) : {}",
                self.rule,
                self.query_path.join("/"),
                self.description
            )
        }
    }
}

impl QueryError for ValidationError {
    fn message(&self) -> Option<&str> {
        Some(&self.message)
    }

    fn locations(&self) -> Option<&[SourceLocation]> {
        Some(&self.locations)
    }

    fn classification(&self) -> Option<&dyn ErrorClassification> {
        Some(&ErrorType::ValidationError)
    }
}

// =============================================================================
// Execution errors
// =============================================================================

/// A resolver failed while fetching the value at `path`.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct DataFetchingError {
    message: String,
    path: Vec<PathSegment>,
    locations: Option<Vec<SourceLocation>>,
    extensions: Option<Extensions>,
}

impl DataFetchingError {
    pub fn new(path: Vec<PathSegment>, cause: impl fmt::Display) -> Self {
        Self {
            message: format!(
                "Exception while fetching data ({}) : {cause}",
                display_path(&path)
            ),
            path,
            locations: None,
            extensions: None,
        }
    }

    #[must_use]
    pub fn with_locations(mut self, locations: Vec<SourceLocation>) -> Self {
        self.locations = Some(locations);
        self
    }

    /// Attach resolver-supplied extensions.
    #[must_use]
    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = Some(extensions);
        self
    }
}

impl QueryError for DataFetchingError {
    fn message(&self) -> Option<&str> {
        Some(&self.message)
    }

    fn locations(&self) -> Option<&[SourceLocation]> {
        self.locations.as_deref()
    }

    fn path(&self) -> Option<&[PathSegment]> {
        Some(&self.path)
    }

    fn extensions(&self) -> Option<&Extensions> {
        self.extensions.as_ref()
    }

    fn classification(&self) -> Option<&dyn ErrorClassification> {
        Some(&ErrorType::DataFetchingException)
    }
}

/// A field declared non-null resolved to null.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct NonNullableFieldError {
    message: String,
    path: Vec<PathSegment>,
}

impl NonNullableFieldError {
    pub fn new(path: Vec<PathSegment>, type_name: &str, parent_type: &str) -> Self {
        Self {
            message: format!(
                "The field at path '{}' was declared as a non null type, but the code involved \
                 in retrieving data has wrongly returned a null value. The non-nullable type is \
                 '{type_name}' within parent type '{parent_type}'",
                display_path(&path)
            ),
            path,
        }
    }
}

impl QueryError for NonNullableFieldError {
    fn message(&self) -> Option<&str> {
        Some(&self.message)
    }

    fn path(&self) -> Option<&[PathSegment]> {
        Some(&self.path)
    }

    fn classification(&self) -> Option<&dyn ErrorClassification> {
        Some(&ErrorType::NullValueInNonNullableField)
    }
}

/// Execution stopped before completion.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AbortExecutionError {
    message: String,
    extensions: Option<Extensions>,
}

impl AbortExecutionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            extensions: None,
        }
    }

    #[must_use]
    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = Some(extensions);
        self
    }
}

impl QueryError for AbortExecutionError {
    fn message(&self) -> Option<&str> {
        Some(&self.message)
    }

    fn extensions(&self) -> Option<&Extensions> {
        self.extensions.as_ref()
    }

    fn classification(&self) -> Option<&dyn ErrorClassification> {
        Some(&ErrorType::ExecutionAborted)
    }
}

canonical_identity!(
    GenericQueryError,
    InvalidSyntaxError,
    ValidationError,
    DataFetchingError,
    NonNullableFieldError,
    AbortExecutionError,
);
