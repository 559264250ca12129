//! The query error capability.
//!
//! Every error produced by the parser, validator or executor implements
//! [`QueryError`]. The normalizer only ever reads errors through this trait.

use crate::classification::ErrorClassification;
use crate::location::SourceLocation;
use crate::path::PathSegment;
use serde_json::{Map, Value};
use std::any::Any;
use std::fmt;

/// Open side-channel metadata attached to an error.
pub type Extensions = Map<String, Value>;

/// Access to the concrete type behind a trait object.
///
/// Blanket-implemented for every `'static` type; implementors of
/// [`QueryError`] never write this by hand.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Read-only view of a query error.
///
/// All accessors are optional; an error reporting none of them is still a
/// valid error.
pub trait QueryError: AsAny + fmt::Debug + Send + Sync {
    fn message(&self) -> Option<&str>;

    fn locations(&self) -> Option<&[SourceLocation]> {
        None
    }

    fn path(&self) -> Option<&[PathSegment]> {
        None
    }

    fn extensions(&self) -> Option<&Extensions> {
        None
    }

    fn classification(&self) -> Option<&dyn ErrorClassification> {
        None
    }
}

impl fmt::Display for dyn QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message().unwrap_or("<no message>"))
    }
}
