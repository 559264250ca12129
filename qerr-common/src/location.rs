//! Source locations and their wire form.
//!
//! A location points into the original query text. The wire form is a
//! two-key object `{"line": .., "column": ..}` in that key order.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A 1-based `(line, column)` position in query text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Map a location sequence into its wire form, one entry per input, in order.
///
/// Callers only invoke this when the error actually carries locations; an
/// empty slice yields an empty array.
#[must_use]
pub fn locations_to_specification(locations: &[SourceLocation]) -> Value {
    Value::Array(locations.iter().map(location_to_specification).collect())
}

#[must_use]
pub fn location_to_specification(location: &SourceLocation) -> Value {
    let mut map = Map::with_capacity(2);
    map.insert("line".to_string(), Value::from(location.line));
    map.insert("column".to_string(), Value::from(location.column));
    Value::Object(map)
}
