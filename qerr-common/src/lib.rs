//! Query error normalization and canonical identity.
//!
//! Errors raised anywhere in the query pipeline implement [`QueryError`].
//! [`ErrorNormalizer`] reshapes any of them into the response wire form and
//! provides the equality and hash used to deduplicate them.
//!
//! ```ignore
//! use qerr_common::{ErrorNormalizer, ErrorType, QueryErrorBuilder};
//!
//! let error = QueryErrorBuilder::new("Validation error")
//!     .location(3, 9)
//!     .path(["user", "name"])
//!     .classification(ErrorType::ValidationError)
//!     .build();
//! let spec = ErrorNormalizer::new().to_specification(&error)?;
//! ```

pub mod api;
pub mod classification;
pub mod config;
pub mod error;
pub mod kinds;
pub mod location;
pub mod logging;
pub mod normalizer;
pub mod path;

pub use classification::{
    ClassificationError, ClassificationKey, ErrorClassification, ErrorType, NamedClassification,
};
pub use error::{Extensions, QueryError};
pub use kinds::{
    AbortExecutionError, DataFetchingError, GenericQueryError, InvalidSyntaxError,
    NonNullableFieldError, QueryErrorBuilder, ValidationError,
};
pub use location::SourceLocation;
pub use logging::{LogConfig, LoggingGuards, init_logging};
pub use normalizer::{CanonicalError, ErrorNormalizer, MessagePolicy, equals, hash_code};
pub use path::PathSegment;
