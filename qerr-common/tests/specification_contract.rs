//! Wire-form contract tests for normalized query errors.
//!
//! Covers:
//!   - exact output of the documented scenarios
//!   - key presence rules for absent/empty fields
//!   - classification merge into extensions
//!   - third-party error types plugged in through the public traits

use qerr_common::api::ErrorSpecification;
use qerr_common::classification::{ClassificationError, ClassificationKey, ErrorClassification};
use qerr_common::{
    DataFetchingError, ErrorNormalizer, ErrorType, Extensions, MessagePolicy, NamedClassification,
    PathSegment, QueryError, QueryErrorBuilder, SourceLocation, canonical_identity, equals,
    hash_code,
};
use serde_json::{Value, json};

/// Error type defined outside the crate, as a resolver library would.
#[derive(Debug, Clone)]
struct UpstreamError {
    service: String,
    message: Option<String>,
    path: Option<Vec<PathSegment>>,
    extensions: Option<Extensions>,
}

impl QueryError for UpstreamError {
    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    fn path(&self) -> Option<&[PathSegment]> {
        self.path.as_deref()
    }

    fn extensions(&self) -> Option<&Extensions> {
        self.extensions.as_ref()
    }

    fn classification(&self) -> Option<&dyn ErrorClassification> {
        Some(&UpstreamClassification)
    }
}

canonical_identity!(UpstreamError);

#[derive(Debug)]
struct UpstreamClassification;

impl ErrorClassification for UpstreamClassification {
    fn key(&self) -> ClassificationKey {
        ClassificationKey::of::<Self>("Upstream")
    }

    fn to_specification(&self, error: &dyn QueryError) -> Result<Value, ClassificationError> {
        let path_len = error.path().map_or(0, <[PathSegment]>::len);
        Ok(json!({"kind": "Upstream", "depth": path_len}))
    }
}

fn normalize(error: &dyn QueryError) -> Value {
    Value::Object(ErrorNormalizer::new().to_specification(error).unwrap())
}

// ===========================================================================
// 1. Documented scenarios
// ===========================================================================

#[test]
fn e2e_validation_scenario_exact_bytes() {
    let error = QueryErrorBuilder::new("Validation error")
        .location(3, 9)
        .path(["user", "name"])
        .without_classification()
        .build();
    let spec = ErrorNormalizer::new().to_specification(&error).unwrap();
    assert_eq!(
        serde_json::to_string(&spec).unwrap(),
        r#"{"message":"Validation error","locations":[{"line":3,"column":9}],"path":["user","name"]}"#
    );
}

#[test]
fn e2e_validation_scenario_with_classification_exact_bytes() {
    let error = QueryErrorBuilder::new("Validation error")
        .location(3, 9)
        .path(["user", "name"])
        .classification(ErrorType::ValidationError)
        .build();
    let spec = ErrorNormalizer::new().to_specification(&error).unwrap();
    assert_eq!(
        serde_json::to_string(&spec).unwrap(),
        r#"{"message":"Validation error","locations":[{"line":3,"column":9}],"path":["user","name"],"extensions":{"classification":"ValidationError"}}"#
    );
}

// ===========================================================================
// 2. Key presence
// ===========================================================================

#[test]
fn e2e_message_only_error_has_single_key() {
    let error = QueryErrorBuilder::new("only message")
        .without_classification()
        .build();
    assert_eq!(normalize(&error), json!({"message": "only message"}));
}

#[test]
fn e2e_empty_locations_are_not_omitted() {
    let error = QueryErrorBuilder::new("m")
        .locations(Vec::new())
        .without_classification()
        .build();
    assert_eq!(normalize(&error), json!({"message": "m", "locations": []}));
}

#[test]
fn e2e_classification_synthesizes_extensions() {
    let error = QueryErrorBuilder::new("m")
        .classification(ErrorType::OperationNotSupported)
        .build();
    assert_eq!(
        normalize(&error),
        json!({"message": "m", "extensions": {"classification": "OperationNotSupported"}})
    );
}

#[test]
fn e2e_absent_message_with_omit_policy() {
    let error = UpstreamError {
        service: "billing".to_string(),
        message: None,
        path: None,
        extensions: None,
    };
    let spec = ErrorNormalizer::new()
        .with_message_policy(MessagePolicy::OmitAbsent)
        .to_specification(&error)
        .unwrap();
    assert!(!spec.contains_key("message"));
    assert!(spec.contains_key("extensions"));
}

// ===========================================================================
// 3. Classification merge
// ===========================================================================

#[test]
fn e2e_preexisting_classification_entry_preserved() {
    let error = QueryErrorBuilder::new("m")
        .extension("classification", json!("FromResolver"))
        .classification(ErrorType::DataFetchingException)
        .build();
    assert_eq!(
        normalize(&error)["extensions"],
        json!({"classification": "FromResolver"})
    );
}

#[test]
fn e2e_classification_can_depend_on_error() {
    let error = UpstreamError {
        service: "inventory".to_string(),
        message: Some("stock lookup failed".to_string()),
        path: Some(vec![PathSegment::field("product"), PathSegment::field("stock")]),
        extensions: None,
    };
    assert_eq!(
        normalize(&error)["extensions"]["classification"],
        json!({"kind": "Upstream", "depth": 2})
    );
}

#[test]
fn e2e_output_parses_as_typed_specification() {
    let error = DataFetchingError::new(vec![PathSegment::field("orders"), PathSegment::index(7)], "db down")
        .with_locations(vec![SourceLocation::new(2, 3)]);
    let spec = ErrorNormalizer::new().to_specification(&error).unwrap();
    let typed = ErrorSpecification::try_from(spec).unwrap();
    assert_eq!(typed.path.as_ref().map(Vec::len), Some(2));
    assert_eq!(typed.classification(), Some(&json!("DataFetchingException")));
}

// ===========================================================================
// 4. Identity across kinds
// ===========================================================================

#[test]
fn e2e_external_type_identity_ignores_extensions_and_service() {
    let mut ext = Extensions::new();
    ext.insert("retry_after".to_string(), json!(30));
    let a = UpstreamError {
        service: "billing".to_string(),
        message: Some("timeout".to_string()),
        path: Some(vec![PathSegment::field("invoice")]),
        extensions: Some(ext),
    };
    let b = UpstreamError {
        extensions: None,
        ..a.clone()
    };
    assert_eq!(a, b);
    assert_eq!(hash_code(&a), hash_code(&b));
    assert_eq!(a.service, "billing");
}

#[test]
fn e2e_external_and_builtin_kinds_never_equal() {
    let upstream = UpstreamError {
        service: "s".to_string(),
        message: Some("m".to_string()),
        path: None,
        extensions: None,
    };
    let generic = QueryErrorBuilder::new("m")
        .classification(NamedClassification::new("Upstream"))
        .build();
    assert!(!equals(&upstream, &generic));
    assert!(!equals(&generic, &upstream));
}
