//! JSON Schema generation for the error wire form.
//!
//! # Generated Files
//!
//! - `error-specification.schema.json` - schema of one normalized error
//! - `classifications.json` - machine-readable built-in classification catalog

use super::{ErrorSpecification, SCHEMA_VERSION};
use crate::classification::ErrorType;
use schemars::schema::RootSchema;
use schemars::schema_for;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Generate JSON Schema for a normalized error.
#[must_use]
pub fn generate_error_specification_schema() -> RootSchema {
    schema_for!(ErrorSpecification)
}

/// Machine-readable classification entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationEntry {
    /// Name as it appears under `extensions.classification`.
    pub name: String,
    /// What the classification means.
    pub description: String,
}

/// Catalog of built-in classifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationCatalog {
    pub schema_version: String,
    pub classifications: Vec<ClassificationEntry>,
}

#[must_use]
pub fn generate_classification_catalog() -> ClassificationCatalog {
    ClassificationCatalog {
        schema_version: SCHEMA_VERSION.to_string(),
        classifications: ErrorType::all()
            .iter()
            .map(|t| ClassificationEntry {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect(),
    }
}

/// Schema export result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaExportResult {
    pub files_generated: usize,
    pub files: Vec<String>,
    pub output_dir: String,
}

/// Write all schema documents into `output_dir`, creating it if needed.
///
/// # Errors
///
/// Returns error if directory creation or file writing fails.
pub fn export_schemas(output_dir: &Path) -> std::io::Result<SchemaExportResult> {
    use std::fs;

    fs::create_dir_all(output_dir)?;

    let mut files = Vec::new();

    let schema_path = output_dir.join("error-specification.schema.json");
    fs::write(
        &schema_path,
        serde_json::to_string_pretty(&generate_error_specification_schema())?,
    )?;
    files.push(schema_path.display().to_string());

    let catalog_path = output_dir.join("classifications.json");
    fs::write(
        &catalog_path,
        serde_json::to_string_pretty(&generate_classification_catalog())?,
    )?;
    files.push(catalog_path.display().to_string());

    debug!(dir = %output_dir.display(), count = files.len(), "exported schemas");

    Ok(SchemaExportResult {
        files_generated: files.len(),
        files,
        output_dir: output_dir.display().to_string(),
    })
}
