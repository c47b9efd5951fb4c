//! JSON Schema checks for the three core blob kinds.
//! These catch shape problems (missing fields, wrong types) before the
//! blobs are converted into a catalog model.

use crate::constants::{SCHEMA_BUNDLE, SCHEMA_CHANNEL, SCHEMA_PACKAGE};
use crate::declcfg::DeclarativeConfig;
use crate::error::{Error, Result};
use log::debug;
use serde_json::{json, Value};

fn property_schema() -> Value {
    json!({
        "type": "object",
        "required": ["type", "value"],
        "properties": {
            "type": { "type": "string", "minLength": 1 }
        }
    })
}

/// Returns the embedded schema for a blob kind, if there is one.
pub fn schema_for(kind: &str) -> Option<Value> {
    let schema = match kind {
        SCHEMA_PACKAGE => json!({
            "type": "object",
            "required": ["schema", "name"],
            "properties": {
                "schema": { "const": SCHEMA_PACKAGE },
                "name": { "type": "string", "minLength": 1 },
                "defaultChannel": { "type": "string" },
                "description": { "type": "string" },
                "properties": { "type": "array", "items": property_schema() }
            }
        }),
        SCHEMA_CHANNEL => json!({
            "type": "object",
            "required": ["schema", "name", "package", "entries"],
            "properties": {
                "schema": { "const": SCHEMA_CHANNEL },
                "name": { "type": "string", "minLength": 1 },
                "package": { "type": "string", "minLength": 1 },
                "entries": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["name"],
                        "properties": {
                            "name": { "type": "string", "minLength": 1 },
                            "replaces": { "type": "string" },
                            "skips": { "type": "array", "items": { "type": "string" } },
                            "skipRange": { "type": "string" }
                        }
                    }
                },
                "properties": { "type": "array", "items": property_schema() }
            }
        }),
        SCHEMA_BUNDLE => json!({
            "type": "object",
            "required": ["schema", "name", "package", "image", "properties"],
            "properties": {
                "schema": { "const": SCHEMA_BUNDLE },
                "name": { "type": "string", "minLength": 1 },
                "package": { "type": "string", "minLength": 1 },
                "image": { "type": "string" },
                "properties": { "type": "array", "items": property_schema() },
                "relatedImages": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["image"],
                        "properties": {
                            "name": { "type": "string" },
                            "image": { "type": "string", "minLength": 1 }
                        }
                    }
                }
            }
        }),
        _ => return None,
    };
    Some(schema)
}

/// Checks a single blob; returns every violation found.
pub fn check_blob(blob: &Value) -> Result<Vec<String>> {
    let kind = blob.get("schema").and_then(Value::as_str).unwrap_or_default();
    let Some(schema) = schema_for(kind) else {
        debug!("No schema for blob kind '{kind}', skipping");
        return Ok(Vec::new());
    };

    let validator = jsonschema::validator_for(&schema)
        .map_err(|e| Error::SchemaError(format!("invalid embedded schema for {kind}: {e}")))?;
    let name = blob.get("name").and_then(Value::as_str).unwrap_or("<unnamed>");
    Ok(validator
        .iter_errors(blob)
        .map(|e| format!("{kind} '{name}': {e}"))
        .collect())
}

/// Checks every blob of the config against its schema.
///
/// # Errors
/// * `Error::SchemaError` listing all violations, one per line
pub fn check_config(cfg: &DeclarativeConfig) -> Result<()> {
    let mut violations = Vec::new();
    for blob in cfg.blobs()? {
        violations.extend(check_blob(&blob)?);
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(Error::SchemaError(violations.join("\n")))
    }
}
