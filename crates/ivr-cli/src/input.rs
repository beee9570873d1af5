//! JSON input files for the `resolve` command.
//!
//! The calling system owns these formats; the engine itself never reads
//! files other than the alias corpus and policy.

use std::path::Path;

use anyhow::{Context, Result, bail};
use ivr_model::{
    FieldMapping, OcrExtractionResult, OcrLabel, SourceField, SourceValue, TargetField,
    TargetFieldCatalog,
};
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogInput {
    Catalog(TargetFieldCatalog),
    Fields(Vec<TargetField>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredInput {
    Mappings(Vec<FieldMapping>),
    Manual(serde_json::Map<String, Value>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OcrInput {
    Result(OcrExtractionResult),
    Labels(Vec<OcrLabel>),
}

/// Reads a file and parses it with `parse`, naming the file on failure.
pub fn read_with<T>(path: &Path, parse: impl FnOnce(&str) -> Result<T>) -> Result<T> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse(&content).with_context(|| format!("parse {}", path.display()))
}

/// Source fields from a JSON object of key to value, in document order.
/// `null` values are skipped. An array of `{key, value}` objects is also
/// accepted.
pub fn parse_sources(json: &str) -> Result<Vec<SourceField>> {
    let value: Value = serde_json::from_str(json).context("invalid JSON")?;
    match value {
        Value::Object(map) => {
            let mut fields = Vec::with_capacity(map.len());
            for (key, value) in map {
                if let Some(value) = source_value(&key, value)? {
                    fields.push(SourceField { key, value });
                }
            }
            Ok(fields)
        }
        Value::Array(_) => serde_json::from_value(value).context("invalid source field list"),
        other => bail!("expected an object of source fields, found {}", kind(&other)),
    }
}

fn source_value(key: &str, value: Value) -> Result<Option<SourceValue>> {
    Ok(match value {
        Value::Null => None,
        Value::Bool(flag) => Some(SourceValue::Bool(flag)),
        Value::Number(number) => match number.as_f64() {
            Some(number) => Some(SourceValue::Number(number)),
            None => bail!("source field '{key}' has a number outside the f64 range"),
        },
        Value::String(text) => Some(SourceValue::String(text)),
        Value::Array(items) => {
            let mut list = Vec::with_capacity(items.len());
            for item in items {
                if let Some(item) = source_value(key, item)? {
                    list.push(item);
                }
            }
            Some(SourceValue::List(list))
        }
        Value::Object(_) => bail!("source field '{key}' holds an object; expected a scalar or array"),
    })
}

/// A catalog object with `fields`, or a bare array of fields.
pub fn parse_catalog(json: &str) -> Result<TargetFieldCatalog> {
    let input: CatalogInput = serde_json::from_str(json).context("invalid target catalog")?;
    Ok(match input {
        CatalogInput::Catalog(catalog) => TargetFieldCatalog::new(catalog.template_id, catalog.fields),
        CatalogInput::Fields(fields) => TargetFieldCatalog::new(None, fields),
    })
}

/// Stored mappings as a list of mapping objects, or an object of source key
/// to target name (manual mappings).
pub fn parse_stored(json: &str) -> Result<Vec<FieldMapping>> {
    let input: StoredInput = serde_json::from_str(json).context("invalid stored mappings")?;
    match input {
        StoredInput::Mappings(mappings) => {
            if let Some(bad) = mappings.iter().find(|m| !m.is_consistent()) {
                bail!("stored mapping for '{}' is inconsistent", bad.source_key);
            }
            Ok(mappings)
        }
        StoredInput::Manual(map) => map
            .into_iter()
            .map(|(key, target)| match target {
                Value::String(target) => Ok(FieldMapping::manual(key, target)),
                other => bail!("stored target for '{key}' must be a string, found {}", kind(&other)),
            })
            .collect(),
    }
}

/// An OCR result object, or a bare array of labels.
pub fn parse_ocr(json: &str) -> Result<OcrExtractionResult> {
    let input: OcrInput = serde_json::from_str(json).context("invalid OCR result")?;
    Ok(match input {
        OcrInput::Result(result) => result,
        OcrInput::Labels(labels) => OcrExtractionResult::new(labels),
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
