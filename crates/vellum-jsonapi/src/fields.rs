//! Sparse-fieldset filtering.
//!
//! Parses the `fields[{type}]` query parameters and restricts the
//! `attributes` of every resource object in an assembled document to the
//! requested names. Filtering is all-or-nothing: if any requested field
//! does not exist on an entry of its type, the whole response is replaced
//! by a 400 error document enumerating every offending field.

use http::StatusCode;
use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use vellum_core::{ApiError, EngineError, EngineResult, HttpError, Request};

/// Machine code reported for invalid `fields[...]` entries.
pub const CODE_INVALID_QUERY_FIELDS: &str = "INVALID_FIELD_QUERY_PARAM";

fn fields_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^fields\[(\w+)\]$").expect("static regex"))
}

/// Extracts the requested fields per type from a request's query
/// parameters.
#[must_use]
pub fn parse_query_fields(req: &Request) -> IndexMap<String, Vec<String>> {
    let mut result = IndexMap::new();
    for (name, values) in &req.query_params {
        if let Some(captures) = fields_regex().captures(name) {
            if let Some(type_name) = captures.get(1) {
                result.insert(type_name.as_str().to_string(), values.clone());
            }
        }
    }
    result
}

/// Applies sparse-fieldset filtering to an assembled document in place.
///
/// The singular `data` object, each entry of a `data` array, and each entry
/// of an `included` array are filtered independently by their own `type`
/// member. Entries without a `type` or without `attributes` pass through
/// untouched.
pub fn filter_sparse_fields(
    document: &mut Value,
    fields: &IndexMap<String, Vec<String>>,
) -> EngineResult<()> {
    if fields.is_empty() {
        return Ok(());
    }
    let Some(content) = document.as_object_mut() else {
        return Ok(());
    };

    let mut wrong: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut record = |invalid: IndexMap<String, Vec<String>>| {
        for (type_name, fields) in invalid {
            let entry = wrong.entry(type_name).or_default();
            for field in fields {
                if !entry.contains(&field) {
                    entry.push(field);
                }
            }
        }
    };

    match content.get_mut("data") {
        Some(Value::Object(data)) => record(replace_attributes(fields, data)),
        Some(Value::Array(entries)) => {
            for entry in entries.iter_mut().filter_map(Value::as_object_mut) {
                record(replace_attributes(fields, entry));
            }
        }
        _ => {}
    }
    if let Some(Value::Array(included)) = content.get_mut("included") {
        for entry in included.iter_mut().filter_map(Value::as_object_mut) {
            record(replace_attributes(fields, entry));
        }
    }

    if wrong.is_empty() {
        return Ok(());
    }

    let mut errors = Vec::new();
    for (type_name, fields) in &wrong {
        for field in fields {
            errors.push(
                ApiError::new(
                    StatusCode::BAD_REQUEST,
                    format!(r#"Field "{field}" does not exist for type "{type_name}""#),
                )
                .with_code(CODE_INVALID_QUERY_FIELDS)
                .with_detail("Please make sure you do only request existing fields")
                .with_parameter(format!("fields[{type_name}]")),
            );
        }
    }
    Err(EngineError::Http(HttpError::with_errors(
        StatusCode::BAD_REQUEST,
        "Some requested fields were invalid",
        errors,
    )))
}

/// Filters one resource object's `attributes` by the fields requested for
/// its type, returning the requested names that do not exist.
fn replace_attributes(
    fields: &IndexMap<String, Vec<String>>,
    entry: &mut serde_json::Map<String, Value>,
) -> IndexMap<String, Vec<String>> {
    let Some(type_name) = entry.get("type").and_then(Value::as_str).map(str::to_string) else {
        return IndexMap::new();
    };
    let Some(requested) = fields.get(&type_name).filter(|f| !f.is_empty()) else {
        return IndexMap::new();
    };
    let Some(Value::Object(attributes)) = entry.get_mut("attributes") else {
        return IndexMap::new();
    };

    let mut filtered = serde_json::Map::new();
    let mut missing = Vec::new();
    for field in requested {
        match attributes.get(field) {
            Some(value) => {
                filtered.insert(field.clone(), value.clone());
            }
            None => missing.push(field.clone()),
        }
    }
    *attributes = filtered;

    if missing.is_empty() {
        IndexMap::new()
    } else {
        let mut wrong = IndexMap::new();
        wrong.insert(type_name, missing);
        wrong
    }
}
