//! Helper functions for reading schema keywords
//!
//! Each getter returns `Ok(None)` when the keyword is absent and an
//! `InvalidSchema` error pointing at the keyword when it has the wrong shape.

use crate::error::{SchemaError, SchemaPath, SchemaResult};
use indexmap::IndexMap;
use rup_yaml::Document;

pub(super) type Keywords = IndexMap<String, Document>;

pub(super) fn get_string<'a>(
    keywords: &'a Keywords,
    key: &str,
    location: &SchemaPath,
) -> SchemaResult<Option<&'a str>> {
    match keywords.get(key) {
        None => Ok(None),
        Some(Document::String(s)) => Ok(Some(s)),
        Some(_) => Err(SchemaError::invalid(
            format!("'{}' must be a string", key),
            &location.child(key),
        )),
    }
}

pub(super) fn get_number(
    keywords: &Keywords,
    key: &str,
    location: &SchemaPath,
) -> SchemaResult<Option<f64>> {
    match keywords.get(key) {
        None => Ok(None),
        Some(value) => value.as_f64().map(Some).ok_or_else(|| {
            SchemaError::invalid(format!("'{}' must be a number", key), &location.child(key))
        }),
    }
}

pub(super) fn get_usize(
    keywords: &Keywords,
    key: &str,
    location: &SchemaPath,
) -> SchemaResult<Option<usize>> {
    let Some(value) = keywords.get(key) else {
        return Ok(None);
    };
    if let Some(n) = value.as_number()
        && n.is_integer()
        && n.as_f64() >= 0.0
    {
        return Ok(Some(n.as_f64().min(usize::MAX as f64) as usize));
    }
    Err(SchemaError::invalid(
        format!("'{}' must be a non-negative integer", key),
        &location.child(key),
    ))
}

pub(super) fn get_bool(
    keywords: &Keywords,
    key: &str,
    location: &SchemaPath,
) -> SchemaResult<Option<bool>> {
    match keywords.get(key) {
        None => Ok(None),
        Some(Document::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(SchemaError::invalid(
            format!("'{}' must be a boolean", key),
            &location.child(key),
        )),
    }
}

pub(super) fn get_string_array(
    keywords: &Keywords,
    key: &str,
    location: &SchemaPath,
) -> SchemaResult<Option<Vec<String>>> {
    let Some(value) = keywords.get(key) else {
        return Ok(None);
    };
    let items = value.as_sequence().ok_or_else(|| {
        SchemaError::invalid(
            format!("'{}' must be an array of strings", key),
            &location.child(key),
        )
    })?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                SchemaError::invalid(
                    format!("'{}' must contain only strings", key),
                    &location.child(key).child(i.to_string()),
                )
            })
        })
        .collect::<SchemaResult<Vec<_>>>()
        .map(Some)
}

pub(super) fn get_array<'a>(
    keywords: &'a Keywords,
    key: &str,
    location: &SchemaPath,
) -> SchemaResult<Option<&'a [Document]>> {
    match keywords.get(key) {
        None => Ok(None),
        Some(value) => value.as_sequence().map(Some).ok_or_else(|| {
            SchemaError::invalid(format!("'{}' must be an array", key), &location.child(key))
        }),
    }
}

pub(super) fn get_mapping<'a>(
    keywords: &'a Keywords,
    key: &str,
    location: &SchemaPath,
) -> SchemaResult<Option<&'a Keywords>> {
    match keywords.get(key) {
        None => Ok(None),
        Some(value) => value.as_mapping().map(Some).ok_or_else(|| {
            SchemaError::invalid(format!("'{}' must be an object", key), &location.child(key))
        }),
    }
}

/// True if any of `keys` is present.
pub(super) fn has_any(keywords: &Keywords, keys: &[&str]) -> bool {
    keys.iter().any(|key| keywords.contains_key(*key))
}
