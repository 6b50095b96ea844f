//! JSON parsing into [`Document`] with duplicate-key detection.
//!
//! `serde_json::Value` silently keeps the last of two equal keys, so objects
//! are first collected as entry lists and checked while converting.

use crate::document::{Document, Number};
use crate::error::{LoadError, Result};
use crate::loader::LoadOptions;
use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::de::{Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use std::fmt;

/// JSON value with object entries in source order, duplicates included.
enum RawJson {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<RawJson>),
    Object(Vec<(String, RawJson)>),
}

impl<'de> Deserialize<'de> for RawJson {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(RawJsonVisitor)
    }
}

struct RawJsonVisitor;

impl<'de> Visitor<'de> for RawJsonVisitor {
    type Value = RawJson;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_unit<E>(self) -> std::result::Result<RawJson, E> {
        Ok(RawJson::Null)
    }

    fn visit_bool<E>(self, v: bool) -> std::result::Result<RawJson, E> {
        Ok(RawJson::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> std::result::Result<RawJson, E> {
        Ok(RawJson::Number(Number::Int(v)))
    }

    fn visit_u64<E>(self, v: u64) -> std::result::Result<RawJson, E> {
        Ok(RawJson::Number(Number::from_u64(v)))
    }

    fn visit_f64<E: serde::de::Error>(self, v: f64) -> std::result::Result<RawJson, E> {
        Number::from_f64(v)
            .map(RawJson::Number)
            .ok_or_else(|| E::custom("number is out of range"))
    }

    fn visit_str<E>(self, v: &str) -> std::result::Result<RawJson, E> {
        Ok(RawJson::String(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> std::result::Result<RawJson, E> {
        Ok(RawJson::String(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<RawJson, A::Error> {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(RawJson::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<RawJson, A::Error> {
        let mut entries = Vec::new();
        while let Some((key, value)) = map.next_entry::<String, RawJson>()? {
            entries.push((key, value));
        }
        Ok(RawJson::Object(entries))
    }
}

/// Parse a JSON text. Trailing content after the value is an error.
pub(crate) fn parse_json(content: &str, options: &LoadOptions) -> Result<Document> {
    let raw: RawJson = serde_json::from_str(content).map_err(|err| LoadError::MalformedSyntax {
        message: format!("invalid JSON: {}", strip_position(&err)),
        line: Some(err.line()),
        column: Some(err.column()),
    })?;
    convert(raw, &mut Vec::new(), options)
}

/// Position within the document being converted, for error messages.
enum Step {
    Key(String),
    Index(usize),
}

fn convert(raw: RawJson, path: &mut Vec<Step>, options: &LoadOptions) -> Result<Document> {
    match raw {
        RawJson::Null => Ok(Document::Null),
        RawJson::Bool(b) => Ok(Document::Bool(b)),
        RawJson::Number(n) => Ok(Document::Number(n)),
        RawJson::String(s) => Ok(Document::String(s)),
        RawJson::Array(items) => {
            check_depth(path, options)?;
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                path.push(Step::Index(index));
                out.push(convert(item, path, options)?);
                path.pop();
            }
            Ok(Document::Sequence(out))
        }
        RawJson::Object(entries) => {
            check_depth(path, options)?;
            let mut out = IndexMap::with_capacity(entries.len());
            for (key, value) in entries {
                match out.entry(key) {
                    Entry::Occupied(entry) => {
                        return Err(LoadError::DuplicateKey {
                            key: entry.key().clone(),
                            path: render_path(path),
                        });
                    }
                    Entry::Vacant(entry) => {
                        path.push(Step::Key(entry.key().clone()));
                        let converted = convert(value, path, options)?;
                        path.pop();
                        entry.insert(converted);
                    }
                }
            }
            Ok(Document::Mapping(out))
        }
    }
}

fn check_depth(path: &[Step], options: &LoadOptions) -> Result<()> {
    if path.len() + 1 > options.max_nesting {
        return Err(LoadError::NestingLimitExceeded {
            limit: options.max_nesting,
        });
    }
    Ok(())
}

fn render_path(path: &[Step]) -> String {
    if path.is_empty() {
        return "(root)".to_string();
    }
    let mut out = String::new();
    for step in path {
        match step {
            Step::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            Step::Index(index) => out.push_str(&format!("[{}]", index)),
        }
    }
    out
}

/// serde_json appends " at line L column C"; the location is kept separately.
fn strip_position(err: &serde_json::Error) -> String {
    let text = err.to_string();
    match text.rfind(" at line ") {
        Some(pos) => text[..pos].to_string(),
        None => text,
    }
}
