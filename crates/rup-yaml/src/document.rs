//! The document tree produced by the loader.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;

/// Longest rendering produced by [`Document::shape`] for a scalar.
const SHAPE_MAX_CHARS: usize = 64;

/// A loaded YAML or JSON value.
///
/// Mappings preserve insertion order and never contain duplicate keys (the
/// loader rejects them). Equality is structural and follows JSON Schema's
/// notion of equal instances: numbers compare numerically and mapping
/// equality does not depend on key order.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<Document>),
    Mapping(IndexMap<String, Document>),
}

/// A finite number.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    /// Only used for values above `i64::MAX`.
    UInt(u64),
    Float(f64),
}

impl Number {
    /// Create a float, rejecting NaN and infinities.
    pub fn from_f64(value: f64) -> Option<Number> {
        value.is_finite().then_some(Number::Float(value))
    }

    pub fn from_u64(value: u64) -> Number {
        match i64::try_from(value) {
            Ok(i) => Number::Int(i),
            Err(_) => Number::UInt(value),
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(i) => i as f64,
            Number::UInt(u) => u as f64,
            Number::Float(f) => f,
        }
    }

    /// True for integers and for floats without a fractional part.
    pub fn is_integer(&self) -> bool {
        match *self {
            Number::Int(_) | Number::UInt(_) => true,
            Number::Float(f) => f.fract() == 0.0,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (Number::UInt(a), Number::UInt(b)) => a == b,
            (Number::Int(_), Number::UInt(_)) | (Number::UInt(_), Number::Int(_)) => false,
            (a, b) => a.as_f64() == b.as_f64(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::UInt(u) => write!(f, "{}", u),
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Number::Int(i) => serializer.serialize_i64(i),
            Number::UInt(u) => serializer.serialize_u64(u),
            Number::Float(f) => serializer.serialize_f64(f),
        }
    }
}

impl Document {
    /// JSON Schema type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Document::Null => "null",
            Document::Bool(_) => "boolean",
            Document::Number(n) if n.is_integer() => "integer",
            Document::Number(_) => "number",
            Document::String(_) => "string",
            Document::Sequence(_) => "array",
            Document::Mapping(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Document::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Document::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Document::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(|n| n.as_f64())
    }

    /// True for integers and for floats with no fractional part.
    pub fn is_integer(&self) -> bool {
        self.as_number().is_some_and(|n| n.is_integer())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Document::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Document]> {
        match self {
            Document::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, Document>> {
        match self {
            Document::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a key when this value is a mapping.
    pub fn get(&self, key: &str) -> Option<&Document> {
        self.as_mapping().and_then(|entries| entries.get(key))
    }

    /// A short description of this value, safe to embed in messages.
    ///
    /// Scalars are rendered JSON-style and truncated; containers are
    /// summarized by their size so that a report never copies a large
    /// subtree of the input.
    pub fn shape(&self) -> String {
        match self {
            Document::Null => "null".to_string(),
            Document::Bool(b) => b.to_string(),
            Document::Number(n) => n.to_string(),
            Document::String(s) => {
                let quoted = serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s));
                truncate_chars(&quoted, SHAPE_MAX_CHARS)
            }
            Document::Sequence(items) => match items.len() {
                1 => "array with 1 item".to_string(),
                n => format!("array with {} items", n),
            },
            Document::Mapping(entries) => match entries.len() {
                1 => "object with 1 property".to_string(),
                n => format!("object with {} properties", n),
            },
        }
    }

    /// Convert into a `serde_json::Value`, preserving key order.
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            Document::Null => serde_json::Value::Null,
            Document::Bool(b) => serde_json::Value::Bool(*b),
            Document::Number(Number::Int(i)) => serde_json::Value::from(*i),
            Document::Number(Number::UInt(u)) => serde_json::Value::from(*u),
            Document::Number(Number::Float(f)) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Document::String(s) => serde_json::Value::String(s.clone()),
            Document::Sequence(items) => {
                serde_json::Value::Array(items.iter().map(Document::to_json_value).collect())
            }
            Document::Mapping(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json_value()))
                    .collect(),
            ),
        }
    }
}

impl From<&serde_json::Value> for Document {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Document::Null,
            serde_json::Value::Bool(b) => Document::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Document::Number(Number::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Document::Number(Number::from_u64(u))
                } else {
                    // serde_json only produces finite floats
                    Document::Number(Number::Float(n.as_f64().unwrap_or_default()))
                }
            }
            serde_json::Value::String(s) => Document::String(s.clone()),
            serde_json::Value::Array(items) => {
                Document::Sequence(items.iter().map(Document::from).collect())
            }
            serde_json::Value::Object(entries) => Document::Mapping(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Document::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Document {
    fn from(value: serde_json::Value) -> Self {
        Document::from(&value)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Document::Null => serializer.serialize_unit(),
            Document::Bool(b) => serializer.serialize_bool(*b),
            Document::Number(n) => n.serialize(serializer),
            Document::String(s) => serializer.serialize_str(s),
            Document::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Document::Mapping(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_names() {
        assert_eq!(Document::Null.type_name(), "null");
        assert_eq!(Document::Number(Number::Int(3)).type_name(), "integer");
        assert_eq!(Document::Number(Number::Float(3.0)).type_name(), "integer");
        assert_eq!(Document::Number(Number::Float(3.5)).type_name(), "number");
        assert_eq!(Document::from(json!({"a": 1})).type_name(), "object");
        assert_eq!(Document::from(json!([1])).type_name(), "array");
        assert!(Document::Number(Number::Float(2.0)).is_integer());
        assert!(!Document::from(json!("2")).is_integer());
    }

    #[test]
    fn test_numbers_compare_numerically() {
        assert_eq!(Number::Int(1), Number::Float(1.0));
        assert_ne!(Number::Int(1), Number::Float(1.5));
        assert_ne!(Number::Int(-1), Number::UInt(u64::MAX));
        assert_eq!(Number::from_u64(7), Number::Int(7));
        assert!(Number::from_f64(f64::NAN).is_none());
        assert!(Number::from_f64(f64::INFINITY).is_none());
    }

    #[test]
    fn test_mapping_equality_ignores_order() {
        let a = Document::from(json!({"x": 1, "y": 2}));
        let b = Document::from(json!({"y": 2, "x": 1}));
        assert_eq!(a, b);
    }

    #[test]
    fn test_shape_is_bounded() {
        let long = "x".repeat(500);
        let shape = Document::String(long).shape();
        assert_eq!(shape.chars().count(), SHAPE_MAX_CHARS);
        assert!(shape.ends_with("..."));

        assert_eq!(Document::String("hi".into()).shape(), "\"hi\"");
        assert_eq!(Document::from(json!([1, 2])).shape(), "array with 2 items");
        assert_eq!(Document::from(json!({"a": 1})).shape(), "object with 1 property");
    }

    #[test]
    fn test_json_conversion_preserves_order() {
        let doc = Document::from(json!({"b": 1, "a": [true, null, "s"]}));
        let keys: Vec<_> = doc.as_mapping().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(doc.to_json_value(), json!({"b": 1, "a": [true, null, "s"]}));
    }

    #[test]
    fn test_serialize_matches_json_value() {
        let doc = Document::from(json!({"n": 1.5, "u": 18446744073709551615u64}));
        let text = serde_json::to_string(&doc).unwrap();
        assert_eq!(text, r#"{"n":1.5,"u":18446744073709551615}"#);
    }
}
