//! Schema type definitions
//!
//! Each struct holds the constraints of one kind of schema node in the
//! supported JSON Schema subset. Nodes are compiled once from the schema
//! document and are read-only afterwards.

use indexmap::IndexMap;
use regex::Regex;
use rup_yaml::Document;
use std::fmt;

use super::Schema;
use crate::error::SchemaPath;

/// Object schema
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSchema {
    /// In declaration order.
    pub properties: IndexMap<String, Schema>,
    pub required: Vec<String>,
    pub additional_properties: AdditionalProperties,
    pub min_properties: Option<usize>,
    pub max_properties: Option<usize>,
    /// `false` when the kind was inferred from keywords; non-objects then pass.
    pub type_declared: bool,
}

/// Treatment of keys not listed in `properties`.
#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalProperties {
    Allowed,
    Forbidden,
    Schema(Box<Schema>),
}

/// Array schema
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    pub items: Option<Box<Schema>>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub unique_items: bool,
    /// `false` when the kind was inferred from keywords; non-arrays then pass.
    pub type_declared: bool,
}

/// Scalar schema: type set plus value constraints.
///
/// `types: None` accepts any value type. Each constraint only applies to
/// values it makes sense for (`pattern` to strings, `minimum` to numbers,
/// and so on), except `enum`/`const` which compare any value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScalarSchema {
    pub types: Option<Vec<ScalarType>>,
    pub enum_values: Option<Vec<Document>>,
    pub const_value: Option<Document>,
    pub pattern: Option<Pattern>,
    pub format: Option<String>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<f64>,
    pub exclusive_maximum: Option<f64>,
    pub multiple_of: Option<f64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Null,
    Boolean,
    Integer,
    Number,
    String,
}

impl ScalarType {
    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::Null => "null",
            ScalarType::Boolean => "boolean",
            ScalarType::Integer => "integer",
            ScalarType::Number => "number",
            ScalarType::String => "string",
        }
    }

    /// Whether `value` is an instance of this type. Integral numbers are
    /// both `integer` and `number`.
    pub fn accepts(&self, value: &Document) -> bool {
        match (self, value) {
            (ScalarType::Null, Document::Null) => true,
            (ScalarType::Boolean, Document::Bool(_)) => true,
            (ScalarType::Integer, value) => value.is_integer(),
            (ScalarType::Number, Document::Number(_)) => true,
            (ScalarType::String, Document::String(_)) => true,
            _ => false,
        }
    }
}

/// A compiled `pattern`, compared by its source text.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            source: source.to_string(),
            regex: Regex::new(source)?,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Unanchored search, as in JSON Schema.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// `$ref` schema
#[derive(Debug, Clone, PartialEq)]
pub struct RefSchema {
    /// The reference as written, e.g. `#/$defs/PlanOutput`.
    pub reference: String,
    pub target: RefTarget,
    /// Location of the `$ref` keyword in the schema document.
    pub location: SchemaPath,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RefTarget {
    Root,
    Definition(String),
}

impl fmt::Display for RefTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefTarget::Root => write!(f, "#"),
            RefTarget::Definition(name) => write!(f, "#/$defs/{}", name),
        }
    }
}

/// `allOf` / `anyOf` / `oneOf`
#[derive(Debug, Clone, PartialEq)]
pub struct CombinatorSchema {
    pub kind: CombinatorKind,
    pub schemas: Vec<Schema>,
    pub origin: CombinatorOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinatorKind {
    AllOf,
    AnyOf,
    OneOf,
}

impl CombinatorKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            CombinatorKind::AllOf => "allOf",
            CombinatorKind::AnyOf => "anyOf",
            CombinatorKind::OneOf => "oneOf",
        }
    }
}

/// How a combinator node came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinatorOrigin {
    /// Written as `allOf`/`anyOf`/`oneOf` in the schema.
    Keyword,
    /// `allOf` joining the sibling keywords of one schema object
    /// (a type with `$ref`, or a type with a combinator).
    Siblings,
    /// `anyOf` splitting a `type` list that mixes containers with other
    /// types. Branches accept disjoint value types.
    TypeList,
}
