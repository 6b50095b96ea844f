// Error and violation types for schema loading and validation

use rup_yaml::LoadError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type for schema compilation and lookup.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Fatal problems with the schema, or with a request made against it.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to load schema: {0}")]
    Load(#[from] LoadError),

    /// A keyword has the wrong shape. `location` is a JSON pointer into the schema.
    #[error("invalid schema at {location}: {message}")]
    InvalidSchema { message: String, location: String },

    /// Every reference that does not resolve, sorted by location.
    #[error(
        "schema integrity error: {} dangling reference(s): {}",
        .dangling.len(),
        join_dangling(.dangling)
    )]
    Integrity { dangling: Vec<DanglingReference> },

    #[error(
        "unknown document type '{name}' (expected one of: discovery, plan, execution, verification)"
    )]
    UnknownType { name: String },

    #[error("schema has no definition named '{name}'")]
    UnknownDefinition { name: String },
}

impl SchemaError {
    pub(crate) fn invalid(message: impl Into<String>, location: &SchemaPath) -> Self {
        SchemaError::InvalidSchema {
            message: message.into(),
            location: location.to_string(),
        }
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::Load(err) => err.code(),
            SchemaError::InvalidSchema { .. } => "invalid-schema",
            SchemaError::Integrity { .. } => "schema-integrity",
            SchemaError::UnknownType { .. } => "unknown-type",
            SchemaError::UnknownDefinition { .. } => "unknown-definition",
        }
    }
}

/// A reference whose target does not exist.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct DanglingReference {
    /// Where the reference appears.
    pub location: String,
    /// The reference as written.
    pub reference: String,
}

impl fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at {})", self.reference, self.location)
    }
}

fn join_dangling(dangling: &[DanglingReference]) -> String {
    dangling
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors from the file-level entry points. Never mixed with violations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    Load(#[from] LoadError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl EngineError {
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Load(err) => err.code(),
            EngineError::Schema(err) => err.code(),
        }
    }
}

/// Which bound a [`ViolationKind::RangeViolation`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Bound {
    Minimum,
    Maximum,
    ExclusiveMinimum,
    ExclusiveMaximum,
    MultipleOf,
    MinLength,
    MaxLength,
    MinItems,
    MaxItems,
    MinProperties,
    MaxProperties,
}

impl Bound {
    /// The schema keyword that declares this bound.
    pub fn keyword(&self) -> &'static str {
        match self {
            Bound::Minimum => "minimum",
            Bound::Maximum => "maximum",
            Bound::ExclusiveMinimum => "exclusiveMinimum",
            Bound::ExclusiveMaximum => "exclusiveMaximum",
            Bound::MultipleOf => "multipleOf",
            Bound::MinLength => "minLength",
            Bound::MaxLength => "maxLength",
            Bound::MinItems => "minItems",
            Bound::MaxItems => "maxItems",
            Bound::MinProperties => "minProperties",
            Bound::MaxProperties => "maxProperties",
        }
    }
}

/// Combinators that report [`ViolationKind::NoMatchingVariant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VariantCombinator {
    OneOf,
    AnyOf,
}

impl fmt::Display for VariantCombinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantCombinator::OneOf => write!(f, "oneOf"),
            VariantCombinator::AnyOf => write!(f, "anyOf"),
        }
    }
}

/// Structured violation kinds
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ViolationKind {
    MissingRequired { property: String },

    /// Key not declared under `additionalProperties: false`.
    UnexpectedProperty { property: String },

    TypeMismatch { expected: String, got: String },

    /// `allowed` holds the JSON rendering of each permitted value.
    EnumMismatch { allowed: Vec<String> },

    PatternMismatch { pattern: String },

    FormatMismatch { format: String },

    /// Numeric, length and count bounds. Lengths and counts are reported as numbers too.
    RangeViolation { bound: Bound, limit: f64, actual: f64 },

    /// Indices of two equal items under `uniqueItems`.
    DuplicateItem { first: usize, duplicate: usize },

    /// No variant of a `oneOf`/`anyOf` matched.
    ///
    /// For `oneOf`, `causes` are the violations of the `closest` variant;
    /// for `anyOf`, the violations of every variant in order. At most
    /// `variant_cause_cap` causes are kept and `omitted` counts the rest.
    NoMatchingVariant {
        combinator: VariantCombinator,
        variants: usize,
        closest: Option<usize>,
        causes: Vec<Violation>,
        omitted: usize,
    },

    /// More than one `oneOf` variant matched.
    AmbiguousVariant { matching: Vec<usize> },

    /// The schema is `false`.
    NotAllowed,

    DocumentTooDeep { limit: usize },

    /// A reference chain returned to itself without consuming the document.
    SchemaTooDeep { reference: String },

    UnresolvedReference { reference: String },

    VersionMismatch { expected: String, found: String },
}

impl ViolationKind {
    /// Stable kebab-case code, used to compare results across implementations.
    pub fn code(&self) -> &'static str {
        match self {
            ViolationKind::MissingRequired { .. } => "missing-required",
            ViolationKind::UnexpectedProperty { .. } => "unexpected-property",
            ViolationKind::TypeMismatch { .. } => "type-mismatch",
            ViolationKind::EnumMismatch { .. } => "enum-mismatch",
            ViolationKind::PatternMismatch { .. } => "pattern-mismatch",
            ViolationKind::FormatMismatch { .. } => "format-mismatch",
            ViolationKind::RangeViolation { .. } => "range-violation",
            ViolationKind::DuplicateItem { .. } => "duplicate-item",
            ViolationKind::NoMatchingVariant { .. } => "no-matching-variant",
            ViolationKind::AmbiguousVariant { .. } => "ambiguous-variant",
            ViolationKind::NotAllowed => "not-allowed",
            ViolationKind::DocumentTooDeep { .. } => "document-too-deep",
            ViolationKind::SchemaTooDeep { .. } => "schema-too-deep",
            ViolationKind::UnresolvedReference { .. } => "unresolved-reference",
            ViolationKind::VersionMismatch { .. } => "version-mismatch",
        }
    }

    /// Human-readable sentence describing the violation.
    pub fn message(&self) -> String {
        match self {
            ViolationKind::MissingRequired { property } => {
                format!("Missing required property '{}'", property)
            }
            ViolationKind::UnexpectedProperty { property } => {
                format!("Unexpected property '{}' is not allowed", property)
            }
            ViolationKind::TypeMismatch { expected, got } => {
                format!("Expected {}, got {}", expected, got)
            }
            ViolationKind::EnumMismatch { allowed } => {
                format!("Value must be one of: {}", allowed.join(", "))
            }
            ViolationKind::PatternMismatch { pattern } => {
                format!("String does not match pattern '{}'", pattern)
            }
            ViolationKind::FormatMismatch { format } => {
                format!("String is not a valid '{}'", format)
            }
            ViolationKind::RangeViolation {
                bound,
                limit,
                actual,
            } => match bound {
                Bound::Minimum => format!("Number {} is less than minimum {}", actual, limit),
                Bound::Maximum => format!("Number {} is greater than maximum {}", actual, limit),
                Bound::ExclusiveMinimum => {
                    format!("Number {} is not greater than {}", actual, limit)
                }
                Bound::ExclusiveMaximum => format!("Number {} is not less than {}", actual, limit),
                Bound::MultipleOf => format!("Number {} is not a multiple of {}", actual, limit),
                Bound::MinLength => {
                    format!("String length {} is less than minimum {}", actual, limit)
                }
                Bound::MaxLength => {
                    format!("String length {} is greater than maximum {}", actual, limit)
                }
                Bound::MinItems => {
                    format!("Array length {} is less than minimum {}", actual, limit)
                }
                Bound::MaxItems => {
                    format!("Array length {} is greater than maximum {}", actual, limit)
                }
                Bound::MinProperties => {
                    format!("Object has {} properties, less than minimum {}", actual, limit)
                }
                Bound::MaxProperties => format!(
                    "Object has {} properties, greater than maximum {}",
                    actual, limit
                ),
            },
            ViolationKind::DuplicateItem { first, duplicate } => {
                format!("Item {} duplicates item {}", duplicate, first)
            }
            ViolationKind::NoMatchingVariant {
                combinator,
                variants,
                closest,
                ..
            } => match closest {
                Some(index) => format!(
                    "Value does not match any of the {} {} variants (closest: variant {})",
                    variants, combinator, index
                ),
                None => format!(
                    "Value does not match any of the {} {} variants",
                    variants, combinator
                ),
            },
            ViolationKind::AmbiguousVariant { matching } => format!(
                "Value matches more than one oneOf variant (variants {})",
                matching
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            ViolationKind::NotAllowed => "No value is allowed here".to_string(),
            ViolationKind::DocumentTooDeep { limit } => {
                format!("Document nesting exceeds the limit of {} levels", limit)
            }
            ViolationKind::SchemaTooDeep { reference } => format!(
                "Schema reference '{}' loops back to itself without descending into the document",
                reference
            ),
            ViolationKind::UnresolvedReference { reference } => {
                format!("Unresolved schema reference '{}'", reference)
            }
            ViolationKind::VersionMismatch { expected, found } => {
                format!("Schema version mismatch. Expected {}, got {}", expected, found)
            }
        }
    }
}

/// One failed constraint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Keys and indices from the document root.
    pub path: InstancePath,
    /// Keywords taken through the schema, including `$ref` hops.
    pub schema_path: SchemaPath,
    #[serde(flatten)]
    pub kind: ViolationKind,
    pub message: String,
    /// Bounded description of the offending value.
    pub found: String,
}

impl Violation {
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Instance path (e.g., `steps[0].id`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InstancePath {
    segments: Vec<PathSegment>,
}

impl InstancePath {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub fn push_key(&mut self, key: impl Into<String>) {
        self.segments.push(PathSegment::Key(key.into()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.segments.push(PathSegment::Index(index));
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for InstancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "(root)");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i > 0 => write!(f, ".{}", key)?,
                PathSegment::Key(key) => write!(f, "{}", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// Segment in an instance path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, "{}", k),
            PathSegment::Index(i) => write!(f, "{}", i),
        }
    }
}

/// Schema path, rendered as a JSON pointer (`#/$defs/Plan/properties/id`).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct SchemaPath {
    segments: Vec<String>,
}

impl SchemaPath {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.segments.pop()
    }

    /// A copy of this path extended by `segment`.
    pub fn child(&self, segment: impl Into<String>) -> SchemaPath {
        let mut path = self.clone();
        path.push(segment);
        path
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#")?;
        for segment in &self.segments {
            write!(f, "/{}", segment.replace('~', "~0").replace('/', "~1"))?;
        }
        Ok(())
    }
}

impl Serialize for SchemaPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
