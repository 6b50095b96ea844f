//! Schema model and compilation from a loaded schema document.

mod helpers;
mod parsers;
mod types;

pub use types::{
    AdditionalProperties, ArraySchema, CombinatorKind, CombinatorOrigin, CombinatorSchema,
    ObjectSchema, Pattern, RefSchema, RefTarget, ScalarSchema, ScalarType,
};

use crate::error::{SchemaError, SchemaPath, SchemaResult};
use helpers::{Keywords, get_array, has_any};
use parsers::{parse_array_schema, parse_combinator, parse_object_schema, parse_ref_schema, parse_scalar_schema};
use rup_yaml::Document;

/// A compiled schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// `true` or `{}`
    Any,
    /// `false`
    Never,
    Object(ObjectSchema),
    Array(ArraySchema),
    Scalar(ScalarSchema),
    Ref(RefSchema),
    Combinator(CombinatorSchema),
}

const OBJECT_KEYWORDS: &[&str] = &[
    "properties",
    "required",
    "additionalProperties",
    "minProperties",
    "maxProperties",
];

const ARRAY_KEYWORDS: &[&str] = &["items", "minItems", "maxItems", "uniqueItems"];

const SCALAR_KEYWORDS: &[&str] = &[
    "enum",
    "const",
    "pattern",
    "format",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
    "minLength",
    "maxLength",
];

const STRUCTURAL_KEYWORDS: &[&str] = &["type", "$ref", "allOf", "anyOf", "oneOf", "$defs", "definitions"];

/// Keywords that never constrain a value.
const ANNOTATION_KEYWORDS: &[&str] = &[
    "title",
    "description",
    "default",
    "examples",
    "$comment",
    "$id",
    "$schema",
    "deprecated",
    "readOnly",
    "writeOnly",
];

impl Schema {
    /// Compile a schema document, whose root is at `#`.
    pub fn from_document(document: &Document) -> SchemaResult<Schema> {
        compile(document, &SchemaPath::new())
    }

    /// Every `$ref` node in this schema, in schema order.
    pub fn references(&self) -> Vec<&RefSchema> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(schema) = stack.pop() {
            match schema {
                Schema::Any | Schema::Never | Schema::Scalar(_) => {}
                Schema::Ref(r) => out.push(r),
                Schema::Object(o) => {
                    if let AdditionalProperties::Schema(s) = &o.additional_properties {
                        stack.push(s);
                    }
                    stack.extend(o.properties.values().rev());
                }
                Schema::Array(a) => {
                    if let Some(items) = &a.items {
                        stack.push(items);
                    }
                }
                Schema::Combinator(c) => stack.extend(c.schemas.iter().rev()),
            }
        }
        out
    }

    /// For the branches of a `type` list: whether this node accepts the
    /// value's type at all.
    pub(crate) fn accepts_type_of(&self, value: &Document) -> bool {
        match self {
            Schema::Object(_) => matches!(value, Document::Mapping(_)),
            Schema::Array(_) => matches!(value, Document::Sequence(_)),
            Schema::Scalar(s) => s
                .types
                .as_ref()
                .is_none_or(|types| types.iter().any(|t| t.accepts(value))),
            _ => true,
        }
    }
}

/// Compile the schema at `location`.
pub(crate) fn compile(value: &Document, location: &SchemaPath) -> SchemaResult<Schema> {
    match value {
        Document::Bool(true) => Ok(Schema::Any),
        Document::Bool(false) => Ok(Schema::Never),
        Document::Mapping(keywords) => compile_keywords(keywords, location),
        other => Err(SchemaError::invalid(
            format!("schema must be an object or a boolean, found {}", other.type_name()),
            location,
        )),
    }
}

fn compile_keywords(keywords: &Keywords, location: &SchemaPath) -> SchemaResult<Schema> {
    for key in keywords.keys() {
        if !is_known_keyword(key) {
            tracing::debug!(keyword = %key, location = %location, "ignoring unsupported schema keyword");
        }
    }

    // Sibling keywords compose in a fixed order: base, $ref, allOf, anyOf, oneOf.
    let mut parts = parse_base(keywords, location)?;
    if let Some(reference) = keywords.get("$ref") {
        parts.push(parse_ref_schema(reference, &location.child("$ref"))?);
    }
    for kind in [CombinatorKind::AllOf, CombinatorKind::AnyOf, CombinatorKind::OneOf] {
        if let Some(value) = keywords.get(kind.keyword()) {
            parts.push(parse_combinator(kind, value, &location.child(kind.keyword()))?);
        }
    }

    if parts.len() > 1 {
        return Ok(Schema::Combinator(CombinatorSchema {
            kind: CombinatorKind::AllOf,
            schemas: parts,
            origin: CombinatorOrigin::Siblings,
        }));
    }
    Ok(parts.pop().unwrap_or(Schema::Any))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeName {
    Object,
    Array,
    Scalar(ScalarType),
}

/// The kind-specific part of a schema object: zero or more nodes.
fn parse_base(keywords: &Keywords, location: &SchemaPath) -> SchemaResult<Vec<Schema>> {
    let Some(type_value) = keywords.get("type") else {
        // Each keyword family only constrains values of its own kind.
        let mut parts = Vec::new();
        if has_any(keywords, OBJECT_KEYWORDS) {
            parts.push(parse_object_schema(keywords, location, false)?);
        }
        if has_any(keywords, ARRAY_KEYWORDS) {
            parts.push(parse_array_schema(keywords, location, false)?);
        }
        if has_any(keywords, SCALAR_KEYWORDS) {
            parts.push(parse_scalar_schema(keywords, location, None)?);
        }
        return Ok(parts);
    };

    let types = parse_type_list(type_value, &location.child("type"))?;
    let scalar_types: Vec<ScalarType> = types
        .iter()
        .filter_map(|t| match t {
            TypeName::Scalar(s) => Some(*s),
            _ => None,
        })
        .collect();

    let mut branches = Vec::new();
    if types.contains(&TypeName::Object) {
        branches.push(parse_object_schema(keywords, location, true)?);
    }
    if types.contains(&TypeName::Array) {
        branches.push(parse_array_schema(keywords, location, true)?);
    }
    let has_container = !branches.is_empty();
    if !scalar_types.is_empty() {
        branches.push(parse_scalar_schema(keywords, location, Some(scalar_types))?);
    }

    // enum/const compare whole values, so next to a container type they are
    // checked once for every value instead of inside the scalar branch.
    let value_check = if has_container {
        parse_value_check(keywords, location)?
    } else {
        None
    };
    if value_check.is_some() {
        for branch in &mut branches {
            if let Schema::Scalar(scalar) = branch {
                scalar.enum_values = None;
                scalar.const_value = None;
            }
        }
    }

    let mut parts = if branches.len() > 1 {
        vec![Schema::Combinator(CombinatorSchema {
            kind: CombinatorKind::AnyOf,
            schemas: branches,
            origin: CombinatorOrigin::TypeList,
        })]
    } else {
        branches
    };
    parts.extend(value_check);
    Ok(parts)
}

/// An untyped node holding only `enum` and `const`, if either is present.
fn parse_value_check(keywords: &Keywords, location: &SchemaPath) -> SchemaResult<Option<Schema>> {
    let enum_values = get_array(keywords, "enum", location)?.map(<[_]>::to_vec);
    let const_value = keywords.get("const").cloned();
    if enum_values.is_none() && const_value.is_none() {
        return Ok(None);
    }
    Ok(Some(Schema::Scalar(ScalarSchema {
        enum_values,
        const_value,
        ..ScalarSchema::default()
    })))
}

fn parse_type_list(value: &Document, location: &SchemaPath) -> SchemaResult<Vec<TypeName>> {
    let names: Vec<(&str, SchemaPath)> = match value {
        Document::String(name) => vec![(name.as_str(), location.clone())],
        Document::Sequence(items) if !items.is_empty() => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_str()
                    .map(|name| (name, location.child(i.to_string())))
                    .ok_or_else(|| SchemaError::invalid("type names must be strings", &location.child(i.to_string())))
            })
            .collect::<SchemaResult<_>>()?,
        _ => {
            return Err(SchemaError::invalid(
                "'type' must be a string or a non-empty array of strings",
                location,
            ));
        }
    };

    let mut types = Vec::with_capacity(names.len());
    for (name, at) in names {
        let parsed = match name {
            "object" => TypeName::Object,
            "array" => TypeName::Array,
            "null" => TypeName::Scalar(ScalarType::Null),
            "boolean" => TypeName::Scalar(ScalarType::Boolean),
            "integer" => TypeName::Scalar(ScalarType::Integer),
            "number" => TypeName::Scalar(ScalarType::Number),
            "string" => TypeName::Scalar(ScalarType::String),
            other => {
                return Err(SchemaError::invalid(format!("unknown type '{}'", other), &at));
            }
        };
        if !types.contains(&parsed) {
            types.push(parsed);
        }
    }
    Ok(types)
}

fn is_known_keyword(key: &str) -> bool {
    OBJECT_KEYWORDS.contains(&key)
        || ARRAY_KEYWORDS.contains(&key)
        || SCALAR_KEYWORDS.contains(&key)
        || STRUCTURAL_KEYWORDS.contains(&key)
        || ANNOTATION_KEYWORDS.contains(&key)
        || key.starts_with("x_")
        || key.starts_with("x-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn compile_json(value: serde_json::Value) -> SchemaResult<Schema> {
        Schema::from_document(&Document::from(value))
    }

    #[test]
    fn test_boolean_and_empty_schemas() {
        assert_eq!(compile_json(json!(true)).unwrap(), Schema::Any);
        assert_eq!(compile_json(json!(false)).unwrap(), Schema::Never);
        assert_eq!(compile_json(json!({})).unwrap(), Schema::Any);
        assert_eq!(
            compile_json(json!({"title": "x", "description": "y", "x_owner": "z"})).unwrap(),
            Schema::Any
        );
    }

    #[test]
    fn test_object_schema_keeps_declaration_order() {
        let schema = compile_json(json!({
            "type": "object",
            "required": ["b"],
            "properties": {"b": {"type": "string"}, "a": {"type": "integer"}},
            "additionalProperties": false
        }))
        .unwrap();
        let Schema::Object(object) = schema else {
            panic!("expected object schema, got {schema:?}");
        };
        let names: Vec<_> = object.properties.keys().cloned().collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(object.required, vec!["b"]);
        assert_eq!(object.additional_properties, AdditionalProperties::Forbidden);
    }

    #[test]
    fn test_kind_inferred_from_keywords() {
        assert!(matches!(
            compile_json(json!({"properties": {}})).unwrap(),
            Schema::Object(_)
        ));
        assert!(matches!(
            compile_json(json!({"items": {"type": "string"}})).unwrap(),
            Schema::Array(_)
        ));
        let Schema::Scalar(scalar) = compile_json(json!({"enum": ["a", 1]})).unwrap() else {
            panic!("expected scalar schema");
        };
        assert_eq!(scalar.types, None);
    }

    #[test]
    fn test_inferred_kinds_are_not_declared_types() {
        let Schema::Object(object) = compile_json(json!({"required": ["id"]})).unwrap() else {
            panic!("expected object schema");
        };
        assert!(!object.type_declared);
        let Schema::Object(object) = compile_json(json!({"type": "object"})).unwrap() else {
            panic!("expected object schema");
        };
        assert!(object.type_declared);

        let schema = compile_json(json!({"properties": {}, "items": {}})).unwrap();
        let Schema::Combinator(c) = schema else {
            panic!("expected combinator, got {schema:?}");
        };
        assert!(matches!(&c.schemas[0], Schema::Object(o) if !o.type_declared));
        assert!(matches!(&c.schemas[1], Schema::Array(a) if !a.type_declared));
    }

    #[test]
    fn test_scalar_type_list() {
        let Schema::Scalar(scalar) = compile_json(json!({"type": ["string", "null"]})).unwrap() else {
            panic!("expected scalar schema");
        };
        assert_eq!(scalar.types, Some(vec![ScalarType::String, ScalarType::Null]));
    }

    #[test]
    fn test_mixed_type_list_splits_by_type() {
        let schema = compile_json(json!({"type": ["object", "null"], "required": ["a"]})).unwrap();
        let Schema::Combinator(c) = schema else {
            panic!("expected combinator, got {schema:?}");
        };
        assert_eq!(c.kind, CombinatorKind::AnyOf);
        assert_eq!(c.origin, CombinatorOrigin::TypeList);
        assert!(matches!(c.schemas[0], Schema::Object(_)));
        assert!(matches!(c.schemas[1], Schema::Scalar(_)));
    }

    #[test]
    fn test_siblings_compose_in_fixed_order() {
        let schema = compile_json(json!({
            "oneOf": [{"type": "string"}, {"type": "integer"}],
            "$ref": "#/$defs/Base",
            "type": "object",
            "anyOf": [true],
            "allOf": [true]
        }))
        .unwrap();
        let Schema::Combinator(c) = schema else {
            panic!("expected combinator, got {schema:?}");
        };
        assert_eq!(c.origin, CombinatorOrigin::Siblings);
        assert!(matches!(c.schemas[0], Schema::Object(_)));
        assert!(matches!(c.schemas[1], Schema::Ref(_)));
        let kinds: Vec<_> = c.schemas[2..]
            .iter()
            .map(|s| match s {
                Schema::Combinator(c) => c.kind,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(
            kinds,
            vec![CombinatorKind::AllOf, CombinatorKind::AnyOf, CombinatorKind::OneOf]
        );
    }

    #[test]
    fn test_ref_with_annotations_stays_a_ref() {
        let schema = compile_json(json!({"$ref": "#/$defs/Step", "description": "a step"})).unwrap();
        assert!(matches!(schema, Schema::Ref(_)));
    }

    #[test]
    fn test_container_type_with_enum_adds_value_check() {
        let schema = compile_json(json!({"type": "array", "enum": [[1, 2]]})).unwrap();
        let Schema::Combinator(c) = schema else {
            panic!("expected combinator, got {schema:?}");
        };
        assert!(matches!(c.schemas[0], Schema::Array(_)));
        assert!(matches!(&c.schemas[1], Schema::Scalar(s) if s.types.is_none()));
    }

    #[test]
    fn test_mixed_type_list_moves_enum_out_of_scalar_branch() {
        let schema = compile_json(json!({"type": ["object", "null"], "enum": [null, {"a": 1}]})).unwrap();
        let Schema::Combinator(outer) = schema else {
            panic!("expected combinator, got {schema:?}");
        };
        assert_eq!(outer.origin, CombinatorOrigin::Siblings);
        let Schema::Combinator(type_list) = &outer.schemas[0] else {
            panic!("expected type list, got {:?}", outer.schemas[0]);
        };
        assert_eq!(type_list.origin, CombinatorOrigin::TypeList);
        assert!(matches!(&type_list.schemas[1], Schema::Scalar(s) if s.enum_values.is_none()));
        assert!(matches!(
            &outer.schemas[1],
            Schema::Scalar(s) if s.types.is_none() && s.enum_values.as_ref().map(Vec::len) == Some(2)
        ));
    }

    #[test]
    fn test_invalid_keywords_report_location() {
        let cases = [
            (json!({"type": "strin"}), "#/type"),
            (json!({"type": ["string", 3]}), "#/type/1"),
            (json!({"properties": {"a": {"pattern": "("}}}), "#/properties/a/pattern"),
            (json!({"properties": {"a": {"minLength": "3"}}}), "#/properties/a/minLength"),
            (json!({"items": 5}), "#/items"),
            (json!({"anyOf": []}), "#/anyOf"),
            (json!({"$ref": "other.json#/Foo"}), "#/$ref"),
        ];
        for (schema, expected) in cases {
            match compile_json(schema.clone()) {
                Err(SchemaError::InvalidSchema { location, .. }) => {
                    assert_eq!(location, expected, "{schema}");
                }
                other => panic!("expected InvalidSchema for {schema}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_references_are_collected_in_order() {
        let schema = compile_json(json!({
            "properties": {
                "a": {"$ref": "#/$defs/A"},
                "b": {"type": "array", "items": {"$ref": "#/$defs/B"}}
            },
            "additionalProperties": {"$ref": "#"}
        }))
        .unwrap();
        let refs: Vec<_> = schema.references().iter().map(|r| r.reference.as_str()).collect();
        assert_eq!(refs, vec!["#/$defs/A", "#/$defs/B", "#"]);
    }
}
