// Validation engine

use crate::error::{Bound, InstancePath, PathSegment, SchemaPath, VariantCombinator, Violation, ViolationKind};
use crate::formats;
use crate::resolver::ResolvedSchema;
use crate::schema::{
    AdditionalProperties, ArraySchema, CombinatorKind, CombinatorOrigin, CombinatorSchema,
    ObjectSchema, RefSchema, RefTarget, ScalarSchema, Schema,
};
use crate::store::SchemaStore;
use rup_yaml::Document;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Tolerance for `multipleOf` on floating point values.
const MULTIPLE_OF_EPSILON: f64 = 1e-9;

/// Limits applied during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// Deepest document path the validator descends into.
    pub max_depth: usize,
    /// Nested causes kept on a `NoMatchingVariant` violation.
    pub variant_cause_cap: usize,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            max_depth: 64,
            variant_cause_cap: 10,
        }
    }
}

/// Validate a document against a resolved schema with default options.
///
/// Violations come back in document traversal order. Validation never
/// fails; data problems are violations.
pub fn validate(value: &Document, schema: &ResolvedSchema<'_>) -> Vec<Violation> {
    validate_with(value, schema, &ValidatorOptions::default())
}

pub fn validate_with(
    value: &Document,
    schema: &ResolvedSchema<'_>,
    options: &ValidatorOptions,
) -> Vec<Violation> {
    let mut context = ValidationContext::new(schema.store(), options);
    validate_node(value, schema.schema(), &mut context);
    context.violations
}

/// Validation context tracks state during validation
struct ValidationContext<'a> {
    store: &'a SchemaStore,
    options: &'a ValidatorOptions,
    instance_path: InstancePath,
    schema_path: SchemaPath,
    violations: Vec<Violation>,
    /// References being followed, with the document depth each was entered at.
    active_refs: Vec<(usize, &'a RefTarget)>,
}

impl<'a> ValidationContext<'a> {
    fn new(store: &'a SchemaStore, options: &'a ValidatorOptions) -> Self {
        Self {
            store,
            options,
            instance_path: InstancePath::new(),
            schema_path: SchemaPath::new(),
            violations: Vec::new(),
            active_refs: Vec::new(),
        }
    }

    fn add(&mut self, kind: ViolationKind, value: &Document) {
        self.violations.push(Violation {
            path: self.instance_path.clone(),
            schema_path: self.schema_path.clone(),
            message: kind.message(),
            kind,
            found: value.shape(),
        });
    }

    /// Record a violation of `keyword` in the current schema node.
    fn add_at(&mut self, keyword: &str, kind: ViolationKind, value: &Document) {
        self.with_schema_path(keyword, |ctx| ctx.add(kind, value));
    }

    fn with_schema_path<F, R>(&mut self, segment: impl Into<String>, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        self.schema_path.push(segment);
        let result = f(self);
        self.schema_path.pop();
        result
    }

    /// Run `f` against a child of the current value.
    ///
    /// At the depth limit, `f` is skipped and a single `DocumentTooDeep` is
    /// recorded at the parent, however many children it has.
    fn descend<F>(&mut self, segment: PathSegment, parent: &Document, reported: &mut bool, f: F)
    where
        F: FnOnce(&mut Self),
    {
        if self.instance_path.len() >= self.options.max_depth {
            if !*reported {
                let limit = self.options.max_depth;
                self.add(ViolationKind::DocumentTooDeep { limit }, parent);
                *reported = true;
            }
            return;
        }
        match segment {
            PathSegment::Key(key) => self.instance_path.push_key(key),
            PathSegment::Index(index) => self.instance_path.push_index(index),
        }
        f(self);
        self.instance_path.pop();
    }

    /// Collect the violations produced by `f` instead of recording them.
    fn capture<F>(&mut self, f: F) -> Vec<Violation>
    where
        F: FnOnce(&mut Self),
    {
        let saved = std::mem::take(&mut self.violations);
        f(self);
        std::mem::replace(&mut self.violations, saved)
    }
}

/// Main validation dispatcher
fn validate_node<'a>(value: &Document, schema: &'a Schema, context: &mut ValidationContext<'a>) {
    match schema {
        Schema::Any => {}
        Schema::Never => context.add(ViolationKind::NotAllowed, value),
        Schema::Object(s) => validate_object(value, s, context),
        Schema::Array(s) => validate_array(value, s, context),
        Schema::Scalar(s) => validate_scalar(value, s, context),
        Schema::Ref(s) => validate_ref(value, s, context),
        Schema::Combinator(s) => validate_combinator(value, s, context),
    }
}

fn validate_ref<'a>(value: &Document, schema: &'a RefSchema, context: &mut ValidationContext<'a>) {
    let depth = context.instance_path.len();
    let looping = context
        .active_refs
        .iter()
        .any(|(at, target)| *at == depth && *target == &schema.target);
    if looping {
        let kind = ViolationKind::SchemaTooDeep {
            reference: schema.reference.clone(),
        };
        context.add_at("$ref", kind, value);
        return;
    }

    let store = context.store;
    let Some(target) = store.target(&schema.target) else {
        let kind = ViolationKind::UnresolvedReference {
            reference: schema.reference.clone(),
        };
        context.add_at("$ref", kind, value);
        return;
    };

    tracing::trace!(reference = %schema.reference, path = %context.instance_path, "following reference");
    context.active_refs.push((depth, &schema.target));
    context.with_schema_path("$ref", |ctx| validate_node(value, target, ctx));
    context.active_refs.pop();
}

/// Validate an object value
fn validate_object<'a>(value: &Document, schema: &'a ObjectSchema, context: &mut ValidationContext<'a>) {
    let Some(entries) = value.as_mapping() else {
        if schema.type_declared {
            type_mismatch(value, "object".to_string(), context);
        }
        return;
    };

    let count = entries.len();
    if let Some(min) = schema.min_properties
        && count < min
    {
        range_violation(value, Bound::MinProperties, min as f64, count as f64, context);
    }
    if let Some(max) = schema.max_properties
        && count > max
    {
        range_violation(value, Bound::MaxProperties, max as f64, count as f64, context);
    }

    let mut too_deep = false;

    // Declared properties, in declaration order
    for (name, property_schema) in &schema.properties {
        match entries.get(name) {
            Some(child) => {
                context.descend(PathSegment::Key(name.clone()), value, &mut too_deep, |ctx| {
                    ctx.with_schema_path("properties", |ctx| {
                        ctx.with_schema_path(name.as_str(), |ctx| {
                            validate_node(child, property_schema, ctx)
                        })
                    })
                });
            }
            None if schema.required.contains(name) => missing_required(value, name, context),
            None => {}
        }
    }

    // Required names without a property declaration
    for name in &schema.required {
        if !schema.properties.contains_key(name) && !entries.contains_key(name) {
            missing_required(value, name, context);
        }
    }

    // Undeclared keys, in document order
    for (key, child) in entries {
        if schema.properties.contains_key(key) {
            continue;
        }
        match &schema.additional_properties {
            AdditionalProperties::Allowed => {}
            AdditionalProperties::Forbidden => {
                let kind = ViolationKind::UnexpectedProperty {
                    property: key.clone(),
                };
                context.add_at("additionalProperties", kind, child);
            }
            AdditionalProperties::Schema(additional) => {
                context.descend(PathSegment::Key(key.clone()), value, &mut too_deep, |ctx| {
                    ctx.with_schema_path("additionalProperties", |ctx| {
                        validate_node(child, additional, ctx)
                    })
                });
            }
        }
    }
}

fn missing_required(value: &Document, name: &str, context: &mut ValidationContext<'_>) {
    let kind = ViolationKind::MissingRequired {
        property: name.to_string(),
    };
    context.add_at("required", kind, value);
}

/// Validate an array value
fn validate_array<'a>(value: &Document, schema: &'a ArraySchema, context: &mut ValidationContext<'a>) {
    let Some(items) = value.as_sequence() else {
        if schema.type_declared {
            type_mismatch(value, "array".to_string(), context);
        }
        return;
    };

    let len = items.len();
    if let Some(min) = schema.min_items
        && len < min
    {
        range_violation(value, Bound::MinItems, min as f64, len as f64, context);
    }
    if let Some(max) = schema.max_items
        && len > max
    {
        range_violation(value, Bound::MaxItems, max as f64, len as f64, context);
    }

    if schema.unique_items {
        let mut seen: HashMap<String, usize> = HashMap::with_capacity(len);
        for (index, item) in items.iter().enumerate() {
            match seen.entry(canonical_key(item)) {
                Entry::Occupied(entry) => {
                    let kind = ViolationKind::DuplicateItem {
                        first: *entry.get(),
                        duplicate: index,
                    };
                    context.add_at("uniqueItems", kind, item);
                }
                Entry::Vacant(entry) => {
                    entry.insert(index);
                }
            }
        }
    }

    if let Some(item_schema) = &schema.items {
        let mut too_deep = false;
        for (index, item) in items.iter().enumerate() {
            context.descend(PathSegment::Index(index), value, &mut too_deep, |ctx| {
                ctx.with_schema_path("items", |ctx| validate_node(item, item_schema, ctx))
            });
        }
    }
}

/// Validate a scalar value. A type mismatch stops the remaining checks.
fn validate_scalar(value: &Document, schema: &ScalarSchema, context: &mut ValidationContext<'_>) {
    if let Some(types) = &schema.types
        && !types.iter().any(|t| t.accepts(value))
    {
        let expected = types.iter().map(|t| t.name()).collect::<Vec<_>>().join(" or ");
        type_mismatch(value, expected, context);
        return;
    }

    if let Some(allowed) = &schema.enum_values
        && !allowed.contains(value)
    {
        let kind = ViolationKind::EnumMismatch {
            allowed: allowed.iter().map(render_json).collect(),
        };
        context.add_at("enum", kind, value);
    }

    if let Some(expected) = &schema.const_value
        && expected != value
    {
        let kind = ViolationKind::EnumMismatch {
            allowed: vec![render_json(expected)],
        };
        context.add_at("const", kind, value);
    }

    if let Document::String(text) = value {
        if let Some(pattern) = &schema.pattern
            && !pattern.is_match(text)
        {
            let kind = ViolationKind::PatternMismatch {
                pattern: pattern.as_str().to_string(),
            };
            context.add_at("pattern", kind, value);
        }

        if let Some(format) = &schema.format
            && formats::check(format, text) == Some(false)
        {
            let kind = ViolationKind::FormatMismatch {
                format: format.clone(),
            };
            context.add_at("format", kind, value);
        }
    }

    if let Some(number) = value.as_number() {
        let x = number.as_f64();
        if let Some(min) = schema.minimum
            && x < min
        {
            range_violation(value, Bound::Minimum, min, x, context);
        }
        if let Some(max) = schema.maximum
            && x > max
        {
            range_violation(value, Bound::Maximum, max, x, context);
        }
        if let Some(min) = schema.exclusive_minimum
            && x <= min
        {
            range_violation(value, Bound::ExclusiveMinimum, min, x, context);
        }
        if let Some(max) = schema.exclusive_maximum
            && x >= max
        {
            range_violation(value, Bound::ExclusiveMaximum, max, x, context);
        }
        if let Some(step) = schema.multiple_of {
            let quotient = x / step;
            if (quotient - quotient.round()).abs() > MULTIPLE_OF_EPSILON {
                range_violation(value, Bound::MultipleOf, step, x, context);
            }
        }
    }

    if let Document::String(text) = value {
        let length = text.chars().count();
        if let Some(min) = schema.min_length
            && length < min
        {
            range_violation(value, Bound::MinLength, min as f64, length as f64, context);
        }
        if let Some(max) = schema.max_length
            && length > max
        {
            range_violation(value, Bound::MaxLength, max as f64, length as f64, context);
        }
    }
}

fn validate_combinator<'a>(
    value: &Document,
    schema: &'a CombinatorSchema,
    context: &mut ValidationContext<'a>,
) {
    match (schema.origin, schema.kind) {
        (CombinatorOrigin::TypeList, _) => validate_type_list(value, schema, context),
        (CombinatorOrigin::Siblings, _) => {
            for part in &schema.schemas {
                validate_node(value, part, context);
            }
        }
        (CombinatorOrigin::Keyword, CombinatorKind::AllOf) => {
            for index in 0..schema.schemas.len() {
                validate_variant(value, schema, index, context);
            }
        }
        (CombinatorOrigin::Keyword, CombinatorKind::AnyOf) => {
            let mut causes = Vec::new();
            for index in 0..schema.schemas.len() {
                let found = context.capture(|ctx| validate_variant(value, schema, index, ctx));
                if found.is_empty() {
                    return;
                }
                causes.extend(found);
            }
            no_matching_variant(value, schema, None, causes, context);
        }
        (CombinatorOrigin::Keyword, CombinatorKind::OneOf) => {
            let results: Vec<Vec<Violation>> = (0..schema.schemas.len())
                .map(|index| context.capture(|ctx| validate_variant(value, schema, index, ctx)))
                .collect();

            let matching: Vec<usize> = results
                .iter()
                .enumerate()
                .filter(|(_, found)| found.is_empty())
                .map(|(index, _)| index)
                .collect();

            match matching.len() {
                1 => {}
                0 => {
                    // Fewest violations wins; ties go to the earliest variant.
                    let closest = results
                        .iter()
                        .enumerate()
                        .min_by_key(|(_, found)| found.len())
                        .map(|(index, _)| index);
                    let causes = closest
                        .and_then(|index| results.into_iter().nth(index))
                        .unwrap_or_default();
                    no_matching_variant(value, schema, closest, causes, context);
                }
                _ => {
                    let kind = ViolationKind::AmbiguousVariant { matching };
                    context.add_at("oneOf", kind, value);
                }
            }
        }
    }
}

fn validate_variant<'a>(
    value: &Document,
    schema: &'a CombinatorSchema,
    index: usize,
    context: &mut ValidationContext<'a>,
) {
    let variant = &schema.schemas[index];
    context.with_schema_path(schema.kind.keyword(), |ctx| {
        ctx.with_schema_path(index.to_string(), |ctx| validate_node(value, variant, ctx))
    });
}

/// A `type` list mixing containers with other types: the value is checked
/// against the one branch that accepts its type.
fn validate_type_list<'a>(
    value: &Document,
    schema: &'a CombinatorSchema,
    context: &mut ValidationContext<'a>,
) {
    match schema.schemas.iter().find(|branch| branch.accepts_type_of(value)) {
        Some(branch) => validate_node(value, branch, context),
        None => {
            let expected = schema
                .schemas
                .iter()
                .flat_map(branch_type_names)
                .collect::<Vec<_>>()
                .join(" or ");
            type_mismatch(value, expected, context);
        }
    }
}

fn branch_type_names(schema: &Schema) -> Vec<&'static str> {
    match schema {
        Schema::Object(_) => vec!["object"],
        Schema::Array(_) => vec!["array"],
        Schema::Scalar(s) => s
            .types
            .as_ref()
            .map(|types| types.iter().map(|t| t.name()).collect())
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn no_matching_variant(
    value: &Document,
    schema: &CombinatorSchema,
    closest: Option<usize>,
    mut causes: Vec<Violation>,
    context: &mut ValidationContext<'_>,
) {
    let cap = context.options.variant_cause_cap;
    let omitted = causes.len().saturating_sub(cap);
    causes.truncate(cap);

    let combinator = match schema.kind {
        CombinatorKind::OneOf => VariantCombinator::OneOf,
        _ => VariantCombinator::AnyOf,
    };
    let kind = ViolationKind::NoMatchingVariant {
        combinator,
        variants: schema.schemas.len(),
        closest,
        causes,
        omitted,
    };
    context.add_at(schema.kind.keyword(), kind, value);
}

fn type_mismatch(value: &Document, expected: String, context: &mut ValidationContext<'_>) {
    let kind = ViolationKind::TypeMismatch {
        expected,
        got: value.type_name().to_string(),
    };
    context.add_at("type", kind, value);
}

fn range_violation(
    value: &Document,
    bound: Bound,
    limit: f64,
    actual: f64,
    context: &mut ValidationContext<'_>,
) {
    let kind = ViolationKind::RangeViolation {
        bound,
        limit,
        actual,
    };
    context.add_at(bound.keyword(), kind, value);
}

fn render_json(value: &Document) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| value.shape())
}

/// Key under which equal values (in the JSON Schema sense) collide:
/// numbers compare numerically and object key order is ignored.
fn canonical_key(value: &Document) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Document, out: &mut String) {
    match value {
        Document::Null => out.push_str("null"),
        Document::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        // Integral floats display without a fraction, so 1 and 1.0 collide.
        Document::Number(n) if n.as_f64() == 0.0 => out.push('0'),
        Document::Number(n) => out.push_str(&n.to_string()),
        Document::String(s) => out.push_str(&format!("{:?}", s)),
        Document::Sequence(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Document::Mapping(entries) => {
            let mut keys: Vec<&String> = entries.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&format!("{:?}:", key));
                if let Some(child) = entries.get(key) {
                    write_canonical(child, out);
                }
            }
            out.push('}');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn store(schema: serde_json::Value) -> SchemaStore {
        SchemaStore::from_document(&Document::from(schema)).unwrap()
    }

    fn check(schema: serde_json::Value, doc: serde_json::Value) -> Vec<Violation> {
        let store = store(schema);
        validate(&Document::from(doc), &store.resolve_root())
    }

    /// `(code, instance path)` pairs.
    fn summary(violations: &[Violation]) -> Vec<(&'static str, String)> {
        violations
            .iter()
            .map(|v| (v.code(), v.path.to_string()))
            .collect()
    }

    fn person_schema() -> serde_json::Value {
        json!({
            "type": "object",
            "required": ["name"],
            "properties": {"name": {"type": "string"}},
            "additionalProperties": false
        })
    }

    #[test]
    fn test_closed_object_scenario() {
        let v = check(person_schema(), json!({"name": "x", "extra": 1}));
        assert_eq!(summary(&v), vec![("unexpected-property", "(root)".to_string())]);
        assert_eq!(
            v[0].kind,
            ViolationKind::UnexpectedProperty {
                property: "extra".into()
            }
        );
        assert_eq!(v[0].schema_path.to_string(), "#/additionalProperties");
        assert_eq!(v[0].found, "1");

        let v = check(person_schema(), json!({}));
        assert_eq!(
            v.iter().map(|v| v.kind.clone()).collect::<Vec<_>>(),
            vec![ViolationKind::MissingRequired {
                property: "name".into()
            }]
        );
        assert_eq!(v[0].schema_path.to_string(), "#/required");

        assert!(check(person_schema(), json!({"name": "x"})).is_empty());
    }

    #[test]
    fn test_every_unexpected_key_is_reported_in_document_order() {
        let v = check(person_schema(), json!({"zeta": 1, "name": "x", "alpha": 2}));
        let keys: Vec<_> = v
            .iter()
            .map(|v| match &v.kind {
                ViolationKind::UnexpectedProperty { property } => property.as_str(),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_object_check_order() {
        let schema = json!({
            "type": "object",
            "required": ["b", "a", "c"],
            "properties": {
                "a": {"type": "string"},
                "b": {"type": "integer"}
            },
            "additionalProperties": false,
            "minProperties": 4
        });
        let v = check(schema, json!({"x": true, "a": 1}));
        assert_eq!(
            v.iter().map(|v| (v.code(), v.path.to_string(), v.schema_path.to_string())).collect::<Vec<_>>(),
            vec![
                ("range-violation", "(root)".to_string(), "#/minProperties".to_string()),
                ("type-mismatch", "a".to_string(), "#/properties/a/type".to_string()),
                ("missing-required", "(root)".to_string(), "#/required".to_string()),
                ("missing-required", "(root)".to_string(), "#/required".to_string()),
                ("unexpected-property", "(root)".to_string(), "#/additionalProperties".to_string()),
            ]
        );
        let missing: Vec<_> = v
            .iter()
            .filter_map(|v| match &v.kind {
                ViolationKind::MissingRequired { property } => Some(property.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(missing, vec!["b", "c"]);
    }

    #[test]
    fn test_additional_properties_schema() {
        let schema = json!({
            "type": "object",
            "properties": {"id": {"type": "integer"}},
            "additionalProperties": {"type": "string"}
        });
        let v = check(schema, json!({"id": 1, "note": "ok", "count": 3}));
        assert_eq!(summary(&v), vec![("type-mismatch", "count".to_string())]);
        assert_eq!(v[0].schema_path.to_string(), "#/additionalProperties/type");
    }

    #[test]
    fn test_array_bounds_and_items_are_all_collected() {
        let schema = json!({"type": "array", "minItems": 4, "items": {"type": "integer"}});
        let v = check(schema, json!([1, "two", 3.5]));
        assert_eq!(
            summary(&v),
            vec![
                ("range-violation", "(root)".to_string()),
                ("type-mismatch", "[1]".to_string()),
                ("type-mismatch", "[2]".to_string()),
            ]
        );
    }

    #[test]
    fn test_unique_items_uses_json_equality() {
        let schema = json!({"type": "array", "uniqueItems": true});
        let v = check(schema.clone(), json!([1, 2, 1.0, {"a": 1, "b": 2}, {"b": 2, "a": 1}, "1"]));
        assert_eq!(
            v.iter().map(|v| v.kind.clone()).collect::<Vec<_>>(),
            vec![
                ViolationKind::DuplicateItem { first: 0, duplicate: 2 },
                ViolationKind::DuplicateItem { first: 3, duplicate: 4 },
            ]
        );
        assert!(check(schema, json!([1, "1", [1], {"1": 1}])).is_empty());
    }

    #[test]
    fn test_scalar_type_mismatch_stops_scalar_checks() {
        let schema = json!({"type": "string", "pattern": "^a", "minLength": 5});
        let v = check(schema, json!(12));
        assert_eq!(summary(&v), vec![("type-mismatch", "(root)".to_string())]);
        assert_eq!(
            v[0].kind,
            ViolationKind::TypeMismatch {
                expected: "string".into(),
                got: "integer".into()
            }
        );
    }

    #[test]
    fn test_scalar_checks_accumulate() {
        let schema = json!({"type": "string", "enum": ["alpha", "beta"], "pattern": "^a", "format": "date", "maxLength": 3});
        let v = check(schema, json!("zzzz"));
        let codes: Vec<_> = v.iter().map(Violation::code).collect();
        assert_eq!(
            codes,
            vec!["enum-mismatch", "pattern-mismatch", "format-mismatch", "range-violation"]
        );
        assert_eq!(v[0].message, r#"Value must be one of: "alpha", "beta""#);
    }

    #[test]
    fn test_numeric_bounds() {
        let schema = json!({"type": "number", "minimum": 0, "exclusiveMaximum": 10, "multipleOf": 0.5});
        assert!(check(schema.clone(), json!(9.5)).is_empty());
        assert!(check(schema.clone(), json!(0)).is_empty());
        let v = check(schema.clone(), json!(10));
        assert_eq!(
            v[0].kind,
            ViolationKind::RangeViolation {
                bound: Bound::ExclusiveMaximum,
                limit: 10.0,
                actual: 10.0
            }
        );
        let v = check(schema, json!(-0.25));
        let bounds: Vec<_> = v
            .iter()
            .map(|v| match v.kind {
                ViolationKind::RangeViolation { bound, .. } => bound,
                _ => panic!("unexpected {:?}", v.kind),
            })
            .collect();
        assert_eq!(bounds, vec![Bound::Minimum, Bound::MultipleOf]);
    }

    #[test]
    fn test_multiple_of_tolerates_float_error() {
        assert!(check(json!({"multipleOf": 0.1}), json!(0.3)).is_empty());
    }

    #[test]
    fn test_integer_type() {
        let schema = json!({"type": "integer"});
        assert!(check(schema.clone(), json!(3)).is_empty());
        assert!(check(schema.clone(), json!(3.0)).is_empty());
        assert_eq!(check(schema, json!(3.5)).len(), 1);
    }

    #[test]
    fn test_string_length_counts_characters() {
        let schema = json!({"type": "string", "maxLength": 3});
        assert!(check(schema, json!("héé")).is_empty());
    }

    #[test]
    fn test_const() {
        let v = check(json!({"const": "v1"}), json!("v2"));
        assert_eq!(summary(&v), vec![("enum-mismatch", "(root)".to_string())]);
        assert_eq!(v[0].schema_path.to_string(), "#/const");
    }

    #[test]
    fn test_never_schema() {
        let schema = json!({"type": "object", "properties": {"legacy": false}});
        let v = check(schema, json!({"legacy": null}));
        assert_eq!(summary(&v), vec![("not-allowed", "legacy".to_string())]);
    }

    #[test]
    fn test_one_of_ambiguous() {
        let schema = json!({"oneOf": [{"type": "integer"}, {"type": "number"}, {"type": "string"}]});
        let v = check(schema, json!(3));
        assert_eq!(v[0].kind, ViolationKind::AmbiguousVariant { matching: vec![0, 1] });
        assert_eq!(v[0].schema_path.to_string(), "#/oneOf");
    }

    #[test]
    fn test_one_of_closest_candidate_tie_break() {
        let schema = json!({
            "oneOf": [
                {"type": "object", "required": ["first"]},
                {"type": "object", "required": ["second"]},
                {"type": "object", "required": ["a", "b"]}
            ]
        });
        let v = check(schema, json!({}));
        assert_eq!(v.len(), 1);
        let ViolationKind::NoMatchingVariant {
            combinator,
            variants,
            closest,
            causes,
            omitted,
        } = &v[0].kind
        else {
            panic!("unexpected {:?}", v[0].kind);
        };
        assert_eq!(*combinator, VariantCombinator::OneOf);
        assert_eq!(*variants, 3);
        assert_eq!(*closest, Some(0));
        assert_eq!(*omitted, 0);
        assert_eq!(
            causes[0].kind,
            ViolationKind::MissingRequired {
                property: "first".into()
            }
        );
        assert_eq!(causes[0].schema_path.to_string(), "#/oneOf/0/required");
    }

    #[test]
    fn test_any_of_reports_all_causes_capped() {
        let schema = json!({"anyOf": [
            {"type": "object", "required": ["a", "b", "c"]},
            {"type": "object", "required": ["d", "e", "f"]}
        ]});
        let store = store(schema);
        let options = ValidatorOptions {
            variant_cause_cap: 4,
            ..ValidatorOptions::default()
        };
        let v = validate_with(&Document::from(json!({})), &store.resolve_root(), &options);
        let ViolationKind::NoMatchingVariant {
            combinator,
            closest,
            causes,
            omitted,
            ..
        } = &v[0].kind
        else {
            panic!("unexpected {:?}", v[0].kind);
        };
        assert_eq!(*combinator, VariantCombinator::AnyOf);
        assert_eq!(*closest, None);
        assert_eq!(causes.len(), 4);
        assert_eq!(*omitted, 2);
    }

    #[test]
    fn test_any_of_match_discards_failed_attempts() {
        let schema = json!({"anyOf": [{"type": "string"}, {"type": "integer"}]});
        assert!(check(schema, json!(5)).is_empty());
    }

    #[test]
    fn test_all_of_concatenates() {
        let schema = json!({"allOf": [
            {"type": "object", "required": ["a"]},
            {"type": "object", "required": ["b"]}
        ]});
        let v = check(schema, json!({}));
        let paths: Vec<_> = v.iter().map(|v| v.schema_path.to_string()).collect();
        assert_eq!(paths, vec!["#/allOf/0/required", "#/allOf/1/required"]);
    }

    #[test]
    fn test_mixed_type_list_reports_plain_type_mismatch() {
        let schema = json!({"type": ["object", "null"], "required": ["a"]});
        assert!(check(schema.clone(), json!(null)).is_empty());
        assert_eq!(summary(&check(schema.clone(), json!({}))), vec![("missing-required", "(root)".to_string())]);
        let v = check(schema, json!("text"));
        assert_eq!(
            v[0].kind,
            ViolationKind::TypeMismatch {
                expected: "object or null".into(),
                got: "string".into()
            }
        );
    }

    #[test]
    fn test_enum_applies_to_every_branch_of_a_mixed_type_list() {
        let schema = json!({"type": ["object", "null"], "enum": [null, {"a": 1}]});
        assert!(check(schema.clone(), json!(null)).is_empty());
        assert!(check(schema.clone(), json!({"a": 1})).is_empty());
        let v = check(schema, json!({"b": 2}));
        assert_eq!(summary(&v), vec![("enum-mismatch", "(root)".to_string())]);
        assert_eq!(v[0].schema_path.to_string(), "#/enum");

        let schema = json!({"type": ["array", "string"], "const": ["x"]});
        assert!(check(schema.clone(), json!(["x"])).is_empty());
        assert_eq!(
            summary(&check(schema.clone(), json!(["y"]))),
            vec![("enum-mismatch", "(root)".to_string())]
        );
        // Reported once, not by both the scalar branch and the value check.
        assert_eq!(
            summary(&check(schema, json!("x"))),
            vec![("enum-mismatch", "(root)".to_string())]
        );
    }

    #[test]
    fn test_inferred_object_keywords_ignore_other_types() {
        let schema = json!({
            "type": "array",
            "items": {"required": ["id"], "properties": {"id": {"type": "string"}}}
        });
        assert!(check(schema.clone(), json!(["plain-string-step", 3, null])).is_empty());
        assert_eq!(
            summary(&check(schema, json!([{"name": "x"}]))),
            vec![("missing-required", "[0]".to_string())]
        );

        let schema = json!({"minItems": 2, "properties": {"a": {"type": "integer"}}});
        assert!(check(schema.clone(), json!("text")).is_empty());
        assert_eq!(summary(&check(schema.clone(), json!([1]))), vec![("range-violation", "(root)".to_string())]);
        assert_eq!(summary(&check(schema, json!({"a": "x"}))), vec![("type-mismatch", "a".to_string())]);

        let declared = json!({"type": "object", "required": ["id"]});
        assert_eq!(summary(&check(declared, json!("text"))), vec![("type-mismatch", "(root)".to_string())]);
    }

    #[test]
    fn test_references_and_schema_paths() {
        let schema = json!({
            "type": "object",
            "properties": {"steps": {"type": "array", "items": {"$ref": "#/$defs/Step"}}},
            "$defs": {"Step": {"type": "object", "properties": {"id": {"type": "integer"}}}}
        });
        let v = check(schema, json!({"steps": [{"id": 1}, {"id": "two"}]}));
        assert_eq!(summary(&v), vec![("type-mismatch", "steps[1].id".to_string())]);
        assert_eq!(
            v[0].schema_path.to_string(),
            "#/properties/steps/items/$ref/properties/id/type"
        );
    }

    #[test]
    fn test_recursive_definition_follows_document() {
        let schema = json!({
            "$ref": "#/$defs/Node",
            "$defs": {"Node": {
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "children": {"type": "array", "items": {"$ref": "#/$defs/Node"}}
                },
                "additionalProperties": false
            }}
        });
        let doc = json!({"name": "root", "children": [{"name": "a", "children": [{"name": 1}]}]});
        let v = check(schema, doc);
        assert_eq!(summary(&v), vec![("type-mismatch", "children[0].children[0].name".to_string())]);
    }

    #[test]
    fn test_schema_only_cycle_is_reported_once() {
        let schema = json!({
            "$ref": "#/$defs/Ping",
            "$defs": {
                "Ping": {"$ref": "#/$defs/Pong"},
                "Pong": {"$ref": "#/$defs/Ping"}
            }
        });
        let v = check(schema, json!({"any": "thing"}));
        assert_eq!(summary(&v), vec![("schema-too-deep", "(root)".to_string())]);
        assert_eq!(
            v[0].kind,
            ViolationKind::SchemaTooDeep {
                reference: "#/$defs/Ping".into()
            }
        );
    }

    #[test]
    fn test_self_reference_to_root() {
        let schema = json!({"anyOf": [{"type": "string"}, {"$ref": "#"}]});
        let v = check(schema, json!(1));
        assert_eq!(summary(&v), vec![("no-matching-variant", "(root)".to_string())]);
    }

    #[test]
    fn test_document_depth_limit() {
        let schema = json!({"$ref": "#/$defs/Nested", "$defs": {"Nested": {
            "type": "array", "items": {"$ref": "#/$defs/Nested"}
        }}});
        let store = store(schema);
        let options = ValidatorOptions {
            max_depth: 3,
            ..ValidatorOptions::default()
        };
        let shallow = Document::from(json!([[[]]]));
        assert!(validate_with(&shallow, &store.resolve_root(), &options).is_empty());

        let deep = Document::from(json!([[[[[]], [[]]]]]));
        let v = validate_with(&deep, &store.resolve_root(), &options);
        assert_eq!(
            summary(&v),
            vec![
                ("document-too-deep", "[0][0][0]".to_string()),
                ("document-too-deep", "[0][0][1]".to_string()),
            ]
        );
        assert_eq!(v[0].kind, ViolationKind::DocumentTooDeep { limit: 3 });
    }

    #[test]
    fn test_validation_is_idempotent() {
        let schema = json!({
            "type": "object",
            "properties": {"a": {"oneOf": [{"type": "string"}, {"type": "boolean"}]}},
            "additionalProperties": false
        });
        let store = store(schema);
        let doc = Document::from(json!({"a": 1, "b": 2, "c": 3}));
        let first = serde_json::to_string(&validate(&doc, &store.resolve_root())).unwrap();
        let second = serde_json::to_string(&validate(&doc, &store.resolve_root())).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_format_never_fails() {
        assert!(check(json!({"type": "string", "format": "uri"}), json!("not a uri")).is_empty());
    }
}
