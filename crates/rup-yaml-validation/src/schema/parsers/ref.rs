//! Reference schema parser
//!
//! Only references into the same document are supported: `#` for the root
//! schema and `#/$defs/<name>` for a definition. Targets are looked up by
//! name during validation, so cyclic definitions need no special handling here.

use crate::error::{SchemaError, SchemaPath, SchemaResult};
use crate::schema::Schema;
use crate::schema::types::{RefSchema, RefTarget};
use rup_yaml::Document;

/// `location` is the location of the `$ref` keyword.
pub(in crate::schema) fn parse_ref_schema(
    value: &Document,
    location: &SchemaPath,
) -> SchemaResult<Schema> {
    let reference = value
        .as_str()
        .ok_or_else(|| SchemaError::invalid("'$ref' must be a string", location))?;

    let target = parse_reference(reference).ok_or_else(|| {
        SchemaError::invalid(
            format!(
                "unsupported reference '{}' (expected '#' or '#/$defs/<name>')",
                reference
            ),
            location,
        )
    })?;

    Ok(Schema::Ref(RefSchema {
        reference: reference.to_string(),
        target,
        location: location.clone(),
    }))
}

fn parse_reference(reference: &str) -> Option<RefTarget> {
    if reference == "#" {
        return Some(RefTarget::Root);
    }
    let token = reference.strip_prefix("#/$defs/")?;
    if token.is_empty() || token.contains('/') {
        return None;
    }
    Some(RefTarget::Definition(
        token.replace("~1", "/").replace("~0", "~"),
    ))
}
