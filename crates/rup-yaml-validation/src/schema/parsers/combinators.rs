//! Combinator schema parser (`allOf`, `anyOf`, `oneOf`)

use crate::error::{SchemaError, SchemaPath, SchemaResult};
use crate::schema::types::{CombinatorKind, CombinatorOrigin, CombinatorSchema};
use crate::schema::{Schema, compile};
use rup_yaml::Document;

/// `location` is the location of the combinator keyword itself.
pub(in crate::schema) fn parse_combinator(
    kind: CombinatorKind,
    value: &Document,
    location: &SchemaPath,
) -> SchemaResult<Schema> {
    let items = match value.as_sequence() {
        Some(items) if !items.is_empty() => items,
        _ => {
            return Err(SchemaError::invalid(
                format!("'{}' must be a non-empty array of schemas", kind.keyword()),
                location,
            ));
        }
    };

    let schemas = items
        .iter()
        .enumerate()
        .map(|(i, item)| compile(item, &location.child(i.to_string())))
        .collect::<SchemaResult<Vec<_>>>()?;

    Ok(Schema::Combinator(CombinatorSchema {
        kind,
        schemas,
        origin: CombinatorOrigin::Keyword,
    }))
}
