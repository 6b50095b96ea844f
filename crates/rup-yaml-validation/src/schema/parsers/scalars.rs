//! Scalar schema parser
//!
//! Handles value constraints: `enum`, `const`, `pattern`, `format`, numeric
//! bounds and string length.

use crate::error::{SchemaError, SchemaPath, SchemaResult};
use crate::formats;
use crate::schema::Schema;
use crate::schema::helpers::{Keywords, get_array, get_number, get_string, get_usize};
use crate::schema::types::{Pattern, ScalarSchema, ScalarType};

/// `types: None` leaves the value type unrestricted.
pub(in crate::schema) fn parse_scalar_schema(
    keywords: &Keywords,
    location: &SchemaPath,
    types: Option<Vec<ScalarType>>,
) -> SchemaResult<Schema> {
    let pattern = get_string(keywords, "pattern", location)?
        .map(|source| {
            Pattern::new(source).map_err(|e| {
                SchemaError::invalid(
                    format!("invalid regular expression '{}': {}", source, e),
                    &location.child("pattern"),
                )
            })
        })
        .transpose()?;

    let format = get_string(keywords, "format", location)?.map(str::to_string);
    if let Some(name) = &format
        && !formats::is_known(name)
    {
        tracing::warn!(format = %name, location = %location, "unknown format is ignored");
    }

    let multiple_of = get_number(keywords, "multipleOf", location)?;
    if let Some(m) = multiple_of
        && m <= 0.0
    {
        return Err(SchemaError::invalid(
            "'multipleOf' must be greater than zero",
            &location.child("multipleOf"),
        ));
    }

    Ok(Schema::Scalar(ScalarSchema {
        types,
        enum_values: get_array(keywords, "enum", location)?.map(<[_]>::to_vec),
        const_value: keywords.get("const").cloned(),
        pattern,
        format,
        minimum: get_number(keywords, "minimum", location)?,
        maximum: get_number(keywords, "maximum", location)?,
        exclusive_minimum: get_number(keywords, "exclusiveMinimum", location)?,
        exclusive_maximum: get_number(keywords, "exclusiveMaximum", location)?,
        multiple_of,
        min_length: get_usize(keywords, "minLength", location)?,
        max_length: get_usize(keywords, "maxLength", location)?,
    }))
}
