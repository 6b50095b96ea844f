//! Array schema parser

use crate::error::{SchemaPath, SchemaResult};
use crate::schema::helpers::{Keywords, get_bool, get_usize};
use crate::schema::types::ArraySchema;
use crate::schema::{Schema, compile};

pub(in crate::schema) fn parse_array_schema(
    keywords: &Keywords,
    location: &SchemaPath,
    type_declared: bool,
) -> SchemaResult<Schema> {
    let items = keywords
        .get("items")
        .map(|items| compile(items, &location.child("items")).map(Box::new))
        .transpose()?;

    Ok(Schema::Array(ArraySchema {
        items,
        min_items: get_usize(keywords, "minItems", location)?,
        max_items: get_usize(keywords, "maxItems", location)?,
        unique_items: get_bool(keywords, "uniqueItems", location)?.unwrap_or(false),
        type_declared,
    }))
}
