//! Object schema parser

use crate::error::{SchemaError, SchemaPath, SchemaResult};
use crate::schema::helpers::{Keywords, get_mapping, get_string_array, get_usize};
use crate::schema::types::{AdditionalProperties, ObjectSchema};
use crate::schema::{Schema, compile};
use indexmap::IndexMap;
use rup_yaml::Document;

pub(in crate::schema) fn parse_object_schema(
    keywords: &Keywords,
    location: &SchemaPath,
    type_declared: bool,
) -> SchemaResult<Schema> {
    let mut properties = IndexMap::new();
    if let Some(declared) = get_mapping(keywords, "properties", location)? {
        let base = location.child("properties");
        for (name, schema) in declared {
            properties.insert(name.clone(), compile(schema, &base.child(name.as_str()))?);
        }
    }

    let mut required: Vec<String> = Vec::new();
    for name in get_string_array(keywords, "required", location)?.unwrap_or_default() {
        if !required.contains(&name) {
            required.push(name);
        }
    }

    let additional_properties = match keywords.get("additionalProperties") {
        None | Some(Document::Bool(true)) => AdditionalProperties::Allowed,
        Some(Document::Bool(false)) => AdditionalProperties::Forbidden,
        Some(schema @ Document::Mapping(_)) => AdditionalProperties::Schema(Box::new(compile(
            schema,
            &location.child("additionalProperties"),
        )?)),
        Some(_) => {
            return Err(SchemaError::invalid(
                "'additionalProperties' must be a boolean or a schema",
                &location.child("additionalProperties"),
            ));
        }
    };

    Ok(Schema::Object(ObjectSchema {
        properties,
        required,
        additional_properties,
        min_properties: get_usize(keywords, "minProperties", location)?,
        max_properties: get_usize(keywords, "maxProperties", location)?,
        type_declared,
    }))
}
