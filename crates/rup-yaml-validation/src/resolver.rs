//! Reference resolution.
//!
//! References are not inlined. A [`ResolvedSchema`] pairs a schema node with
//! the store that owns its reference targets, and `$ref` nodes are looked up
//! by name while validating. Cyclic definitions therefore need no special
//! treatment here; the validator detects reference loops that do not
//! consume any of the document.

use crate::error::{DanglingReference, SchemaError, SchemaResult, Violation};
use crate::schema::{RefSchema, Schema};
use crate::store::{DocumentType, SchemaStore};
use crate::validator::{ValidatorOptions, validate_with};
use rup_yaml::Document;

/// A schema node whose references are known to resolve in `store`.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedSchema<'s> {
    schema: &'s Schema,
    store: &'s SchemaStore,
}

/// Pair `schema` with `store`, checking that every reference in it resolves.
///
/// Nodes owned by the store are checked when the store is built; this is
/// for schemas compiled separately.
pub fn resolve<'s>(schema: &'s Schema, store: &'s SchemaStore) -> SchemaResult<ResolvedSchema<'s>> {
    let mut dangling: Vec<DanglingReference> = schema
        .references()
        .into_iter()
        .filter(|r| store.target(&r.target).is_none())
        .map(|r| DanglingReference {
            location: r.location.to_string(),
            reference: r.reference.clone(),
        })
        .collect();

    if !dangling.is_empty() {
        dangling.sort();
        return Err(SchemaError::Integrity { dangling });
    }
    Ok(ResolvedSchema { schema, store })
}

impl<'s> ResolvedSchema<'s> {
    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    pub fn store(&self) -> &'s SchemaStore {
        self.store
    }

    /// Target of a reference: the root schema or a definition.
    pub fn lookup(&self, reference: &RefSchema) -> Option<&'s Schema> {
        self.store.target(&reference.target)
    }

    /// Validate `value` with default options.
    pub fn evaluate_against(&self, value: &Document) -> Vec<Violation> {
        self.evaluate_with(value, &ValidatorOptions::default())
    }

    pub fn evaluate_with(&self, value: &Document, options: &ValidatorOptions) -> Vec<Violation> {
        validate_with(value, self, options)
    }
}

impl SchemaStore {
    pub fn resolve_root(&self) -> ResolvedSchema<'_> {
        ResolvedSchema {
            schema: self.root(),
            store: self,
        }
    }

    pub fn resolve_type(&self, doc_type: DocumentType) -> SchemaResult<ResolvedSchema<'_>> {
        Ok(ResolvedSchema {
            schema: self.definition(doc_type.definition_name())?,
            store: self,
        })
    }
}
