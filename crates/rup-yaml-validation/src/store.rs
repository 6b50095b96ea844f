//! Schema store and document-type registry.

use crate::config::EngineConfig;
use crate::error::{DanglingReference, SchemaError, SchemaPath, SchemaResult};
use crate::schema::{RefTarget, Schema, compile};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use rup_yaml::{Document, load};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

static VERSION_IN_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/v(\d+\.\d+\.\d+)/").expect("valid regex"));

/// Logical type of an agent output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentType {
    Discovery,
    Plan,
    Execution,
    Verification,
}

impl DocumentType {
    pub const ALL: [DocumentType; 4] = [
        DocumentType::Discovery,
        DocumentType::Plan,
        DocumentType::Execution,
        DocumentType::Verification,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Discovery => "discovery",
            DocumentType::Plan => "plan",
            DocumentType::Execution => "execution",
            DocumentType::Verification => "verification",
        }
    }

    /// Name of the `$defs` entry describing this document type.
    pub fn definition_name(&self) -> &'static str {
        match self {
            DocumentType::Discovery => "DiscoveryReport",
            DocumentType::Plan => "PlanOutput",
            DocumentType::Execution => "ExecutionOutput",
            DocumentType::Verification => "VerificationOutput",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| SchemaError::UnknownType {
                name: s.to_string(),
            })
    }
}

/// The root schema and its named definitions.
///
/// Every reference in the store resolves; this is checked when the store is
/// built. The store is never mutated afterwards and can be shared across
/// threads by reference.
#[derive(Debug)]
pub struct SchemaStore {
    root: Schema,
    definitions: IndexMap<String, Schema>,
    version: Option<String>,
}

impl SchemaStore {
    /// Load a schema file under the same limits as documents.
    pub fn load(path: &Path, config: &EngineConfig) -> SchemaResult<Self> {
        let document = load(path, None, &config.load_options())?;
        let store = Self::from_document(&document)?;
        tracing::debug!(
            path = %path.display(),
            definitions = store.definitions.len(),
            version = ?store.version,
            "schema loaded"
        );
        Ok(store)
    }

    /// Compile the root schema and every `$defs` entry, then check that
    /// every reference resolves.
    pub fn from_document(document: &Document) -> SchemaResult<Self> {
        let root_location = SchemaPath::new();
        let root = compile(document, &root_location)?;

        let mut definitions = IndexMap::new();
        if let Some(defs) = document.get("$defs") {
            let defs_location = root_location.child("$defs");
            let entries = defs.as_mapping().ok_or_else(|| {
                SchemaError::invalid("'$defs' must be an object", &defs_location)
            })?;
            for (name, schema) in entries {
                definitions.insert(name.clone(), compile(schema, &defs_location.child(name.as_str()))?);
            }
        }

        let store = SchemaStore {
            root,
            definitions,
            version: schema_version_of(document),
        };
        store.check_integrity()?;
        Ok(store)
    }

    fn check_integrity(&self) -> SchemaResult<()> {
        let mut dangling: Vec<DanglingReference> = std::iter::once(&self.root)
            .chain(self.definitions.values())
            .flat_map(Schema::references)
            .filter(|r| self.target(&r.target).is_none())
            .map(|r| DanglingReference {
                location: r.location.to_string(),
                reference: r.reference.clone(),
            })
            .collect();

        if dangling.is_empty() {
            return Ok(());
        }
        dangling.sort();
        Err(SchemaError::Integrity { dangling })
    }

    pub fn root(&self) -> &Schema {
        &self.root
    }

    pub fn definition(&self, name: &str) -> SchemaResult<&Schema> {
        self.definitions
            .get(name)
            .ok_or_else(|| SchemaError::UnknownDefinition {
                name: name.to_string(),
            })
    }

    pub fn definition_names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    /// Definition for a document type given by name, e.g. `"plan"`.
    pub fn type_to_definition(&self, type_name: &str) -> SchemaResult<&Schema> {
        let doc_type: DocumentType = type_name.parse()?;
        self.definition(doc_type.definition_name())
    }

    /// Check that every registered document type has a definition.
    pub fn verify_document_types(&self) -> SchemaResult<()> {
        let dangling: Vec<DanglingReference> = DocumentType::ALL
            .into_iter()
            .filter(|t| !self.definitions.contains_key(t.definition_name()))
            .map(|t| DanglingReference {
                location: format!("document type '{}'", t),
                reference: RefTarget::Definition(t.definition_name().to_string()).to_string(),
            })
            .collect();

        if dangling.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::Integrity { dangling })
        }
    }

    /// Protocol version the schema describes, if it declares one.
    pub fn schema_version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub(crate) fn target(&self, target: &RefTarget) -> Option<&Schema> {
        match target {
            RefTarget::Root => Some(&self.root),
            RefTarget::Definition(name) => self.definitions.get(name),
        }
    }
}

/// `x_rup_schema_version` if it is a string, else the `/vX.Y.Z/` segment of `$id`.
fn schema_version_of(document: &Document) -> Option<String> {
    if let Some(version) = document.get("x_rup_schema_version").and_then(Document::as_str) {
        return Some(version.to_string());
    }
    let id = document.get("$id").and_then(Document::as_str)?;
    VERSION_IN_ID
        .captures(id)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
