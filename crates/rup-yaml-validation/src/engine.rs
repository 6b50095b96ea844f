//! File-level entry points: the protocol document and typed agent outputs.

use crate::config::EngineConfig;
use crate::error::{EngineError, InstancePath, SchemaPath, SchemaResult, Violation, ViolationKind};
use crate::report::{DisplayCap, Report, format};
use crate::store::{DocumentType, SchemaStore};
use crate::validator::validate_with;
use rup_yaml::{Document, load};
use std::fmt;
use std::path::Path;

/// What a document is validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// The root schema.
    Protocol,
    /// The definition registered for a document type.
    Output(DocumentType),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Protocol => f.write_str("protocol"),
            Target::Output(doc_type) => write!(f, "{} output", doc_type),
        }
    }
}

/// Violations found in one file.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub violations: Vec<Violation>,
}

impl Outcome {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn report(&self, cap: DisplayCap) -> Report {
        format(&self.violations, cap)
    }
}

/// Validate a protocol document against the root schema.
///
/// If the schema declares a version and the document's top-level
/// `schema_version` differs from it, a `VersionMismatch` comes first.
pub fn validate_protocol(document: &Document, store: &SchemaStore, config: &EngineConfig) -> Vec<Violation> {
    let mut violations = Vec::new();
    if let Some(expected) = store.schema_version()
        && let Some(version) = document.get("schema_version")
        && version.as_str() != Some(expected)
    {
        violations.push(version_mismatch(expected, version));
    }
    violations.extend(validate_with(document, &store.resolve_root(), &config.validator_options()));
    violations
}

/// Validate an agent output against the definition for its type.
pub fn validate_output(
    document: &Document,
    doc_type: DocumentType,
    store: &SchemaStore,
    config: &EngineConfig,
) -> SchemaResult<Vec<Violation>> {
    let resolved = store.resolve_type(doc_type)?;
    Ok(validate_with(document, &resolved, &config.validator_options()))
}

/// Load `path` under the configured limits and validate it.
pub fn validate_file(
    path: &Path,
    target: Target,
    store: &SchemaStore,
    config: &EngineConfig,
) -> Result<Outcome, EngineError> {
    let document = load(path, None, &config.load_options())?;
    let violations = match target {
        Target::Protocol => validate_protocol(&document, store, config),
        Target::Output(doc_type) => validate_output(&document, doc_type, store, config)?,
    };
    tracing::debug!(
        path = %path.display(),
        %target,
        violations = violations.len(),
        "validated"
    );
    Ok(Outcome { violations })
}

const OUTPUT_PREFIXES: &[(&str, DocumentType)] = &[
    ("discovery", DocumentType::Discovery),
    ("plan", DocumentType::Plan),
    ("execution", DocumentType::Execution),
    ("changes", DocumentType::Execution),
    ("verification", DocumentType::Verification),
    ("report", DocumentType::Verification),
];

/// Pick a target from a file name, for directory-wide validation.
///
/// YAML files whose name contains `protocol` (any case) are protocol
/// documents; JSON files named after an output type, or `changes*` and
/// `report*`, are outputs. Anything else is skipped.
pub fn classify(path: &Path) -> Option<Target> {
    let name = path.file_name()?.to_str()?;
    match path.extension()?.to_str()? {
        "yaml" | "yml" => name.to_lowercase().contains("protocol").then_some(Target::Protocol),
        "json" => OUTPUT_PREFIXES
            .iter()
            .find(|(prefix, _)| name.starts_with(prefix))
            .map(|(_, doc_type)| Target::Output(*doc_type)),
        _ => None,
    }
}

fn version_mismatch(expected: &str, version: &Document) -> Violation {
    let found = match version.as_str() {
        Some(text) => text.to_string(),
        None => serde_json::to_string(version).unwrap_or_else(|_| version.shape()),
    };
    let kind = ViolationKind::VersionMismatch {
        expected: expected.to_string(),
        found,
    };
    let mut path = InstancePath::new();
    path.push_key("schema_version");
    let mut schema_path = SchemaPath::new();
    schema_path.push("properties");
    schema_path.push("schema_version");
    Violation {
        path,
        schema_path,
        message: kind.message(),
        kind,
        found: version.shape(),
    }
}
