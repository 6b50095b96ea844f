//! Command implementations for validate-rup
//!
//! Each command returns `Ok(true)` when everything it checked is valid.
//! Load and schema errors for a single file are fatal; in directory mode they
//! are counted and the remaining files are still checked.

pub mod all;
pub mod output;
pub mod protocol;

use crate::render::{FileResult, OutputFormat};
use anyhow::{Context, Result};
use rup_yaml_validation::{EngineConfig, SchemaStore, Target, validate_file};
use std::path::Path;

/// The schema and settings shared by every file in one run.
pub struct Session {
    pub store: SchemaStore,
    pub config: EngineConfig,
    pub format: OutputFormat,
}

impl Session {
    pub fn open(schema: &Path, config: EngineConfig, format: OutputFormat) -> Result<Self> {
        let store = SchemaStore::load(schema, &config)
            .with_context(|| format!("Failed to load schema: {}", schema.display()))?;
        Ok(Session {
            store,
            config,
            format,
        })
    }

    /// Fail unless every document type has a definition in the schema.
    fn require_document_types(&self) -> Result<()> {
        self.store
            .verify_document_types()
            .context("Schema does not define every document type")
    }

    /// Validate one file, treating load and schema errors as fatal.
    fn check_single(&self, file: &Path, target: Target) -> Result<bool> {
        let outcome = validate_file(file, target, &self.store, &self.config)
            .with_context(|| format!("Failed to validate {}", file.display()))?;
        let result = FileResult::checked(file, target, outcome.report(self.config.display_cap()));
        result.print(self.format)?;
        Ok(outcome.is_valid())
    }
}
