//! Error types for bounded loading.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for rup-yaml operations.
pub type Result<T> = std::result::Result<T, LoadError>;

/// Errors that abort loading before any validation can happen.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Raised from the file size alone, before the content is parsed.
    #[error("{} is {size} bytes, larger than the limit of {limit} bytes", .path.display())]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("YAML aliases exceed limit of {limit} expansions (line {line})")]
    AliasLimitExceeded { limit: usize, line: usize },

    /// Aliases stayed under the count but copy too many nodes in total.
    #[error("YAML aliases copy more than {limit} nodes (line {line})")]
    AliasNodesExceeded { limit: usize, line: usize },

    #[error("{message}{}", location_suffix(.line, .column))]
    MalformedSyntax {
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },

    /// `path` names the mapping holding the duplicate, e.g. `metadata.changelog[0]`.
    #[error("duplicate key '{key}' in mapping at {path}")]
    DuplicateKey { key: String, path: String },

    /// YAML constructs with no JSON counterpart.
    #[error("unsupported YAML: {message}{}", location_suffix(.line, .column))]
    UnsupportedYaml {
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },

    #[error("document nesting exceeds limit of {limit} levels")]
    NestingLimitExceeded { limit: usize },
}

impl LoadError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            LoadError::FileNotFound { .. } => "file-not-found",
            LoadError::Io { .. } => "io-error",
            LoadError::FileTooLarge { .. } => "file-too-large",
            LoadError::AliasLimitExceeded { .. } | LoadError::AliasNodesExceeded { .. } => {
                "alias-limit-exceeded"
            }
            LoadError::MalformedSyntax { .. } => "malformed-syntax",
            LoadError::DuplicateKey { .. } => "duplicate-key",
            LoadError::UnsupportedYaml { .. } => "unsupported-yaml",
            LoadError::NestingLimitExceeded { .. } => "nesting-limit-exceeded",
        }
    }

    pub(crate) fn malformed(message: impl Into<String>, marker: &yaml_rust2::scanner::Marker) -> Self {
        LoadError::MalformedSyntax {
            message: message.into(),
            line: Some(marker.line()),
            column: Some(marker.col() + 1),
        }
    }

    pub(crate) fn unsupported(message: impl Into<String>, marker: &yaml_rust2::scanner::Marker) -> Self {
        LoadError::UnsupportedYaml {
            message: message.into(),
            line: Some(marker.line()),
            column: Some(marker.col() + 1),
        }
    }
}

impl From<yaml_rust2::ScanError> for LoadError {
    fn from(err: yaml_rust2::ScanError) -> Self {
        LoadError::malformed(format!("invalid YAML: {}", err.info()), err.marker())
    }
}

fn location_suffix(line: &Option<usize>, column: &Option<usize>) -> String {
    match (*line, *column) {
        (Some(line), Some(column)) => format!(" at line {}, column {}", line, column),
        (Some(line), None) => format!(" at line {}", line),
        _ => String::new(),
    }
}
