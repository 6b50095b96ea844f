//! File loading with size, alias and nesting limits.

use crate::document::Document;
use crate::error::{LoadError, Result};
use crate::json::parse_json;
use crate::parser::parse_yaml;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Input syntax of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// `.json` files are JSON; everything else is read as YAML.
    pub fn from_path(path: &Path) -> Format {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

/// Resource limits applied while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Largest accepted file, in bytes.
    pub max_bytes: u64,
    /// Largest accepted number of YAML alias expansions per document.
    pub max_aliases: usize,
    /// Largest accepted number of nodes copied by those expansions.
    pub max_alias_nodes: usize,
    /// Deepest accepted container nesting.
    pub max_nesting: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_bytes: 5_242_880,
            max_aliases: 50,
            max_alias_nodes: 10_000,
            max_nesting: 256,
        }
    }
}

/// Load a YAML or JSON file into a [`Document`].
///
/// The format is taken from `format`, or inferred from the file extension
/// when `None`. The file size is checked against `options.max_bytes` before
/// any content is read.
///
/// # Errors
///
/// Returns a [`LoadError`] if the file is missing, unreadable, too large,
/// not UTF-8, or rejected by the parser.
pub fn load(path: &Path, format: Option<Format>, options: &LoadOptions) -> Result<Document> {
    let format = format.unwrap_or_else(|| Format::from_path(path));

    let metadata = std::fs::metadata(path).map_err(|source| io_error(path, source))?;
    if metadata.len() > options.max_bytes {
        tracing::debug!(path = %path.display(), size = metadata.len(), "file rejected before reading");
        return Err(LoadError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            limit: options.max_bytes,
        });
    }

    let file = File::open(path).map_err(|source| io_error(path, source))?;
    let mut bytes = Vec::with_capacity(usize::try_from(metadata.len()).unwrap_or(0));
    file.take(options.max_bytes.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|source| io_error(path, source))?;

    // The file may have grown since it was stat'ed.
    let read = bytes.len() as u64;
    if read > options.max_bytes {
        return Err(LoadError::FileTooLarge {
            path: path.to_path_buf(),
            size: read,
            limit: options.max_bytes,
        });
    }

    let content = String::from_utf8(bytes).map_err(|err| LoadError::MalformedSyntax {
        message: format!("{} is not valid UTF-8: {}", path.display(), err.utf8_error()),
        line: None,
        column: None,
    })?;

    tracing::debug!(path = %path.display(), ?format, bytes = read, "loading document");
    parse_str(&content, format, options)
}

/// Parse in-memory text. `max_bytes` is not applied; the other limits are.
///
/// # Errors
///
/// Returns a [`LoadError`] if the text is malformed or exceeds a limit.
pub fn parse_str(content: &str, format: Format, options: &LoadOptions) -> Result<Document> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    match format {
        Format::Yaml => parse_yaml(content, options),
        Format::Json => parse_json(content, options),
    }
}

fn io_error(path: &Path, source: std::io::Error) -> LoadError {
    if source.kind() == ErrorKind::NotFound {
        LoadError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else {
        LoadError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
