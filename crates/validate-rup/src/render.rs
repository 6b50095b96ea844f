//! Printing results as plain text or JSON.

use anyhow::Result;
use clap::ValueEnum;
use rup_yaml_validation::{EngineError, Report, Target};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// What happened to one file.
#[derive(Debug, Serialize)]
pub struct FileResult {
    pub file: String,
    pub target: String,
    #[serde(flatten)]
    pub status: FileStatus,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Checked { report: Report },
    /// The file could not be loaded, or its type has no definition.
    Failed { code: &'static str, error: String },
}

impl FileResult {
    pub fn checked(path: &Path, target: Target, report: Report) -> Self {
        FileResult {
            file: path.display().to_string(),
            target: target.to_string(),
            status: FileStatus::Checked { report },
        }
    }

    pub fn failed(path: &Path, target: Target, error: &EngineError) -> Self {
        FileResult {
            file: path.display().to_string(),
            target: target.to_string(),
            status: FileStatus::Failed {
                code: error.code(),
                error: error.to_string(),
            },
        }
    }

    pub fn print(&self, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Text => print!("{}", self.to_text()),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(self)?),
        }
        Ok(())
    }

    fn to_text(&self) -> String {
        match &self.status {
            FileStatus::Checked { report } if report.valid => {
                format!("✓ {} ({})\n", self.file, self.target)
            }
            FileStatus::Checked { report } => {
                let mut text = format!("✗ {} ({})\n", self.file, self.target);
                for line in report.to_string().lines() {
                    text.push_str("  ");
                    text.push_str(line);
                    text.push('\n');
                }
                text
            }
            FileStatus::Failed { error, .. } => {
                format!("⚠ {} ({}): {}\n", self.file, self.target, error)
            }
        }
    }
}

/// Counts for a directory run.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub failed: usize,
}

impl Summary {
    pub fn of(results: &[FileResult]) -> Self {
        let mut summary = Summary {
            total: results.len(),
            ..Summary::default()
        };
        for result in results {
            match &result.status {
                FileStatus::Checked { report } if report.valid => summary.valid += 1,
                FileStatus::Checked { .. } => summary.invalid += 1,
                FileStatus::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }

    pub fn is_success(&self) -> bool {
        self.invalid == 0 && self.failed == 0
    }

    pub fn print(&self, directory: &Path, results: &[FileResult], format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Json => {
                let value = serde_json::json!({
                    "directory": directory.display().to_string(),
                    "results": results,
                    "summary": self,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
            OutputFormat::Text => print!("{}", self.to_text(directory, results)),
        }
        Ok(())
    }

    fn to_text(&self, directory: &Path, results: &[FileResult]) -> String {
        if results.is_empty() {
            return format!("Warning: No files found to validate in {}\n", directory.display());
        }

        let rule = "=".repeat(50);
        let mut text = format!("Validation Results\n{}\n", rule);
        for result in results {
            text.push_str(&result.to_text());
        }
        text.push_str(&format!("{}\nTotal: {} files\n", rule, self.total));
        text.push_str(&format!("  ✓ Valid: {}\n", self.valid));
        text.push_str(&format!("  ✗ Invalid: {}\n", self.invalid));
        if self.failed > 0 {
            text.push_str(&format!("  ⚠ Load errors: {}\n", self.failed));
        }
        text
    }
}
