//! Directory mode: every recognized file under a directory, in parallel.

use super::Session;
use crate::render::{FileResult, Summary};
use anyhow::Result;
use rayon::prelude::*;
use rup_yaml_validation::{Target, classify, validate_file};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub fn execute(session: &Session, directory: &Path) -> Result<bool> {
    if !directory.is_dir() {
        anyhow::bail!("Not a directory: {}", directory.display());
    }
    session.require_document_types()?;

    let files = discover(directory);
    tracing::info!(directory = %directory.display(), files = files.len(), "validating directory");

    let cap = session.config.display_cap();
    let results: Vec<FileResult> = files
        .par_iter()
        .map(|(path, target)| {
            match validate_file(path, *target, &session.store, &session.config) {
                Ok(outcome) => FileResult::checked(path, *target, outcome.report(cap)),
                Err(err) => {
                    tracing::warn!(path = %path.display(), code = err.code(), "could not validate file");
                    FileResult::failed(path, *target, &err)
                }
            }
        })
        .collect();

    let summary = Summary::of(&results);
    summary.print(directory, &results, session.format)?;
    Ok(summary.is_success())
}

/// Files with a target, sorted by path.
fn discover(directory: &Path) -> Vec<(PathBuf, Target)> {
    let mut files: Vec<(PathBuf, Target)> = WalkDir::new(directory)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| classify(e.path()).map(|target| (e.into_path(), target)))
        .collect();
    files.sort_by(|a, b| a.0.cmp(&b.0));
    files
}
