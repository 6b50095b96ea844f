use super::Session;
use anyhow::Result;
use rup_yaml_validation::{DocumentType, Target};
use std::path::Path;

pub fn execute(session: &Session, file: &Path, doc_type: &str) -> Result<bool> {
    let doc_type: DocumentType = doc_type.parse()?;
    session.require_document_types()?;
    session.check_single(file, Target::Output(doc_type))
}
