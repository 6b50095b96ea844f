use super::Session;
use anyhow::Result;
use rup_yaml_validation::Target;
use std::path::Path;

pub fn execute(session: &Session, file: &Path) -> Result<bool> {
    session.check_single(file, Target::Protocol)
}
