//! Engine configuration.

use crate::report::DisplayCap;
use crate::validator::ValidatorOptions;
use rup_yaml::LoadOptions;
use serde::Deserialize;

/// Limits and display settings shared by every validation in a run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Files larger than this are rejected before parsing.
    pub max_file_bytes: u64,
    /// YAML alias expansions allowed per document.
    pub max_yaml_aliases: usize,
    /// Violations shown by default; `None` shows all.
    pub error_display_cap: Option<usize>,
    /// Deepest document nesting the validator descends into.
    pub max_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 5_242_880,
            max_yaml_aliases: 50,
            error_display_cap: Some(10),
            max_depth: 64,
        }
    }
}

impl EngineConfig {
    pub fn with_max_file_bytes(mut self, bytes: u64) -> Self {
        self.max_file_bytes = bytes;
        self
    }

    pub fn with_max_yaml_aliases(mut self, aliases: usize) -> Self {
        self.max_yaml_aliases = aliases;
        self
    }

    pub fn with_error_display_cap(mut self, cap: Option<usize>) -> Self {
        self.error_display_cap = cap;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            max_bytes: self.max_file_bytes,
            max_aliases: self.max_yaml_aliases,
            ..LoadOptions::default()
        }
    }

    pub fn validator_options(&self) -> ValidatorOptions {
        ValidatorOptions {
            max_depth: self.max_depth,
            ..ValidatorOptions::default()
        }
    }

    pub fn display_cap(&self) -> DisplayCap {
        match self.error_display_cap {
            Some(cap) => DisplayCap::Limited(cap),
            None => DisplayCap::All,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_file_bytes, 5_242_880);
        assert_eq!(config.max_yaml_aliases, 50);
        assert_eq!(config.display_cap(), DisplayCap::Limited(10));
        assert_eq!(config.validator_options().max_depth, 64);
        assert_eq!(config.load_options().max_aliases, 50);
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"max_yaml_aliases": 5, "error_display_cap": null}"#).unwrap();
        assert_eq!(config.max_yaml_aliases, 5);
        assert_eq!(config.display_cap(), DisplayCap::All);
        assert_eq!(config.max_file_bytes, 5_242_880);
    }

    #[test]
    fn test_builder_setters() {
        let config = EngineConfig::default()
            .with_max_file_bytes(10)
            .with_max_depth(3)
            .with_error_display_cap(None);
        assert_eq!(config.load_options().max_bytes, 10);
        assert_eq!(config.validator_options().max_depth, 3);
        assert_eq!(config.display_cap(), DisplayCap::All);
    }
}
