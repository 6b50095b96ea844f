//! Bounded, deterministic violation reports.

use crate::error::Violation;
use serde::Serialize;
use std::fmt;

/// How many violations a report shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayCap {
    Limited(usize),
    /// Verbose mode.
    All,
}

impl Default for DisplayCap {
    fn default() -> Self {
        DisplayCap::Limited(10)
    }
}

/// The first violations of a run plus a count of the rest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub valid: bool,
    pub total: usize,
    pub shown: Vec<Violation>,
    pub omitted_count: usize,
}

/// Project `violations` onto a report showing at most `cap` of them, in
/// emission order.
pub fn format(violations: &[Violation], cap: DisplayCap) -> Report {
    let limit = match cap {
        DisplayCap::Limited(n) => n.min(violations.len()),
        DisplayCap::All => violations.len(),
    };
    Report {
        valid: violations.is_empty(),
        total: violations.len(),
        shown: violations[..limit].to_vec(),
        omitted_count: violations.len() - limit,
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            return writeln!(f, "Valid");
        }
        writeln!(f, "Invalid: {} violation(s)", self.total)?;
        for violation in &self.shown {
            writeln!(f, "  ✗ {}", violation.path)?;
            writeln!(f, "    {}", violation.message)?;
            writeln!(f, "    at schema {}", violation.schema_path)?;
        }
        if self.omitted_count > 0 {
            writeln!(f, "  ... and {} more violation(s)", self.omitted_count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{InstancePath, SchemaPath, ViolationKind};

    fn violation(property: &str) -> Violation {
        let kind = ViolationKind::MissingRequired {
            property: property.to_string(),
        };
        let mut schema_path = SchemaPath::new();
        schema_path.push("required");
        Violation {
            path: InstancePath::new(),
            schema_path,
            message: kind.message(),
            kind,
            found: "{}".to_string(),
        }
    }

    fn violations(n: usize) -> Vec<Violation> {
        (0..n).map(|i| violation(&format!("p{i}"))).collect()
    }

    #[test]
    fn test_valid_report() {
        let report = format(&[], DisplayCap::default());
        assert!(report.valid);
        assert_eq!(report.total, 0);
        assert_eq!(report.omitted_count, 0);
        assert_eq!(report.to_string(), "Valid\n");
    }

    #[test]
    fn test_cap_keeps_first_in_order() {
        let all = violations(13);
        let report = format(&all, DisplayCap::Limited(10));
        assert!(!report.valid);
        assert_eq!(report.total, 13);
        assert_eq!(report.shown, all[..10].to_vec());
        assert_eq!(report.omitted_count, 3);
    }

    #[test]
    fn test_under_cap_and_verbose() {
        let all = violations(4);
        assert_eq!(format(&all, DisplayCap::Limited(10)).omitted_count, 0);
        let verbose = format(&violations(25), DisplayCap::All);
        assert_eq!(verbose.shown.len(), 25);
        assert_eq!(verbose.omitted_count, 0);
    }

    #[test]
    fn test_text_rendering() {
        let report = format(&violations(3), DisplayCap::Limited(1));
        assert_eq!(
            report.to_string(),
            "Invalid: 3 violation(s)\n  ✗ (root)\n    Missing required property 'p0'\n    at schema #/required\n  ... and 2 more violation(s)\n"
        );
    }

    #[test]
    fn test_json_shape() {
        let report = format(&violations(2), DisplayCap::Limited(1));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["omitted_count"], 1);
        assert_eq!(json["shown"][0]["path"], serde_json::json!([]));
        assert_eq!(json["shown"][0]["schema_path"], "#/required");
        assert_eq!(json["shown"][0]["type"], "MissingRequired");
        assert_eq!(json["shown"][0]["data"]["property"], "p0");
    }
}
