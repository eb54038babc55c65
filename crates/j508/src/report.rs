//! Run report

use serde::Serialize;

use crate::{Rule, Violation};

/// Everything one `make_compliant` call found and did
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    /// Every violation, in the order found
    pub violations: Vec<Violation>,
    /// Violations whose rule was selected for debug output
    pub logged: Vec<Violation>,
    /// Warning records for violations that could not be fixed
    pub failed: Vec<Violation>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> usize {
        self.violations.len()
    }

    /// Violations not also listed in `failed`
    pub fn fixed_count(&self) -> usize {
        self.violations.len().saturating_sub(self.failed.len())
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations recorded for one rule
    pub fn by_rule(&self, rule: Rule) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.rule == rule)
    }

    /// The two summary lines printed after a debug run
    pub fn summary_lines(&self) -> [String; 2] {
        [
            format!(
                "{} Violations Logged. {} Total Violations Found.",
                self.logged.len(),
                self.total()
            ),
            format!(
                "{} Violations Fixed. Unable to Fix {} Violations.",
                self.fixed_count(),
                self.failed.len()
            ),
        ]
    }
}
