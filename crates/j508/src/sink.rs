//! Log sinks
//!
//! Where debug output of a run goes. The default sink writes through
//! `tracing`; tests collect lines in memory.

use std::cell::RefCell;
use std::rc::Rc;

use crate::{Report, Violation};

/// Receives debug output for logged violations
pub trait LogSink {
    /// One logged violation; `ordinal` is 1-based among logged violations
    fn violation(&mut self, ordinal: usize, violation: &Violation);

    /// End-of-run summary, emitted only for debug runs
    fn summary(&mut self, report: &Report);
}

/// Render the line for one logged violation
pub fn violation_line(ordinal: usize, violation: &Violation) -> String {
    format!("{ordinal}. {} :: {}", violation.message(), violation.context_label)
}

/// Sink that forwards to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn violation(&mut self, ordinal: usize, violation: &Violation) {
        tracing::info!(
            ordinal,
            rule = %violation.rule,
            element = %violation.context_label,
            node = %violation.context,
            "{}",
            violation_line(ordinal, violation)
        );
    }

    fn summary(&mut self, report: &Report) {
        let [logged, fixed] = report.summary_lines();
        let logged_labels: Vec<&str> = report.logged.iter().map(|v| v.context_label.as_str()).collect();
        tracing::info!(logged = ?logged_labels, total = report.total(), "{logged}");
        tracing::info!(failed = report.failed.len(), "{fixed}");
        for warning in &report.failed {
            tracing::warn!(
                rule = %warning.rule,
                element = %warning.context_label,
                "{}",
                warning.message()
            );
        }
    }
}

/// Sink that collects rendered lines; clones share the same buffer
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Rc<RefCell<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines collected so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn clear(&self) {
        self.lines.borrow_mut().clear();
    }
}

impl LogSink for MemorySink {
    fn violation(&mut self, ordinal: usize, violation: &Violation) {
        self.lines.borrow_mut().push(violation_line(ordinal, violation));
    }

    fn summary(&mut self, report: &Report) {
        let mut lines = self.lines.borrow_mut();
        lines.extend(report.summary_lines());
        lines.extend(report.failed.iter().map(Violation::message));
    }
}

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn violation(&mut self, _ordinal: usize, _violation: &Violation) {}

    fn summary(&mut self, _report: &Report) {}
}
