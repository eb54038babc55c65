//! Compliance runner
//!
//! Normalizes the target and options, runs the selected rules in
//! declaration order and assembles the report.

use j508_dom::{Document, NodeId};

use crate::compliance::Compliance;
use crate::rules::{self, RuleContext};
use crate::sink::LogSink;
use crate::{Options, Report, RuleSet, RunConfiguration, Target, Violation};

/// Violations collected during one run
pub(crate) struct Pass<'a> {
    config: RunConfiguration,
    report: Report,
    sink: &'a mut dyn LogSink,
}

impl<'a> Pass<'a> {
    fn new(config: RunConfiguration, sink: &'a mut dyn LogSink) -> Self {
        Self { config, report: Report::new(), sink }
    }

    /// Record a violation, logging it when its rule is debugged
    pub(crate) fn record(&mut self, violation: Violation) {
        if self.config.debug.contains(violation.rule) {
            self.report.logged.push(violation.clone());
            self.sink.violation(self.report.logged.len(), &violation);
        }
        self.report.violations.push(violation);
    }

    /// Record a violation that could not be fixed properly
    pub(crate) fn record_failed(&mut self, violation: Violation) {
        self.report.failed.push(violation.to_warning());
        self.record(violation);
    }

    fn finish(self) -> Report {
        if !self.config.debug.is_empty() {
            self.sink.summary(&self.report);
        }
        self.report
    }
}

impl Compliance {
    /// Fix the subtree under `target` according to `options`.
    ///
    /// Never fails: invalid targets fall back to the body, rules with no
    /// matches do nothing and links that cannot be titled are reported in
    /// `Report::failed`.
    pub fn make_compliant(
        &mut self,
        doc: &mut Document,
        target: impl Into<Target>,
        options: impl Into<Options>,
    ) -> Report {
        let root = target.into().resolve(doc);
        let config = options.into().resolve();
        self.execute(doc, root, config)
    }

    /// Run every rule without debug output
    pub fn run_all(&mut self, doc: &mut Document, target: impl Into<Target>) -> Report {
        self.make_compliant(doc, target, Options::None)
    }

    pub fn run_with_config(
        &mut self,
        doc: &mut Document,
        target: impl Into<Target>,
        config: RunConfiguration,
    ) -> Report {
        self.make_compliant(doc, target, Options::Config(config))
    }

    /// Run and log every rule
    pub fn run_debug_all(&mut self, doc: &mut Document, target: impl Into<Target>) -> Report {
        self.make_compliant(doc, target, Options::Debug(true))
    }

    /// Start a builder-style run
    pub fn run<'a>(&'a mut self, doc: &'a mut Document) -> Run<'a> {
        Run {
            compliance: self,
            doc,
            target: Target::Body,
            config: RunConfiguration::default(),
        }
    }

    fn execute(&mut self, doc: &mut Document, root: NodeId, config: RunConfiguration) -> Report {
        tracing::debug!(root = %root, rules = %config.rules, debug = %config.debug, "making subtree compliant");

        let Compliance { settings, listeners, sink, .. } = self;
        let mut cx = RuleContext {
            doc,
            root,
            settings,
            listeners,
            pass: Pass::new(config, sink.as_mut()),
        };
        for rule in config.rules.iter() {
            rules::apply(rule, &mut cx);
        }
        let report = cx.pass.finish();

        tracing::debug!(
            total = report.total(),
            fixed = report.fixed_count(),
            failed = report.failed.len(),
            "run complete"
        );
        report
    }
}

/// Builder for one run
pub struct Run<'a> {
    compliance: &'a mut Compliance,
    doc: &'a mut Document,
    target: Target,
    config: RunConfiguration,
}

impl<'a> Run<'a> {
    /// Limit the run to a subtree
    pub fn within(mut self, target: impl Into<Target>) -> Self {
        self.target = target.into();
        self
    }

    pub fn rules(mut self, rules: impl Into<RuleSet>) -> Self {
        self.config.rules = rules.into();
        self
    }

    pub fn debug(mut self, debug: impl Into<RuleSet>) -> Self {
        self.config.debug = debug.into();
        self
    }

    pub fn execute(self) -> Report {
        self.compliance.run_with_config(self.doc, self.target, self.config)
    }
}

/// `make_compliant` on the document itself
pub trait MakeCompliant {
    fn make_compliant(&mut self, compliance: &mut Compliance, options: impl Into<Options>) -> Report;
}

impl MakeCompliant for Document {
    fn make_compliant(&mut self, compliance: &mut Compliance, options: impl Into<Options>) -> Report {
        compliance.make_compliant(self, Target::Body, options)
    }
}
