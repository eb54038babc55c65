//! Violation records

use j508_dom::{DomTree, NodeId};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::Rule;

/// How bad a record is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Found and fixed
    #[default]
    Info,
    /// Could not be fixed properly
    Warning,
}

/// One detected (and possibly fixed) issue
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub rule: Rule,
    pub severity: Severity,
    /// Element the rule matched
    pub context: NodeId,
    /// `tag#id.class` snapshot of the element when the record was made
    pub context_label: String,
    /// Value the fix wrote, for rules that write one
    pub value: Option<String>,
    pub fixed: bool,
    pub comments: Option<String>,
}

impl Violation {
    /// A fixed, informational record for `context`
    pub fn new(rule: Rule, tree: &DomTree, context: NodeId) -> Self {
        Self {
            rule,
            severity: Severity::Info,
            context,
            context_label: tree.describe(context),
            value: None,
            fixed: true,
            comments: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }

    /// Mark the record as not properly fixed
    pub fn unfixed(mut self) -> Self {
        self.fixed = false;
        self
    }

    /// Same record, raised to a warning
    pub fn to_warning(&self) -> Self {
        Self { severity: Severity::Warning, ..self.clone() }
    }

    /// Human-readable message with the value filled in
    pub fn message(&self) -> String {
        let template = match self.severity {
            Severity::Warning => self.rule.warning_template().unwrap_or(self.rule.message_template()),
            Severity::Info => self.rule.message_template(),
        };
        template.replace("{value}", self.value.as_deref().unwrap_or(""))
    }
}

impl Serialize for Violation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Violation", 8)?;
        state.serialize_field("rule", &self.rule)?;
        state.serialize_field("severity", &self.severity)?;
        state.serialize_field("node", &self.context.index())?;
        state.serialize_field("element", &self.context_label)?;
        state.serialize_field("value", &self.value)?;
        state.serialize_field("fixed", &self.fixed)?;
        state.serialize_field("comments", &self.comments)?;
        state.serialize_field("message", &self.message())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor() -> (DomTree, NodeId) {
        let mut tree = DomTree::new();
        let a = tree.create_element("a");
        tree.append_child(tree.root(), a).unwrap();
        tree.set_attribute(a, "id", "home").unwrap();
        (tree, a)
    }

    #[test]
    fn test_message_fills_value() {
        let (tree, a) = anchor();
        let v = Violation::new(Rule::AMissingTitle, &tree, a).with_value("Home");
        assert_eq!(v.message(), "Adding missing title attribute as \"Home\" for hyperlink");
        assert_eq!(v.context_label, "a#home");
        assert!(v.fixed);
    }

    #[test]
    fn test_warning_message() {
        let (tree, a) = anchor();
        let v = Violation::new(Rule::AMissingTitle, &tree, a)
            .with_value("Anonymous hyperlink")
            .unfixed()
            .to_warning();
        assert_eq!(v.severity, Severity::Warning);
        assert!(v.message().starts_with("WARNING: Unable to find an appropriate title"));
        assert!(v.message().contains("\"Anonymous hyperlink\""));
    }

    #[test]
    fn test_message_without_value() {
        let (tree, a) = anchor();
        let v = Violation::new(Rule::ABlankTarget, &tree, a);
        assert_eq!(v.message(), "Inserting missing sr-only element after blank target hyperlink.");
    }
}
