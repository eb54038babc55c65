//! Run configuration
//!
//! What to run, what to log and the texts and numbers the fixes use.

use j508_dom::{Document, NodeId};
use serde::{Deserialize, Serialize};

use crate::{Rule, RuleSet};

/// Which rules run and which of those are logged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfiguration {
    pub rules: RuleSet,
    /// Only consulted for rules also present in `rules`
    pub debug: RuleSet,
}

impl Default for RunConfiguration {
    fn default() -> Self {
        Self {
            rules: RuleSet::ALL,
            debug: RuleSet::EMPTY,
        }
    }
}

impl RunConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(mut self, rules: impl Into<RuleSet>) -> Self {
        self.rules = rules.into();
        self
    }

    pub fn with_debug(mut self, debug: impl Into<RuleSet>) -> Self {
        self.debug = debug.into();
        self
    }

    /// Does the rule run and get logged?
    pub fn logs(&self, rule: Rule) -> bool {
        self.rules.contains(rule) && self.debug.contains(rule)
    }
}

/// Options accepted by `make_compliant`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Options {
    /// All rules, no debug output
    #[default]
    None,
    /// `true` logs every rule; `false` is the same as `None`
    Debug(bool),
    Config(RunConfiguration),
}

impl Options {
    pub fn resolve(self) -> RunConfiguration {
        match self {
            Self::None | Self::Debug(false) => RunConfiguration::default(),
            Self::Debug(true) => RunConfiguration::default().with_debug(RuleSet::ALL),
            Self::Config(config) => config,
        }
    }
}

impl From<bool> for Options {
    fn from(debug: bool) -> Self {
        Self::Debug(debug)
    }
}

impl From<RunConfiguration> for Options {
    fn from(config: RunConfiguration) -> Self {
        Self::Config(config)
    }
}

impl From<Option<RunConfiguration>> for Options {
    fn from(config: Option<RunConfiguration>) -> Self {
        config.map_or(Self::None, Self::Config)
    }
}

/// Subtree a run works on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    #[default]
    Body,
    Node(NodeId),
}

impl Target {
    /// Resolve against a document. Anything that is not an attached
    /// element falls back to the body (or the document node).
    pub fn resolve(self, doc: &Document) -> NodeId {
        match self {
            Self::Node(id) if doc.is_element(id) => id,
            Self::Node(id) => {
                tracing::debug!(node = %id, "target is not an attached element; using body");
                doc.body_or_root()
            }
            Self::Body => doc.body_or_root(),
        }
    }
}

impl From<NodeId> for Target {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<Option<NodeId>> for Target {
    fn from(id: Option<NodeId>) -> Self {
        id.map_or(Self::Body, Self::Node)
    }
}

/// Order in which focus-trap candidates are ranked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FocusOrder {
    /// Document order
    #[default]
    DomOrder,
    /// Descending by `class` attribute, ties kept in document order
    ClassName,
}

/// Texts and numbers used by the fixes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Text of the span inserted after new-tab links
    pub sr_text: String,
    /// Class of that span; also how an existing one is recognized
    pub sr_class: String,
    /// Title given to links nothing better could be found for
    pub anonymous_title: String,
    /// Gap kept between a relocated dropdown and the right viewport edge
    pub viewport_margin: f64,
    /// Delay before deferred focus moves, in milliseconds
    pub focus_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sr_text: "(link opens in a new tab)".to_string(),
            sr_class: "sr-only".to_string(),
            anonymous_title: "Anonymous hyperlink".to_string(),
            viewport_margin: 50.0,
            focus_delay_ms: 10,
        }
    }
}

impl Settings {
    pub fn with_sr_text(mut self, text: impl Into<String>) -> Self {
        self.sr_text = text.into();
        self
    }

    pub fn with_sr_class(mut self, class: impl Into<String>) -> Self {
        self.sr_class = class.into();
        self
    }

    pub fn with_anonymous_title(mut self, title: impl Into<String>) -> Self {
        self.anonymous_title = title.into();
        self
    }

    pub fn with_viewport_margin(mut self, margin: f64) -> Self {
        self.viewport_margin = margin;
        self
    }

    pub fn with_focus_delay(mut self, ms: u64) -> Self {
        self.focus_delay_ms = ms;
        self
    }
}
