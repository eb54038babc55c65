//! j508
//!
//! Section 508 compliance fixer for HTML documents.
//!
//! Scans a DOM subtree for a fixed catalogue of accessibility problems and
//! fixes them in place:
//! - links opening new tabs without warning text
//! - missing `tabindex` on links, buttons and images
//! - missing `title` on links and buttons
//! - titles hidden by tooltip plugins
//! - disabled controls left in the tab order
//! - table cells without `scope`
//! - dropdown menus clipped by overflow
//! - date pickers that trap keyboard focus
//!
//! # Example
//! ```rust,ignore
//! use j508::{Compliance, Rule};
//!
//! let mut doc = j508_html::parse(html);
//! let mut compliance = Compliance::new();
//! let report = compliance.run(&mut doc)
//!     .rules(Rule::AMissingTabindex | Rule::TdMissingScope)
//!     .execute();
//! println!("{}", j508_html::serialize(&doc));
//! ```

mod compliance;
mod config;
mod report;
mod rule;
mod rules;
mod runner;
mod violation;
pub mod focus;
pub mod scheduler;
pub mod sink;

pub use compliance::{ActiveDropdown, Compliance};
pub use config::{FocusOrder, Options, RunConfiguration, Settings, Target};
pub use focus::{TabIndex, focus_candidates, is_focusable};
pub use report::Report;
pub use rule::{Rule, RuleParseError, RuleSet};
pub use runner::{MakeCompliant, Run};
pub use sink::{LogSink, MemorySink, NullSink, TracingSink};
pub use violation::{Severity, Violation};

// Re-export the DOM so callers need a single dependency
pub use j508_dom as dom;
pub use j508_html as html;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
