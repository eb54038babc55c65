//! Rule implementations
//!
//! Each rule queries the target subtree with its selector, fixes the
//! matches that still need it and records one violation per fix.

mod anchor;
mod attribute;
mod datepicker;
mod dropdown;

use j508_dom::{Document, ElementQuery, EventRegistry, NodeId, SelectorList};

use crate::compliance::Handler;
use crate::runner::Pass;
use crate::{Rule, Settings};

/// Everything a rule may touch during a run
pub(crate) struct RuleContext<'a> {
    pub doc: &'a mut Document,
    pub root: NodeId,
    pub settings: &'a Settings,
    pub listeners: &'a mut EventRegistry<Handler>,
    pub pass: Pass<'a>,
}

impl RuleContext<'_> {
    /// Elements under the root matching the rule's selector
    fn matches(&self, rule: Rule) -> Vec<NodeId> {
        match SelectorList::parse(rule.selector()) {
            Ok(selector) => self.doc.tree().select(self.root, &selector),
            Err(err) => {
                tracing::warn!(%rule, %err, "skipping rule with invalid selector");
                Vec::new()
            }
        }
    }
}

/// Run one rule over the context's subtree
pub(crate) fn apply(rule: Rule, cx: &mut RuleContext<'_>) {
    let matches = cx.matches(rule);
    tracing::debug!(%rule, matches = matches.len(), "applying rule");

    match rule {
        Rule::ABlankTarget => anchor::blank_target(cx, &matches),
        Rule::AMissingTitle => anchor::missing_title(cx, &matches),
        Rule::AMissingTabindex | Rule::ButtonMissingTabindex | Rule::ImgMissingTabindex => {
            attribute::set_missing(cx, rule, &matches, "tabindex", "0")
        }
        Rule::TdMissingScope => attribute::set_missing(cx, rule, &matches, "scope", "rowgroup"),
        Rule::ThMissingScope => attribute::set_missing(cx, rule, &matches, "scope", "colgroup"),
        Rule::ButtonMissingTitle => attribute::button_title(cx, &matches),
        Rule::DataToggleRestoreTitle => attribute::restore_title(cx, &matches),
        Rule::DisabledInputRemoveTabindex => attribute::disabled_tabindex(cx, &matches),
        Rule::DatePickerAddFix => datepicker::bind(cx, &matches),
        Rule::DropDownAddFix => dropdown::bind(cx, &matches),
    }
}
