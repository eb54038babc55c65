//! Attribute rules: tabindex, scope and title fixes

use j508_dom::NodeId;
use j508_html::get_inner_html;

use super::RuleContext;
use super::anchor::scrub_markup;
use crate::{Rule, Violation};

/// Write `value` into `attr` and record the fix
fn write(cx: &mut RuleContext<'_>, rule: Rule, element: NodeId, attr: &str, value: &str) {
    if let Err(err) = cx.doc.tree_mut().set_attribute(element, attr, value) {
        tracing::warn!(%rule, %err, node = %element, "could not set {attr}");
        return;
    }
    let violation = Violation::new(rule, cx.doc.tree(), element).with_value(value);
    cx.pass.record(violation);
}

/// Fixed value for an attribute the selector found missing
pub(super) fn set_missing(cx: &mut RuleContext<'_>, rule: Rule, matches: &[NodeId], attr: &str, value: &str) {
    for &element in matches {
        write(cx, rule, element, attr, value);
    }
}

/// Buttons get their text as title; buttons without text are left alone
pub(super) fn button_title(cx: &mut RuleContext<'_>, matches: &[NodeId]) {
    for &button in matches {
        let title = scrub_markup(&get_inner_html(cx.doc.tree(), button));
        if title.is_empty() {
            continue;
        }
        write(cx, Rule::ButtonMissingTitle, button, "title", &title);
    }
}

/// Put back titles a tooltip plugin moved into `data-original-title`
pub(super) fn restore_title(cx: &mut RuleContext<'_>, matches: &[NodeId]) {
    for &element in matches {
        let tree = cx.doc.tree();
        let Some(original) = tree.attribute(element, "data-original-title") else {
            continue;
        };
        if tree.attribute(element, "title") == Some(original) {
            continue;
        }
        let original = original.to_string();
        write(cx, Rule::DataToggleRestoreTitle, element, "title", &original);
    }
}

/// Take disabled controls out of the tab order
pub(super) fn disabled_tabindex(cx: &mut RuleContext<'_>, matches: &[NodeId]) {
    for &element in matches {
        if cx.doc.tree().attribute(element, "tabindex") == Some("-1") {
            continue;
        }
        write(cx, Rule::DisabledInputRemoveTabindex, element, "tabindex", "-1");
    }
}
