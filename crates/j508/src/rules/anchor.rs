//! Hyperlink rules: new-tab warnings and missing titles

use j508_dom::{DomResult, DomTree, NodeId};
use j508_html::get_inner_html;
use once_cell::sync::Lazy;
use regex::Regex;

use super::RuleContext;
use crate::{Rule, Settings, Violation};

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<.*?>").expect("static regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s\s+").expect("static regex"));

/// Attributes tried, in order, when a link has no text
const TITLE_FALLBACKS: &[&str] = &["id", "name", "href"];

/// Inner HTML reduced to plain text: tags dropped, whitespace runs
/// collapsed, `&amp;` unescaped, trimmed
pub(crate) fn scrub_markup(html: &str) -> String {
    let text = TAG_RE.replace_all(html, "");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    text.replace("&amp;", "&").trim().to_string()
}

/// Best title for a link: its text, else the first non-blank of
/// `id`, `name` and `href`
pub(crate) fn derive_title(tree: &DomTree, anchor: NodeId) -> Option<String> {
    let text = scrub_markup(&get_inner_html(tree, anchor));
    if !text.is_empty() {
        return Some(text);
    }
    TITLE_FALLBACKS.iter()
        .filter_map(|attr| tree.attribute(anchor, attr))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

fn insert_sr_text(tree: &mut DomTree, anchor: NodeId, settings: &Settings) -> DomResult<NodeId> {
    let span = tree.create_element("span");
    tree.set_attribute(span, "class", settings.sr_class.as_str())?;
    let text = tree.create_text(&settings.sr_text);
    tree.append_child(span, text)?;
    tree.insert_after(anchor, span)
}

pub(super) fn blank_target(cx: &mut RuleContext<'_>, matches: &[NodeId]) {
    for &anchor in matches {
        let tree = cx.doc.tree();
        // Any class containing the sr class counts, e.g. `sr-only-focusable`
        let announced = tree.next_element_sibling(anchor)
            .and_then(|next| tree.attribute(next, "class"))
            .is_some_and(|class| class.contains(cx.settings.sr_class.as_str()));
        if announced {
            continue;
        }

        if let Err(err) = insert_sr_text(cx.doc.tree_mut(), anchor, cx.settings) {
            tracing::warn!(%err, node = %anchor, "could not insert screen-reader text");
            continue;
        }
        let violation = Violation::new(Rule::ABlankTarget, cx.doc.tree(), anchor);
        cx.pass.record(violation);
    }
}

pub(super) fn missing_title(cx: &mut RuleContext<'_>, matches: &[NodeId]) {
    for &anchor in matches {
        let derived = derive_title(cx.doc.tree(), anchor);
        let fixed = derived.is_some();
        let title = derived.unwrap_or_else(|| cx.settings.anonymous_title.clone());

        if let Err(err) = cx.doc.tree_mut().set_attribute(anchor, "title", title.as_str()) {
            tracing::warn!(%err, node = %anchor, "could not set title");
            continue;
        }

        let violation = Violation::new(Rule::AMissingTitle, cx.doc.tree(), anchor).with_value(title);
        if fixed {
            cx.pass.record(violation);
        } else {
            let violation = violation.unfixed().with_comments("no text, id, name or href to derive a title from");
            cx.pass.record_failed(violation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrub_markup() {
        assert_eq!(scrub_markup("<b>Save</b>   <i>now</i>"), "Save now");
        assert_eq!(scrub_markup("  Tom &amp; Jerry \n"), "Tom & Jerry");
        assert_eq!(scrub_markup("<img src=\"x.png\">"), "");
    }

    #[test]
    fn test_derive_title_fallbacks() {
        let mut tree = DomTree::new();
        let a = tree.create_element("a");
        tree.append_child(tree.root(), a).unwrap();
        tree.set_attribute(a, "id", "").unwrap();
        tree.set_attribute(a, "name", "foo").unwrap();
        tree.set_attribute(a, "href", "/bar").unwrap();
        assert_eq!(derive_title(&tree, a).as_deref(), Some("foo"));

        tree.set_attribute(a, "name", "  ").unwrap();
        assert_eq!(derive_title(&tree, a).as_deref(), Some("/bar"));

        tree.set_attribute(a, "href", "").unwrap();
        assert_eq!(derive_title(&tree, a), None);
    }

    #[test]
    fn test_derive_title_prefers_text() {
        let mut tree = DomTree::new();
        let a = tree.create_element("a");
        let text = tree.create_text("Home");
        tree.append_child(tree.root(), a).unwrap();
        tree.append_child(a, text).unwrap();
        tree.set_attribute(a, "id", "nav-home").unwrap();
        assert_eq!(derive_title(&tree, a).as_deref(), Some("Home"));
    }
}
