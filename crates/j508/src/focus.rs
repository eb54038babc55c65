//! Focus Management
//!
//! Keyboard focus trapping: confine Tab to the focusable elements of a
//! container.

use j508_dom::{DomTree, Document, EventType, NodeId};

use crate::compliance::{Compliance, Handler};
use crate::FocusOrder;

/// Form controls that take focus unless disabled
const FORM_CONTROLS: &[&str] = &["input", "select", "textarea", "button"];

/// Tab index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabIndex {
    NotFocusable,       // tabindex="-1" or unparsable
    Sequential(i32),    // tabindex="0" or positive
}

impl TabIndex {
    pub fn parse(value: &str) -> Self {
        match value.trim().parse::<i32>() {
            Ok(n) if n < 0 => Self::NotFocusable,
            Ok(n) => Self::Sequential(n),
            Err(_) => Self::NotFocusable,
        }
    }

    pub fn is_focusable(&self) -> bool {
        matches!(self, Self::Sequential(_))
    }
}

/// Can the element take keyboard focus?
pub fn is_focusable(tree: &DomTree, id: NodeId) -> bool {
    let Some(tag) = tree.tag_name(id) else {
        return false;
    };
    if tree.has_attribute(id, "disabled") {
        return false;
    }
    FORM_CONTROLS.contains(&tag)
        || (tag == "a" && tree.has_attribute(id, "href"))
        || tree.attribute(id, "tabindex").is_some_and(|t| TabIndex::parse(t).is_focusable())
}

impl FocusOrder {
    /// Rank focus candidates in place
    pub fn sort(self, tree: &DomTree, candidates: &mut [NodeId]) {
        match self {
            Self::DomOrder => {}
            Self::ClassName => {
                let class = |id: NodeId| tree.attribute(id, "class").unwrap_or("");
                candidates.sort_by(|a, b| class(*b).cmp(class(*a)));
            }
        }
    }
}

/// Focusable descendants of `container`, ranked by `order`
pub fn focus_candidates(tree: &DomTree, container: NodeId, order: FocusOrder) -> Vec<NodeId> {
    let mut candidates: Vec<NodeId> = tree.descendants(container)
        .map(|(id, _)| id)
        .filter(|&id| is_focusable(tree, id))
        .collect();
    order.sort(tree, &mut candidates);
    candidates
}

fn hook_key(id: &str) -> String {
    format!("tab.{id}")
}

fn hook_namespace(id: &str) -> String {
    format!("j508.tab.{id}")
}

impl Compliance {
    /// Confine Tab to `container`: focus its first candidate and send Tab
    /// pressed on the last one back to the first.
    ///
    /// Returns the element the listener was bound on, or `None` when the
    /// container has nothing focusable.
    pub fn hook_tab_index(&mut self, doc: &mut Document, id: &str, container: NodeId) -> Option<NodeId> {
        let candidates = focus_candidates(doc.tree(), container, self.focus_order);
        let (&first, &last) = (candidates.first()?, candidates.last()?);

        self.unhook_tab_index(id);

        doc.focus(first);
        self.listeners.bind(last, EventType::KeyDown, &hook_namespace(id), Handler::TabTrap { container });
        self.hooks.insert(hook_key(id), last);

        tracing::debug!(hook = id, first = %first, last = %last, candidates = candidates.len(), "tab trap hooked");
        Some(last)
    }

    /// Remove a focus trap. Unknown ids are ignored.
    pub fn unhook_tab_index(&mut self, id: &str) -> bool {
        let Some(element) = self.hooks.remove(&hook_key(id)) else {
            return false;
        };
        self.listeners.unbind(element, EventType::KeyDown, &hook_namespace(id));
        tracing::debug!(hook = id, "tab trap unhooked");
        true
    }

    /// Element a trap is bound on
    pub fn hook(&self, id: &str) -> Option<NodeId> {
        self.hooks.get(&hook_key(id)).copied()
    }

    /// Tab pressed on the last element of a trap
    pub(crate) fn wrap_focus(&self, doc: &mut Document, container: NodeId) -> bool {
        let candidates = focus_candidates(doc.tree(), container, self.focus_order);
        match candidates.first() {
            Some(&first) => doc.focus(first),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> (Document, NodeId, Vec<NodeId>) {
        let mut doc = Document::default();
        let body = doc.body();
        let tree = doc.tree_mut();
        let container = tree.create_element("form");
        tree.append_child(body, container).unwrap();

        let mut ids = Vec::new();
        for (tag, attrs) in [
            ("input", vec![]),
            ("a", vec![("href", "/x")]),
            ("a", vec![]),
            ("button", vec![("disabled", "")]),
            ("div", vec![("tabindex", "0")]),
            ("span", vec![("tabindex", "-1")]),
        ] {
            let el = tree.create_element(tag);
            for (name, value) in attrs {
                tree.set_attribute(el, name, value).unwrap();
            }
            tree.append_child(container, el).unwrap();
            ids.push(el);
        }
        (doc, container, ids)
    }

    #[test]
    fn test_tab_index() {
        assert!(!TabIndex::parse("-1").is_focusable());
        assert!(TabIndex::parse("0").is_focusable());
        assert!(TabIndex::parse("5").is_focusable());
        assert!(!TabIndex::parse("abc").is_focusable());
    }

    #[test]
    fn test_candidates_skip_disabled_and_plain() {
        let (doc, container, ids) = form();
        let found = focus_candidates(doc.tree(), container, FocusOrder::DomOrder);
        assert_eq!(found, vec![ids[0], ids[1], ids[4]]);
    }

    #[test]
    fn test_class_name_order_is_descending_and_stable() {
        let mut tree = DomTree::new();
        let mut ids = Vec::new();
        for class in ["b", "a", "c", "b"] {
            let el = tree.create_element("input");
            tree.set_attribute(el, "class", class).unwrap();
            tree.append_child(tree.root(), el).unwrap();
            ids.push(el);
        }
        let mut ranked = ids.clone();
        FocusOrder::ClassName.sort(&tree, &mut ranked);
        assert_eq!(ranked, vec![ids[2], ids[0], ids[3], ids[1]]);
    }

    #[test]
    fn test_hook_and_unhook() {
        let (mut doc, container, ids) = form();
        let mut compliance = Compliance::new();

        assert_eq!(compliance.hook_tab_index(&mut doc, "dialog", container), Some(ids[4]));
        assert_eq!(doc.focused(), Some(ids[0]));
        assert_eq!(compliance.hook("dialog"), Some(ids[4]));
        assert!(compliance.is_bound(ids[4], EventType::KeyDown, "j508.tab.dialog"));

        assert!(compliance.unhook_tab_index("dialog"));
        assert!(!compliance.is_bound(ids[4], EventType::KeyDown, "j508.tab.dialog"));
        assert!(!compliance.unhook_tab_index("dialog"));
    }

    #[test]
    fn test_hook_without_candidates() {
        let mut doc = Document::default();
        let body = doc.body();
        let empty = doc.tree_mut().create_element("div");
        doc.tree_mut().append_child(body, empty).unwrap();

        let mut compliance = Compliance::new();
        assert_eq!(compliance.hook_tab_index(&mut doc, "x", empty), None);
        assert_eq!(compliance.hook("x"), None);
        assert_eq!(doc.focused(), None);
    }
}
