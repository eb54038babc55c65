//! Dropdown overflow fix
//!
//! Menus inside containers with hidden overflow get clipped. While a menu
//! is shown it is moved to the body and positioned absolutely under its
//! owner; hiding it puts it back. Scrolling or resizing closes every
//! relocated menu since its position is stale.

use j508_dom::{Document, ElementQuery, Event, EventTarget, EventType, NodeId, SelectorList};

use super::RuleContext;
use crate::compliance::{ActiveDropdown, Compliance, Handler};
use crate::scheduler::Task;
use crate::{Rule, Settings, Violation};

/// Listener namespace for scroll/resize handlers
pub(crate) const HIDE_NAMESPACE: &str = "j508.dropdown";
/// Listener namespace for the bootstrap dropdown events
pub(crate) const NAMESPACE: &str = "j508";

pub(crate) const SHOW: EventType = EventType::Custom("show.bs.dropdown");
pub(crate) const SHOWN: EventType = EventType::Custom("shown.bs.dropdown");
pub(crate) const HIDE: EventType = EventType::Custom("hide.bs.dropdown");

const MENU: &str = "ul.dropdown-menu:not(.inline)";

pub(super) fn bind(cx: &mut RuleContext<'_>, matches: &[NodeId]) {
    // Any scroll anywhere closes relocated menus
    let tree = cx.doc.tree();
    let scrollables: Vec<NodeId> = std::iter::once(tree.root())
        .chain(tree.descendants(tree.root()).filter(|(_, n)| n.is_element()).map(|(id, _)| id))
        .collect();
    for node in scrollables {
        cx.listeners.bind(node, EventType::Scroll, HIDE_NAMESPACE, Handler::HideActiveDropdowns);
    }
    cx.listeners.bind(EventTarget::Window, EventType::Resize, HIDE_NAMESPACE, Handler::HideActiveDropdowns);

    for &menu in matches {
        let Some(owner) = cx.doc.tree().parent(menu) else {
            continue;
        };
        cx.listeners.bind(owner, SHOW, NAMESPACE, Handler::ShowDropdown);
        cx.listeners.bind(owner, SHOWN, NAMESPACE, Handler::DropdownShown);

        let violation = Violation::new(Rule::DropDownAddFix, cx.doc.tree(), menu);
        cx.pass.record(violation);
    }
}

/// Where a shown menu goes: under its owner, pulled left when it would
/// run past the viewport's right edge
pub(crate) fn menu_position(doc: &Document, owner: NodeId, menu: NodeId, settings: &Settings) -> (f64, f64) {
    let owner_box = doc.layout_box(owner);
    let menu_width = doc.layout_box(menu).width;
    let viewport_width = doc.viewport().width;

    let mut x = if owner_box.left() + menu_width > viewport_width {
        owner_box.left() + owner_box.width - menu_width
    } else {
        owner_box.left()
    };
    if x + menu_width > viewport_width - settings.viewport_margin {
        x = viewport_width - menu_width - settings.viewport_margin;
    }
    let y = owner_box.top() + owner_box.height;
    (x, y)
}

impl Compliance {
    /// Scroll or resize: hide every relocated menu
    pub(crate) fn hide_active_dropdowns(&mut self, doc: &mut Document) {
        let active = std::mem::take(&mut self.active_dropdowns);
        for dropdown in &active {
            self.dispatch(doc, Event::new(HIDE, dropdown.owner));
        }
        self.active_dropdowns.clear();
    }

    pub(crate) fn show_dropdown(&mut self, doc: &mut Document, owner: NodeId) {
        let Some(menu) = SelectorList::parse(MENU)
            .ok()
            .and_then(|selector| doc.tree().select(owner, &selector).first().copied())
        else {
            tracing::trace!(owner = %owner, "no menu left under dropdown owner");
            return;
        };

        self.active_dropdowns.push(ActiveDropdown { owner, menu });
        let (x, y) = menu_position(doc, owner, menu, &self.settings);

        let body = doc.body_or_root();
        let tree = doc.tree_mut();
        let moved = tree.detach(menu)
            .and_then(|_| tree.append_child(body, menu))
            .and_then(|_| {
                tree.set_style(menu, &[
                    ("position", "absolute".to_string()),
                    ("display", "block".to_string()),
                    ("left", format!("{x}px")),
                    ("top", format!("{y}px")),
                ])
            });
        if let Err(err) = moved {
            tracing::warn!(%err, menu = %menu, "could not relocate dropdown menu");
            return;
        }

        self.listeners.bind(owner, HIDE, NAMESPACE, Handler::HideDropdown { menu });
        tracing::debug!(owner = %owner, menu = %menu, x, y, "dropdown menu relocated");
    }

    pub(crate) fn hide_dropdown(&mut self, doc: &mut Document, owner: NodeId, menu: NodeId) {
        if let Some(handle) = self.dropdown_focus.take() {
            self.scheduler.cancel(handle);
        }

        let tree = doc.tree_mut();
        let restored = tree.detach(menu)
            .and_then(|_| tree.append_child(owner, menu))
            .and_then(|_| {
                tree.set_style(menu, &[
                    ("position", "absolute".to_string()),
                    ("display", "none".to_string()),
                ])
            });
        if let Err(err) = restored {
            tracing::warn!(%err, menu = %menu, "could not restore dropdown menu");
        }
        self.active_dropdowns.clear();
    }

    pub(crate) fn dropdown_shown(&mut self, owner: NodeId) {
        let handle = self.scheduler.schedule(self.settings.focus_delay_ms, owner, Task::FocusFirstDropdownLink);
        self.dropdown_focus = Some(handle);
    }

    /// First link of the first active menu
    pub(crate) fn first_dropdown_link(&self, doc: &Document) -> Option<NodeId> {
        let menu = self.active_dropdowns.first()?.menu;
        doc.tree().get_elements_by_tag_name(menu, "a").first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use j508_dom::DOMRect;

    fn doc_with_boxes(owner_box: DOMRect, menu_width: f64, viewport: f64) -> (Document, NodeId, NodeId) {
        let mut doc = Document::default();
        let body = doc.body();
        let owner = doc.tree_mut().create_element("li");
        let menu = doc.tree_mut().create_element("ul");
        doc.tree_mut().append_child(body, owner).unwrap();
        doc.tree_mut().append_child(owner, menu).unwrap();
        doc.set_viewport(viewport, 600.0);
        doc.set_layout_box(owner, owner_box);
        doc.set_layout_box(menu, DOMRect::from_xywh(0.0, 0.0, menu_width, 100.0));
        (doc, owner, menu)
    }

    #[test]
    fn test_position_fits() {
        let (doc, owner, menu) = doc_with_boxes(DOMRect::from_xywh(100.0, 40.0, 80.0, 30.0), 200.0, 1000.0);
        assert_eq!(menu_position(&doc, owner, menu, &Settings::default()), (100.0, 70.0));
    }

    #[test]
    fn test_position_flips_to_owner_right_edge() {
        let (doc, owner, menu) = doc_with_boxes(DOMRect::from_xywh(850.0, 0.0, 100.0, 20.0), 200.0, 1000.0);
        // 850 + 200 > 1000, so right-align with owner: 850 + 100 - 200 = 750
        assert_eq!(menu_position(&doc, owner, menu, &Settings::default()), (750.0, 20.0));
    }

    #[test]
    fn test_position_clamped_by_margin() {
        let (doc, owner, menu) = doc_with_boxes(DOMRect::from_xywh(780.0, 0.0, 100.0, 20.0), 200.0, 1000.0);
        // 780 + 200 fits, but 980 > 1000 - 50, so x = 1000 - 200 - 50
        assert_eq!(menu_position(&doc, owner, menu, &Settings::default()), (750.0, 20.0));

        let settings = Settings::default().with_viewport_margin(0.0);
        assert_eq!(menu_position(&doc, owner, menu, &settings), (780.0, 20.0));
    }
}
