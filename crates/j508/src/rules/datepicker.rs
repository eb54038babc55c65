//! Date-picker keyboard fix
//!
//! Time-slot tables trap keyboard users: after picking a slot with Enter
//! nothing moves focus out of the table. The fix binds a `keyup` handler
//! that sends focus to whatever follows the table's wrapper.

use j508_dom::{Document, ElementQuery, EventType, NodeId, SelectorList};

use super::RuleContext;
use crate::compliance::{Compliance, Handler};
use crate::scheduler::Task;
use crate::{Rule, Violation};

/// Listener namespace for date-picker handlers
pub(crate) const NAMESPACE: &str = "j508";

const WRAPPER: &str = ".dataTables_wrapper";

pub(super) fn bind(cx: &mut RuleContext<'_>, matches: &[NodeId]) {
    for &element in matches {
        cx.listeners.bind(element, EventType::KeyUp, NAMESPACE, Handler::DatePickerKeyUp);
        let violation = Violation::new(Rule::DatePickerAddFix, cx.doc.tree(), element);
        cx.pass.record(violation);
    }
}

/// Element that should get focus after Enter on `element`: the element
/// after the parent of its closest table wrapper
pub(crate) fn focus_target(doc: &Document, element: NodeId) -> Option<NodeId> {
    let tree = doc.tree();
    let wrapper = SelectorList::parse(WRAPPER).ok()?;
    let wrapper = tree.closest(element, &wrapper)?;
    let parent = tree.parent(wrapper)?;
    tree.next_element_sibling(parent)
}

impl Compliance {
    /// Enter released on a date-picker element
    pub(crate) fn date_picker_enter(&mut self, doc: &Document, element: NodeId) {
        let Some(target) = focus_target(doc, element) else {
            tracing::trace!(node = %element, "date picker has no focus target");
            return;
        };
        self.scheduler.schedule(self.settings.focus_delay_ms, element, Task::Focus(target));
    }
}
