//! Compliance context
//!
//! Owns all state a run leaves behind: bound listeners, focus traps,
//! active dropdowns and deferred tasks. Separate instances share nothing.

use std::collections::HashMap;

use j508_dom::{Document, Event, EventRegistry, EventTarget, EventType, Key, NodeId};

use crate::scheduler::{Scheduler, Task, TaskHandle};
use crate::sink::{LogSink, TracingSink};
use crate::{FocusOrder, Settings};

/// What a bound listener does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Handler {
    /// Scroll or resize: close every relocated dropdown
    HideActiveDropdowns,
    /// `show.bs.dropdown` on a dropdown owner
    ShowDropdown,
    /// `shown.bs.dropdown` on a dropdown owner
    DropdownShown,
    /// `hide.bs.dropdown` on an owner whose menu was relocated
    HideDropdown { menu: NodeId },
    /// `keyup` on a date-picker element
    DatePickerKeyUp,
    /// `keydown` on the last element of a focus trap
    TabTrap { container: NodeId },
}

/// A dropdown menu currently shown outside its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveDropdown {
    pub owner: NodeId,
    pub menu: NodeId,
}

/// Compliance fixer context
pub struct Compliance {
    pub(crate) settings: Settings,
    pub(crate) focus_order: FocusOrder,
    pub(crate) sink: Box<dyn LogSink>,
    pub(crate) listeners: EventRegistry<Handler>,
    pub(crate) hooks: HashMap<String, NodeId>,
    pub(crate) active_dropdowns: Vec<ActiveDropdown>,
    pub(crate) dropdown_focus: Option<TaskHandle>,
    pub(crate) scheduler: Scheduler,
}

impl Compliance {
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
            focus_order: FocusOrder::default(),
            sink: Box::new(TracingSink),
            listeners: EventRegistry::new(),
            hooks: HashMap::new(),
            active_dropdowns: Vec::new(),
            dropdown_focus: None,
            scheduler: Scheduler::new(),
        }
    }

    pub fn with_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_focus_order(mut self, order: FocusOrder) -> Self {
        self.focus_order = order;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn focus_order(&self) -> FocusOrder {
        self.focus_order
    }

    /// Is a listener bound under this key?
    pub fn is_bound(&self, target: impl Into<EventTarget>, event_type: EventType, namespace: &str) -> bool {
        self.listeners.is_bound(target, event_type, namespace)
    }

    /// Number of bound listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Dropdowns currently relocated to the body
    pub fn active_dropdowns(&self) -> &[ActiveDropdown] {
        &self.active_dropdowns
    }

    /// Deferred tasks not yet fired
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending()
    }

    /// Virtual time in milliseconds
    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    // ---- events ---------------------------------------------------------

    /// Deliver an event to the listeners bound on its path.
    ///
    /// Returns whether a handler prevented the default action.
    pub fn dispatch(&mut self, doc: &mut Document, mut event: Event) -> bool {
        let path = event.path(doc.tree());
        for current in path {
            let handlers: Vec<Handler> = self.listeners
                .handlers(current, event.event_type)
                .copied()
                .collect();
            for handler in handlers {
                self.run_handler(doc, handler, current, &mut event);
            }
            if event.is_propagation_stopped() {
                break;
            }
        }
        event.is_default_prevented()
    }

    fn run_handler(&mut self, doc: &mut Document, handler: Handler, current: EventTarget, event: &mut Event) {
        tracing::trace!(?handler, ?current, event = ?event.event_type, "running handler");
        match (handler, current) {
            (Handler::HideActiveDropdowns, _) => self.hide_active_dropdowns(doc),
            (Handler::ShowDropdown, EventTarget::Node(owner)) => self.show_dropdown(doc, owner),
            (Handler::DropdownShown, EventTarget::Node(owner)) => self.dropdown_shown(owner),
            (Handler::HideDropdown { menu }, EventTarget::Node(owner)) => {
                self.hide_dropdown(doc, owner, menu)
            }
            (Handler::DatePickerKeyUp, EventTarget::Node(element)) => {
                if event.key == Some(Key::Enter) {
                    event.prevent_default();
                    self.date_picker_enter(doc, element);
                }
            }
            (Handler::TabTrap { container }, _) => {
                if event.key == Some(Key::Tab) {
                    event.prevent_default();
                    self.wrap_focus(doc, container);
                }
            }
            (_, EventTarget::Window) => {}
        }
    }

    // ---- deferred tasks -------------------------------------------------

    /// Move the virtual clock by `ms` and run the tasks that became due.
    ///
    /// Tasks whose origin or target left the document are dropped.
    /// Returns the number of tasks that ran.
    pub fn advance(&mut self, doc: &mut Document, ms: u64) -> usize {
        let mut ran = 0;
        for (origin, task) in self.scheduler.advance(ms) {
            if !doc.tree().is_connected(origin) {
                tracing::trace!(origin = %origin, ?task, "dropping task from detached origin");
                continue;
            }
            let target = match task {
                Task::Focus(target) => Some(target),
                Task::FocusFirstDropdownLink => self.first_dropdown_link(doc),
            };
            match target {
                Some(target) if doc.focus(target) => {
                    tracing::debug!(target = %target, "deferred focus");
                    ran += 1;
                }
                _ => tracing::trace!(?task, "deferred focus target gone"),
            }
        }
        ran
    }
}

impl Default for Compliance {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Compliance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compliance")
            .field("settings", &self.settings)
            .field("focus_order", &self.focus_order)
            .field("listeners", &self.listeners.len())
            .field("hooks", &self.hooks)
            .field("active_dropdowns", &self.active_dropdowns)
            .field("scheduler", &self.scheduler)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_without_listeners() {
        let mut doc = Document::default();
        let body = doc.body();
        let mut compliance = Compliance::new();
        assert!(!compliance.dispatch(&mut doc, Event::key_down(body, Key::Tab)));
        assert_eq!(compliance.listener_count(), 0);
    }

    #[test]
    fn test_tab_trap_bubbles_from_child() {
        let mut doc = Document::default();
        let body = doc.body();
        let tree = doc.tree_mut();
        let container = tree.create_element("div");
        let first = tree.create_element("input");
        let last = tree.create_element("button");
        let icon = tree.create_element("i");
        tree.append_child(body, container).unwrap();
        tree.append_child(container, first).unwrap();
        tree.append_child(container, last).unwrap();
        tree.append_child(last, icon).unwrap();

        let mut compliance = Compliance::new();
        compliance.hook_tab_index(&mut doc, "c", container);
        doc.blur();

        // Other keys pass through
        assert!(!compliance.dispatch(&mut doc, Event::key_down(icon, Key::Other(65))));
        assert_eq!(doc.focused(), None);

        assert!(compliance.dispatch(&mut doc, Event::key_down(icon, Key::Tab)));
        assert_eq!(doc.focused(), Some(first));
    }

    #[test]
    fn test_advance_drops_detached_origin() {
        let mut doc = Document::default();
        let body = doc.body();
        let origin = doc.tree_mut().create_element("a");
        let target = doc.tree_mut().create_element("input");
        doc.tree_mut().append_child(body, origin).unwrap();
        doc.tree_mut().append_child(body, target).unwrap();

        let mut compliance = Compliance::new();
        compliance.scheduler.schedule(10, origin, Task::Focus(target));
        doc.tree_mut().detach(origin).unwrap();

        assert_eq!(compliance.advance(&mut doc, 10), 0);
        assert_eq!(doc.focused(), None);
        assert_eq!(compliance.now(), 10);
    }
}
