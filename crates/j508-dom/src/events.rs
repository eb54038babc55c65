//! DOM Events
//!
//! Event values and a namespaced listener registry. Handlers are opaque
//! to this crate (`H`); the embedder decides what running one means.
//!
//! Binding is jQuery-style: a listener is keyed by
//! `(target, event type, namespace)` and re-binding the same key replaces
//! the old handler instead of stacking a second one.

use std::collections::HashMap;

use crate::{DomTree, NodeId};

/// Event type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    KeyDown,
    KeyUp,
    Scroll,
    Resize,
    /// Library-defined event such as `show.bs.dropdown`
    Custom(&'static str),
}

impl EventType {
    /// Check if this event type bubbles to ancestors
    pub fn bubbles(&self) -> bool {
        !matches!(self, EventType::Scroll | EventType::Resize)
    }
}

/// Keyboard key of interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Tab,
    Enter,
    Escape,
    Other(u32),
}

impl Key {
    /// Map a legacy `keyCode` / `which` value
    pub fn from_code(code: u32) -> Self {
        match code {
            9 => Self::Tab,
            13 => Self::Enter,
            27 => Self::Escape,
            other => Self::Other(other),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            Self::Tab => 9,
            Self::Enter => 13,
            Self::Escape => 27,
            Self::Other(code) => code,
        }
    }
}

/// Where a listener is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Node(NodeId),
    Window,
}

impl From<NodeId> for EventTarget {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

/// DOM event
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: EventType,
    pub target: EventTarget,
    pub key: Option<Key>,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl Event {
    pub fn new(event_type: EventType, target: impl Into<EventTarget>) -> Self {
        Self {
            event_type,
            target: target.into(),
            key: None,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn key_down(target: NodeId, key: Key) -> Self {
        Self { key: Some(key), ..Self::new(EventType::KeyDown, target) }
    }

    pub fn key_up(target: NodeId, key: Key) -> Self {
        Self { key: Some(key), ..Self::new(EventType::KeyUp, target) }
    }

    pub fn scroll(target: impl Into<EventTarget>) -> Self {
        Self::new(EventType::Scroll, target)
    }

    pub fn resize() -> Self {
        Self::new(EventType::Resize, EventTarget::Window)
    }

    pub fn custom(name: &'static str, target: NodeId) -> Self {
        Self::new(EventType::Custom(name), target)
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Stop propagation
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// Targets visited during dispatch: the target, then its ancestors
    /// for bubbling event types.
    pub fn path(&self, tree: &DomTree) -> Vec<EventTarget> {
        let mut path = vec![self.target];
        if let EventTarget::Node(id) = self.target {
            if self.event_type.bubbles() {
                path.extend(tree.ancestors(id).map(EventTarget::Node));
            }
        }
        path
    }
}

/// One bound listener
#[derive(Debug, Clone)]
struct Listener<H> {
    event_type: EventType,
    namespace: String,
    handler: H,
}

/// Namespaced listener registry
#[derive(Debug, Clone)]
pub struct EventRegistry<H> {
    listeners: HashMap<EventTarget, Vec<Listener<H>>>,
}

impl<H> EventRegistry<H> {
    pub fn new() -> Self {
        Self { listeners: HashMap::new() }
    }

    /// Bind a handler, replacing any handler under the same key.
    /// Returns the replaced handler.
    pub fn bind(
        &mut self,
        target: impl Into<EventTarget>,
        event_type: EventType,
        namespace: &str,
        handler: H,
    ) -> Option<H> {
        let list = self.listeners.entry(target.into()).or_default();
        if let Some(existing) = list.iter_mut()
            .find(|l| l.event_type == event_type && l.namespace == namespace)
        {
            return Some(std::mem::replace(&mut existing.handler, handler));
        }
        list.push(Listener {
            event_type,
            namespace: namespace.to_string(),
            handler,
        });
        None
    }

    /// Remove the handler under a key, if any
    pub fn unbind(
        &mut self,
        target: impl Into<EventTarget>,
        event_type: EventType,
        namespace: &str,
    ) -> Option<H> {
        let target = target.into();
        let list = self.listeners.get_mut(&target)?;
        let pos = list.iter()
            .position(|l| l.event_type == event_type && l.namespace == namespace)?;
        let removed = list.remove(pos).handler;
        if list.is_empty() {
            self.listeners.remove(&target);
        }
        Some(removed)
    }

    /// Handlers bound for a target and type, in bind order
    pub fn handlers(&self, target: EventTarget, event_type: EventType) -> impl Iterator<Item = &H> {
        self.listeners.get(&target)
            .into_iter()
            .flatten()
            .filter(move |l| l.event_type == event_type)
            .map(|l| &l.handler)
    }

    pub fn is_bound(&self, target: impl Into<EventTarget>, event_type: EventType, namespace: &str) -> bool {
        self.listeners.get(&target.into())
            .is_some_and(|list| list.iter().any(|l| l.event_type == event_type && l.namespace == namespace))
    }

    /// Total number of bound listeners
    pub fn len(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<H> Default for EventRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebind_replaces() {
        let mut registry = EventRegistry::new();
        let node = NodeId(3);
        assert_eq!(registry.bind(node, EventType::KeyUp, "j508", 1), None);
        assert_eq!(registry.bind(node, EventType::KeyUp, "j508", 2), Some(1));
        assert_eq!(registry.len(), 1);

        let found: Vec<_> = registry.handlers(EventTarget::Node(node), EventType::KeyUp).collect();
        assert_eq!(found, vec![&2]);
    }

    #[test]
    fn test_namespaces_are_independent() {
        let mut registry = EventRegistry::new();
        let node = NodeId(1);
        registry.bind(node, EventType::KeyDown, "j508.tab.a", 'a');
        registry.bind(node, EventType::KeyDown, "j508.tab.b", 'b');
        assert_eq!(registry.len(), 2);

        assert_eq!(registry.unbind(node, EventType::KeyDown, "j508.tab.a"), Some('a'));
        assert!(!registry.is_bound(node, EventType::KeyDown, "j508.tab.a"));
        assert!(registry.is_bound(node, EventType::KeyDown, "j508.tab.b"));
        assert_eq!(registry.unbind(node, EventType::KeyDown, "missing"), None);
    }

    #[test]
    fn test_unbind_last_clears_target() {
        let mut registry = EventRegistry::new();
        registry.bind(EventTarget::Window, EventType::Resize, "j508.dropdown", ());
        registry.unbind(EventTarget::Window, EventType::Resize, "j508.dropdown");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_key_codes() {
        assert_eq!(Key::from_code(9), Key::Tab);
        assert_eq!(Key::from_code(13), Key::Enter);
        assert_eq!(Key::Other(65).code(), 65);
    }

    #[test]
    fn test_path_bubbles_for_keys_only() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let a = tree.create_element("a");
        tree.append_child(tree.root(), div).unwrap();
        tree.append_child(div, a).unwrap();

        let key = Event::key_up(a, Key::Enter);
        assert_eq!(
            key.path(&tree),
            vec![EventTarget::Node(a), EventTarget::Node(div), EventTarget::Node(NodeId::ROOT)]
        );
        assert_eq!(Event::scroll(a).path(&tree), vec![EventTarget::Node(a)]);
    }

    #[test]
    fn test_prevent_default() {
        let mut event = Event::key_down(NodeId(1), Key::Tab);
        assert!(!event.is_default_prevented());
        event.prevent_default();
        assert!(event.is_default_prevented());
    }
}
