//! Document - High-level document API
//!
//! Owns the tree plus the per-page state a browser would keep next to it:
//! the focused element, the viewport and host-supplied layout boxes.

use std::collections::HashMap;

use crate::{DOMRect, DomTree, NodeId};

/// Viewport used until the host reports a real one
const DEFAULT_VIEWPORT: DOMRect = DOMRect { x: 0.0, y: 0.0, width: 1280.0, height: 720.0 };

/// HTML Document
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    url: String,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
    focused: Option<NodeId>,
    viewport: DOMRect,
    layout: HashMap<NodeId, DOMRect>,
}

impl Document {
    /// Create a document with an empty html/head/body skeleton
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        tree.link_last(tree.root(), html);
        tree.link_last(html, head);
        tree.link_last(html, body);

        Self {
            tree,
            url: url.to_string(),
            html_element: html,
            head_element: head,
            body_element: body,
            focused: None,
            viewport: DEFAULT_VIEWPORT,
            layout: HashMap::new(),
        }
    }

    /// Create an empty document (no structure)
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
            focused: None,
            viewport: DEFAULT_VIEWPORT,
            layout: HashMap::new(),
        }
    }

    /// Locate html/head/body after the tree was built externally (parser)
    pub fn finalize(&mut self) {
        let tree = &self.tree;
        let html = tree.children(tree.root())
            .map(|(id, _)| id)
            .find(|&id| tree.is_tag(id, "html"));

        let (mut head, mut body) = (NodeId::NONE, NodeId::NONE);
        if let Some(html) = html {
            for (id, _) in tree.children(html) {
                if !head.is_valid() && tree.is_tag(id, "head") {
                    head = id;
                } else if !body.is_valid() && tree.is_tag(id, "body") {
                    body = id;
                }
            }
        }

        self.html_element = html.unwrap_or(NodeId::NONE);
        self.head_element = head;
        self.body_element = body;
        tracing::trace!(html = ?self.html_element, body = ?self.body_element, "document finalized");
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Text of the first `<title>` in `<head>`
    pub fn title(&self) -> String {
        if !self.head_element.is_valid() {
            return String::new();
        }
        self.tree.children(self.head_element)
            .find(|&(id, _)| self.tree.is_tag(id, "title"))
            .map(|(id, _)| self.tree.text_content(id).trim().to_string())
            .unwrap_or_default()
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <head> element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get <body> element (NONE for structureless documents)
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Body when attached, otherwise the document node
    pub fn body_or_root(&self) -> NodeId {
        if self.body_element.is_valid() && self.tree.is_connected(self.body_element) {
            self.body_element
        } else {
            self.tree.root()
        }
    }

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.descendants(self.tree.root())
            .map(|(node_id, _)| node_id)
            .find(|&node_id| self.tree.attribute(node_id, "id") == Some(id))
    }

    /// An attached element of this document
    pub fn is_element(&self, id: NodeId) -> bool {
        self.tree.is_element(id) && self.tree.is_connected(id)
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    // ---- focus ----------------------------------------------------------

    /// Move focus to an attached element
    pub fn focus(&mut self, id: NodeId) -> bool {
        if !self.is_element(id) {
            return false;
        }
        self.focused = Some(id);
        true
    }

    pub fn blur(&mut self) {
        self.focused = None;
    }

    /// Focused element, if it is still attached
    pub fn focused(&self) -> Option<NodeId> {
        self.focused.filter(|&id| self.tree.is_connected(id))
    }

    // ---- geometry -------------------------------------------------------

    pub fn viewport(&self) -> DOMRect {
        self.viewport
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = DOMRect::from_xywh(0.0, 0.0, width, height);
    }

    /// Record the host's layout box for an element
    pub fn set_layout_box(&mut self, id: NodeId, rect: DOMRect) {
        self.layout.insert(id, rect);
    }

    /// Layout box of an element; zero-sized at the origin when unknown
    pub fn layout_box(&self, id: NodeId) -> DOMRect {
        self.layout.get(&id).copied().unwrap_or_default()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("url", &self.url)
            .field("tree", &self.tree)
            .field("focused", &self.focused)
            .finish()
    }
}
