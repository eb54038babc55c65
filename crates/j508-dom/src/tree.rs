//! DOM Tree (arena-based allocation)

use crate::{
    DomError, DomResult, ElementData, InlineStyle, InternedString, Node, NodeId, QualName,
    StringInterner,
};

const HTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// Arena-based DOM tree for memory efficiency
///
/// Node 0 is always the document node. Detached nodes stay in the arena
/// (their IDs remain valid) but are unreachable from the root.
pub struct DomTree {
    pub(crate) nodes: Vec<Node>,
    interner: StringInterner,
    html_ns: InternedString,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        let mut interner = StringInterner::new();
        let html_ns = interner.intern(HTML_NS);
        Self {
            nodes: vec![Node::document()],
            interner,
            html_ns,
        }
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes in the arena (attached or not)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the tree holds nothing but the document node
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn interner_mut(&mut self) -> &mut StringInterner {
        &mut self.interner
    }

    /// Resolve an interned string
    #[inline]
    pub fn resolve(&self, id: InternedString) -> &str {
        self.interner.get(id)
    }

    pub fn intern(&mut self, s: &str) -> InternedString {
        self.interner.intern(s)
    }

    // ---- creation -------------------------------------------------------

    /// Push a prebuilt node into the arena (unattached)
    pub fn push_node(&mut self, node: Node) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Create an unattached HTML element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let local = self.interner.intern(&tag.to_ascii_lowercase());
        let name = QualName::new(self.html_ns, local);
        self.push_node(Node::element(name))
    }

    /// Create an unattached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push_node(Node::text(text.to_string()))
    }

    /// Create an unattached comment node
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push_node(Node::comment(text.to_string()))
    }

    // ---- structure ------------------------------------------------------

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        if !self.node(parent)?.can_have_children() {
            return Err(DomError::InvalidNodeType(parent));
        }
        self.node(child)?;
        if child == NodeId::ROOT || child == parent || self.is_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest);
        }
        Ok(())
    }

    /// Append `child` as the last child of `parent`, moving it if attached
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.check_insert(parent, child)?;
        self.unlink(child);
        self.link_last(parent, child);
        Ok(child)
    }

    /// Insert `new_child` before `reference` (or append when `None`)
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<NodeId> {
        let Some(reference) = reference else {
            return self.append_child(parent, new_child);
        };
        if self.node(reference)?.parent != parent {
            return Err(DomError::HierarchyRequest);
        }
        self.check_insert(parent, new_child)?;
        if new_child == reference {
            return Ok(new_child);
        }

        self.unlink(new_child);
        let prev = self.nodes[reference.index()].prev_sibling;
        {
            let node = &mut self.nodes[new_child.index()];
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = reference;
        }
        self.nodes[reference.index()].prev_sibling = new_child;
        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = new_child;
        } else {
            self.nodes[parent.index()].first_child = new_child;
        }
        Ok(new_child)
    }

    /// Insert `new_node` as the next sibling of `reference`
    pub fn insert_after(&mut self, reference: NodeId, new_node: NodeId) -> DomResult<NodeId> {
        let parent = self.node(reference)?.parent;
        if !parent.is_valid() {
            return Err(DomError::Detached(reference));
        }
        if new_node == reference {
            return Err(DomError::HierarchyRequest);
        }
        let next = self.nodes[reference.index()].next_sibling;
        let next = next.is_valid().then_some(next);
        self.insert_before(parent, new_node, next)
    }

    /// Remove a node (and its subtree) from its parent
    pub fn detach(&mut self, id: NodeId) -> DomResult<NodeId> {
        self.node(id)?;
        if id == NodeId::ROOT {
            return Err(DomError::HierarchyRequest);
        }
        self.unlink(id);
        Ok(id)
    }

    /// Link without validation. Callers guarantee `child` is unattached.
    pub(crate) fn link_last(&mut self, parent: NodeId, child: NodeId) {
        let last = self.nodes[parent.index()].last_child;
        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = last;
            node.next_sibling = NodeId::NONE;
        }
        if last.is_valid() {
            self.nodes[last.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        self.nodes[parent.index()].last_child = child;
    }

    fn unlink(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[id.index()];
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        if !parent.is_valid() {
            return;
        }
        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }
        let node = &mut self.nodes[id.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    // ---- traversal ------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_valid())
    }

    /// Direct children of a node
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let next = self.get(id).map_or(NodeId::NONE, |n| n.first_child);
        Children { tree: self, next }
    }

    /// All descendants in document (pre-)order, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let next = self.get(id).map_or(NodeId::NONE, |n| n.first_child);
        Descendants { tree: self, root: id, next }
    }

    /// Ancestors from the parent up to the document node
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), |&p| self.parent(p))
    }

    /// Is `ancestor` a strict ancestor of `node`?
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|a| a == ancestor)
    }

    /// Reachable from the document node
    pub fn is_connected(&self, id: NodeId) -> bool {
        id == NodeId::ROOT || (self.get(id).is_some() && self.is_ancestor(NodeId::ROOT, id))
    }

    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut next = self.get(id)?.next_sibling;
        while let Some(node) = self.get(next) {
            if node.is_element() {
                return Some(next);
            }
            next = node.next_sibling;
        }
        None
    }

    /// Concatenated text of the node and its descendants
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.get(id).and_then(Node::as_text) {
            return text.to_string();
        }
        self.descendants(id)
            .filter_map(|(_, node)| node.as_text())
            .collect()
    }

    // ---- elements and attributes ---------------------------------------

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    /// Lower-case tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| self.resolve(e.name.local))
    }

    pub fn is_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag_name(id).is_some_and(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        let key = self.interner.lookup(name)?;
        self.element(id)?.get_attr(key)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// Set an attribute, returning the previous value
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> DomResult<Option<String>> {
        let key = self.interner.intern(&name.to_ascii_lowercase());
        let elem = self.nodes
            .get_mut(id.index())
            .ok_or(DomError::NotFound(id))?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType(id))?;
        Ok(elem.set_attr(QualName::local(key), value.into()))
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<Option<String>> {
        let key = self.interner.lookup(name);
        let elem = self.nodes
            .get_mut(id.index())
            .ok_or(DomError::NotFound(id))?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType(id))?;
        Ok(key.and_then(|k| elem.remove_attr(k)))
    }

    /// classList.contains
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attribute(id, "class")
            .is_some_and(|c| c.split_ascii_whitespace().any(|t| t == class))
    }

    /// Merge declarations into the element's inline `style` attribute
    pub fn set_style(&mut self, id: NodeId, declarations: &[(&str, String)]) -> DomResult<()> {
        let mut style = InlineStyle::parse(self.attribute(id, "style").unwrap_or(""));
        for (property, value) in declarations {
            style.set(property, value);
        }
        self.set_attribute(id, "style", style.to_string())?;
        Ok(())
    }

    /// Read one inline style property
    pub fn style_property(&self, id: NodeId, property: &str) -> Option<String> {
        let style = InlineStyle::parse(self.attribute(id, "style")?);
        style.get(property).map(str::to_string)
    }

    /// Short `tag#id.class` label used in logs and reports
    pub fn describe(&self, id: NodeId) -> String {
        let Some(node) = self.get(id) else {
            return format!("<missing {id}>");
        };
        match &node.data {
            crate::NodeData::Element(elem) => {
                let mut label = self.resolve(elem.name.local).to_string();
                if let Some(html_id) = self.attribute(id, "id").filter(|v| !v.is_empty()) {
                    label.push('#');
                    label.push_str(html_id);
                }
                if let Some(classes) = self.attribute(id, "class") {
                    for class in classes.split_ascii_whitespace() {
                        label.push('.');
                        label.push_str(class);
                    }
                }
                label
            }
            crate::NodeData::Document => "#document".to_string(),
            crate::NodeData::Text(_) => "#text".to_string(),
            crate::NodeData::Comment(_) => "#comment".to_string(),
            crate::NodeData::Doctype { .. } => "#doctype".to_string(),
            crate::NodeData::ProcessingInstruction { .. } => "#pi".to_string(),
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DomTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomTree")
            .field("nodes", &self.nodes.len())
            .field("interner", &self.interner)
            .finish()
    }
}

/// Iterator over direct children
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

/// Pre-order iterator over a subtree (root excluded)
pub struct Descendants<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: NodeId,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;

        self.next = if node.first_child.is_valid() {
            node.first_child
        } else {
            let mut cur = id;
            loop {
                if cur == self.root || !cur.is_valid() {
                    break NodeId::NONE;
                }
                let Some(n) = self.tree.get(cur) else {
                    break NodeId::NONE;
                };
                if n.next_sibling.is_valid() {
                    break n.next_sibling;
                }
                cur = n.parent;
            }
        };

        Some((id, node))
    }
}
