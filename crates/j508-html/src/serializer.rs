//! HTML serialization
//!
//! Writes a subtree back out the way `innerHTML`/`outerHTML` read it.
//! Empty attribute values are written bare (`<input disabled>`), void
//! elements get no end tag and `script`/`style` text is not escaped.

use j508_dom::{DomTree, ElementData, NodeData, NodeId};

/// Elements without an end tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input",
    "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose text is written verbatim
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Subtree to markup
#[derive(Debug, Clone, Default)]
pub struct HtmlSerializer {
    /// Indentation per level; `None` keeps the markup as it is in the tree
    indent: Option<String>,
}

impl HtmlSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// One element per line, two spaces per level. Whitespace-only text
    /// is dropped.
    pub fn pretty() -> Self {
        Self::with_indent("  ")
    }

    pub fn with_indent(indent: impl Into<String>) -> Self {
        Self { indent: Some(indent.into()) }
    }

    pub fn is_pretty(&self) -> bool {
        self.indent.is_some()
    }

    /// Children of `node_id` only
    pub fn serialize_inner(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut writer = Writer::new(tree, self.indent.as_deref());
        writer.content(node_id);
        writer.buf
    }

    /// `node_id` and everything under it
    pub fn serialize_outer(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut writer = Writer::new(tree, self.indent.as_deref());
        writer.node(node_id);
        writer.buf
    }
}

struct Writer<'a> {
    tree: &'a DomTree,
    indent: Option<&'a str>,
    depth: usize,
    buf: String,
}

impl<'a> Writer<'a> {
    fn new(tree: &'a DomTree, indent: Option<&'a str>) -> Self {
        Self { tree, indent, depth: 0, buf: String::new() }
    }

    fn line_break(&mut self) {
        let Some(indent) = self.indent else {
            return;
        };
        if !self.buf.is_empty() {
            self.buf.push('\n');
            self.buf.push_str(&indent.repeat(self.depth));
        }
    }

    /// What goes between the tags of `id`: verbatim text for raw-text
    /// elements, serialized children otherwise
    fn content(&mut self, id: NodeId) {
        let tree = self.tree;
        if is_raw_text(tree, id) {
            for text in tree.children(id).filter_map(|(_, child)| child.as_text()) {
                self.buf.push_str(text);
            }
        } else {
            self.children(id);
        }
    }

    fn children(&mut self, parent: NodeId) {
        let tree = self.tree;
        for (child, _) in tree.children(parent) {
            self.node(child);
        }
    }

    fn node(&mut self, id: NodeId) {
        let tree = self.tree;
        let Some(node) = tree.get(id) else {
            return;
        };

        match &node.data {
            NodeData::Document => self.children(id),
            NodeData::Element(element) => self.element(id, element),
            NodeData::Text(text) => {
                if self.indent.is_none() || !text.content.trim().is_empty() {
                    escape(&text.content, false, &mut self.buf);
                }
            }
            NodeData::Comment(comment) => {
                self.buf.push_str("<!--");
                self.buf.push_str(comment);
                self.buf.push_str("-->");
            }
            NodeData::Doctype { name, .. } => {
                self.buf.push_str("<!DOCTYPE ");
                self.buf.push_str(tree.resolve(*name));
                self.buf.push('>');
            }
            NodeData::ProcessingInstruction { target, data } => {
                self.buf.push_str("<?");
                self.buf.push_str(tree.resolve(*target));
                if !data.is_empty() {
                    self.buf.push(' ');
                    self.buf.push_str(data);
                }
                self.buf.push('>');
            }
        }
    }

    fn element(&mut self, id: NodeId, element: &ElementData) {
        let tree = self.tree;
        let tag = tree.resolve(element.name.local);

        self.line_break();
        self.buf.push('<');
        self.buf.push_str(tag);
        for attr in &element.attrs {
            self.buf.push(' ');
            self.buf.push_str(tree.resolve(attr.name.local));
            if !attr.value.is_empty() {
                self.buf.push_str("=\"");
                escape(&attr.value, true, &mut self.buf);
                self.buf.push('"');
            }
        }
        self.buf.push('>');

        if VOID_ELEMENTS.contains(&tag) {
            return;
        }

        self.depth += 1;
        self.content(id);
        self.depth -= 1;
        if !RAW_TEXT_ELEMENTS.contains(&tag) && tree.children(id).any(|(_, child)| child.is_element()) {
            self.line_break();
        }

        self.buf.push_str("</");
        self.buf.push_str(tag);
        self.buf.push('>');
    }
}

fn is_raw_text(tree: &DomTree, id: NodeId) -> bool {
    match tree.get(id).map(|node| &node.data) {
        Some(NodeData::Element(element)) => RAW_TEXT_ELEMENTS.contains(&tree.resolve(element.name.local)),
        _ => false,
    }
}

/// Escape `&`, `<` and `>`; also `"` inside attribute values
fn escape(text: &str, in_attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// `innerHTML` of a node
pub fn get_inner_html(tree: &DomTree, node_id: NodeId) -> String {
    HtmlSerializer::new().serialize_inner(tree, node_id)
}

/// `outerHTML` of a node
pub fn get_outer_html(tree: &DomTree, node_id: NodeId) -> String {
    HtmlSerializer::new().serialize_outer(tree, node_id)
}
