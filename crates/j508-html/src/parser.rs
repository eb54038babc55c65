//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts it to our arena DOM.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use j508_dom::{Document, DomTree, ElementData, Node, NodeId, QualName};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

/// HTML5 parser
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Document {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a base URL
    ///
    /// html5ever recovers from every syntax error, so this never fails;
    /// fragments get wrapped in html/head/body.
    pub fn parse_with_url(&self, html: &str, url: &str) -> Document {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = parse_document(RcDom::default(), Default::default()).one(html);

        let mut document = Document::empty(url);
        self.convert_node(&dom.document, document.tree_mut(), NodeId::ROOT);
        document.finalize();

        tracing::debug!("Parsed {} nodes", document.tree().len());
        document
    }

    /// Convert an RcDom node (and its subtree) into our DOM under `parent`
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) {
        match &handle.data {
            RcNodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, parent);
                }
            }
            RcNodeData::Doctype { name, public_id, system_id } => {
                let name = tree.intern(name);
                let id = tree.push_node(Node::doctype(
                    name,
                    public_id.to_string(),
                    system_id.to_string(),
                ));
                attach(tree, parent, id);
            }
            RcNodeData::Text { contents } => {
                // Whitespace is kept: it separates words in derived titles
                let id = tree.create_text(&contents.borrow());
                attach(tree, parent, id);
            }
            RcNodeData::Comment { contents } => {
                let id = tree.create_comment(contents);
                attach(tree, parent, id);
            }
            RcNodeData::Element { name, attrs, .. } => {
                let ns = tree.intern(&name.ns);
                let local = tree.intern(&name.local);
                let mut elem = ElementData::new(QualName::new(ns, local));

                for attr in attrs.borrow().iter() {
                    let attr_ns = tree.intern(&attr.name.ns);
                    let attr_local = tree.intern(&attr.name.local);
                    elem.set_attr(QualName::new(attr_ns, attr_local), attr.value.to_string());
                }

                let id = tree.push_node(Node::from_element(elem));
                if !attach(tree, parent, id) {
                    return;
                }

                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, id);
                }
            }
            RcNodeData::ProcessingInstruction { target, contents } => {
                let target = tree.intern(target);
                let id = tree.push_node(Node::processing_instruction(target, contents.to_string()));
                attach(tree, parent, id);
            }
        }
    }
}

fn attach(tree: &mut DomTree, parent: NodeId, child: NodeId) -> bool {
    match tree.append_child(parent, child) {
        Ok(_) => true,
        Err(err) => {
            tracing::warn!(%err, "dropping node while building DOM");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
        let doc = HtmlParser::new().parse(html);

        assert!(doc.tree().len() > 1, "Expected more than 1 node, got {}", doc.tree().len());
        assert_eq!(doc.title(), "Test");
    }

    #[test]
    fn test_parse_fragment() {
        let html = "<div><span>Text</span></div>";
        let doc = HtmlParser::new().parse(html);

        // Even fragments get wrapped in html/head/body by html5ever
        assert!(doc.body().is_valid());
        assert_eq!(doc.tree().text_content(doc.body()), "Text");
    }

    #[test]
    fn test_attributes_preserved() {
        let doc = HtmlParser::new().parse(r#"<a id="x" href="/bar" target="_blank">Go</a>"#);
        let a = doc.get_element_by_id("x").unwrap();
        assert_eq!(doc.tree().attribute(a, "href"), Some("/bar"));
        assert_eq!(doc.tree().attribute(a, "target"), Some("_blank"));
    }
}
