//! j508 HTML
//!
//! Loads HTML5 documents into the j508 DOM (via html5ever) and writes
//! them back out.

mod parser;
mod serializer;

pub use parser::HtmlParser;
pub use serializer::{HtmlSerializer, get_inner_html, get_outer_html};

pub use j508_dom::Document;

/// Parse an HTML string into a Document
pub fn parse(html: &str) -> Document {
    HtmlParser::new().parse(html)
}

/// Serialize a whole document, doctype included
pub fn serialize(doc: &Document) -> String {
    HtmlSerializer::new().serialize_outer(doc.tree(), doc.tree().root())
}
