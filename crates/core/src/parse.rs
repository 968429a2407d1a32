//! Tolerant HTML parsing into the owned [`DomNode`] tree.
//!
//! Parsing is a pure function of its input and never fails on malformed
//! markup: the underlying html5ever engine applies browser-style error
//! recovery (unclosed tags are auto-closed, stray closing tags are ignored,
//! unknown tags become generic containers) and decodes standard character
//! entities into literal text. The only failure mode is input bytes that are
//! not text at all, surfaced as [`PagemarkError::DecodeError`].
//!
//! # Example
//!
//! ```rust
//! use pagemark_core::parse::parse_document;
//!
//! // Unclosed <p> and a stray </b> are repaired, not rejected.
//! let tree = parse_document("<p>Hello</b> world");
//! assert!(tree.find_element("p").is_some());
//! ```

use scraper::{Html, node::Node};

use crate::dom::DomNode;
use crate::{PagemarkError, Result};

/// Decodes raw bytes as UTF-8 text.
///
/// Returns [`PagemarkError::DecodeError`] when the bytes cannot be
/// interpreted as text. This is the only hard failure in the parsing stage.
pub fn decode(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|_| PagemarkError::DecodeError)
}

/// Parses an HTML string into a [`DomNode`] tree.
///
/// The returned tree is rooted at a synthetic `#document` element wrapping
/// whatever the parser recovered, normally a single `html` element with
/// `head` and `body` children even for bare fragments.
///
/// Comments, doctypes, and processing instructions are dropped here; they
/// carry no renderable content and the sanitizer never needs to see them.
pub fn parse_document(html: &str) -> DomNode {
    let parsed = Html::parse_document(html);

    let children = parsed.tree.root().children().filter_map(convert_node).collect();

    DomNode::Element { tag: "#document".to_string(), attrs: Vec::new(), children }
}

/// Converts one html5ever node into an owned [`DomNode`], recursively.
fn convert_node(node: ego_tree::NodeRef<'_, Node>) -> Option<DomNode> {
    match node.value() {
        Node::Element(element) => {
            // scraper's default `deterministic` feature stores attributes in
            // an index map, so this iteration preserves document order.
            let attrs = element
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect();
            let children = node.children().filter_map(convert_node).collect();

            Some(DomNode::Element { tag: element.name().to_string(), attrs, children })
        }
        Node::Text(text) => Some(DomNode::Text { content: text.text.to_string() }),
        _ => None,
    }
}
