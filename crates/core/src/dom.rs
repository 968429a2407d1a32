//! The owned DOM tree that flows through the pipeline.
//!
//! Every pipeline stage consumes and produces a [`DomNode`] tree. The tree is
//! single-owned: each node belongs to exactly one parent, the root is owned by
//! whichever stage is currently processing it, and ownership moves between
//! stages. No stage ever shares or concurrently mutates a tree.
//!
//! # Example
//!
//! ```rust
//! use pagemark_core::dom::DomNode;
//!
//! let node = DomNode::element_with(
//!     "p",
//!     vec![],
//!     vec![DomNode::text("Hello world")],
//! );
//! assert_eq!(node.text_content(), "Hello world");
//! ```

/// A node in the owned DOM tree.
///
/// Either an element with a tag name, attributes, and ordered children, or a
/// text node. Attributes are kept verbatim in document order as name/value
/// pairs, so attribute handling is deterministic and case is never forced.
#[derive(Debug, Clone, PartialEq)]
pub enum DomNode {
    /// An element such as `<p>` or `<div>`.
    Element {
        /// Lowercased tag name as reported by the parser.
        tag: String,
        /// Attributes in document order, names and values verbatim.
        attrs: Vec<(String, String)>,
        /// Child nodes in document order.
        children: Vec<DomNode>,
    },
    /// A run of character data, entities already decoded.
    Text {
        /// The decoded text content.
        content: String,
    },
}

impl DomNode {
    /// Creates an empty element with the given tag name.
    pub fn element(tag: impl Into<String>) -> Self {
        DomNode::Element { tag: tag.into(), attrs: Vec::new(), children: Vec::new() }
    }

    /// Creates an element with attributes and children.
    pub fn element_with(tag: impl Into<String>, attrs: Vec<(String, String)>, children: Vec<DomNode>) -> Self {
        DomNode::Element { tag: tag.into(), attrs, children }
    }

    /// Creates a text node.
    pub fn text(content: impl Into<String>) -> Self {
        DomNode::Text { content: content.into() }
    }

    /// Returns the tag name if this node is an element.
    pub fn tag(&self) -> Option<&str> {
        match self {
            DomNode::Element { tag, .. } => Some(tag),
            DomNode::Text { .. } => None,
        }
    }

    /// Returns true if this node is an element.
    pub fn is_element(&self) -> bool {
        matches!(self, DomNode::Element { .. })
    }

    /// Returns true if this node is a text node.
    pub fn is_text(&self) -> bool {
        matches!(self, DomNode::Text { .. })
    }

    /// Looks up an attribute value by name.
    ///
    /// Uses a linear scan over the ordered attribute list; the first
    /// occurrence wins, matching document order.
    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            DomNode::Element { attrs, .. } => {
                attrs.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
            }
            DomNode::Text { .. } => None,
        }
    }

    /// Returns the child nodes, empty for text nodes.
    pub fn children(&self) -> &[DomNode] {
        match self {
            DomNode::Element { children, .. } => children,
            DomNode::Text { .. } => &[],
        }
    }

    /// Returns the child nodes mutably, if this node is an element.
    pub fn children_mut(&mut self) -> Option<&mut Vec<DomNode>> {
        match self {
            DomNode::Element { children, .. } => Some(children),
            DomNode::Text { .. } => None,
        }
    }

    /// Collects the concatenated text content of this subtree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            DomNode::Text { content } => out.push_str(content),
            DomNode::Element { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Finds the first descendant element with the given tag, pre-order.
    pub fn find_element(&self, tag: &str) -> Option<&DomNode> {
        if self.tag() == Some(tag) {
            return Some(self);
        }
        for child in self.children() {
            if let Some(found) = child.find_element(tag) {
                return Some(found);
            }
        }
        None
    }

    /// Counts elements in this subtree, including this node.
    pub fn element_count(&self) -> usize {
        match self {
            DomNode::Text { .. } => 0,
            DomNode::Element { children, .. } => {
                1 + children.iter().map(DomNode::element_count).sum::<usize>()
            }
        }
    }
}
