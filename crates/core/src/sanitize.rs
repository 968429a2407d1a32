//! Removal of non-content elements from the DOM tree.
//!
//! The sanitizer excises every element whose tag is in a fixed removal set,
//! together with its entire subtree. Sibling order is preserved and there are
//! no error conditions; a tree with no matches passes through unchanged.

use crate::dom::DomNode;

/// Configuration for DOM sanitization.
///
/// The default removal set matches what browsers would execute or hide rather
/// than display: scripts, styles, embedded frames, and noscript fallbacks.
#[derive(Debug, Clone)]
pub struct SanitizeConfig {
    /// Tags whose subtrees are removed entirely.
    pub remove_tags: Vec<String>,
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            remove_tags: ["script", "style", "iframe", "noscript"]
                .iter()
                .map(|t| (*t).to_string())
                .collect(),
        }
    }
}

impl SanitizeConfig {
    fn should_remove(&self, tag: &str) -> bool {
        self.remove_tags.iter().any(|t| t == tag)
    }
}

/// Removes all nodes in the removal set from the tree.
///
/// Takes the tree by value and hands it back, matching the pipeline's
/// move-between-stages ownership model.
pub fn sanitize(mut root: DomNode, config: &SanitizeConfig) -> DomNode {
    sanitize_in_place(&mut root, config);
    root
}

fn sanitize_in_place(node: &mut DomNode, config: &SanitizeConfig) {
    if let Some(children) = node.children_mut() {
        children.retain(|child| match child.tag() {
            Some(tag) => !config.should_remove(tag),
            None => true,
        });
        for child in children {
            sanitize_in_place(child, config);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_document;

    fn contains_tag(node: &DomNode, tag: &str) -> bool {
        node.find_element(tag).is_some()
    }

    #[test]
    fn test_removes_script_subtree() {
        let tree = parse_document("<div><script>var x = 1;</script><p>keep</p></div>");
        let clean = sanitize(tree, &SanitizeConfig::default());
        assert!(!contains_tag(&clean, "script"));
        assert_eq!(clean.find_element("div").unwrap().text_content(), "keep");
    }

    #[test]
    fn test_removes_all_default_tags() {
        let tree = parse_document(
            "<body><style>a{}</style><iframe src=\"x\"></iframe>\
             <noscript>enable js</noscript><p>content</p></body>",
        );
        let clean = sanitize(tree, &SanitizeConfig::default());
        for tag in ["style", "iframe", "noscript"] {
            assert!(!contains_tag(&clean, tag), "{tag} survived sanitization");
        }
        assert!(contains_tag(&clean, "p"));
    }

    #[test]
    fn test_removes_nested_occurrences() {
        let tree = parse_document("<div><section><script>x</script></section></div>");
        let clean = sanitize(tree, &SanitizeConfig::default());
        assert!(!contains_tag(&clean, "script"));
        assert!(contains_tag(&clean, "section"));
    }

    #[test]
    fn test_preserves_sibling_order() {
        let tree = parse_document("<div><p>a</p><script>x</script><p>b</p><p>c</p></div>");
        let clean = sanitize(tree, &SanitizeConfig::default());
        let div = clean.find_element("div").unwrap();
        let texts: Vec<String> = div.children().iter().map(DomNode::text_content).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_no_matches_is_noop() {
        let tree = parse_document("<div><p>plain</p></div>");
        let before = tree.clone();
        let clean = sanitize(tree, &SanitizeConfig::default());
        assert_eq!(clean, before);
    }

    #[test]
    fn test_custom_removal_set() {
        let config = SanitizeConfig { remove_tags: vec!["aside".to_string()] };
        let tree = parse_document("<div><aside>ad</aside><script>kept now</script></div>");
        let clean = sanitize(tree, &config);
        assert!(!contains_tag(&clean, "aside"));
        assert!(contains_tag(&clean, "script"));
    }
}
