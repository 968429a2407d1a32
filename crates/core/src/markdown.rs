//! Rule-driven Markdown rendering of a [`DomNode`] subtree.
//!
//! The renderer walks the tree depth-first. Children are rendered first and
//! the already-rendered text is handed to the first matching
//! [`ConversionRule`] from a fixed, ordered table; unknown tags fall through
//! to their children's text so content is never silently dropped. Text nodes
//! collapse whitespace runs to single spaces except inside a rule-declared
//! preserve-whitespace context (fenced code).
//!
//! Output is byte-deterministic: the rule table is a static ordered list,
//! attributes are scanned in document order, and nothing iterates a hash map.

use std::sync::LazyLock;

use crate::dom::DomNode;

/// Rendering context threaded down the tree during the walk.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    /// Current list nesting depth; 0 outside any list.
    pub list_depth: usize,
    /// 1-based position when rendering an `<ol>` item.
    pub item_index: Option<usize>,
    /// Whitespace is preserved verbatim (inside `<pre>`).
    pub preserve_whitespace: bool,
}

/// Input handed to a rule's render function.
#[derive(Debug)]
pub struct RuleInput<'a> {
    /// Tag of the element being rendered.
    pub tag: &'a str,
    /// The element's attributes, document order.
    pub attrs: &'a [(String, String)],
    /// Already-rendered text of the element's children.
    pub children: &'a str,
    /// Context the element was rendered in.
    pub ctx: &'a RenderContext,
}

impl RuleInput<'_> {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }
}

/// One entry of the conversion rule table.
///
/// Rules are immutable, loaded once, and ordered by priority descending with
/// declaration order breaking ties; the first matching rule wins.
pub struct ConversionRule {
    /// Name for debugging and tests.
    pub name: &'static str,
    /// Higher priority rules are tried first.
    pub priority: i32,
    /// Predicate over the element's tag and attributes.
    pub matches: fn(tag: &str, attrs: &[(String, String)]) -> bool,
    /// Whether descendants keep whitespace verbatim.
    pub preserve_whitespace: bool,
    /// Render function receiving the children's already-rendered text.
    pub render: fn(&RuleInput<'_>) -> String,
}

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];
const BLOCK_CONTAINER_TAGS: &[&str] = &[
    "body", "div", "article", "section", "main", "aside", "figure", "header", "footer", "nav",
    "table", "thead", "tbody", "tr",
];
const SKIP_TAGS: &[&str] = &["head", "title", "meta", "link", "base"];

/// The static rule table, sorted once at first use.
static RULES: LazyLock<Vec<ConversionRule>> = LazyLock::new(|| {
    let mut rules = vec![
        ConversionRule {
            name: "skip",
            priority: 100,
            matches: |tag, _| SKIP_TAGS.contains(&tag),
            preserve_whitespace: false,
            render: |_| String::new(),
        },
        ConversionRule {
            name: "heading",
            priority: 10,
            matches: |tag, _| HEADING_TAGS.contains(&tag),
            preserve_whitespace: false,
            render: render_heading,
        },
        ConversionRule {
            name: "paragraph",
            priority: 10,
            matches: |tag, _| tag == "p",
            preserve_whitespace: false,
            render: |input| {
                let text = input.children.trim();
                if text.is_empty() { String::new() } else { format!("{text}\n\n") }
            },
        },
        ConversionRule {
            name: "line-break",
            priority: 10,
            matches: |tag, _| tag == "br",
            preserve_whitespace: false,
            render: |_| "\n".to_string(),
        },
        ConversionRule {
            name: "rule",
            priority: 10,
            matches: |tag, _| tag == "hr",
            preserve_whitespace: false,
            render: |_| "---\n\n".to_string(),
        },
        ConversionRule {
            name: "strong",
            priority: 10,
            matches: |tag, _| tag == "strong" || tag == "b",
            preserve_whitespace: false,
            render: |input| wrap_inline(input.children, "**"),
        },
        ConversionRule {
            name: "emphasis",
            priority: 10,
            matches: |tag, _| tag == "em" || tag == "i",
            preserve_whitespace: false,
            render: |input| wrap_inline(input.children, "*"),
        },
        ConversionRule {
            name: "inline-code",
            priority: 10,
            matches: |tag, _| tag == "code",
            preserve_whitespace: false,
            render: |input| {
                // Inside <pre> the fenced-code rule owns the formatting.
                if input.ctx.preserve_whitespace {
                    input.children.to_string()
                } else {
                    wrap_inline(input.children, "`")
                }
            },
        },
        ConversionRule {
            name: "link",
            priority: 10,
            matches: |tag, _| tag == "a",
            preserve_whitespace: false,
            render: render_link,
        },
        ConversionRule {
            name: "image",
            priority: 10,
            matches: |tag, _| tag == "img",
            preserve_whitespace: false,
            render: render_image,
        },
        ConversionRule {
            name: "blockquote",
            priority: 10,
            matches: |tag, _| tag == "blockquote",
            preserve_whitespace: false,
            render: render_blockquote,
        },
        ConversionRule {
            name: "list-item",
            priority: 10,
            matches: |tag, _| tag == "li",
            preserve_whitespace: false,
            render: render_list_item,
        },
        ConversionRule {
            name: "list",
            priority: 10,
            matches: |tag, _| tag == "ul" || tag == "ol",
            preserve_whitespace: false,
            render: render_list,
        },
        ConversionRule {
            name: "fenced-code",
            priority: 10,
            matches: |tag, _| tag == "pre",
            preserve_whitespace: true,
            render: render_fenced_code,
        },
        ConversionRule {
            name: "block-container",
            priority: 0,
            matches: |tag, _| BLOCK_CONTAINER_TAGS.contains(&tag),
            preserve_whitespace: false,
            render: |input| {
                let text = input.children.trim();
                if text.is_empty() { String::new() } else { format!("{text}\n\n") }
            },
        },
    ];

    // Priority descending, declaration order for ties (stable sort).
    rules.sort_by(|a, b| b.priority.cmp(&a.priority));
    rules
});

/// Finds the first matching rule for an element.
pub fn lookup_rule(tag: &str, attrs: &[(String, String)]) -> Option<&'static ConversionRule> {
    RULES.iter().find(|rule| (rule.matches)(tag, attrs))
}

fn render_heading(input: &RuleInput<'_>) -> String {
    let level = match input.tag {
        "h1" => 1,
        "h2" => 2,
        "h3" => 3,
        "h4" => 4,
        "h5" => 5,
        _ => 6,
    };
    let text = input.children.trim();
    if text.is_empty() {
        return String::new();
    }
    format!("{} {text}\n\n", "#".repeat(level))
}

/// Wraps inline content, keeping surrounding spacing outside the markers.
fn wrap_inline(children: &str, marker: &str) -> String {
    let text = children.trim();
    if text.is_empty() {
        return String::new();
    }
    let leading = if children.starts_with(' ') { " " } else { "" };
    let trailing = if children.ends_with(' ') { " " } else { "" };
    format!("{leading}{marker}{text}{marker}{trailing}")
}

fn render_link(input: &RuleInput<'_>) -> String {
    let text = input.children.trim();
    if text.is_empty() {
        return String::new();
    }
    match input.attr("href") {
        Some(href) if href.starts_with("http://") || href.starts_with("https://") => {
            format!("[{text}]({href})")
        }
        // Missing or non-http(s) href: keep the text, drop the link.
        _ => text.to_string(),
    }
}

fn render_image(input: &RuleInput<'_>) -> String {
    match input.attr("src") {
        Some(src) if !src.is_empty() => {
            let alt = input.attr("alt").unwrap_or("");
            format!("![{alt}]({src})")
        }
        _ => String::new(),
    }
}

fn render_blockquote(input: &RuleInput<'_>) -> String {
    let text = input.children.trim();
    if text.is_empty() {
        return String::new();
    }
    let quoted: Vec<String> = text
        .lines()
        .map(|line| if line.is_empty() { ">".to_string() } else { format!("> {line}") })
        .collect();
    format!("{}\n\n", quoted.join("\n"))
}

fn render_list_item(input: &RuleInput<'_>) -> String {
    let text = input.children.trim();
    if text.is_empty() {
        return String::new();
    }

    let marker = match input.ctx.item_index {
        Some(n) => format!("{n}. "),
        None => "- ".to_string(),
    };

    // Continuation lines (wrapped content, nested lists) indent under the
    // marker; nesting depth accumulates one level per enclosing item.
    let mut lines = text.lines();
    let first = lines.next().unwrap_or("");
    let mut out = format!("{marker}{first}\n");
    for line in lines {
        if line.is_empty() {
            out.push('\n');
        } else {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

fn render_list(input: &RuleInput<'_>) -> String {
    let body = input.children.trim_end();
    if body.trim().is_empty() {
        return String::new();
    }
    if input.ctx.list_depth > 0 {
        // Nested list: stay inside the parent item, no blank line.
        format!("\n{body}")
    } else {
        format!("{body}\n\n")
    }
}

fn render_fenced_code(input: &RuleInput<'_>) -> String {
    let content = input.children.trim_matches('\n');
    // The fence must be longer than any backtick run in the content, so a
    // literal ``` inside the block cannot close it.
    let longest_run = content
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat((longest_run + 1).max(3));
    format!("{fence}\n{content}\n{fence}\n\n")
}

/// Renders a DOM subtree to Markdown.
///
/// The walk never mutates the tree it is given. Consecutive blank lines in
/// the output collapse to one, and the final document is trimmed.
pub fn render_markdown(node: &DomNode) -> String {
    let raw = render_node(node, &RenderContext::default());
    finalize(&raw)
}

fn render_node(node: &DomNode, ctx: &RenderContext) -> String {
    match node {
        DomNode::Text { content } => {
            if ctx.preserve_whitespace {
                content.clone()
            } else {
                collapse_whitespace(content)
            }
        }
        DomNode::Element { tag, attrs, children } => {
            let rule = lookup_rule(tag, attrs);

            let mut child_ctx = ctx.clone();
            if let Some(rule) = rule
                && rule.preserve_whitespace
            {
                child_ctx.preserve_whitespace = true;
            }

            let rendered = render_children(tag, children, &child_ctx);

            match rule {
                Some(rule) => (rule.render)(&RuleInput { tag, attrs, children: &rendered, ctx }),
                // Unhandled tag: pass the children through unchanged.
                None => rendered,
            }
        }
    }
}

/// Whitespace-only text between children of these tags is formatting noise
/// from the source document, not content, and is dropped.
fn drops_interelement_whitespace(tag: &str) -> bool {
    matches!(tag, "#document" | "html" | "ul" | "ol" | "blockquote")
        || BLOCK_CONTAINER_TAGS.contains(&tag)
}

fn is_insignificant_whitespace(node: &DomNode) -> bool {
    matches!(node, DomNode::Text { content } if content.trim().is_empty())
}

fn render_children(tag: &str, children: &[DomNode], ctx: &RenderContext) -> String {
    let skip_whitespace = !ctx.preserve_whitespace && drops_interelement_whitespace(tag);

    if tag == "ul" || tag == "ol" {
        let mut item_ctx = ctx.clone();
        item_ctx.list_depth += 1;
        item_ctx.item_index = None;

        let ordered = tag == "ol";
        let mut index = 0usize;
        let mut out = String::new();
        for child in children {
            if is_insignificant_whitespace(child) {
                continue;
            }
            if child.tag() == Some("li") && ordered {
                index += 1;
                item_ctx.item_index = Some(index);
            }
            out.push_str(&render_node(child, &item_ctx));
        }
        return out;
    }

    children
        .iter()
        .filter(|child| !(skip_whitespace && is_insignificant_whitespace(child)))
        .map(|child| render_node(child, ctx))
        .collect()
}

/// Collapses whitespace runs (including newlines) to single spaces.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    out
}

/// Collapses runs of blank lines to a single blank line and trims the ends.
fn finalize(raw: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut blank_run = 0usize;
    for line in raw.lines() {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run == 1 {
                lines.push("");
            }
        } else {
            blank_run = 0;
            lines.push(line.trim_end());
        }
    }

    while lines.first() == Some(&"") {
        lines.remove(0);
    }
    while lines.last() == Some(&"") {
        lines.pop();
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_document;
    use rstest::rstest;

    fn render(html: &str) -> String {
        let tree = parse_document(html);
        let body = tree.find_element("body").unwrap();
        render_markdown(body)
    }

    #[rstest]
    #[case("<h1>Title</h1><p>Hello <b>world</b></p>", "# Title\n\nHello **world**")]
    #[case("<h2>Sub</h2>", "## Sub")]
    #[case("<h6>Deep</h6>", "###### Deep")]
    #[case("<p>one</p><p>two</p>", "one\n\ntwo")]
    #[case("<ul><li>a</li><li>b</li></ul>", "- a\n- b")]
    #[case("<ol><li>a</li><li>b</li></ol>", "1. a\n2. b")]
    #[case("<foo>text</foo>", "text")]
    #[case("<p>a<br>b</p>", "a\nb")]
    #[case("<hr>", "---")]
    #[case("<p><em>soft</em> and <strong>loud</strong></p>", "*soft* and **loud**")]
    #[case("<p><code>x + y</code></p>", "`x + y`")]
    fn literal_scenarios(#[case] html: &str, #[case] expected: &str) {
        assert_eq!(render(html), expected);
    }

    #[test]
    fn test_link_with_https_href() {
        let out = render(r#"<p>see <a href="https://x.com">link</a></p>"#);
        assert!(out.contains("[link](https://x.com)"), "got: {out}");
    }

    #[test]
    fn test_link_without_href_keeps_text() {
        assert_eq!(render("<p><a>bare</a></p>"), "bare");
    }

    #[test]
    fn test_link_with_javascript_href_keeps_text() {
        assert_eq!(render(r#"<p><a href="javascript:void(0)">click</a></p>"#), "click");
    }

    #[test]
    fn test_image() {
        assert_eq!(render(r#"<img src="cat.png" alt="a cat">"#), "![a cat](cat.png)");
    }

    #[test]
    fn test_image_without_src_dropped() {
        assert_eq!(render(r#"<p>before <img alt="x"> after</p>"#), "before after");
    }

    #[test]
    fn test_blockquote_prefixes_every_line() {
        let out = render("<blockquote><p>first</p><p>second</p></blockquote>");
        assert_eq!(out, "> first\n>\n> second");
    }

    #[test]
    fn test_nested_list_indentation() {
        let out = render("<ul><li>a<ul><li>inner</li></ul></li><li>b</li></ul>");
        assert_eq!(out, "- a\n  - inner\n- b");
    }

    #[test]
    fn test_fenced_code_preserves_whitespace() {
        let out = render("<pre><code>fn main() {\n    run();\n}</code></pre>");
        assert_eq!(out, "```\nfn main() {\n    run();\n}\n```");
    }

    #[test]
    fn test_fenced_code_escapes_inner_fence() {
        let out = render("<pre><code>```\ninner\n```</code></pre>");
        assert!(out.starts_with("````\n"), "fence must outgrow the content: {out}");
        assert!(out.ends_with("\n````"));
    }

    #[test]
    fn test_whitespace_collapsed_in_paragraph() {
        assert_eq!(render("<p>several\n\n\n   spaced    words</p>"), "several spaced words");
    }

    #[test]
    fn test_blank_lines_collapse() {
        let out = render("<div><p>a</p></div><div></div><div><p>b</p></div>");
        assert_eq!(out, "a\n\nb");
    }

    #[test]
    fn test_unknown_tag_content_never_dropped() {
        assert_eq!(render("<widget><p>inside</p></widget>"), "inside");
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let tree = parse_document("<body><h1>T</h1><p>a <b>b</b> <a href=\"https://e.com\">c</a></p></body>");
        let body = tree.find_element("body").unwrap();
        assert_eq!(render_markdown(body), render_markdown(body));
    }

    #[test]
    fn test_renderer_does_not_mutate_tree() {
        let tree = parse_document("<body><p>stable</p></body>");
        let body = tree.find_element("body").unwrap().clone();
        let before = body.clone();
        let _ = render_markdown(&body);
        assert_eq!(body, before);
    }

    #[test]
    fn test_whitespace_between_list_items_ignored() {
        let out = render("<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>");
        assert_eq!(out, "- a\n- b");
    }

    #[test]
    fn test_whitespace_between_block_siblings_ignored() {
        let out = render("<div>\n  <p>a</p>\n  <p>b</p>\n</div>");
        assert_eq!(out, "a\n\nb");
    }

    #[test]
    fn test_space_between_inline_siblings_kept() {
        let out = render("<p><b>a</b> <i>b</i></p>");
        assert_eq!(out, "**a** *b*");
    }

    #[test]
    fn test_rule_table_first_match_wins() {
        // <pre> matches the fenced-code rule, never the block container.
        let rule = lookup_rule("pre", &[]).unwrap();
        assert_eq!(rule.name, "fenced-code");
        let rule = lookup_rule("div", &[]).unwrap();
        assert_eq!(rule.name, "block-container");
        assert!(lookup_rule("customtag", &[]).is_none());
    }
}
