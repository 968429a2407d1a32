//! Readability-style extraction of the primary content subtree.
//!
//! The extractor flattens the sanitized tree into an arena of element entries,
//! scores block-like candidates with [`crate::scoring`], propagates a fraction
//! of each candidate's score to its parent and grandparent (content clusters,
//! so containers of many scored paragraphs accumulate credit), then picks a
//! winner among the top candidates with a sibling-proximity bonus. The
//! extraction root is the winner's closest ancestor covering a threshold
//! fraction of the document's total positive score.
//!
//! Extraction never hard-fails: when no candidate clears the score floor the
//! whole sanitized body is returned and [`Extraction::used_fallback`] is set.

use crate::dom::DomNode;
use crate::scoring::{Classification, ScoreConfig, ScoreResult, calculate_score, link_density};

/// Tags considered potential content containers.
const CANDIDATE_TAGS: &[&str] = &["p", "div", "article", "section", "main", "td", "pre", "blockquote"];

/// Structural tags that stay candidates even with little direct text.
const STRUCTURAL_TAGS: &[&str] = &["article", "section", "main"];

/// Wrapper tags with no semantic meaning of their own, eligible for unwrapping.
const WRAPPER_TAGS: &[&str] = &["div", "span", "section"];

/// Tags that make an otherwise text-free element worth keeping.
const MEANINGFUL_LEAF_TAGS: &[&str] = &["img", "br", "hr", "video", "audio"];

/// Configuration for content extraction.
///
/// Every heuristic constant is exposed here; the defaults are a starting
/// point, not gospel, and should be tuned against a corpus of representative
/// pages.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Scoring configuration for individual candidates.
    pub score: ScoreConfig,
    /// Minimum winner score; below this the extractor falls back to the body.
    pub min_score_floor: f64,
    /// Number of top candidates considered for sibling-proximity ranking.
    pub max_top_candidates: usize,
    /// Fraction of a candidate's score credited to its parent.
    pub parent_fraction: f64,
    /// Fraction of a candidate's score credited to its grandparent.
    pub grandparent_fraction: f64,
    /// Bonus per similar scored sibling during final ranking.
    pub sibling_bonus: f64,
    /// Fraction of total positive score the extraction root must contain.
    pub coverage_threshold: f64,
    /// Candidates with less subtree text than this are skipped, unless they
    /// are structural tags like `article`.
    pub min_candidate_chars: usize,
    /// Link density above which post-processing drops an element.
    pub max_link_density: f64,
    /// Maximum elements to scan (0 = unlimited).
    pub max_elements: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            score: ScoreConfig::default(),
            min_score_floor: 10.0,
            max_top_candidates: 5,
            parent_fraction: 0.5,
            grandparent_fraction: 1.0 / 3.0,
            sibling_bonus: 5.0,
            coverage_threshold: 0.6,
            min_candidate_chars: 25,
            max_link_density: 0.66,
            max_elements: 0,
        }
    }
}

/// The result of content extraction.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// The extracted subtree, or the whole sanitized body on fallback.
    pub root: DomNode,
    /// True when no candidate cleared the score floor and the full body was
    /// returned instead. A degraded success, not an error.
    pub used_fallback: bool,
    /// Accumulated score of the winning candidate, 0.0 on fallback.
    pub top_score: f64,
}

/// One element in the flattened arena.
#[derive(Debug)]
struct Entry {
    parent: Option<usize>,
    /// Child-index path from the search root to this element.
    path: Vec<usize>,
    tag: String,
    class: Option<String>,
    /// Present when this element was scored as a candidate.
    score: Option<ScoreResult>,
}

/// Extracts the primary content subtree from a sanitized tree.
///
/// The search domain is the first `body` element, or the whole tree when the
/// input has no body (already-extracted fragments, for instance).
pub fn extract_content(tree: &DomNode, config: &ExtractConfig) -> Extraction {
    let body = tree.find_element("body").unwrap_or(tree);

    let entries = flatten(body, config);

    let totals = accumulate_scores(&entries, config);

    let winner = match select_winner(&entries, &totals, config) {
        Some(id) if totals[id] >= config.min_score_floor => id,
        _ => {
            return Extraction { root: body.clone(), used_fallback: true, top_score: 0.0 };
        }
    };

    let root_id = coverage_ancestor(&entries, winner, config);
    let mut root = node_at_path(body, &entries[root_id].path).clone();

    prune(&mut root, config);
    root = unwrap_wrappers(root);

    Extraction { root, used_fallback: false, top_score: totals[winner] }
}

/// Flattens the tree into the element arena, scoring block-like candidates.
fn flatten(root: &DomNode, config: &ExtractConfig) -> Vec<Entry> {
    let mut entries = Vec::new();
    let limit = if config.max_elements == 0 { usize::MAX } else { config.max_elements };
    walk(root, None, &mut Vec::new(), &mut entries, config, limit);
    entries
}

fn walk(
    node: &DomNode, parent: Option<usize>, path: &mut Vec<usize>, entries: &mut Vec<Entry>,
    config: &ExtractConfig, limit: usize,
) {
    let DomNode::Element { tag, children, .. } = node else {
        return;
    };
    if entries.len() >= limit {
        return;
    }

    let id = entries.len();
    let score = if is_candidate(node, tag, config) { Some(calculate_score(node, &config.score)) } else { None };

    entries.push(Entry {
        parent,
        path: path.clone(),
        tag: tag.clone(),
        class: node.attr("class").map(str::to_string),
        score,
    });

    for (i, child) in children.iter().enumerate() {
        path.push(i);
        walk(child, Some(id), path, entries, config, limit);
        path.pop();
    }
}

fn is_candidate(node: &DomNode, tag: &str, config: &ExtractConfig) -> bool {
    if !CANDIDATE_TAGS.contains(&tag) {
        return false;
    }
    if STRUCTURAL_TAGS.contains(&tag) {
        return true;
    }
    node.text_content().chars().count() >= config.min_candidate_chars
}

/// Accumulates candidate scores and propagates them up two levels.
fn accumulate_scores(entries: &[Entry], config: &ExtractConfig) -> Vec<f64> {
    let mut totals = vec![0.0; entries.len()];

    for (id, entry) in entries.iter().enumerate() {
        let Some(score) = &entry.score else { continue };
        let own = score.final_score;
        totals[id] += own;

        if let Some(parent) = entry.parent {
            totals[parent] += own * config.parent_fraction;
            if let Some(grandparent) = entries[parent].parent {
                totals[grandparent] += own * config.grandparent_fraction;
            }
        }
    }

    totals
}

/// Ranks the top candidates and applies the sibling-proximity bonus.
///
/// Sorting is by score descending with document order breaking ties, so the
/// outcome never depends on map iteration order.
fn select_winner(entries: &[Entry], totals: &[f64], config: &ExtractConfig) -> Option<usize> {
    let mut ranked: Vec<usize> = (1..entries.len())
        .filter(|&id| totals[id] > 0.0 && !is_boilerplate(&entries[id]))
        .collect();
    ranked.sort_by(|&a, &b| totals[b].partial_cmp(&totals[a]).unwrap_or(std::cmp::Ordering::Equal).then(a.cmp(&b)));
    ranked.truncate(config.max_top_candidates);

    ranked
        .iter()
        .map(|&id| (id, totals[id] + sibling_bonus(entries, totals, id, config)))
        .max_by(|(a_id, a), (b_id, b)| {
            a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal).then(b_id.cmp(a_id))
        })
        .map(|(id, _)| id)
}

fn is_boilerplate(entry: &Entry) -> bool {
    matches!(&entry.score, Some(s) if s.classification == Classification::Boilerplate)
}

/// Bonus for candidates whose scored siblings look alike.
///
/// An isolated high scorer surrounded by unrelated markup is suspicious; a
/// candidate whose siblings share its tag or a class token and also scored is
/// probably part of the article's paragraph run.
fn sibling_bonus(entries: &[Entry], totals: &[f64], id: usize, config: &ExtractConfig) -> f64 {
    let entry = &entries[id];
    let Some(parent) = entry.parent else { return 0.0 };

    let similar = entries
        .iter()
        .enumerate()
        .filter(|(other_id, other)| {
            *other_id != id
                && other.parent == Some(parent)
                && other.score.is_some()
                && totals[*other_id] > 0.0
                && (other.tag == entry.tag || shares_class_token(entry, other))
        })
        .count();

    similar as f64 * config.sibling_bonus
}

fn shares_class_token(a: &Entry, b: &Entry) -> bool {
    match (&a.class, &b.class) {
        (Some(a), Some(b)) => {
            a.split_whitespace().any(|token| b.split_whitespace().any(|other| other == token))
        }
        _ => false,
    }
}

/// Walks up from the winner to the closest ancestor containing at least the
/// coverage threshold of the document's total positive candidate score.
///
/// Coverage grows monotonically towards the root, so the first node meeting
/// the threshold is the closest; the search root always covers everything.
fn coverage_ancestor(entries: &[Entry], winner: usize, config: &ExtractConfig) -> usize {
    let total_positive: f64 =
        entries.iter().filter_map(|e| e.score.as_ref()).map(|s| s.final_score).sum();
    if total_positive <= 0.0 {
        return winner;
    }
    let needed = total_positive * config.coverage_threshold;

    let mut current = winner;
    loop {
        if contained_score(entries, current) >= needed {
            return current;
        }
        match entries[current].parent {
            Some(parent) => current = parent,
            None => return current,
        }
    }
}

/// Sum of candidate scores inside a node's subtree, by path prefix.
fn contained_score(entries: &[Entry], id: usize) -> f64 {
    let prefix = &entries[id].path;
    entries
        .iter()
        .filter(|e| e.path.len() >= prefix.len() && e.path[..prefix.len()] == prefix[..])
        .filter_map(|e| e.score.as_ref())
        .map(|s| s.final_score)
        .sum()
}

fn node_at_path<'a>(root: &'a DomNode, path: &[usize]) -> &'a DomNode {
    let mut node = root;
    for &index in path {
        node = &node.children()[index];
    }
    node
}

/// Drops link-dense and empty elements from the extracted subtree.
fn prune(node: &mut DomNode, config: &ExtractConfig) {
    let Some(children) = node.children_mut() else { return };

    children.retain(|child| match child {
        DomNode::Text { .. } => true,
        DomNode::Element { .. } => {
            !is_link_dense(child, config) && !is_empty_element(child)
        }
    });

    for child in children {
        prune(child, config);
    }
}

fn is_link_dense(node: &DomNode, config: &ExtractConfig) -> bool {
    let text = node.text_content();
    // Long prose with citations is fine; only short link-heavy blocks go.
    text.chars().count() < 200 && !text.trim().is_empty() && link_density(node) > config.max_link_density
}

fn is_empty_element(node: &DomNode) -> bool {
    if node.text_content().trim().len() > 0 {
        return false;
    }
    !has_meaningful_leaf(node)
}

fn has_meaningful_leaf(node: &DomNode) -> bool {
    match node.tag() {
        Some(tag) if MEANINGFUL_LEAF_TAGS.contains(&tag) => true,
        _ => node.children().iter().any(has_meaningful_leaf),
    }
}

/// Unwraps semantic-free wrappers with a single element child and no text.
fn unwrap_wrappers(mut node: DomNode) -> DomNode {
    loop {
        let unwrap = match &node {
            DomNode::Element { tag, children, .. } if WRAPPER_TAGS.contains(&tag.as_str()) => {
                let elements: Vec<&DomNode> = children.iter().filter(|c| c.is_element()).collect();
                let stray_text = children
                    .iter()
                    .any(|c| matches!(c, DomNode::Text { content } if !content.trim().is_empty()));
                elements.len() == 1 && !stray_text
            }
            _ => false,
        };

        if !unwrap {
            break;
        }
        let Some(children) = node.children_mut() else { break };
        let only = children
            .iter()
            .position(|c| c.is_element())
            .unwrap_or_else(|| unreachable!("wrapper has exactly one element child"));
        node = children.swap_remove(only);
    }

    if let Some(children) = node.children_mut() {
        let taken = std::mem::take(children);
        *children = taken.into_iter().map(unwrap_wrappers).collect();
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_document;
    use crate::sanitize::{SanitizeConfig, sanitize};

    fn article_page() -> String {
        let para = "This is a long and winding paragraph of article prose, with plenty of \
                    commas, subordinate clauses, and enough words that the density scoring \
                    saturates, because genuine articles are wordy, discursive, and long."
            .to_string();
        format!(
            r#"<html><body>
                <nav class="nav-menu"><a href="/">Home</a> <a href="/about">About</a></nav>
                <div class="sidebar"><a href="/x">Related</a> <a href="/y">More</a></div>
                <article>
                    <h2>Section heading</h2>
                    <p>{para}</p>
                    <p>{para}</p>
                    <p>{para}</p>
                </article>
                <div class="footer"><a href="/contact">Contact us</a></div>
            </body></html>"#
        )
    }

    fn extract_default(html: &str) -> Extraction {
        let tree = sanitize(parse_document(html), &SanitizeConfig::default());
        extract_content(&tree, &ExtractConfig::default())
    }

    #[test]
    fn test_selects_article_over_boilerplate() {
        let result = extract_default(&article_page());
        assert!(!result.used_fallback);
        assert_eq!(result.root.tag(), Some("article"));
        assert!(result.top_score >= ExtractConfig::default().min_score_floor);
    }

    #[test]
    fn test_extracted_root_keeps_paragraphs() {
        let result = extract_default(&article_page());
        let paragraphs =
            result.root.children().iter().filter(|c| c.tag() == Some("p")).count();
        assert_eq!(paragraphs, 3);
    }

    #[test]
    fn test_fallback_on_boilerplate_only_page() {
        let html = r#"<html><body>
            <nav class="nav-menu"><a href="/">Home</a></nav>
            <div class="sidebar"><a href="/x">Related</a></div>
            <div class="footer">Copyright</div>
        </body></html>"#;
        let result = extract_default(html);
        assert!(result.used_fallback);
        assert_eq!(result.root.tag(), Some("body"));
        assert_eq!(result.top_score, 0.0);
    }

    #[test]
    fn test_fallback_on_empty_body() {
        let result = extract_default("<html><body></body></html>");
        assert!(result.used_fallback);
    }

    #[test]
    fn test_fallback_returns_unmodified_body() {
        let html = r#"<html><body><div class="sidebar"><a href="/x">x</a></div></body></html>"#;
        let tree = sanitize(parse_document(html), &SanitizeConfig::default());
        let body = tree.find_element("body").unwrap().clone();
        let result = extract_content(&tree, &ExtractConfig::default());
        assert!(result.used_fallback);
        assert_eq!(result.root, body);
    }

    #[test]
    fn test_sibling_run_beats_isolated_paragraph() {
        let para = "A solid run of prose, with commas, and enough words to score well, \
                    repeated across sibling paragraphs, which should cluster together, \
                    and be favored over any single outlier elsewhere in the page.";
        let html = format!(
            r#"<html><body>
                <div class="content">
                    <p>{para}</p><p>{para}</p><p>{para}</p><p>{para}</p>
                </div>
                <div><p>{para}</p></div>
            </body></html>"#
        );
        let result = extract_default(&html);
        assert!(!result.used_fallback);
        // The winning subtree must contain the four-paragraph run.
        let paragraphs = count_tag(&result.root, "p");
        assert!(paragraphs >= 4, "expected the sibling run, got {paragraphs} paragraphs");
    }

    fn count_tag(node: &DomNode, tag: &str) -> usize {
        let own = usize::from(node.tag() == Some(tag));
        own + node.children().iter().map(|c| count_tag(c, tag)).sum::<usize>()
    }

    #[test]
    fn test_prune_drops_empty_elements() {
        let mut node = parse_document("<div><p>text</p><p>   </p><span></span></div>")
            .find_element("div")
            .unwrap()
            .clone();
        prune(&mut node, &ExtractConfig::default());
        assert_eq!(node.children().iter().filter(|c| c.is_element()).count(), 1);
    }

    #[test]
    fn test_prune_keeps_images() {
        let mut node = parse_document(r#"<div><figure><img src="x.png" alt="x"></figure></div>"#)
            .find_element("div")
            .unwrap()
            .clone();
        prune(&mut node, &ExtractConfig::default());
        assert!(node.find_element("img").is_some());
    }

    #[test]
    fn test_prune_drops_short_link_dense_block() {
        let mut node = parse_document(
            r#"<div><p>Real content paragraph with words in it.</p>
               <div class="x"><a href="/a">one</a> <a href="/b">two</a></div></div>"#,
        )
        .find_element("div")
        .unwrap()
        .clone();
        prune(&mut node, &ExtractConfig::default());
        assert!(node.find_element("a").is_none());
        assert!(node.find_element("p").is_some());
    }

    #[test]
    fn test_unwrap_single_child_wrapper() {
        let tree = parse_document("<div><div><article><p>content here</p></article></div></div>");
        let outer = tree.find_element("div").unwrap().clone();
        let unwrapped = unwrap_wrappers(outer);
        assert_eq!(unwrapped.tag(), Some("article"));
    }

    #[test]
    fn test_unwrap_stops_at_text() {
        let tree = parse_document("<div>leading text<p>para</p></div>");
        let outer = tree.find_element("div").unwrap().clone();
        let unwrapped = unwrap_wrappers(outer);
        assert_eq!(unwrapped.tag(), Some("div"));
    }
}
