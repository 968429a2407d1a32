//! Heuristic content scoring for candidate elements.
//!
//! Scores combine four signals: a base score from the tag itself, a weight
//! from class/id attribute tokens matched against fixed positive and negative
//! token sets, a sub-linear text-density score (word count and comma-separated
//! clauses, both with diminishing returns), and a link-density penalty that
//! discounts link-heavy nodes since those are usually navigation.
//!
//! All tunable constants live in [`ScoreConfig`] rather than being hard-coded;
//! the defaults were validated against synthetic article/boilerplate pages.

use std::sync::LazyLock;

use regex::Regex;

use crate::dom::DomNode;

/// Configuration for the content scoring algorithm.
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    /// Weight added when class/id tokens match the positive set.
    pub positive_weight: f64,
    /// Weight added when class/id tokens match the negative set (negative value).
    pub negative_weight: f64,
    /// Words per density point, before the cap.
    pub words_per_point: usize,
    /// Maximum density score earned from word count.
    pub max_word_score: f64,
    /// Maximum density score earned from comma-separated clauses.
    pub max_clause_score: f64,
    /// Text length past which a node counts as content-rich, softening the
    /// link-density penalty.
    pub content_rich_chars: usize,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            positive_weight: 25.0,
            negative_weight: -25.0,
            words_per_point: 20,
            max_word_score: 3.0,
            max_clause_score: 3.0,
            content_rich_chars: 500,
        }
    }
}

/// Coarse label attached to a scored candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// No strong signal either way.
    Unknown,
    /// Positive tokens or a positive final score.
    Content,
    /// Negative tokens, or all signal erased by the link-density penalty.
    Boilerplate,
}

/// Result of scoring a single element.
#[derive(Debug, Clone)]
pub struct ScoreResult {
    /// Base score from the tag name.
    pub base_score: f64,
    /// Weight adjustment from class/id tokens.
    pub class_weight: f64,
    /// Text density score (words + clauses).
    pub density: f64,
    /// Link density, 0.0 to 1.0.
    pub link_density: f64,
    /// Final score, always finite and non-negative.
    pub final_score: f64,
    /// Coarse content/boilerplate label.
    pub classification: Classification,
}

/// Base score for an element by tag name.
///
/// Tags that usually wrap article bodies score high, generic containers are
/// neutral-positive, and chrome elements like headers and navigation start in
/// the negative.
pub fn base_tag_score(tag: &str) -> f64 {
    match tag {
        "article" => 10.0,
        "main" | "section" => 8.0,
        "div" => 5.0,
        "p" | "td" | "blockquote" | "pre" => 0.0,
        "form" | "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" | "header" | "footer" | "nav" => -5.0,
        _ => 0.0,
    }
}

/// Tokens that suggest an element wraps primary content.
static POSITIVE_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(article|body|content|entry|hentry|main|page|post|text|blog|story)")
        .unwrap_or_else(|e| unreachable!("invalid positive token pattern: {e}"))
});

/// Tokens that suggest navigation, ads, or other boilerplate.
static NEGATIVE_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(banner|breadcrumbs?|combx|comment|community|disqus|extra|foot|header|menu|nav|promo|related|remark|rss|share|shoutbox|sidebar|social|sponsor|ad-|advert|agegate|pagination|pager|popup)",
    )
    .unwrap_or_else(|e| unreachable!("invalid negative token pattern: {e}"))
});

/// Class/id token weight for an element.
///
/// The id is checked first, then each whitespace-separated class token, in
/// document order. A positive match wins over a negative one within the same
/// attribute, mirroring how content sites often combine both kinds of token.
pub fn class_id_weight(node: &DomNode, config: &ScoreConfig) -> f64 {
    if let Some(id) = node.attr("id") {
        if POSITIVE_TOKENS.is_match(id) {
            return config.positive_weight;
        }
        if NEGATIVE_TOKENS.is_match(id) {
            return config.negative_weight;
        }
    }

    if let Some(class) = node.attr("class") {
        for token in class.split_whitespace() {
            if POSITIVE_TOKENS.is_match(token) {
                return config.positive_weight;
            }
            if NEGATIVE_TOKENS.is_match(token) {
                return config.negative_weight;
            }
        }
    }

    0.0
}

/// Sub-linear text density score.
///
/// One point per `words_per_point` words capped at `max_word_score`, plus one
/// point per comma-separated clause capped at `max_clause_score`. Long text
/// keeps scoring higher, but with diminishing returns past the caps.
pub fn density_score(text: &str, config: &ScoreConfig) -> f64 {
    let words = text.split_whitespace().count();
    let word_score = ((words / config.words_per_point.max(1)) as f64).min(config.max_word_score);

    let clauses = text.matches(',').count();
    let clause_score = (clauses as f64).min(config.max_clause_score);

    word_score + clause_score
}

/// Ratio of anchor text length to total text length within a subtree.
///
/// Returns 0.0 for empty nodes and 1.0 when every character is inside a link.
pub fn link_density(node: &DomNode) -> f64 {
    let total = node.text_content().chars().count();
    if total == 0 {
        return 0.0;
    }

    let linked = anchor_text_len(node, false);
    linked as f64 / total as f64
}

fn anchor_text_len(node: &DomNode, inside_anchor: bool) -> usize {
    match node {
        DomNode::Text { content } => {
            if inside_anchor {
                content.chars().count()
            } else {
                0
            }
        }
        DomNode::Element { tag, children, .. } => {
            let inside = inside_anchor || tag == "a";
            children.iter().map(|c| anchor_text_len(c, inside)).sum()
        }
    }
}

/// Calculates the full score for a candidate element.
///
/// The raw score (base + token weight + density) is scaled by the link-density
/// penalty and clamped to zero; candidate scores are always finite and
/// non-negative so downstream propagation can never produce runaway values.
pub fn calculate_score(node: &DomNode, config: &ScoreConfig) -> ScoreResult {
    let base_score = node.tag().map(base_tag_score).unwrap_or(0.0);
    let class_weight = class_id_weight(node, config);

    let text = node.text_content();
    let density = density_score(&text, config);
    let ld = link_density(node);

    // Positive tokens and long prose soften the link penalty; a genuine
    // article with many citations should not score like a nav menu.
    let content_rich = text.chars().count() > config.content_rich_chars;
    let link_penalty = if class_weight > 0.0 || content_rich { 1.0 - ld * 0.5 } else { 1.0 - ld };

    let raw = base_score + class_weight + density;
    let final_score = (raw * link_penalty).max(0.0);

    let classification = if class_weight < 0.0 {
        Classification::Boilerplate
    } else if final_score > 0.0 && (class_weight > 0.0 || density > 0.0) {
        Classification::Content
    } else {
        Classification::Unknown
    };

    ScoreResult { base_score, class_weight, density, link_density: ld, final_score, classification }
}
