//! Visible-text extraction and tag-weighted term-frequency accumulation.
//!
//! `scraper` gives us the parsed tree; everything about which text counts
//! and how much it counts — tag weights, exclusions — is ours to implement
//! on top of it, since the underlying HTML parser has no notion of either.

use std::collections::HashMap;

use ego_tree::NodeRef;
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Node};

use crate::tokenizer::tokenize;

lazy_static! {
    static ref HEADING_RE: Regex = Regex::new("^h[1-6]$").expect("valid regex");
}

const EXCLUDED_TAGS: &[&str] = &["style", "script", "head", "meta"];
const PSEUDO_ROOT_TAG: &str = "[document]";

fn tag_weight(tag: &str) -> f64 {
    if tag == "title" {
        0.4
    } else if HEADING_RE.is_match(tag) {
        0.3
    } else if tag == "strong" || tag == "b" {
        0.2
    } else {
        0.1
    }
}

/// The tag name of the nearest element ancestor of `node`, or the pseudo-root
/// tag `[document]` if `node` has no element ancestor (a bare top-level text
/// node, or a node directly under the document root).
fn parent_tag_name(node: NodeRef<'_, Node>) -> &str {
    match node.parent() {
        Some(parent) => match parent.value() {
            Node::Element(el) => el.name(),
            _ => PSEUDO_ROOT_TAG,
        },
        None => PSEUDO_ROOT_TAG,
    }
}

/// Walk every text node in `html_src`, weight its stemmed term counts by
/// its parent tag, and sum into one weighted-term-frequency map for the
/// whole document. Comments and text under `style`/`script`/`head`/`meta`/
/// the pseudo-root are excluded.
pub fn weighted_term_frequencies(html_src: &str) -> HashMap<String, f64> {
    let document = Html::parse_document(html_src);
    let mut freqs: HashMap<String, f64> = HashMap::new();

    for node in document.tree.nodes() {
        let text = match node.value() {
            Node::Text(text) => text,
            _ => continue,
        };
        let tag = parent_tag_name(node);
        if tag == PSEUDO_ROOT_TAG || EXCLUDED_TAGS.contains(&tag) {
            continue;
        }
        let weight = tag_weight(tag);
        for term in tokenize(text) {
            *freqs.entry(term).or_insert(0.0) += weight;
        }
    }

    freqs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_and_body_weights_accumulate() {
        let html = "<html><head><title>Alpha Beta</title></head>\
                     <body>beta beta gamma</body></html>";
        let freqs = weighted_term_frequencies(html);
        assert!((freqs["alpha"] - 0.4).abs() < 1e-9);
        assert!((freqs["beta"] - (0.4 + 2.0 * 0.1)).abs() < 1e-9);
        assert!((freqs["gamma"] - 0.1).abs() < 1e-9);
    }

    #[test]
    fn script_style_and_comments_are_excluded() {
        let html = "<html><body>\
                     <script>var hidden = 'nope';</script>\
                     <style>.x{color:red}</style>\
                     <!-- a comment word -->\
                     visible text\
                     </body></html>";
        let freqs = weighted_term_frequencies(html);
        assert!(!freqs.contains_key("hidden"));
        assert!(!freqs.contains_key("nope"));
        assert!(!freqs.contains_key("color"));
        assert!(!freqs.contains_key("comment"));
        assert!(freqs.contains_key("visibl"));
    }

    #[test]
    fn headings_and_strong_get_their_own_weight() {
        let html = "<html><body><h2>big heading</h2><strong>bold word</strong></body></html>";
        let freqs = weighted_term_frequencies(html);
        assert!((freqs["big"] - 0.3).abs() < 1e-9);
        assert!((freqs["bold"] - 0.2).abs() < 1e-9);
    }
}
