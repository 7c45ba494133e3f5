//! Style rule deduplication across blocks
//!
//! Multiple embedded pages carry near-identical stylesheets. This module
//! splits each page's stylesheet into rules, compares them by a
//! whitespace-stripped signature, and keeps the first occurrence of each
//! rule in priority order, producing one master stylesheet plus a rewrite
//! of each page to reference it via a `<link>` tag.
//!
//! Rule splitting is a closing-brace heuristic: a literal `}` inside a
//! quoted value (e.g. `content: "}"`) splits a rule in two and the broken
//! fragments are retained as-is. That limitation is accepted; the payloads
//! this engine manages do not contain one.

use indexmap::IndexSet;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ANY_WHITESPACE: Regex = Regex::new(r"\s").unwrap();
}

/// Style region markers inside a markup payload.
const STYLE_OPEN: &str = "<style>";
const STYLE_CLOSE: &str = "</style>";

/// One style rule with its comparison signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    /// Rule text as found in the source (selector and body, trimmed)
    pub text: String,
    /// Whitespace-stripped form, used only for duplicate comparison
    pub signature: String,
}

impl StyleRule {
    /// Build a rule from source text, computing its signature.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let signature = signature(&text);
        Self { text, signature }
    }
}

/// Compute a rule's comparison signature by removing all whitespace.
///
/// Signatures are never emitted; output always uses the original rule text.
pub fn signature(rule: &str) -> String {
    ANY_WHITESPACE.replace_all(rule, "").to_string()
}

/// Split a stylesheet into candidate rules on the closing-brace heuristic.
///
/// Fragments are trimmed, empties discarded, and the closing brace
/// re-appended to each survivor.
pub fn split_rules(css: &str) -> Vec<String> {
    css.split('}')
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(|fragment| format!("{fragment}}}"))
        .collect()
}

/// The deduplicated, priority-ordered union of style rules.
#[derive(Debug, Clone, Default)]
pub struct MasterStylesheet {
    /// Unique rules in first-seen order
    pub rules: Vec<StyleRule>,
}

impl MasterStylesheet {
    /// Render the master stylesheet payload, one rule per line.
    pub fn to_css(&self) -> String {
        let texts: Vec<&str> = self.rules.iter().map(|r| r.text.as_str()).collect();
        texts.join("\n")
    }

    /// Number of unique rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules were collected.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Deduplicates stylesheets gathered from multiple named blocks.
#[derive(Debug, Clone)]
pub struct StyleDeduplicator {
    /// Block names whose rules win ties, in descending priority
    priority: Vec<String>,
}

impl StyleDeduplicator {
    /// Create a deduplicator with the given priority list.
    pub fn new(priority: Vec<String>) -> Self {
        Self { priority }
    }

    /// Sort key for a block name: its priority index, or one past the list
    /// for non-priority blocks (which keep their relative input order).
    fn sort_key(&self, name: &str) -> usize {
        self.priority
            .iter()
            .position(|p| p == name)
            .unwrap_or(self.priority.len())
    }

    /// Build the master stylesheet from `(block name, stylesheet payload)`
    /// pairs.
    ///
    /// Blocks are stable-sorted priority-first, rules are collected
    /// first-seen: when the same signature appears again - even from a rule
    /// with a different original spelling - the later copy is dropped, so a
    /// selector redefined in a lower-priority block loses silently. Output
    /// order is deterministic for a given input sequence.
    pub fn dedupe(&self, sheets: &[(String, String)]) -> MasterStylesheet {
        let mut ordered: Vec<&(String, String)> = sheets.iter().collect();
        ordered.sort_by_key(|(name, _)| self.sort_key(name));

        let mut seen: IndexSet<String> = IndexSet::new();
        let mut master = MasterStylesheet::default();

        for (_, css) in ordered {
            for text in split_rules(css) {
                let rule = StyleRule::new(text);
                if seen.insert(rule.signature.clone()) {
                    master.rules.push(rule);
                }
            }
        }

        master
    }
}

/// Find the inner span of the first `<style>` region in a markup payload.
pub fn style_region(page: &str) -> Option<(usize, usize)> {
    let open = page.find(STYLE_OPEN)?;
    let inner_start = open + STYLE_OPEN.len();
    let inner_end = inner_start + page[inner_start..].find(STYLE_CLOSE)?;
    Some((inner_start, inner_end))
}

/// Extract the first `<style>` region's stylesheet text from a markup
/// payload.
pub fn extract_stylesheet(page: &str) -> Option<&str> {
    let (start, end) = style_region(page)?;
    Some(&page[start..end])
}

/// Replace a page's inline `<style>` region (tags included) with a `<link>`
/// to the shared stylesheet. Returns `None` when the page has no style
/// region.
pub fn link_stylesheet(page: &str, href: &str) -> Option<String> {
    let (inner_start, inner_end) = style_region(page)?;
    let region_start = inner_start - STYLE_OPEN.len();
    let region_end = inner_end + STYLE_CLOSE.len();

    let mut out = String::with_capacity(page.len());
    out.push_str(&page[..region_start]);
    out.push_str(&format!("<link rel=\"stylesheet\" href=\"{href}\">"));
    out.push_str(&page[region_end..]);
    Some(out)
}
