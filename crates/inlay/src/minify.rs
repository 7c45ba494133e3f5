//! Payload minification
//!
//! Whitespace/comment-level size reduction for stylesheet, markup, and
//! script payloads. These are regex passes over opaque text, not parsers:
//! they collapse whitespace and strip comments without reordering tags,
//! attributes, or declarations. Each pass is idempotent.
//!
//! Known heuristic limits: the script line-comment strip treats any `//` as
//! a comment opener, so a `//` inside a string literal is misclassified.
//! Payloads managed by this engine do not contain one.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BLOCK_COMMENT: Regex = Regex::new(r"(?s)/\*.*?\*/").unwrap();
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
    static ref CSS_PUNCT: Regex = Regex::new(r"\s*([:;{}])\s*").unwrap();
    static ref MARKUP_COMMENT: Regex = Regex::new(r"(?s)<!--.*?-->").unwrap();
    static ref INTER_TAG_GAP: Regex = Regex::new(r">\s+<").unwrap();
    static ref LINE_COMMENT: Regex = Regex::new(r"//.*").unwrap();
    static ref SCRIPT_PUNCT: Regex = Regex::new(r"\s*([=+\-*/%&|<>!?:;,{}()\[\]])\s*").unwrap();
}

/// Minify a stylesheet payload.
///
/// Strips block comments, collapses whitespace runs to one space, removes
/// whitespace around `:` `;` `{` `}`, and drops a trailing semicolon before
/// a closing brace.
pub fn minify_stylesheet(css: &str) -> String {
    let css = BLOCK_COMMENT.replace_all(css, "");
    let css = WHITESPACE_RUN.replace_all(&css, " ");
    let css = CSS_PUNCT.replace_all(&css, "$1");
    let css = css.replace(";}", "}");
    css.trim().to_string()
}

/// Minify a markup payload.
///
/// Strips comments, removes whitespace between adjacent tags, and collapses
/// whitespace runs. Text content keeps its (single-space) separation; no tag
/// or attribute is reordered.
pub fn minify_markup(markup: &str) -> String {
    let markup = MARKUP_COMMENT.replace_all(markup, "");
    let markup = INTER_TAG_GAP.replace_all(&markup, "><");
    let markup = WHITESPACE_RUN.replace_all(&markup, " ");
    markup.trim().to_string()
}

/// Minify a script payload.
///
/// Strips line and block comments, collapses whitespace runs, and removes
/// whitespace adjacent to the operator/punctuation set. Key renaming (see
/// [`crate::rename`]) must run before this pass while multi-word match
/// targets are still intact.
pub fn minify_script(js: &str) -> String {
    let js = LINE_COMMENT.replace_all(js, "");
    let js = BLOCK_COMMENT.replace_all(&js, "");
    let js = WHITESPACE_RUN.replace_all(&js, " ");
    let js = SCRIPT_PUNCT.replace_all(&js, "$1");
    js.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_stylesheet_scenario_c() {
        assert_eq!(minify_stylesheet("  .a  {  color : red ;  }  "), ".a{color:red}");
    }

    #[test]
    fn test_stylesheet_strips_comments() {
        let css = "/* theme */ .a { color: red; } /* multi\nline */ .b { margin: 0 }";
        assert_eq!(minify_stylesheet(css), ".a{color:red}.b{margin:0}");
    }

    #[test]
    fn test_stylesheet_idempotent() {
        let css = "body {\n  margin: 0;\n  background: var(--bg);\n}\n.pill:hover {\n  transform: translateY(-1px);\n}";
        let once = minify_stylesheet(css);
        assert_eq!(minify_stylesheet(&once), once);
    }

    #[test]
    fn test_markup_collapses_inter_tag_whitespace() {
        let html = "<div>\n  <span>a</span>\n  <span>b</span>\n</div>";
        assert_eq!(minify_markup(html), "<div><span>a</span><span>b</span></div>");
    }

    #[test]
    fn test_markup_strips_comments_keeps_text() {
        let html = "<!-- banner -->\n<p>hello   world</p>";
        assert_eq!(minify_markup(html), "<p>hello world</p>");
    }

    #[test]
    fn test_markup_idempotent() {
        let html = "<header>\n  <h1 id=\"serverName\">Tank Alarm Server</h1>\n</header>";
        let once = minify_markup(html);
        assert_eq!(minify_markup(&once), once);
    }

    #[test]
    fn test_script_strips_line_comments() {
        let js = "const a = 1; // counter\nconst b = 2;";
        assert_eq!(minify_script(js), "const a=1;const b=2;");
    }

    #[test]
    fn test_script_strips_block_comments() {
        let js = "/* PIN LOGIC */\nlet pinMode = 'unlock';";
        assert_eq!(minify_script(js), "let pinMode='unlock';");
    }

    #[test]
    fn test_script_tightens_operators() {
        let js = "state.timer = setInterval(() => {\n  refreshData();\n}, 1000);";
        assert_eq!(minify_script(js), "state.timer=setInterval(()=>{refreshData();},1000);");
    }

    #[test]
    fn test_script_idempotent() {
        let js = "function formatNumber(value) {\n  return (typeof value === 'number') ? value.toFixed(1) : '--';\n}";
        let once = minify_script(js);
        assert_eq!(minify_script(&once), once);
    }
}
