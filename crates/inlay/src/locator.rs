//! Block location by syntactic markers
//!
//! A block is a named raw-string value inside the host text, introduced by a
//! declaration-style start marker (`static const char NAME[] PROGMEM = `)
//! and wrapped in raw-string delimiters whose tag is discovered from the
//! text itself (`R"TAG(` ... `)TAG"`). The host text is treated as opaque:
//! location is literal string search, not parsing.
//!
//! The close-delimiter search is non-recursive: a payload containing the
//! literal `)TAG"` sequence terminates the scan early. That precondition
//! holds for the asset payloads this engine manages and is not defended
//! against.

use crate::diagnostics::{InlayError, InlayResult};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Placeholder substituted with the block name in declaration templates.
const NAME_PLACEHOLDER: &str = "{name}";

/// Raw-string tags longer than this are rejected as malformed (the C++
/// grammar caps delimiter tags at 16 characters).
const MAX_TAG_LEN: usize = 16;

/// Marker syntax for locating blocks in a host document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSyntax {
    /// Declaration template; `{name}` is replaced with the block name.
    pub decl_template: String,
    /// When set, a duplicated declaration is an error instead of silently
    /// using the first match.
    pub strict_names: bool,
}

impl Default for BlockSyntax {
    fn default() -> Self {
        Self {
            decl_template: "static const char {name}[] PROGMEM = ".to_string(),
            strict_names: false,
        }
    }
}

impl BlockSyntax {
    /// Create a syntax with a custom declaration template.
    pub fn new(decl_template: impl Into<String>) -> Self {
        Self {
            decl_template: decl_template.into(),
            ..Default::default()
        }
    }

    /// Enable or disable strict duplicate detection.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict_names = strict;
        self
    }

    /// Render the start marker for a concrete block name.
    pub fn start_marker(&self, name: &str) -> String {
        self.decl_template.replace(NAME_PLACEHOLDER, name)
    }

    /// Render the full declaration used when emitting a new block.
    pub fn render_declaration(&self, name: &str, tag: &str, payload: &str) -> String {
        format!("{}R\"{tag}({payload}){tag}\";", self.start_marker(name))
    }

    fn name_regex(&self) -> InlayResult<Regex> {
        let Some(split) = self.decl_template.find(NAME_PLACEHOLDER) else {
            return Err(InlayError::config(format!(
                "declaration template is missing the {} placeholder: {}",
                NAME_PLACEHOLDER, self.decl_template
            )));
        };
        let prefix = &self.decl_template[..split];
        let suffix = &self.decl_template[split + NAME_PLACEHOLDER.len()..];
        let pattern = format!(
            "{}(\\w+){}",
            regex::escape(prefix),
            regex::escape(suffix)
        );
        Regex::new(&pattern).map_err(|e| InlayError::config(e.to_string()))
    }
}

/// One raw-string segment of a block value, as payload byte offsets into the
/// host text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// First payload byte (just past the open delimiter)
    pub start: usize,
    /// One past the last payload byte (the close delimiter's first byte)
    pub end: usize,
}

/// A located block: a named, delimiter-wrapped region of the host text.
///
/// `start`/`end` span the wrapped value, from the first byte of the first
/// open delimiter to one past the last byte of the final close delimiter.
/// The declaration marker stays outside the span, so injection replaces
/// only the wrapped value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Block name from the declaration
    pub name: String,
    /// First byte of the wrapped value
    pub start: usize,
    /// One past the last byte of the wrapped value
    pub end: usize,
    /// Raw-string tag between `R"` and `(`
    pub tag: String,
    /// Payload spans, one per raw-string segment
    pub segments: Vec<Segment>,
}

impl Block {
    /// The literal open delimiter, e.g. `R"HTML(`.
    pub fn open_delim(&self) -> String {
        format!("R\"{}(", self.tag)
    }

    /// The literal close delimiter, e.g. `)HTML"`.
    pub fn close_delim(&self) -> String {
        format!("){}\"", self.tag)
    }

    /// Concatenated payload text of all segments.
    pub fn payload(&self, host: &str) -> String {
        let mut out = String::new();
        for seg in &self.segments {
            out.push_str(&host[seg.start..seg.end]);
        }
        out
    }

    /// Whether the value was stored as more than one raw-string segment.
    pub fn is_chunked(&self) -> bool {
        self.segments.len() > 1
    }
}

/// Locate a named block in the host text.
///
/// Fails with [`InlayError::BlockNotFound`] when the start marker is absent
/// and [`InlayError::MarkerNotFound`] when the wrapper delimiters are absent
/// or malformed. Uses the first matching declaration unless
/// [`BlockSyntax::strict_names`] is set.
pub fn locate(host: &str, syntax: &BlockSyntax, name: &str) -> InlayResult<Block> {
    let marker = syntax.start_marker(name);
    let decl_start = host
        .find(&marker)
        .ok_or_else(|| InlayError::block_not_found(name))?;

    if syntax.strict_names && host[decl_start + marker.len()..].contains(&marker) {
        return Err(InlayError::AmbiguousBlock {
            name: name.to_string(),
        });
    }

    locate_value(host, name, decl_start + marker.len())
}

/// Sweep the whole host text for every block matching the declaration
/// template with any identifier name, in document order.
///
/// Declarations whose wrapper cannot be parsed are skipped, not fatal: the
/// sweep feeds the compaction path, which proceeds with whatever matched.
pub fn locate_all(host: &str, syntax: &BlockSyntax) -> InlayResult<Vec<Block>> {
    let re = syntax.name_regex()?;
    let mut blocks = Vec::new();
    for caps in re.captures_iter(host) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if let Ok(block) = locate_value(host, name.as_str(), whole.end()) {
            blocks.push(block);
        }
    }
    Ok(blocks)
}

/// Parse the wrapped value starting at `from` (just past the start marker).
fn locate_value(host: &str, name: &str, from: usize) -> InlayResult<Block> {
    let (value_start, tag) = scan_open_delim(host, name, from)?;
    let open = format!("R\"{tag}(");
    let close = format!("){tag}\"");

    let mut segments = Vec::new();
    let mut cursor = value_start + open.len();
    loop {
        let rel = host[cursor..]
            .find(&close)
            .ok_or_else(|| InlayError::marker_not_found(name, &close))?;
        segments.push(Segment {
            start: cursor,
            end: cursor + rel,
        });
        let mut after = cursor + rel + close.len();

        // Adjacent same-tag segments continue the block (chunked form).
        let trimmed = host[after..].trim_start();
        let skipped = host[after..].len() - trimmed.len();
        if trimmed.starts_with(&open) {
            after += skipped;
            cursor = after + open.len();
        } else {
            return Ok(Block {
                name: name.to_string(),
                start: value_start,
                end: cursor + rel + close.len(),
                tag,
                segments,
            });
        }
    }
}

/// Scan forward from `from` for the raw-string open delimiter and read its
/// tag. Only whitespace may precede the delimiter.
fn scan_open_delim(host: &str, name: &str, from: usize) -> InlayResult<(usize, String)> {
    let rest = &host[from..];
    let trimmed = rest.trim_start();
    let open_start = from + (rest.len() - trimmed.len());

    let Some(after_intro) = trimmed.strip_prefix("R\"") else {
        return Err(InlayError::marker_not_found(name, "R\""));
    };

    let mut tag = String::new();
    for c in after_intro.chars() {
        if c == '(' {
            return Ok((open_start, tag));
        }
        if !c.is_ascii_alphanumeric() && c != '_' || tag.len() >= MAX_TAG_LEN {
            break;
        }
        tag.push(c);
    }
    Err(InlayError::marker_not_found(name, "R\"...("))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST: &str = concat!(
        "// firmware page table\n",
        "static const char DASHBOARD_HTML[] PROGMEM = R\"HTML(<html><style>.a{}</style></html>)HTML\";\n",
        "static const char LOGIN_HTML[] PROGMEM = R\"HTML(<html>login</html>)HTML\";\n",
    );

    #[test]
    fn test_locate_basic() {
        let syntax = BlockSyntax::default();
        let block = locate(HOST, &syntax, "LOGIN_HTML").unwrap();
        assert_eq!(block.name, "LOGIN_HTML");
        assert_eq!(block.tag, "HTML");
        assert_eq!(block.payload(HOST), "<html>login</html>");
        assert_eq!(&HOST[block.start..block.end], "R\"HTML(<html>login</html>)HTML\"");
    }

    #[test]
    fn test_locate_custom_template() {
        let host = "static const char FOO[] = R\"X(<p>hi</p>)X\";";
        let syntax = BlockSyntax::new("static const char {name}[] = ");
        let block = locate(host, &syntax, "FOO").unwrap();
        assert_eq!(block.tag, "X");
        assert_eq!(block.payload(host), "<p>hi</p>");
    }

    #[test]
    fn test_locate_missing_block() {
        let err = locate(HOST, &BlockSyntax::default(), "MISSING_HTML").unwrap_err();
        assert!(matches!(err, InlayError::BlockNotFound { .. }));
    }

    #[test]
    fn test_locate_missing_close_delim() {
        let host = "static const char A[] PROGMEM = R\"HTML(<p>unterminated";
        let err = locate(host, &BlockSyntax::default(), "A").unwrap_err();
        assert!(matches!(err, InlayError::MarkerNotFound { .. }));
    }

    #[test]
    fn test_locate_missing_open_delim() {
        let host = "static const char A[] PROGMEM = \"plain string\";";
        let err = locate(host, &BlockSyntax::default(), "A").unwrap_err();
        assert!(matches!(err, InlayError::MarkerNotFound { .. }));
    }

    #[test]
    fn test_locate_first_match_wins() {
        let host = "static const char A[] PROGMEM = R\"H(one)H\";\n\
                    static const char A[] PROGMEM = R\"H(two)H\";";
        let block = locate(host, &BlockSyntax::default(), "A").unwrap();
        assert_eq!(block.payload(host), "one");
    }

    #[test]
    fn test_locate_strict_rejects_duplicates() {
        let host = "static const char A[] PROGMEM = R\"H(one)H\";\n\
                    static const char A[] PROGMEM = R\"H(two)H\";";
        let syntax = BlockSyntax::default().strict(true);
        let err = locate(host, &syntax, "A").unwrap_err();
        assert!(matches!(err, InlayError::AmbiguousBlock { .. }));
    }

    #[test]
    fn test_locate_chunked_segments() {
        let host = "static const char PAGE_HTML[] PROGMEM = \
                    R\"HTML(<html>)HTML\" R\"HTML(</html>)HTML\";";
        let block = locate(host, &BlockSyntax::default(), "PAGE_HTML").unwrap();
        assert!(block.is_chunked());
        assert_eq!(block.segments.len(), 2);
        assert_eq!(block.payload(host), "<html></html>");
        assert!(host[block.end..].starts_with(';'));
    }

    #[test]
    fn test_chunked_stops_at_different_tag() {
        let host = "static const char A[] PROGMEM = R\"H(x)H\" R\"CSS(y)CSS\";";
        let block = locate(host, &BlockSyntax::default(), "A").unwrap();
        assert_eq!(block.segments.len(), 1);
        assert_eq!(block.payload(host), "x");
    }

    #[test]
    fn test_locate_all_in_document_order() {
        let syntax = BlockSyntax::default();
        let blocks = locate_all(HOST, &syntax).unwrap();
        let names: Vec<_> = blocks.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["DASHBOARD_HTML", "LOGIN_HTML"]);
    }

    #[test]
    fn test_locate_all_skips_malformed() {
        let host = "static const char GOOD[] PROGMEM = R\"H(ok)H\";\n\
                    static const char BAD[] PROGMEM = \"not raw\";\n";
        let blocks = locate_all(host, &BlockSyntax::default()).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name, "GOOD");
    }

    #[test]
    fn test_template_without_placeholder_is_config_error() {
        let syntax = BlockSyntax::new("static const char [] = ");
        let err = locate_all(HOST, &syntax).unwrap_err();
        assert!(matches!(err, InlayError::Config(_)));
    }

    #[test]
    fn test_render_declaration() {
        let syntax = BlockSyntax::default();
        assert_eq!(
            syntax.render_declaration("STYLE_CSS", "CSS", ".a{}"),
            "static const char STYLE_CSS[] PROGMEM = R\"CSS(.a{})CSS\";"
        );
    }
}
