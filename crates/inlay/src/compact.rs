//! Compaction pipeline orchestrator
//!
//! The [`Compactor`] coordinates the full compaction pass over a host
//! document: sweep the blocks, consolidate their stylesheets into one
//! shared master block, rename and minify each page's payload, and splice
//! everything back. Non-fatal conditions (a page without a style region, a
//! sweep that finds nothing) are downgraded to diagnostics; only IO and
//! marker failures abort.

use crate::diagnostics::{Diagnostic, DiagnosticsCollector, InlayResult};
use crate::host::HostDocument;
use crate::locator::{locate, locate_all, BlockSyntax};
use crate::minify::{minify_markup, minify_script, minify_stylesheet};
use crate::rename::RenameMapping;
use crate::splice;
use crate::styles::{extract_stylesheet, link_stylesheet, style_region, StyleDeduplicator};

/// Script region markers inside a markup payload.
const SCRIPT_OPEN: &str = "<script>";
const SCRIPT_CLOSE: &str = "</script>";

/// Configuration for a compaction run.
#[derive(Debug, Clone)]
pub struct CompactConfig {
    /// Block marker syntax
    pub syntax: BlockSyntax,
    /// Whether to consolidate inline stylesheets into a master block
    pub dedupe_styles: bool,
    /// Whether to minify page payloads
    pub minify_pages: bool,
    /// Block names whose style rules win ties, in descending priority
    pub priority: Vec<String>,
    /// Href the rewritten pages link the shared stylesheet from
    pub stylesheet_href: String,
    /// Name of the emitted master stylesheet block
    pub stylesheet_block: String,
    /// Raw-string tag for the master stylesheet block
    pub stylesheet_tag: String,
    /// Chunk size for re-wrapped payloads (None disables chunking)
    pub chunk_size: Option<usize>,
    /// Key-shortening table applied to script payloads
    pub mapping: RenameMapping,
}

impl Default for CompactConfig {
    fn default() -> Self {
        Self {
            syntax: BlockSyntax::default(),
            dedupe_styles: true,
            minify_pages: true,
            priority: vec![
                "CLIENT_CONSOLE_HTML".to_string(),
                "DASHBOARD_HTML".to_string(),
                "CONTACTS_MANAGER_HTML".to_string(),
                "SERVER_SETTINGS_HTML".to_string(),
                "HISTORICAL_DATA_HTML".to_string(),
            ],
            stylesheet_href: "/style.css".to_string(),
            stylesheet_block: "STYLE_CSS".to_string(),
            stylesheet_tag: "CSS".to_string(),
            chunk_size: Some(8000),
            mapping: RenameMapping::default_vocabulary(),
        }
    }
}

/// Byte savings for one block.
#[derive(Debug, Clone)]
pub struct BlockSavings {
    /// Block name
    pub name: String,
    /// Payload bytes before compaction
    pub before: usize,
    /// Payload bytes after compaction
    pub after: usize,
}

impl BlockSavings {
    /// Bytes saved (zero when the payload grew).
    pub fn saved(&self) -> usize {
        self.before.saturating_sub(self.after)
    }
}

/// Result of a compaction run.
#[derive(Debug, Clone, Default)]
pub struct CompactReport {
    /// Per-block payload savings, in document order
    pub blocks: Vec<BlockSavings>,
    /// Unique rules collected into the master stylesheet (0 if dedup was
    /// off or found nothing)
    pub master_rules: usize,
    /// Bytes of the emitted master stylesheet payload
    pub master_bytes: usize,
}

impl CompactReport {
    /// Total payload bytes before compaction.
    pub fn total_before(&self) -> usize {
        self.blocks.iter().map(|b| b.before).sum()
    }

    /// Total payload bytes after compaction, including the master block.
    pub fn total_after(&self) -> usize {
        self.blocks.iter().map(|b| b.after).sum::<usize>() + self.master_bytes
    }

    /// Whether anything changed.
    pub fn has_changes(&self) -> bool {
        self.master_rules > 0 || self.blocks.iter().any(|b| b.before != b.after)
    }
}

/// Compact a single page payload: minify its style and script regions with
/// the dedicated passes, apply the rename table to the script, then minify
/// the reassembled markup as a whole.
pub fn compact_page(page: &str, mapping: &RenameMapping) -> String {
    let mut out = page.to_string();

    if let Some((start, end)) = style_region(&out) {
        let minified = minify_stylesheet(&out[start..end]);
        out.replace_range(start..end, &minified);
    }

    if let Some((start, end)) = script_region(&out) {
        let compacted = minify_script(&mapping.apply(&out[start..end]));
        out.replace_range(start..end, &compacted);
    }

    minify_markup(&out)
}

/// Find the inner span of the first `<script>` region in a markup payload.
fn script_region(page: &str) -> Option<(usize, usize)> {
    let open = page.find(SCRIPT_OPEN)?;
    let inner_start = open + SCRIPT_OPEN.len();
    let inner_end = inner_start + page[inner_start..].find(SCRIPT_CLOSE)?;
    Some((inner_start, inner_end))
}

/// The compaction pipeline.
///
/// Runs dedup and per-page compaction over a [`HostDocument`] according to
/// its [`CompactConfig`], collecting diagnostics along the way:
/// 1. Sweep the document for blocks
/// 2. Consolidate inline stylesheets into the master block
/// 3. Rename and minify each page payload
/// 4. Splice results back into the document
pub struct Compactor {
    /// Configuration
    config: CompactConfig,
    /// Diagnostics collector
    diagnostics: DiagnosticsCollector,
}

impl Compactor {
    /// Create a new compactor with the given configuration.
    pub fn new(config: CompactConfig) -> Self {
        Self {
            config,
            diagnostics: DiagnosticsCollector::new(),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &CompactConfig {
        &self.config
    }

    /// Get the diagnostics collector.
    pub fn diagnostics(&self) -> &DiagnosticsCollector {
        &self.diagnostics
    }

    /// Run the compaction pipeline over a document.
    ///
    /// The document is mutated in memory; saving is the caller's decision.
    pub fn run(&mut self, doc: &mut HostDocument) -> InlayResult<CompactReport> {
        let mut report = CompactReport::default();

        // Step 1: sweep the document for blocks.
        let blocks = locate_all(doc.text(), &self.config.syntax)?;
        let mut pages: Vec<(String, String)> = blocks
            .iter()
            .filter(|b| b.name != self.config.stylesheet_block)
            .map(|b| (b.name.clone(), b.payload(doc.text())))
            .collect();

        if pages.is_empty() {
            self.diagnostics.warning("no blocks matched the declaration template");
            return Ok(report);
        }
        self.diagnostics
            .info(format!("located {} blocks", pages.len()));
        let original_sizes: Vec<(String, usize)> = pages
            .iter()
            .map(|(name, payload)| (name.clone(), payload.len()))
            .collect();

        // Step 2: consolidate inline stylesheets into the master block.
        if self.config.dedupe_styles {
            self.dedupe_styles(doc, &mut pages, &mut report)?;
        }

        // Step 3: rename and minify each page payload.
        if self.config.minify_pages {
            for (_, payload) in &mut pages {
                *payload = compact_page(payload, &self.config.mapping);
            }
        }

        // Step 4: splice the new payloads back, block by block. Injection
        // re-locates by name, so earlier splices shifting offsets is fine.
        for (name, payload) in &pages {
            let new_text = splice::inject(
                doc.text(),
                &self.config.syntax,
                name,
                payload,
                self.config.chunk_size,
            )?;
            doc.set_text(new_text);
            let before = original_sizes
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, size)| *size)
                .unwrap_or(0);
            report.blocks.push(BlockSavings {
                name: name.clone(),
                before,
                after: payload.len(),
            });
        }

        Ok(report)
    }

    /// Build the master stylesheet from the pages' inline style regions,
    /// rewrite each page to link it, and emit it as a block.
    fn dedupe_styles(
        &mut self,
        doc: &mut HostDocument,
        pages: &mut [(String, String)],
        report: &mut CompactReport,
    ) -> InlayResult<()> {
        let mut sheets: Vec<(String, String)> = Vec::new();
        for (name, payload) in pages.iter() {
            match extract_stylesheet(payload) {
                Some(css) => sheets.push((name.clone(), css.to_string())),
                None => {
                    self.diagnostics.add(
                        Diagnostic::warning("no inline style region, skipped")
                            .in_block(name.clone()),
                    );
                }
            }
        }

        if sheets.is_empty() {
            self.diagnostics
                .warning("no inline stylesheets found; master stylesheet left untouched");
            return Ok(());
        }

        let dedup = StyleDeduplicator::new(self.config.priority.clone());
        let master = dedup.dedupe(&sheets);
        let master_css = master.to_css();
        report.master_rules = master.len();
        report.master_bytes = master_css.len();

        // Rewrite each page that had an inline region to link the shared
        // stylesheet instead.
        for (_, payload) in pages.iter_mut() {
            if let Some(linked) = link_stylesheet(payload, &self.config.stylesheet_href) {
                *payload = linked;
            }
        }

        self.emit_master_block(doc, &master_css)
    }

    /// Write the master stylesheet into the document: refresh the block when
    /// it already exists, otherwise insert its declaration before the first
    /// located block.
    fn emit_master_block(&mut self, doc: &mut HostDocument, master_css: &str) -> InlayResult<()> {
        let name = self.config.stylesheet_block.clone();

        if locate(doc.text(), &self.config.syntax, &name).is_ok() {
            let new_text =
                splice::inject(doc.text(), &self.config.syntax, &name, master_css, None)?;
            doc.set_text(new_text);
            self.diagnostics.info("refreshed master stylesheet block");
            return Ok(());
        }

        let declaration = format!(
            "{}\n\n",
            self.config
                .syntax
                .render_declaration(&name, &self.config.stylesheet_tag, master_css)
        );

        // Insert before the first located block's declaration.
        let blocks = locate_all(doc.text(), &self.config.syntax)?;
        let insert_at = blocks
            .first()
            .and_then(|b| {
                let marker = self.config.syntax.start_marker(&b.name);
                doc.text()[..b.start].rfind(&marker)
            })
            .unwrap_or(0);

        let mut text = doc.text().to_string();
        text.insert_str(insert_at, &declaration);
        doc.set_text(text);
        self.diagnostics.info("inserted master stylesheet block");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn host_with_two_pages() -> String {
        concat!(
            "// pages\n",
            "static const char DASHBOARD_HTML[] PROGMEM = R\"HTML(",
            "<html><head><style>.a { color: red; }</style></head>",
            "<body>  <p>dash</p>  ",
            "<script>els.serverUid.textContent = data.serverUid; // uid\n</script>",
            "</body></html>)HTML\";\n",
            "static const char LOGIN_HTML[] PROGMEM = R\"HTML(",
            "<html><head><style>.a { color: red; } .b { margin: 0; }</style></head>",
            "<body><p>login</p></body></html>)HTML\";\n",
        )
        .to_string()
    }

    #[test]
    fn test_compact_page_rename_before_minify() {
        let mapping = RenameMapping::default_vocabulary();
        let page = "<script>els.x.textContent = data.serverUid || '--';</script>";
        let out = compact_page(page, &mapping);
        assert!(out.contains("data.si"));
        assert!(!out.contains("serverUid"));
    }

    #[test]
    fn test_compact_page_without_regions() {
        let mapping = RenameMapping::new();
        assert_eq!(compact_page("<p>  plain  </p>", &mapping), "<p> plain </p>");
    }

    #[test]
    fn test_run_dedupes_and_links() {
        let mut doc = HostDocument::from_text("mem.ino", host_with_two_pages());
        let mut compactor = Compactor::new(CompactConfig {
            minify_pages: false,
            chunk_size: None,
            ..Default::default()
        });

        let report = compactor.run(&mut doc).unwrap();
        assert_eq!(report.master_rules, 2);

        // Master block exists and carries both rules, dashboard first. The
        // brace splitter trims fragments, so the space before each closing
        // brace is gone.
        let syntax = BlockSyntax::default();
        let master = splice::extract(doc.text(), &syntax, "STYLE_CSS").unwrap();
        assert_eq!(master, ".a { color: red;}\n.b { margin: 0;}");

        // Pages now link the shared stylesheet.
        let dash = splice::extract(doc.text(), &syntax, "DASHBOARD_HTML").unwrap();
        assert!(dash.contains("<link rel=\"stylesheet\" href=\"/style.css\">"));
        assert!(!dash.contains("<style>"));
    }

    #[test]
    fn test_run_full_compaction() {
        let mut doc = HostDocument::from_text("mem.ino", host_with_two_pages());
        let mut compactor = Compactor::new(CompactConfig {
            chunk_size: None,
            ..Default::default()
        });

        let report = compactor.run(&mut doc).unwrap();
        assert!(report.has_changes());
        assert!(report.total_after() < report.total_before() + report.master_bytes);

        let syntax = BlockSyntax::default();
        let dash = splice::extract(doc.text(), &syntax, "DASHBOARD_HTML").unwrap();
        // Renamed (data key only, the DOM reference keeps its name),
        // minified, comment stripped.
        assert!(dash.contains("data.si"));
        assert!(!dash.contains("data.serverUid"));
        assert!(!dash.contains("// uid"));
        assert!(dash.contains("<body><p>dash</p>"));
    }

    #[test]
    fn test_run_twice_is_stable() {
        let mut doc = HostDocument::from_text("mem.ino", host_with_two_pages());
        let mut compactor = Compactor::new(CompactConfig {
            chunk_size: None,
            ..Default::default()
        });
        compactor.run(&mut doc).unwrap();
        let first = doc.text().to_string();

        // A second run finds no inline styles (pages already link the
        // master) and must not clobber the master block or the pages.
        let mut compactor = Compactor::new(CompactConfig {
            chunk_size: None,
            ..Default::default()
        });
        compactor.run(&mut doc).unwrap();
        assert_eq!(doc.text(), first);
    }

    #[test]
    fn test_run_on_empty_host() {
        let mut doc = HostDocument::from_text("mem.ino", "int main() {}\n");
        let mut compactor = Compactor::new(CompactConfig::default());
        let report = compactor.run(&mut doc).unwrap();
        assert!(report.blocks.is_empty());
        assert!(!report.has_changes());
        assert_eq!(doc.text(), "int main() {}\n");
    }
}
