//! Tool configuration
//!
//! Everything the CLI needs to run against a host file: where the host and
//! asset files live, the block marker syntax, and the compaction options.
//! Loaded from an `Inlay.toml` next to the host file (or passed explicitly);
//! every field has a default matching the firmware sketches this tool grew
//! up on.

use crate::compact::CompactConfig;
use crate::diagnostics::{InlayError, InlayResult};
use crate::locator::BlockSyntax;
use crate::rename::RenameMapping;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE: &str = "Inlay.toml";

/// Tool configuration, usually loaded from [`CONFIG_FILE`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InlayConfig {
    /// Host source file containing the blocks
    pub host: PathBuf,
    /// Directory extracted asset files are written to
    pub asset_dir: PathBuf,
    /// Declaration template; `{name}` is replaced with the block name
    pub decl_template: String,
    /// Treat duplicate block declarations as errors
    pub strict_names: bool,
    /// Chunk size for re-wrapped payloads; 0 disables chunking
    pub chunk_size: usize,
    /// Block names whose style rules win dedup ties, highest first
    pub priority: Vec<String>,
    /// Whether compaction consolidates inline stylesheets
    pub dedupe_styles: bool,
    /// Href the rewritten pages link the shared stylesheet from
    pub stylesheet_href: String,
    /// Name of the emitted master stylesheet block
    pub stylesheet_block: String,
    /// Raw-string tag for the master stylesheet block
    pub stylesheet_tag: String,
    /// Optional JSON file overriding the built-in rename vocabulary
    pub rename_table: Option<PathBuf>,
}

impl Default for InlayConfig {
    fn default() -> Self {
        let compact = CompactConfig::default();
        let syntax = BlockSyntax::default();
        Self {
            host: PathBuf::from("firmware.ino"),
            asset_dir: PathBuf::from("assets"),
            decl_template: syntax.decl_template,
            strict_names: false,
            chunk_size: 8000,
            priority: compact.priority,
            dedupe_styles: true,
            stylesheet_href: compact.stylesheet_href,
            stylesheet_block: compact.stylesheet_block,
            stylesheet_tag: compact.stylesheet_tag,
            rename_table: None,
        }
    }
}

impl InlayConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> InlayResult<Self> {
        toml::from_str(text).map_err(|e| InlayError::config(e.to_string()))
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> InlayResult<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Look for [`CONFIG_FILE`] in `dir`; fall back to defaults when absent.
    pub fn discover(dir: impl AsRef<Path>) -> InlayResult<Self> {
        let candidate = dir.as_ref().join(CONFIG_FILE);
        if candidate.exists() {
            Self::load(candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// The block marker syntax this configuration describes.
    pub fn syntax(&self) -> BlockSyntax {
        BlockSyntax::new(&self.decl_template).strict(self.strict_names)
    }

    /// Effective chunk size (`None` when chunking is disabled).
    pub fn effective_chunk_size(&self) -> Option<usize> {
        if self.chunk_size == 0 {
            None
        } else {
            Some(self.chunk_size)
        }
    }

    /// The rename table: the configured JSON file, or the built-in
    /// vocabulary. The table is validated before use.
    pub fn mapping(&self) -> InlayResult<RenameMapping> {
        let mapping = match &self.rename_table {
            Some(path) => RenameMapping::load(path)?,
            None => RenameMapping::default_vocabulary(),
        };
        mapping.validate()?;
        Ok(mapping)
    }

    /// Path an extracted asset is written to for a given block name, by
    /// convention: the lowercased block name with an `.html` extension.
    pub fn asset_path(&self, block_name: &str) -> PathBuf {
        self.asset_dir
            .join(format!("{}.html", block_name.to_lowercase()))
    }

    /// Build the compaction configuration.
    pub fn compact_config(&self) -> InlayResult<CompactConfig> {
        Ok(CompactConfig {
            syntax: self.syntax(),
            dedupe_styles: self.dedupe_styles,
            minify_pages: true,
            priority: self.priority.clone(),
            stylesheet_href: self.stylesheet_href.clone(),
            stylesheet_block: self.stylesheet_block.clone(),
            stylesheet_tag: self.stylesheet_tag.clone(),
            chunk_size: self.effective_chunk_size(),
            mapping: self.mapping()?,
        })
    }
}
