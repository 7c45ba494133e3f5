//! Host document ownership and write-back
//!
//! The host file is read once, transformed in memory by whole-range
//! replacement, and written back in a single whole-file write. The document
//! remembers the text it was loaded with so an unchanged transform skips the
//! write entirely.

use crate::diagnostics::InlayResult;
use std::fs;
use std::path::{Path, PathBuf};

/// UTF-8 byte-order mark, as it appears at the start of a decoded string.
const BOM: char = '\u{feff}';

/// An in-memory host source file with located-range editing.
///
/// The document is the only owner of the host text for the duration of one
/// invocation. All mutation goes through [`HostDocument::replace_range`];
/// nothing edits the text in place character by character.
#[derive(Debug, Clone)]
pub struct HostDocument {
    /// Path the text was loaded from (and will be saved to)
    path: PathBuf,
    /// Text as read at load time, for no-op detection
    original: String,
    /// Current working text
    text: String,
}

impl HostDocument {
    /// Load a host document from disk.
    pub fn load(path: impl Into<PathBuf>) -> InlayResult<Self> {
        let path = path.into();
        let text = fs::read_to_string(&path)?;
        Ok(Self {
            path,
            original: text.clone(),
            text,
        })
    }

    /// Create a document from a string, for callers that already hold the
    /// text. Saving writes to `path` like a loaded document.
    pub fn from_text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            path: path.into(),
            original: text.clone(),
            text,
        }
    }

    /// Path this document was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current working text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the working text differs from what was loaded.
    pub fn is_dirty(&self) -> bool {
        self.text != self.original
    }

    /// Replace the byte range `[start, end)` with `replacement`.
    ///
    /// Offsets must lie on character boundaries of the current text; they
    /// come from the locator, which only produces boundary offsets.
    pub fn replace_range(&mut self, start: usize, end: usize, replacement: &str) {
        self.text.replace_range(start..end, replacement);
    }

    /// Replace the entire working text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Strip a leading UTF-8 byte-order mark from the working text.
    ///
    /// Returns true if a mark was removed. Loading never does this
    /// implicitly: an untouched document must round-trip byte-identically.
    pub fn strip_bom(&mut self) -> bool {
        if self.text.starts_with(BOM) {
            self.text.drain(..BOM.len_utf8());
            true
        } else {
            false
        }
    }

    /// Write the document back to its path.
    ///
    /// The write happens only when the working text differs from the text
    /// read at load time, and is a single whole-file write. Returns true if
    /// a write occurred.
    pub fn save(&mut self) -> InlayResult<bool> {
        if !self.is_dirty() {
            return Ok(false);
        }
        fs::write(&self.path, &self.text)?;
        self.original = self.text.clone();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_and_save_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("host.ino");
        fs::write(&path, "int main() {}\n").unwrap();

        let mut doc = HostDocument::load(&path).unwrap();
        assert_eq!(doc.text(), "int main() {}\n");
        assert!(!doc.is_dirty());

        // Unchanged text is a no-op save.
        assert!(!doc.save().unwrap());

        doc.replace_range(4, 8, "loop");
        assert!(doc.is_dirty());
        assert!(doc.save().unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "int loop() {}\n");

        // Saved state resets the dirty flag.
        assert!(!doc.is_dirty());
        assert!(!doc.save().unwrap());
    }

    #[test]
    fn test_replace_range_preserves_surroundings() {
        let mut doc = HostDocument::from_text("mem.ino", "aaaXXXbbb");
        doc.replace_range(3, 6, "Y");
        assert_eq!(doc.text(), "aaaYbbb");
    }

    #[test]
    fn test_strip_bom() {
        let mut doc = HostDocument::from_text("mem.ino", "\u{feff}static const char");
        assert!(doc.strip_bom());
        assert_eq!(doc.text(), "static const char");
        // Second strip is a no-op.
        assert!(!doc.strip_bom());
    }

    #[test]
    fn test_strip_bom_without_bom() {
        let mut doc = HostDocument::from_text("mem.ino", "static const char");
        assert!(!doc.strip_bom());
        assert!(!doc.is_dirty());
    }

    #[test]
    fn test_save_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("host.ino");
        let mut doc = HostDocument::from_text(&path, "x");
        doc.set_text("y");
        assert!(doc.save().is_err());
    }
}
