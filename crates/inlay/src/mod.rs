//! inlay: embedded web-asset block engine
//!
//! This crate manages web-asset text (markup, stylesheets, scripts) that
//! lives as raw-string blocks inside a larger host source file, typically a
//! firmware sketch serving its UI from flash:
//! - Locating a named block by its declaration marker and raw-string
//!   delimiters
//! - Extracting the payload to a standalone asset file for editing
//! - Re-injecting an edited payload at the exact same location
//! - Consolidating repeated style rules from many pages into one shared
//!   stylesheet block
//! - Minifying markup/stylesheet/script payloads and shortening a known
//!   vocabulary of property keys to fit constrained flash storage
//!
//! # Architecture
//!
//! ```text
//!              ┌──────────────┐
//!              │ HostDocument │
//!              └──────┬───────┘
//!                     ▼
//!              ┌──────────────┐
//!              │   locator    │
//!              └──────┬───────┘
//!          ┌──────────┴──────────┐
//!          ▼                     ▼
//!    ┌──────────┐         ┌───────────────┐
//!    │  splice  │         │   Compactor   │
//!    │ extract/ │         │ styles/rename/│
//!    │  inject  │         │    minify     │
//!    └──────────┘         └───────────────┘
//! ```
//!
//! The host text is opaque: blocks are found by literal marker search, not
//! by parsing the host language. See the `locator` and `styles` modules for
//! the documented limits of that approach.
//!
//! # Usage
//!
//! ```no_run
//! use inlay::{splice, BlockSyntax, HostDocument};
//!
//! let mut doc = HostDocument::load("firmware.ino").unwrap();
//! let syntax = BlockSyntax::default();
//! let payload = splice::extract(doc.text(), &syntax, "DASHBOARD_HTML").unwrap();
//! let edited = payload.replace("v1", "v2");
//! let new_text = splice::inject(doc.text(), &syntax, "DASHBOARD_HTML", &edited, None).unwrap();
//! doc.set_text(new_text);
//! doc.save().unwrap();
//! ```

// Core types
pub mod diagnostics;
pub mod host;
pub mod locator;

// Round-trip path
pub mod splice;

// Compaction path
pub mod compact;
pub mod minify;
pub mod rename;
pub mod styles;

// Configuration and output
pub mod config;
pub mod printer;

// Re-exports for convenience
pub use compact::{BlockSavings, CompactConfig, CompactReport, Compactor};
pub use config::{InlayConfig, CONFIG_FILE};
pub use diagnostics::{Diagnostic, DiagnosticSeverity, DiagnosticsCollector};
pub use diagnostics::{InlayError, InlayResult};
pub use host::HostDocument;
pub use locator::{locate, locate_all, Block, BlockSyntax, Segment};
pub use minify::{minify_markup, minify_script, minify_stylesheet};
pub use printer::ReportPrinter;
pub use rename::RenameMapping;
pub use splice::{extract, inject, rewrap};
pub use styles::{MasterStylesheet, StyleDeduplicator, StyleRule};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
