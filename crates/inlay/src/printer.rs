//! Terminal report printer
//!
//! Renders a [`CompactReport`] for terminal output: one line per block with
//! before/after payload sizes, plus the master stylesheet line and totals.

use crate::compact::{BlockSavings, CompactReport};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Terminal printer for compaction reports.
pub struct ReportPrinter<'a> {
    /// Report to print
    report: &'a CompactReport,
    /// Whether to use colored output
    use_color: bool,
}

impl<'a> ReportPrinter<'a> {
    /// Create a new printer.
    pub fn new(report: &'a CompactReport, use_color: bool) -> Self {
        Self { report, use_color }
    }

    /// Print directly to stdout, with colors when enabled and supported.
    pub fn print_to_stdout(&self) {
        let choice = if self.use_color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        let mut stdout = StandardStream::stdout(choice);
        if let Err(e) = self.write_colored(&mut stdout) {
            eprintln!("Error printing report: {}", e);
        }
    }

    /// Write the report to a WriteColor implementor.
    fn write_colored<W: WriteColor>(&self, w: &mut W) -> io::Result<()> {
        for block in &self.report.blocks {
            w.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
            write!(w, "{:<28}", block.name)?;
            w.reset()?;
            write!(w, " {:>7} -> {:>7} bytes", block.before, block.after)?;

            if block.saved() > 0 {
                w.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
                write!(w, "  (-{})", block.saved())?;
                w.reset()?;
            }
            writeln!(w)?;
        }

        if self.report.master_rules > 0 {
            w.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
            write!(w, "{:<28}", "master stylesheet")?;
            w.reset()?;
            writeln!(
                w,
                " {:>7} bytes, {} rules",
                self.report.master_bytes, self.report.master_rules
            )?;
        }

        w.set_color(ColorSpec::new().set_bold(true))?;
        writeln!(
            w,
            "total: {} -> {} bytes",
            self.report.total_before(),
            self.report.total_after()
        )?;
        w.reset()
    }

    fn format_plain(&self, f: &mut Formatter<'_>) -> FmtResult {
        for block in &self.report.blocks {
            write!(
                f,
                "{:<28} {:>7} -> {:>7} bytes",
                block.name, block.before, block.after
            )?;
            if block.saved() > 0 {
                write!(f, "  (-{})", block.saved())?;
            }
            writeln!(f)?;
        }

        if self.report.master_rules > 0 {
            writeln!(
                f,
                "{:<28} {:>7} bytes, {} rules",
                "master stylesheet", self.report.master_bytes, self.report.master_rules
            )?;
        }

        writeln!(
            f,
            "total: {} -> {} bytes",
            self.report.total_before(),
            self.report.total_after()
        )
    }
}

impl Display for ReportPrinter<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        self.format_plain(f)
    }
}

/// Convenience: render a single block's savings as a plain line.
pub fn savings_line(block: &BlockSavings) -> String {
    format!(
        "{}: {} -> {} bytes (-{})",
        block.name,
        block.before,
        block.after,
        block.saved()
    )
}
