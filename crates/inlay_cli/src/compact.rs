//! Compaction pipeline commands
//!
//! `inlay compact` runs the full pipeline (style dedup, key renaming,
//! minification) over every block in the host file; `inlay dedupe` stops
//! after style consolidation; `inlay fix-bom` strips a stray byte-order
//! mark left by an editor.

use anyhow::{bail, Context, Result};
use inlay::{Compactor, HostDocument, ReportPrinter};
use std::path::PathBuf;

/// Options for the pipeline commands.
struct CompactCommand {
    /// Host file override
    host: Option<PathBuf>,
    /// Configuration file
    config: Option<PathBuf>,
    /// Fail on duplicate block declarations
    strict: bool,
    /// Skip the style dedup stage
    no_dedup: bool,
    /// Parse only, do not write the host file
    dry_run: bool,
}

impl CompactCommand {
    fn parse(args: &[String]) -> Result<Self> {
        let mut cmd = CompactCommand {
            host: None,
            config: None,
            strict: false,
            no_dedup: false,
            dry_run: false,
        };

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--host" => {
                    if i + 1 < args.len() {
                        cmd.host = Some(PathBuf::from(&args[i + 1]));
                        i += 2;
                    } else {
                        bail!("--host requires a value");
                    }
                }
                "--config" => {
                    if i + 1 < args.len() {
                        cmd.config = Some(PathBuf::from(&args[i + 1]));
                        i += 2;
                    } else {
                        bail!("--config requires a value");
                    }
                }
                "--strict" => {
                    cmd.strict = true;
                    i += 1;
                }
                "--no-dedup" => {
                    cmd.no_dedup = true;
                    i += 1;
                }
                "--dry-run" => {
                    cmd.dry_run = true;
                    i += 1;
                }
                _ => {
                    bail!("unknown flag: {}", args[i]);
                }
            }
        }
        Ok(cmd)
    }
}

/// Run the full compaction pipeline.
pub fn run_compact(args: &[String]) -> Result<()> {
    let cmd = CompactCommand::parse(args)?;
    run_pipeline(&cmd, true)
}

/// Run style dedup only.
pub fn run_dedupe(args: &[String]) -> Result<()> {
    let cmd = CompactCommand::parse(args)?;
    if cmd.no_dedup {
        bail!("--no-dedup makes no sense for the dedupe command");
    }
    run_pipeline(&cmd, false)
}

fn run_pipeline(cmd: &CompactCommand, minify: bool) -> Result<()> {
    let config = crate::resolve_config(&cmd.config, &cmd.host, cmd.strict)?;

    let mut compact_config = config.compact_config()?;
    compact_config.minify_pages = minify;
    if cmd.no_dedup {
        compact_config.dedupe_styles = false;
    }

    let mut doc = HostDocument::load(&config.host)
        .with_context(|| format!("failed to read host file {}", config.host.display()))?;

    let mut compactor = Compactor::new(compact_config);
    let report = compactor.run(&mut doc).context("compaction failed")?;
    compactor.diagnostics().print();

    ReportPrinter::new(&report, true).print_to_stdout();

    if cmd.dry_run {
        println!("dry run: {} not written", config.host.display());
    } else if doc.save()? {
        println!("  ✓ wrote {}", config.host.display());
    } else {
        println!("  = {} unchanged", config.host.display());
    }
    Ok(())
}

/// Strip a leading byte-order mark from the host file.
pub fn run_fix_bom(args: &[String]) -> Result<()> {
    let cmd = CompactCommand::parse(args)?;
    let config = crate::resolve_config(&cmd.config, &cmd.host, cmd.strict)?;

    let mut doc = HostDocument::load(&config.host)
        .with_context(|| format!("failed to read host file {}", config.host.display()))?;

    if doc.strip_bom() {
        if cmd.dry_run {
            println!("dry run: byte-order mark found, {} not written", config.host.display());
        } else {
            doc.save()?;
            println!("  ✓ removed byte-order mark from {}", config.host.display());
        }
    } else {
        println!("  = no byte-order mark in {}", config.host.display());
    }
    Ok(())
}

/// Print pipeline command usage.
pub fn usage() {
    eprintln!("inlay compact [--host <file>] [--no-dedup] [--dry-run]");
    eprintln!("inlay dedupe [--host <file>] [--dry-run]");
    eprintln!("inlay fix-bom [--host <file>]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --host <file>      Host source file (default: from Inlay.toml)");
    eprintln!("  --config <file>    Configuration file (default: ./Inlay.toml)");
    eprintln!("  --no-dedup         Skip style consolidation (compact only)");
    eprintln!("  --dry-run          Report, but do not write the host file");
    eprintln!("  --strict           Fail on duplicate block declarations");
}
