//! inlay CLI entry point
//!
//! Thin command dispatcher over the `inlay` engine: extract and inject
//! block payloads, run the compaction pipeline, and small host-file
//! maintenance. Each command module parses its own arguments.

mod asset;
mod compact;

use anyhow::{bail, Context, Result};
use inlay::InlayConfig;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<()> {
    let Some((cmd, rest)) = args.split_first() else {
        usage();
        bail!("missing command");
    };

    match cmd.as_str() {
        "extract" => asset::run_extract(rest),
        "inject" => asset::run_inject(rest),
        "compact" => compact::run_compact(rest),
        "dedupe" => compact::run_dedupe(rest),
        "fix-bom" => compact::run_fix_bom(rest),
        "help" | "--help" | "-h" => {
            match rest.first().map(String::as_str) {
                Some("extract") | Some("inject") => asset::usage(),
                Some("compact") | Some("dedupe") | Some("fix-bom") => compact::usage(),
                _ => usage(),
            }
            Ok(())
        }
        "version" | "--version" | "-V" => {
            println!("inlay {}", inlay::VERSION);
            Ok(())
        }
        other => {
            usage();
            bail!("unknown command: {}", other)
        }
    }
}

/// Resolve the tool configuration: an explicit `--config` file, or
/// `Inlay.toml` discovered in the working directory, or defaults. Command
/// line overrides are applied on top.
pub(crate) fn resolve_config(
    config_path: &Option<PathBuf>,
    host_override: &Option<PathBuf>,
    strict: bool,
) -> Result<InlayConfig> {
    let mut config = match config_path {
        Some(path) => InlayConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => InlayConfig::discover(".").context("failed to read Inlay.toml")?,
    };
    if let Some(host) = host_override {
        config.host = host.clone();
    }
    if strict {
        config.strict_names = true;
    }
    Ok(config)
}

/// Print top-level usage.
fn usage() {
    eprintln!("inlay <command> [options]");
    eprintln!();
    eprintln!("Manage web assets embedded as raw-string blocks in a host source file.");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  extract <blockName>      Write a block's payload to an asset file");
    eprintln!("  inject <blockName>       Splice an edited asset file back into the host");
    eprintln!("  compact                  Dedupe styles, rename keys, minify all blocks");
    eprintln!("  dedupe                   Consolidate inline styles only (no minification)");
    eprintln!("  fix-bom                  Strip a leading byte-order mark from the host");
    eprintln!("  help                     Show this help");
    eprintln!("  version                  Show the version");
    eprintln!();
    eprintln!("Common options:");
    eprintln!("  --host <file>            Host source file (default: from Inlay.toml)");
    eprintln!("  --config <file>          Configuration file (default: ./Inlay.toml)");
    eprintln!("  --strict                 Fail on duplicate block declarations");
}
