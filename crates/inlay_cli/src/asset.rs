//! Asset round-trip commands
//!
//! `inlay extract` writes a located block's payload to a standalone asset
//! file for editing; `inlay inject` splices the edited file back into the
//! host at the exact same location. The asset-file-to-block mapping is a
//! filename convention unless overridden.

use anyhow::{bail, Context, Result};
use inlay::{splice, HostDocument};
use std::fs;
use std::path::PathBuf;

/// Shared options for the extract/inject commands.
struct AssetCommand {
    /// Block name to operate on
    name: String,
    /// Host file override
    host: Option<PathBuf>,
    /// Asset file override
    asset: Option<PathBuf>,
    /// Configuration file
    config: Option<PathBuf>,
    /// Fail on duplicate declarations
    strict: bool,
}

impl AssetCommand {
    fn parse(args: &[String], asset_flag: &str) -> Result<Self> {
        let mut cmd = AssetCommand {
            name: String::new(),
            host: None,
            asset: None,
            config: None,
            strict: false,
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
                flag if flag == asset_flag => {
                    if i + 1 < args.len() {
                        cmd.asset = Some(PathBuf::from(&args[i + 1]));
                        i += 2;
                    } else {
                        bail!("{} requires a value", asset_flag);
                    }
                }
                "--strict" => {
                    cmd.strict = true;
                    i += 1;
                }
                arg if !arg.starts_with('-') => {
                    if !cmd.name.is_empty() {
                        bail!("unexpected argument: {}", arg);
                    }
                    cmd.name = arg.to_string();
                    i += 1;
                }
                _ => {
                    bail!("unknown flag: {}", args[i]);
                }
            }
        }

        if cmd.name.is_empty() {
            bail!("a block name is required");
        }
        Ok(cmd)
    }
}

/// Run the extract command.
pub fn run_extract(args: &[String]) -> Result<()> {
    let cmd = AssetCommand::parse(args, "--out")?;
    let config = crate::resolve_config(&cmd.config, &cmd.host, cmd.strict)?;

    let doc = HostDocument::load(&config.host)
        .with_context(|| format!("failed to read host file {}", config.host.display()))?;

    let payload = splice::extract(doc.text(), &config.syntax(), &cmd.name)
        .with_context(|| format!("extract {}", cmd.name))?;

    let out = cmd.asset.unwrap_or_else(|| config.asset_path(&cmd.name));
    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&out, &payload)
        .with_context(|| format!("failed to write asset file {}", out.display()))?;

    println!(
        "  ✓ {} -> {} ({} bytes)",
        cmd.name,
        out.display(),
        payload.len()
    );
    Ok(())
}

/// Run the inject command.
pub fn run_inject(args: &[String]) -> Result<()> {
    let cmd = AssetCommand::parse(args, "--asset")?;
    let config = crate::resolve_config(&cmd.config, &cmd.host, cmd.strict)?;

    let asset = cmd.asset.unwrap_or_else(|| config.asset_path(&cmd.name));
    let payload = fs::read_to_string(&asset)
        .with_context(|| format!("failed to read asset file {}", asset.display()))?;

    let mut doc = HostDocument::load(&config.host)
        .with_context(|| format!("failed to read host file {}", config.host.display()))?;

    let new_text = splice::inject(
        doc.text(),
        &config.syntax(),
        &cmd.name,
        &payload,
        config.effective_chunk_size(),
    )
    .with_context(|| format!("inject {}", cmd.name))?;
    doc.set_text(new_text);

    if doc.save()? {
        println!("  ✓ {} <- {} ({} bytes)", cmd.name, asset.display(), payload.len());
    } else {
        println!("  = {} unchanged", cmd.name);
    }
    Ok(())
}

/// Print asset command usage.
pub fn usage() {
    eprintln!("inlay extract <blockName> [--host <file>] [--out <file>]");
    eprintln!("inlay inject <blockName> [--host <file>] [--asset <file>]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --host <file>      Host source file (default: from Inlay.toml)");
    eprintln!("  --out <file>       Asset file to write (extract)");
    eprintln!("  --asset <file>     Asset file to read (inject)");
    eprintln!("  --config <file>    Configuration file (default: ./Inlay.toml)");
    eprintln!("  --strict           Fail on duplicate block declarations");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_extract_args() {
        let cmd = AssetCommand::parse(
            &args(&["DASHBOARD_HTML", "--host", "server.ino", "--out", "dash.html"]),
            "--out",
        )
        .unwrap();
        assert_eq!(cmd.name, "DASHBOARD_HTML");
        assert_eq!(cmd.host, Some(PathBuf::from("server.ino")));
        assert_eq!(cmd.asset, Some(PathBuf::from("dash.html")));
        assert!(!cmd.strict);
    }

    #[test]
    fn test_parse_requires_block_name() {
        assert!(AssetCommand::parse(&args(&["--strict"]), "--out").is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_flag() {
        assert!(AssetCommand::parse(&args(&["A", "--frobnicate"]), "--out").is_err());
    }

    #[test]
    fn test_parse_rejects_dangling_value_flag() {
        assert!(AssetCommand::parse(&args(&["A", "--host"]), "--out").is_err());
    }
}
