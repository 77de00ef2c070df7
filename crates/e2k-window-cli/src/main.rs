mod trace;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use e2k_window::Config;

use crate::trace::Replay;

#[derive(Parser)]
#[command(name = "e2k-window")]
#[command(about = "E2K register window model: replay call/return traces")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Replay {
        #[arg(help = "Trace file, one operation per line")]
        trace: PathBuf,

        #[arg(short, long, help = "Config file with 'key = value' lines")]
        config: Option<PathBuf>,

        #[arg(long, help = "Physical register file size in slots")]
        wregs: Option<usize>,

        #[arg(long, help = "Procedure stack size in bytes")]
        ps_size: Option<usize>,

        #[arg(long, help = "Procedure chain stack size in bytes")]
        pcs_size: Option<usize>,

        #[arg(long, help = "Architecture version (setwd dbl is decoded from 3)")]
        arch_version: Option<u32>,

        #[arg(long, help = "Print events and final state as JSON")]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            trace: trace_path,
            config,
            wregs,
            ps_size,
            pcs_size,
            arch_version,
            json,
        } => {
            let mut cfg = if let Some(config_path) = config {
                parse_config(&config_path)?
            } else {
                Config::new()
            };
            if let Some(slots) = wregs {
                cfg = cfg.with_wregs_size(slots);
            }
            if let Some(bytes) = ps_size {
                cfg = cfg.with_ps_size(bytes);
            }
            if let Some(bytes) = pcs_size {
                cfg = cfg.with_pcs_size(bytes);
            }
            if let Some(version) = arch_version {
                cfg = cfg.with_version(version);
            }

            let text = fs::read_to_string(&trace_path)
                .with_context(|| format!("Failed to read {}", trace_path.display()))?;
            let lines = trace::parse(&text)
                .with_context(|| format!("Failed to parse {}", trace_path.display()))?;

            let mut replay = Replay::new(cfg).context("Invalid configuration")?;
            replay
                .run(&lines)
                .with_context(|| format!("Replay of {} aborted", trace_path.display()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&replay.to_json())?);
            } else {
                print!("{replay}");
            }
        }
    }

    Ok(())
}

/// Parse a config file.
///
/// Format (one setting per line):
/// ```text
/// # Comments start with #
/// wregs = 192
/// ps_size = 0x10000
/// pcs_size = 32768
/// version = 3
/// ```
fn parse_config(path: &Path) -> Result<Config> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let mut config = Config::new();

    for (line_num, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (key, value) = line.split_once('=').ok_or_else(|| {
            anyhow::anyhow!(
                "{}:{}: invalid format, expected 'key = value'",
                path.display(),
                line_num + 1
            )
        })?;

        let key = key.trim();
        let value = trace::parse_number(value.trim()).with_context(|| {
            format!("{}:{}: invalid value for '{key}'", path.display(), line_num + 1)
        })?;
        let value = usize::try_from(value)
            .with_context(|| format!("{}:{}: value out of range", path.display(), line_num + 1))?;

        config = match key {
            "wregs" => config.with_wregs_size(value),
            "ps_size" => config.with_ps_size(value),
            "pcs_size" => config.with_pcs_size(value),
            "version" => config.with_version(u32::try_from(value).with_context(|| {
                format!("{}:{}: version out of range", path.display(), line_num + 1)
            })?),
            _ => anyhow::bail!(
                "{}:{}: unknown key '{key}', expected 'wregs', 'ps_size', 'pcs_size' or 'version'",
                path.display(),
                line_num + 1
            ),
        };
    }

    Ok(config)
}
