//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::Strategy;

/// Autonomous concentrated-liquidity agent for vault deposits
#[derive(Parser, Debug)]
#[command(name = "rangekeeper")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the reconciliation and processing loop until Ctrl-C
    Run(RunArgs),

    /// Process one deposit, or every deposit assigned to this agent
    Process(ProcessArgs),

    /// Close every open position of a deposit
    Close(CloseArgs),

    /// Show the agent's identity, tracked positions and reputation
    Status,

    /// Preview the fallback decision for a pool tick (offline)
    Decide(DecideArgs),
}

/// Arguments for `run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Decide and log, but submit nothing
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for `process`.
#[derive(Parser, Debug)]
pub struct ProcessArgs {
    /// Deposit to process; all assigned deposits when omitted
    #[arg(short, long)]
    pub deposit: Option<u64>,

    /// Decide and log, but submit nothing
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for `close`.
#[derive(Parser, Debug)]
pub struct CloseArgs {
    /// Deposit whose positions to close
    #[arg(short, long)]
    pub deposit: u64,
}

/// Arguments for `decide`.
#[derive(Parser, Debug)]
pub struct DecideArgs {
    /// Current pool tick
    #[arg(long, allow_negative_numbers = true)]
    pub tick: i32,

    /// Deposit strategy [conservative, balanced, aggressive]
    #[arg(long, default_value = "balanced")]
    pub strategy: Strategy,

    /// Pool tick spacing
    #[arg(long, default_value_t = 60)]
    pub spacing: i32,

    /// Existing position as LOWER:UPPER (repeatable)
    #[arg(long = "position", value_parser = parse_bounds, allow_hyphen_values = true)]
    pub positions: Vec<(i32, i32)>,
}

fn parse_bounds(raw: &str) -> Result<(i32, i32), String> {
    let (lower, upper) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected LOWER:UPPER, got '{raw}'"))?;
    let lower = lower
        .trim()
        .parse()
        .map_err(|e| format!("invalid lower tick '{lower}': {e}"))?;
    let upper = upper
        .trim()
        .parse()
        .map_err(|e| format!("invalid upper tick '{upper}': {e}"))?;
    Ok((lower, upper))
}
