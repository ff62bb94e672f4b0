//! Terminal rendering for the CLI.
//!
//! With `--json` each command prints exactly one JSON document through
//! [`document`] and every human renderer below is silent. `--quiet` keeps
//! warnings and failures but drops everything else.

use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};

use owo_colors::OwoColorize;
use serde_json::json;

use crate::domain::{Action, AgentReputation, Decision};
use crate::port::inbound::agent::{
    DepositNotification, OutcomeStatus, ProcessOutcome, TrackedPosition,
};

static JSON: AtomicBool = AtomicBool::new(false);
static QUIET: AtomicBool = AtomicBool::new(false);

const LABEL_WIDTH: usize = 14;

/// Output flags taken from the global command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    pub json: bool,
    pub quiet: bool,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }
}

/// Apply output flags. Called once from `main` before dispatch.
pub fn configure(config: OutputConfig) {
    JSON.store(config.json, Ordering::Relaxed);
    QUIET.store(config.quiet, Ordering::Relaxed);
}

#[must_use]
pub fn is_json() -> bool {
    JSON.load(Ordering::Relaxed)
}

#[must_use]
pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

fn verbose() -> bool {
    !is_json() && !is_quiet()
}

/// Print a command's machine-readable result.
pub fn document(value: &serde_json::Value) {
    println!("{value}");
}

/// `rangekeeper <version>` followed by a blank line.
pub fn banner() {
    if verbose() {
        println!("{} {}", "rangekeeper".bold(), env!("CARGO_PKG_VERSION").dimmed());
        println!();
    }
}

pub fn heading(title: &str) {
    if verbose() {
        println!();
        println!("{}", title.bold().underline());
    }
}

/// One aligned `label value` line.
pub fn field(label: &str, value: impl Display) {
    if verbose() {
        println!("  {:<LABEL_WIDTH$} {value}", label.dimmed());
    }
}

pub fn note(message: &str) {
    if verbose() {
        println!("  {}", message.dimmed());
    }
}

/// Shown in quiet mode too.
pub fn warning(message: &str) {
    if !is_json() {
        println!("  {} {message}", "!".yellow().bold());
    }
}

/// Report a fatal error on stderr, as JSON when `--json` is set.
pub fn error(message: &str) {
    if is_json() {
        eprintln!("{}", json!({ "error": message }));
    } else {
        eprintln!("{} {message}", "error:".red().bold());
    }
}

fn action_label(action: Action) -> String {
    let label = action.to_string();
    match action {
        Action::Mint => label.green().bold().to_string(),
        Action::Rebalance => label.yellow().bold().to_string(),
        Action::Close => label.red().bold().to_string(),
        Action::Hold => label.dimmed().to_string(),
    }
}

/// Render a decision: action, range, confidence and reason.
pub fn decision(decision: &Decision, source: Option<&str>) {
    let mut action = action_label(decision.action);
    if let Some(source) = source {
        action = format!("{action} {}", format!("via {source}").dimmed());
    }
    field("Action", action);
    if let Some((lower, upper)) = decision.bounds() {
        field("Range", format!("[{lower}, {upper}]  width {}", upper - lower));
    }
    field("Confidence", format!("{}%", decision.confidence));
    field("Reason", decision.reason.dimmed());
}

/// Render one processing outcome. Errors are shown even in quiet mode.
pub fn outcome(outcome: &ProcessOutcome) {
    let id = format!("#{}", outcome.deposit_id);
    match outcome.status {
        OutcomeStatus::Processed if verbose() => {
            println!("{} {} {}", "✓".green(), id.bold(), outcome.message);
        }
        OutcomeStatus::Skipped if verbose() => {
            println!("{} {} {}", "-".dimmed(), id.bold(), outcome.message.dimmed());
        }
        OutcomeStatus::Error if !is_json() => {
            println!("{} {} {}", "×".red(), id.bold(), outcome.message.red());
        }
        _ => {}
    }

    if let Some(d) = &outcome.decision {
        decision(d, outcome.decision_source.as_deref());
    }
    if let Some(execution) = &outcome.execution {
        if let Some(position) = execution.new_position_id {
            field("New position", format!("#{position}"));
        }
        for tx in &execution.tx_hashes {
            field("Tx", tx);
        }
        if let Some(reason) = &execution.note {
            field("Note", reason);
        }
    }
    if let Some(hash) = &outcome.validation_hash {
        field("Validation", hash);
    }
}

/// `processed / skipped / errors` counts for a batch.
pub fn outcome_summary(outcomes: &[ProcessOutcome]) {
    let count = |status: OutcomeStatus| outcomes.iter().filter(|o| o.status == status).count();
    let errors = count(OutcomeStatus::Error);
    heading("Summary");
    field("Processed", count(OutcomeStatus::Processed));
    field("Skipped", count(OutcomeStatus::Skipped));
    if errors > 0 {
        field("Errors", errors.red());
    } else {
        field("Errors", 0);
    }
}

/// Table of cached position bounds.
pub fn positions(positions: &[TrackedPosition]) {
    if !verbose() || positions.is_empty() {
        return;
    }
    println!(
        "  {}",
        format!("{:>10} {:>10} {:>10} {:>7}", "position", "lower", "upper", "width").dimmed()
    );
    for p in positions {
        println!(
            "  {:>10} {:>10} {:>10} {:>7}",
            format!("#{}", p.position_id),
            p.tick_lower,
            p.tick_upper,
            p.tick_upper - p.tick_lower
        );
    }
}

pub fn reputation(reputation: &AgentReputation) {
    let score = match reputation.reputation_score {
        s if s >= 70 => s.green().to_string(),
        s if s >= 40 => s.yellow().to_string(),
        s => s.red().to_string(),
    };
    field("Score", format!("{score}/100"));
    field(
        "Validations",
        format!(
            "{} ({} responded, {:.0}%)",
            reputation.total_validations, reputation.responded_validations, reputation.response_rate
        ),
    );
    field("Avg score", format!("{:.1}", reputation.average_score));
    field(
        "Trust",
        format!(
            "{:.0}% ({} authorizations)",
            reputation.trust_ratio, reputation.feedback_authorizations
        ),
    );
}

/// Newest-first deposit notifications.
pub fn deposits(deposits: &[DepositNotification]) {
    for deposit in deposits {
        let strategy = deposit
            .strategy
            .map_or_else(|| "unknown".to_string(), |s| s.to_string());
        field(
            &format!("#{}", deposit.deposit_id),
            format!("{strategy} by {}", deposit.owner),
        );
    }
}
