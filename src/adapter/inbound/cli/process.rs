//! Handler for the `process` command.

use serde_json::json;

use crate::adapter::inbound::cli::command::ProcessArgs;
use crate::adapter::inbound::cli::{load_config, output};
use crate::domain::DepositId;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::port::inbound::agent::AgentFacade;

/// Execute the process command.
///
/// # Errors
///
/// Fails if configuration is invalid, the agent cannot be built, or the
/// assigned deposits cannot be enumerated.
pub async fn execute(config_path: &std::path::Path, args: &ProcessArgs) -> Result<()> {
    let mut config = load_config(config_path)?;
    config.agent.dry_run |= args.dry_run;
    let agent = bootstrap::build_agent(&config).await?;

    let outcomes = match args.deposit {
        Some(id) => vec![agent.process_deposit(DepositId::new(id)).await],
        None => agent.process_assigned().await?,
    };

    if output::is_json() {
        output::document(&json!({
            "command": "process",
            "dryRun": config.agent.dry_run,
            "outcomes": outcomes,
        }));
        return Ok(());
    }

    output::banner();
    if config.agent.dry_run {
        output::warning("Dry-run mode enabled - nothing was submitted");
    }
    if outcomes.is_empty() {
        output::note("No active deposits are assigned to this agent");
        return Ok(());
    }
    for outcome in &outcomes {
        output::outcome(outcome);
    }
    if outcomes.len() > 1 {
        output::outcome_summary(&outcomes);
    }
    Ok(())
}
