//! Handler for the `status` command.

use serde_json::json;

use crate::adapter::inbound::cli::{load_config, output};
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::port::inbound::agent::{AgentFacade, AgentStatus};

/// Execute the status command.
///
/// # Errors
///
/// Fails if configuration is invalid, the agent cannot be built, or its
/// identity cannot be resolved.
pub async fn execute(config_path: &std::path::Path) -> Result<()> {
    let config = load_config(config_path)?;
    let agent = bootstrap::build_agent(&config).await?;
    let status = agent.status().await?;

    if output::is_json() {
        output::document(&json!({
            "command": "status",
            "status": status,
        }));
        return Ok(());
    }

    display(&status);
    Ok(())
}

fn display(status: &AgentStatus) {
    output::banner();
    output::field("Agent", format!("#{}", status.identity.id));
    output::field("Domain", &status.identity.domain);
    output::field("Address", status.identity.address);
    match status.watermark {
        Some(block) => output::field("Watermark", block),
        None => output::field("Watermark", "not started"),
    }
    output::field("Pending", status.pending_validations);
    if status.dry_run {
        output::warning("Dry-run mode enabled");
    }

    if let Some(reputation) = &status.reputation {
        output::heading("Reputation");
        output::reputation(reputation);
    }

    // Positions are only known to this process after it mints them.
    if !status.tracked_positions.is_empty() {
        output::heading("Tracked positions");
        output::positions(&status.tracked_positions);
    }

    if !status.recent_deposits.is_empty() {
        output::heading("Recent deposits");
        output::deposits(&status.recent_deposits);
    }
}
