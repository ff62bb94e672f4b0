//! Handler for the `close` command.

use serde_json::json;

use crate::adapter::inbound::cli::command::CloseArgs;
use crate::adapter::inbound::cli::{load_config, output};
use crate::domain::DepositId;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::port::inbound::agent::AgentFacade;

/// Execute the close command.
///
/// # Errors
///
/// Fails if configuration is invalid or the agent cannot be built.
pub async fn execute(config_path: &std::path::Path, args: &CloseArgs) -> Result<()> {
    let config = load_config(config_path)?;
    let agent = bootstrap::build_agent(&config).await?;

    let outcome = agent
        .close_all_positions(DepositId::new(args.deposit))
        .await;

    if output::is_json() {
        output::document(&json!({
            "command": "close",
            "outcome": outcome,
        }));
        return Ok(());
    }

    output::banner();
    output::outcome(&outcome);
    Ok(())
}
