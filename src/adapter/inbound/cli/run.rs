//! Handler for the `run` command.

use tokio::signal;
use tracing::{info, warn};

use crate::adapter::inbound::cli::command::RunArgs;
use crate::adapter::inbound::cli::{load_config, output};
use crate::error::Result;
use crate::infrastructure::config::Config;
use crate::infrastructure::bootstrap;
use crate::infrastructure::runtime::{self, Schedule};

/// Execute the run command. Returns after Ctrl-C.
///
/// # Errors
///
/// Fails if configuration is invalid or the agent cannot be built.
pub async fn execute(config_path: &std::path::Path, args: &RunArgs) -> Result<()> {
    let mut config = load_config(config_path)?;
    config.agent.dry_run |= args.dry_run;

    let agent = bootstrap::build_agent(&config).await?;
    let schedule = Schedule::from_config(&config.agent);

    if !output::is_quiet() && !output::is_json() {
        print_startup(&config, &schedule, agent.advisor_name());
    }

    info!(dry_run = config.agent.dry_run, "rangekeeper starting");

    runtime::run(&agent, schedule, async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    })
    .await;

    info!("rangekeeper stopped");
    Ok(())
}

fn print_startup(config: &Config, schedule: &Schedule, advisor: &str) {
    output::banner();
    output::field("RPC", &config.chain.rpc_url);
    output::field("Chain ID", config.chain.chain_id);
    output::field("Advisor", advisor);
    output::field("Poll", format!("{}s", schedule.poll_interval.as_secs()));
    output::field("Process", format!("{}s", schedule.process_interval.as_secs()));
    output::field(
        "Validation",
        if config.agent.validation_enabled {
            "enabled"
        } else {
            "disabled"
        },
    );
    if config.agent.dry_run {
        output::warning("Dry-run mode enabled - nothing will be submitted");
    }
}
