//! Command-line driver.
//!
//! Each subcommand has a handler module with an `execute` function. Handlers
//! print through [`output`], which honours the global `--json` and `--quiet`
//! flags.

pub mod close;
pub mod command;
pub mod decide;
pub mod output;
pub mod process;
pub mod run;
pub mod status;

use std::path::Path;

use command::{Cli, Commands};

use crate::error::Result;
use crate::infrastructure::config::Config;

/// Dispatch a parsed command line.
///
/// # Errors
///
/// Returns the handler's error.
pub async fn execute(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Run(args) => run::execute(&cli.config, args).await,
        Commands::Process(args) => process::execute(&cli.config, args).await,
        Commands::Close(args) => close::execute(&cli.config, args).await,
        Commands::Status => status::execute(&cli.config).await,
        Commands::Decide(args) => decide::execute(args),
    }
}

/// Load configuration and install logging.
#[allow(clippy::result_large_err)]
pub(crate) fn load_config(path: &Path) -> Result<Config> {
    let config = Config::load(path)?;
    config.init_logging();
    Ok(config)
}
