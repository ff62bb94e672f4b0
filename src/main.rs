use clap::Parser;

use rangekeeper::adapter::inbound::cli::command::Cli;
use rangekeeper::adapter::inbound::cli::output::{self, OutputConfig};
use rangekeeper::adapter::inbound::cli::execute;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    output::configure(OutputConfig::new(cli.json, cli.quiet));

    if let Err(e) = execute(cli).await {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
