//! Tollgate CLI binary.
//!
//! This binary provides command-line access to the gateway:
//! - Run chat completions, optionally through a named profile
//! - Embed texts
//! - Classify sentiment
//! - Inspect the effective configuration

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, handle_command, load_config};

    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "debug"
    } else {
        "warn,tollgate=info"
    };
    tollgate::init_telemetry(filter, cli.json_logs)?;

    let config = load_config(cli.config.as_deref())?;
    handle_command(cli.command, config).await
}
