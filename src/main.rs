//! Signal desk CLI application.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use signal_config::load_config;
use signal_monitor::setup_logging;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level {
        cli::LogLevel::Trace => "trace",
        cli::LogLevel::Debug => "debug",
        cli::LogLevel::Info => "info",
        cli::LogLevel::Warn => "warn",
        cli::LogLevel::Error => "error",
    };
    let logging = load_config(&cli.config).ok().map(|c| c.logging);
    let json_logs = cli.json_logs || logging.as_ref().is_some_and(|l| l.format == "json");
    let log_file = logging.and_then(|l| l.file).map(PathBuf::from);
    let _log_guard = setup_logging(log_level, json_logs, log_file.as_deref());

    // Execute command
    match cli.command {
        Commands::Analyze(args) => cli::commands::analyze::run(args, &cli.config).await,
        Commands::Scan(args) => cli::commands::scan::run(args, &cli.config).await,
        Commands::Search(args) => cli::commands::search::run(args, &cli.config).await,
        Commands::Watch(args) => cli::commands::watch::run(args, &cli.config).await,
        Commands::Alerts(args) => cli::commands::alerts::run(args, &cli.config).await,
        Commands::Compound(args) => cli::commands::compound::run(args, &cli.config).await,
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config).await,
        Commands::PrintConfig => cli::commands::print_config::run(&cli.config).await,
    }
}
