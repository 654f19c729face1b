//! CLI entry point - the composition root.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use readaloud_cli::handlers::read::{self, ReadArgs};
use readaloud_cli::utils::input::read_input;
use readaloud_cli::{Cli, CliError, bootstrap, resolve_settings};

/// Log filter when `RUST_LOG` is not set.
fn default_filter(verbose: bool) -> EnvFilter {
    let level = if verbose { "debug" } else { "info" };
    EnvFilter::new(
        ["readaloud", "readaloud_core", "readaloud_speech", "readaloud_cli"]
            .map(|target| format!("{target}={level}"))
            .join(","),
    )
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let settings = resolve_settings(&cli)?;
    let text = read_input(&cli)?;

    let reader = bootstrap(&settings);
    let args = ReadArgs {
        text,
        from_paragraph: cli.from_paragraph,
        interactive: cli.interactive,
    };
    read::execute(&reader, args).await
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging; stdout carries the text being read
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(cli.verbose));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("Error: {e}");
            Ok(ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1)))
        }
    }
}
