//! Binary crate for the `weather-push` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Logging setup

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    init_tracing(cmd.verbose);
    cmd.run().await
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        cli::Cli::command().debug_assert();
    }

    #[test]
    fn parses_run_with_dry_run() {
        let cli = cli::Cli::try_parse_from(["weather-push", "--verbose", "run", "--dry-run"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, cli::Command::Run { dry_run: true }));
    }

    #[test]
    fn global_config_flag_after_subcommand() {
        let cli =
            cli::Cli::try_parse_from(["weather-push", "locations", "--config", "/tmp/w.toml"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/tmp/w.toml")));
    }
}
