//! Keg tracker CLI binary entrypoint.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use keg_cli::cli::{Cli, Commands, Format};
use keg_cli::commands::{BatchesCommand, KegsCommand, StatsCommand, StatusCommand};
use keg_cli::confirm::{AssumeYes, Confirm, StdinConfirm};
use keg_cli::output::OutputFormat;
use keg_cli::CliError;
use keg_core::HttpKegApi;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    if cli.format == Format::Html && !matches!(cli.command, Commands::List) {
        return Err(CliError::InvalidArgument(
            "--format html is only supported by `list`".into(),
        ));
    }
    let config = cli.config()?;
    let api = HttpKegApi::new(&config)?;
    let stations = config.stations.clone();
    let format = OutputFormat::new(cli.format);
    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::Status => {
            let mut cmd = StatusCommand::new(&config.base_url, api, stations);
            cmd.execute(&mut stdout, &format).await?;
        }
        Commands::List => {
            KegsCommand::new(api, stations).list(&mut stdout, &format).await?;
        }
        Commands::Board => {
            KegsCommand::new(api, stations).board(&mut stdout, &format).await?;
        }
        Commands::Stats => {
            StatsCommand::new(api).stats(&mut stdout, &format).await?;
        }
        Commands::Events => {
            StatsCommand::new(api).events(&mut stdout, &format).await?;
        }
        Commands::Batches => {
            BatchesCommand::new(api, stations).list(&mut stdout, &format).await?;
        }
        Commands::Add => {
            KegsCommand::new(api, stations).add(&mut stdout, &format).await?;
        }
        Commands::Edit(args) => {
            KegsCommand::new(api, stations)
                .edit(&mut stdout, &format, &args)
                .await?;
        }
        Commands::Move { id, station } => {
            KegsCommand::new(api, stations)
                .relocate(&mut stdout, &format, id, &station)
                .await?;
        }
        Commands::Reset { id, yes } => {
            let mut confirm = confirmer(yes);
            KegsCommand::new(api, stations)
                .reset(&mut stdout, &format, id, confirm.as_mut())
                .await?;
        }
        Commands::Delete { id, yes } => {
            let mut confirm = confirmer(yes);
            KegsCommand::new(api, stations)
                .delete(&mut stdout, &format, id, confirm.as_mut())
                .await?;
        }
        Commands::Sync => {
            BatchesCommand::new(api, stations).sync(&mut stdout, &format).await?;
        }
    }

    Ok(())
}

fn confirmer(yes: bool) -> Box<dyn Confirm> {
    if yes {
        Box::new(AssumeYes)
    } else {
        Box::new(StdinConfirm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_status() {
        let cli = Cli::parse_from(["keg", "status"]);
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn cli_parses_move() {
        let cli = Cli::parse_from(["keg", "move", "3", "Conditioning Fridge"]);
        match cli.command {
            Commands::Move { id, station } => {
                assert_eq!(id, 3);
                assert_eq!(station, "Conditioning Fridge");
            }
            _ => panic!("expected move command"),
        }
    }

    #[test]
    fn cli_respects_server_flag() {
        let cli = Cli::parse_from(["keg", "-s", "http://brewery:9000", "status"]);
        assert_eq!(cli.server, "http://brewery:9000");
    }

    #[tokio::test]
    async fn html_rejected_outside_list() {
        let cli = Cli::parse_from(["keg", "--format", "html", "board"]);
        let result = run(cli).await;
        assert!(matches!(result, Err(CliError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn run_with_invalid_server_fails() {
        let cli = Cli::parse_from(["keg", "--server", "localhost:8000", "list"]);
        let result = run(cli).await;
        assert!(matches!(result, Err(CliError::Keg(_))));
    }
}
