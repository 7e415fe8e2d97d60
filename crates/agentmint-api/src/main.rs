//! agentmint CLI entry point.
//!
//! Binary name: `agentmint`
//!
//! Parses CLI arguments, installs tracing, wires the services from config and
//! environment, then dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use agentmint_observe::tracing_setup::{init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,agentmint=debug",
        _ => "trace",
    };
    init_tracing(filter, cli.otel).map_err(|e| anyhow::anyhow!(e))?;

    finish_with(dispatch(cli), shutdown_tracing).await
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "agentmint", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;

    match cli.command {
        Commands::Create { assisted } => cli::wizard::run_wizard(&state, assisted, cli.json).await,
        Commands::List => cli::agent::list_agents(&state, cli.json).await,
        Commands::Show { address } => cli::agent::show_agent(&state, &address, cli.json).await,
        Commands::Chat { address } => cli::chat::chat_with_address(&state, &address).await,
        Commands::Completions { .. } => Ok(()),
    }
}

/// Await `run`, then call `shutdown` on success and on error alike.
async fn finish_with<F, S>(run: F, shutdown: S) -> anyhow::Result<()>
where
    F: Future<Output = anyhow::Result<()>>,
    S: FnOnce(),
{
    let result = run.await;
    shutdown();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn shutdown_runs_when_startup_fails() {
        let shut_down = Cell::new(false);
        let result = finish_with(async { Err(anyhow::anyhow!("missing credentials")) }, || {
            shut_down.set(true)
        })
        .await;

        assert!(result.is_err());
        assert!(shut_down.get());
    }

    #[tokio::test]
    async fn shutdown_runs_after_success() {
        let shut_down = Cell::new(false);
        finish_with(async { Ok(()) }, || shut_down.set(true)).await.unwrap();
        assert!(shut_down.get());
    }

    #[test]
    fn completions_parse_without_state() {
        let cli = Cli::try_parse_from(["agentmint", "completions", "bash"]).unwrap();
        assert!(matches!(cli.command, Commands::Completions { .. }));
    }
}
