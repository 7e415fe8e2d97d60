//! CLI command definitions for the `agentmint` binary.

pub mod agent;
pub mod chat;
pub mod wizard;

use std::time::Duration;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use indicatif::{ProgressBar, ProgressStyle};

/// Create AI personas and mint them as on-chain agents.
#[derive(Parser)]
#[command(name = "agentmint", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Walk through the persona wizard and mint a new agent.
    Create {
        /// Let the model fill empty fields on every stage entry.
        #[arg(long)]
        assisted: bool,
    },

    /// List every agent in the registry.
    #[command(alias = "ls")]
    List,

    /// Show one agent.
    Show {
        /// Deployed agent address.
        address: String,
    },

    /// Chat with an existing agent.
    Chat {
        /// Deployed agent address.
        address: String,
    },

    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Steady-ticking spinner used while a remote call is pending.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
