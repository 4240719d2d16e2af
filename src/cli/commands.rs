use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "council",
    about = "Rule-driven investor personas trading paper portfolios"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every persona for every account (the daily batch)
    RunDaily {
        /// Run even when markets are closed
        #[arg(long)]
        force: bool,
    },
    /// Run a single persona for one account
    Run {
        #[arg(long)]
        account: String,
        /// Persona (value_quality, deep_value, garp, risk_parity, passive_index, momentum_growth)
        #[arg(long)]
        persona: String,
    },
    /// Show a portfolio at last observed prices
    Portfolio {
        #[arg(long)]
        account: String,
        #[arg(long)]
        persona: String,
    },
    /// List executed transactions, newest first
    History {
        #[arg(long)]
        account: String,
        #[arg(long)]
        persona: Option<String>,
        #[arg(long, default_value = "50")]
        limit: usize,
    },
    /// Show the latest run record for a persona
    Runs {
        #[arg(long)]
        account: String,
        #[arg(long)]
        persona: String,
    },
    /// Create an account
    AccountAdd {
        #[arg(long)]
        id: String,
        #[arg(long)]
        email: String,
        /// Disable trade notifications for this account
        #[arg(long)]
        no_alerts: bool,
    },
    /// List accounts
    Accounts,
}
