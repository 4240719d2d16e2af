use chrono::Utc;
use clap::Parser;
use council::application::daily::is_market_day;
use council::cli::commands::{Cli, Commands};
use council::config::CouncilConfig;
use council::domain::ports::persistence::TransactionFilter;
use council::domain::values::persona::Persona;
use council::Council;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let db_path = std::env::var("COUNCIL_DB").unwrap_or_else(|_| "./council.db".into());
    let config = CouncilConfig::from_env();

    let council = match Council::new(&db_path, config) {
        Ok(council) => council,
        Err(e) => {
            eprintln!("Error initializing council: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_command(council, cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(council: Council, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::RunDaily { force } => {
            if !force && !is_market_day(Utc::now()) {
                println!("Market closed today; use --force to run anyway");
                return Ok(());
            }
            let report = council.run_daily().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Run { account, persona } => {
            let persona: Persona = persona.parse().map_err(|e: String| e)?;
            let report = council.run_persona(&account, persona).await?;
            println!("{}", serde_json::to_string_pretty(&report.record)?);
        }
        Commands::Portfolio { account, persona } => {
            let persona: Persona = persona.parse().map_err(|e: String| e)?;
            let summary = council.portfolio_summary(&account, persona)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::History {
            account,
            persona,
            limit,
        } => {
            let persona = persona.map(|p| p.parse()).transpose().map_err(|e: String| e)?;
            let filter = TransactionFilter {
                persona,
                since: None,
                limit: Some(limit),
            };
            let transactions = council.transactions(&account, &filter)?;
            println!("{}", serde_json::to_string_pretty(&transactions)?);
        }
        Commands::Runs { account, persona } => {
            let persona: Persona = persona.parse().map_err(|e: String| e)?;
            match council.latest_run(&account, persona)? {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => println!("No runs recorded for {persona}"),
            }
        }
        Commands::AccountAdd {
            id,
            email,
            no_alerts,
        } => {
            let account = council.add_account(&id, &email, !no_alerts)?;
            println!("{}", serde_json::to_string_pretty(&account)?);
        }
        Commands::Accounts => {
            for account in council.accounts()? {
                println!(
                    "{}: {} (alerts {})",
                    account.id,
                    account.email,
                    if account.alerts_enabled { "on" } else { "off" }
                );
            }
        }
    }
    Ok(())
}
