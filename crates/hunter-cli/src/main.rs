mod leads;
mod search;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::leads::LeadsCommands;

#[derive(Debug, Parser)]
#[command(name = "hunter-cli")]
#[command(about = "Agency Hunter command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Find businesses and rank them by website need
    Search {
        /// Free-text business type, e.g. "autokorjaamo"
        #[arg(long)]
        business_type: String,
        /// City to search, e.g. "Tampere"
        #[arg(long)]
        city: String,
        /// Print the full report as JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Save the results to the CRM (requires `DATABASE_URL`)
        #[arg(long)]
        save: bool,
    },
    /// Work with saved leads
    Leads {
        #[command(subcommand)]
        command: LeadsCommands,
    },
    /// Apply pending database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = hunter_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Search {
            business_type,
            city,
            json,
            save,
        }) => {
            let options = search::SearchOptions { json, save };
            search::run_search(&config, &business_type, &city, options).await?;
        }
        Some(Commands::Leads { command }) => {
            let pool = hunter_db::connect_pool_from_config(&config).await?;
            leads::run_leads(&pool, command).await?;
        }
        Some(Commands::Migrate) => {
            let pool = hunter_db::connect_pool_from_config(&config).await?;
            let applied = hunter_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        None => println!("hunter-cli ready; run with --help for commands"),
    }

    Ok(())
}

#[cfg(test)]
mod tests;
