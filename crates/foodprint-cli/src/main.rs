mod analyze;
mod location;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::location::LocationArgs;

#[derive(Debug, Parser)]
#[command(name = "foodprint")]
#[command(about = "Estimate the environmental footprint of produce")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the full sustainability analysis for one item
    Analyze {
        /// Produce name (e.g., avocado)
        #[arg(long)]
        produce: String,
        /// Where the produce was grown (e.g., "Lima, Peru")
        #[arg(long)]
        source: String,
        #[command(flatten)]
        location: LocationArgs,
        /// Month to assess, 0 = January (defaults to the current month)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..12))]
        month: Option<u8>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Measure travel distance from a source to your location
    Distance {
        /// Where the produce was grown
        #[arg(long)]
        source: String,
        #[command(flatten)]
        location: LocationArgs,
    },
    /// Check whether an item is in season where you are
    Season {
        /// Produce name
        #[arg(long)]
        produce: String,
        #[command(flatten)]
        location: LocationArgs,
        /// Month to assess, 0 = January (defaults to the current month)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..12))]
        month: Option<u8>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = foodprint_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Analyze {
            produce,
            source,
            location,
            month,
            json,
        }) => analyze::run_analyze(&config, &produce, &source, &location, month, json).await?,
        Some(Commands::Distance { source, location }) => {
            analyze::run_distance(&config, &source, &location).await?;
        }
        Some(Commands::Season {
            produce,
            location,
            month,
        }) => analyze::run_season(&config, &produce, &location, month).await?,
        None => println!("foodprint: run `foodprint --help` for available commands"),
    }

    Ok(())
}

#[cfg(test)]
mod tests;
