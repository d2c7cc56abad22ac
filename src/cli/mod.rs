use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::Config;

pub mod commands;

#[derive(Parser)]
#[command(
    name = "menucast",
    about = "Restaurant order prediction API",
    version,
    author = "jdhiman"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the model artifacts and serve the prediction API
    Serve {
        /// Address to bind (defaults to SERVER_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (defaults to SERVER_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run a single prediction and print the JSON result
    Predict {
        /// Date to predict (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,

        /// Hour of the day (0-23)
        #[arg(short = 'H', long, value_parser = clap::value_parser!(u32).range(0..=23))]
        hour: u32,

        /// There is a special local event
        #[arg(short, long)]
        special_event: bool,
    },
}

/// Execute CLI command with the loaded configuration
pub async fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Serve { host, port } => {
            info!("Starting prediction server");
            commands::serve(config, host, port).await?;
        }
        Commands::Predict { date, hour, special_event } => {
            info!("Running one-off prediction for {} {:02}:00", date, hour);
            commands::predict(config, date, hour, special_event).await?;
        }
    }
    Ok(())
}
