use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod commands;
mod output;

#[derive(Parser, Debug)]
#[command(author, version, about = "Galaxy dump import and neutron route planning")]
struct Cli {
    /// Path of the spatial index database.
    #[arg(long, default_value = "index.db")]
    index_db: PathBuf,

    /// Path of the galaxy record database.
    #[arg(long, default_value = "galaxy.db")]
    galaxy_db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a galaxy dump (https://downloads.spansh.co.uk/galaxy.json.gz).
    Import {
        /// Gzip-compressed JSON dump to import.
        dump: PathBuf,
    },
    /// Compute a supercharge-aware route between two system names.
    Route {
        /// Starting system name.
        from: String,
        /// Destination system name.
        to: String,
        /// Emit the route as JSON instead of the hop table.
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        ship: commands::route::ShipArgs,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Import { dump } => commands::import::run(&cli.index_db, &cli.galaxy_db, &dump),
        Command::Route {
            from,
            to,
            json,
            ship,
        } => commands::route::run(&cli.index_db, &cli.galaxy_db, &from, &to, json, &ship),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
