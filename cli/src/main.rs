mod client;
mod seed;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client::Client;

const DEFAULT_SERVER: &str = "http://localhost:5000";

#[derive(Parser)]
#[command(name = "potluck")]
#[command(about = "Potluck CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ping the server (unauthenticated)
    Ping {
        /// Server URL
        #[arg(long, default_value = DEFAULT_SERVER)]
        server: String,
    },
    /// Seed the server with a user, sample recipes and ratings
    Seed {
        /// Server URL
        #[arg(long, default_value = DEFAULT_SERVER)]
        server: String,
        /// Email for the seed user
        #[arg(long)]
        email: String,
        /// Password for the seed user
        #[arg(long)]
        password: String,
        /// Display name for the seed user
        #[arg(long, default_value = "Seed Cook")]
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ping { server } => {
            let response = Client::new(&server).unauthed_ping().await?;
            println!("{}", response.message);
        }
        Commands::Seed {
            server,
            email,
            password,
            name,
        } => {
            seed::seed(&server, &name, &email, &password).await?;
        }
    }

    Ok(())
}
