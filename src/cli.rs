use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod commands;

use crate::config::ServerConfig;
use commands::{init_database, migrate_and_serve, serve};

#[derive(Parser)]
#[command(name = "finance")]
#[command(about = "Stock trading simulator with CLI tools and web server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve(ServerConfig),
    /// Initialize the database using migrations
    ///
    /// Examples:
    ///   SQLite: sqlite:///path/to/database.sqlite
    ///   SQLite: sqlite://finance.db?mode=rwc
    InitDb {
        /// Database URL
        ///
        /// For SQLite databases, use:
        ///   - sqlite:///absolute/path/to/database.sqlite (absolute path)
        #[arg(short, long, env = "DATABASE_URL")]
        database_url: String,
    },
    /// Apply pending migrations, then start the web server
    MigrateAndServe(ServerConfig),
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Serve(config) => {
                serve(&config).await?;
            }
            Commands::InitDb { database_url } => {
                init_database(&database_url).await?;
            }
            Commands::MigrateAndServe(config) => {
                migrate_and_serve(&config).await?;
            }
        }
        Ok(())
    }
}
