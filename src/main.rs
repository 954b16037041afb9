//! Wallet Persona - behavioral profiles for Ethereum addresses
//!
//! # NOTE
//! - Profiles live in memory only and are lost on restart.
//! - `firstSeenEstimate` and `syntheticGasUsed` are random placeholders,
//!   not on-chain data.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;

// Use the library crate
use wallet_persona::cli::commands;
use wallet_persona::config::Config;

/// Wallet Persona - on-chain behavioral profiling
#[derive(Parser)]
#[command(name = "wallet-persona")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "persona.toml", env = "PERSONA_CONFIG")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,

    /// Derive the persona for one address
    Persona {
        /// Account address (0x + 40 hex digits)
        address: String,
    },

    /// Compute similarity between two addresses
    Similarity {
        /// First account address
        address1: String,

        /// Second account address
        address2: String,
    },

    /// Show current configuration (secrets masked)
    Config,

    /// Check ledger RPC reachability
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wallet_persona=info".parse()?),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Execute command
    let result = match cli.command {
        Commands::Serve => commands::serve(&config).await,
        Commands::Persona { address } => commands::persona(&config, &address).await,
        Commands::Similarity { address1, address2 } => {
            commands::similarity(&config, &address1, &address2).await
        }
        Commands::Config => commands::show_config(&config),
        Commands::Health => commands::health(&config).await,
    };

    if let Err(e) = result {
        error!("Command failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
