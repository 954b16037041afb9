//! CLI command implementations

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::Config;
use crate::engine::PersonaEngine;
use crate::ledger::JsonRpcLedger;
use crate::persona::PlaceholderEstimator;
use crate::server;

/// Build the ledger client from config
fn build_ledger(config: &Config) -> Result<Arc<JsonRpcLedger>> {
    let ledger = JsonRpcLedger::new(config.rpc.endpoint.clone(), config.rpc.timeout())
        .context("Failed to create ledger client")?;
    Ok(Arc::new(ledger))
}

/// Build a fresh engine with an empty store
pub fn build_engine(config: &Config) -> Result<Arc<PersonaEngine>> {
    let ledger = build_ledger(config)?;
    Ok(Arc::new(PersonaEngine::new(
        ledger,
        config.clustering.clone(),
        PlaceholderEstimator::new(config.estimates.seed),
    )))
}

/// Start the HTTP server
pub async fn serve(config: &Config) -> Result<()> {
    info!("Starting wallet persona server...");

    let engine = build_engine(config)?;

    info!("Checking ledger endpoint...");
    if engine.ledger_healthy().await {
        info!("Ledger endpoint reachable");
    } else if config.rpc.require_connection {
        anyhow::bail!("Ethereum RPC not reachable (set rpc.require_connection = false to start anyway)");
    } else {
        warn!("Ledger endpoint unreachable - persona requests will fail until it recovers");
    }

    let bind_addr = config.server.bind_addr()?;
    server::serve(engine, bind_addr).await
}

/// Derive and print one persona
pub async fn persona(config: &Config, address: &str) -> Result<()> {
    let engine = build_engine(config)?;
    let persona = engine.derive_persona(address).await?;
    println!("{}", serde_json::to_string_pretty(&persona)?);
    Ok(())
}

/// Compare two addresses and print the score
pub async fn similarity(config: &Config, address1: &str, address2: &str) -> Result<()> {
    let engine = build_engine(config)?;
    let similarity = engine.compute_similarity(address1, address2).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({ "similarity": similarity }))?
    );
    Ok(())
}

/// Show configuration
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", config.masked_display());
    Ok(())
}

/// Check system health
pub async fn health(config: &Config) -> Result<()> {
    println!("\n=== SYSTEM HEALTH CHECK ===\n");

    let mut all_healthy = true;

    // Check RPC
    print!("Ledger RPC... ");
    match check_rpc(config).await {
        Ok((chain_id, latency)) => println!("OK (chain {}, {}ms)", chain_id, latency),
        Err(e) => {
            println!("FAILED: {}", e);
            all_healthy = false;
        }
    }

    // Check bind address
    print!("Server bind address... ");
    match config.server.bind_addr() {
        Ok(addr) => println!("OK ({})", addr),
        Err(e) => {
            println!("FAILED: {}", e);
            all_healthy = false;
        }
    }

    println!();
    if all_healthy {
        println!("All systems healthy!");
    } else {
        println!("Some systems are unhealthy. Check the errors above.");
    }

    Ok(())
}

async fn check_rpc(config: &Config) -> Result<(u64, u64)> {
    let ledger = build_ledger(config)?;

    let start = Instant::now();
    let chain_id = ledger.chain_id().await?;
    let latency = start.elapsed().as_millis() as u64;

    Ok((chain_id, latency))
}
