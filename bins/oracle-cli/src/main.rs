//! Settlement Oracle CLI
//!
//! Commands:
//! - `resolve`: run the resolution batch (build, sign and submit commitments)
//! - `snapshot`: fetch today's leaderboard and print it with its canonical hash
//! - `markets`: list market definitions with readiness against chain time
//! - `sign-check`: sign a probe digest and recover the signer address
//!
//! # Usage
//! ```bash
//! # Production batch run
//! ORACLE_PRIVATE_KEY=... RPC_URL=... rank_oracle resolve
//!
//! # Build and sign but submit nothing
//! rank_oracle resolve --dry-run
//!
//! # Inspect inputs
//! rank_oracle snapshot
//! rank_oracle markets
//!
//! # Key self-test
//! ORACLE_PRIVATE_KEY=... rank_oracle sign-check
//! ```

use std::sync::Arc;

use alloy::primitives::keccak256;
use anyhow::Result;
use chrono::DateTime;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use rank_oracle::chain::{AddressBook, ChainGateway, RpcGateway};
use rank_oracle::commitment::snapshot_hash;
use rank_oracle::leaderboard::LeaderboardClient;
use rank_oracle::{
    CommitmentSigner, MarketStatus, OracleConfig, ResolutionEngine,
};

#[derive(Parser)]
#[command(name = "rank_oracle")]
#[command(about = "Leaderboard settlement oracle")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the resolution batch over every pending market
    Resolve {
        /// Build and sign commitments but submit nothing
        #[arg(long, default_value = "false")]
        dry_run: bool,
    },

    /// Fetch today's leaderboard snapshot and print its canonical hash
    Snapshot {
        /// Print raw entry JSON instead of a table
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// List market definitions with readiness against current chain time
    Markets,

    /// Sign a probe digest and verify the recovered address (requires
    /// ORACLE_PRIVATE_KEY)
    SignCheck,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt().with_env_filter(env_filter).with_target(false).init();

    match cli.command {
        Commands::Resolve { dry_run } => run_resolve(dry_run).await,
        Commands::Snapshot { json } => run_snapshot(json).await,
        Commands::Markets => run_markets().await,
        Commands::SignCheck => run_sign_check().await,
    }
}

async fn run_resolve(dry_run: bool) -> Result<()> {
    let config = OracleConfig::from_env()?;
    info!("=== Resolution Batch ===");
    info!("API base: {}", config.api_base);
    info!("RPC: {}", config.rpc_url);
    if dry_run {
        warn!("Dry run: nothing will be submitted");
    }
    info!("");

    let api = LeaderboardClient::with_base_url(&config.api_base)?;
    let book = AddressBook::bootstrap(&config.address_book_path, &api).await?;
    info!("Settlement oracle: {}", book.settlement_oracle);

    let signer = CommitmentSigner::from_hex(&config.private_key)?;
    info!("Oracle signer: {}", signer.address());

    let gateway =
        RpcGateway::connect(config.rpc_url.clone(), signer.key(), book.settlement_oracle);

    // Snapshot and market definitions are pulled exactly once for the run.
    let snapshot = api.fetch_snapshot().await?;
    let markets = api.fetch_markets().await?;
    info!("Loaded {} snapshot entries, {} market(s)", snapshot.len(), markets.len());

    let engine = ResolutionEngine::new(Arc::new(gateway), signer, book.settlement_oracle)
        .with_dry_run(dry_run);
    let summary = engine.run(&snapshot, &markets).await?;

    info!("");
    info!("=== Summary ===");
    for outcome in &summary.outcomes {
        match &outcome.status {
            MarketStatus::Resolved { tx_hash } => {
                info!("  {}: resolved ({})", outcome.label, tx_hash)
            }
            MarketStatus::Signed { digest } => {
                info!("  {}: signed, not submitted (digest {})", outcome.label, digest)
            }
            MarketStatus::Skipped { wait_secs } => {
                info!("  {}: skipped ({}s remaining)", outcome.label, wait_secs)
            }
            MarketStatus::Failed { error } => info!("  {}: FAILED ({})", outcome.label, error),
        }
    }
    info!("Resolved: {}", summary.resolved);
    info!("Skipped: {}", summary.skipped);
    info!("Failed: {}", summary.failed);

    if !summary.is_clean() {
        anyhow::bail!("{} market(s) failed", summary.failed);
    }
    Ok(())
}

async fn run_snapshot(json: bool) -> Result<()> {
    let config = OracleConfig::from_env()?;
    let api = LeaderboardClient::with_base_url(&config.api_base)?;

    let snapshot = api.fetch_snapshot().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(snapshot.entries())?);
    } else {
        info!("=== Leaderboard ({} entries) ===", snapshot.len());
        for entry in snapshot.entries() {
            info!("  #{:<3} {:<24} {}", entry.rank, entry.name, entry.score);
        }
    }

    info!("Snapshot hash: {}", snapshot_hash(&snapshot));
    Ok(())
}

async fn run_markets() -> Result<()> {
    let config = OracleConfig::from_env()?;
    let api = LeaderboardClient::with_base_url(&config.api_base)?;
    let book = AddressBook::bootstrap(&config.address_book_path, &api).await?;

    let gateway = RpcGateway::connect_readonly(config.rpc_url.clone(), book.settlement_oracle);
    let chain_time = gateway.latest_block_timestamp().await?;
    info!("Chain time: {} ({})", chain_time, format_ts(chain_time));
    info!("");

    let markets = api.fetch_markets().await?;
    info!("=== Markets ({}) ===", markets.len());
    for def in &markets {
        let readiness = if chain_time >= def.resolve_time {
            "READY".to_string()
        } else {
            format!("{}s remaining", def.resolve_time - chain_time)
        };
        info!(
            "  {:<32} resolve at {} ({})",
            def.kind.label(),
            format_ts(def.resolve_time),
            readiness
        );
    }
    Ok(())
}

async fn run_sign_check() -> Result<()> {
    let config = OracleConfig::from_env()?;
    let signer = CommitmentSigner::from_hex(&config.private_key)?;

    info!("=== Sign Check ===");
    info!("Signer address: {}", signer.address());

    let digest = keccak256(b"rank-oracle sign check");
    let signature = signer.sign_digest(digest).await?;
    let recovered = signature.recover_address_from_msg(digest.as_slice())?;

    info!("Probe digest: {}", digest);
    info!("Recovered address: {}", recovered);

    if recovered != signer.address() {
        anyhow::bail!("recovered address does not match signer");
    }
    info!("Signature round-trip OK");
    Ok(())
}

fn format_ts(ts: u64) -> String {
    DateTime::from_timestamp(ts as i64, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| "invalid timestamp".to_string())
}
