//! Market Gate & Batch Driver
//!
//! Per-market state machine:
//! ```text
//! PENDING_TIME -> READY    (chain time >= resolve time)
//! PENDING_TIME -> SKIPPED  (gate not met; terminal, no retry this run)
//! READY        -> RESOLVED (commitment mined)
//! READY        -> SIGNED   (dry-run only: signed, nothing submitted)
//! READY        -> SKIPPED  (contract's own time gate rejected us)
//! READY        -> FAILED   (any other error)
//! ```
//!
//! Partial-failure isolation: errors are caught at the per-market boundary
//! and classified by kind. Only `NotReadyYet` downgrades to a skip; every
//! other kind is logged and recorded as failed, and the batch always
//! continues. One market's failure never aborts the run.
//!
//! Markets are processed strictly sequentially; the snapshot, the market
//! list and the chain time are each pulled exactly once per run, so no
//! market's gating decision can depend on another market's side effects.

use std::sync::Arc;

use alloy::primitives::{Address, B256};
use tracing::{error, info, warn};

use crate::chain::ChainGateway;
use crate::commitment::snapshot_hash;
use crate::error::OracleError;
use crate::signer::CommitmentSigner;
use crate::types::{Commitment, MarketDefinition, SignedCommitment, Snapshot};

/// Terminal state of one market within a run.
#[derive(Debug)]
pub enum MarketStatus {
    Resolved { tx_hash: B256 },
    /// Dry-run terminal state: commitment built and signed, nothing
    /// submitted. Carries the signed digest instead of a tx hash.
    Signed { digest: B256 },
    Skipped { wait_secs: u64 },
    Failed { error: OracleError },
}

/// One market's terminal state plus its status-line label.
#[derive(Debug)]
pub struct MarketOutcome {
    pub label: String,
    pub status: MarketStatus,
}

/// End-of-run accounting.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub resolved: u32,
    pub skipped: u32,
    pub failed: u32,
    pub outcomes: Vec<MarketOutcome>,
}

impl BatchSummary {
    /// True when no market failed. Skips are expected and do not count
    /// against a clean run.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    fn record(&mut self, label: String, status: MarketStatus) {
        match &status {
            MarketStatus::Resolved { .. } | MarketStatus::Signed { .. } => self.resolved += 1,
            MarketStatus::Skipped { .. } => self.skipped += 1,
            MarketStatus::Failed { .. } => self.failed += 1,
        }
        self.outcomes.push(MarketOutcome { label, status });
    }
}

/// Drives commitment construction, signing and submission for every pending
/// market.
pub struct ResolutionEngine {
    chain: Arc<dyn ChainGateway>,
    signer: CommitmentSigner,
    /// Settlement oracle address; both the submission target and the
    /// verifying contract baked into every blob digest.
    verifying_contract: Address,
    dry_run: bool,
}

impl ResolutionEngine {
    pub fn new(
        chain: Arc<dyn ChainGateway>,
        signer: CommitmentSigner,
        verifying_contract: Address,
    ) -> Self {
        Self { chain, signer, verifying_contract, dry_run: false }
    }

    /// Build and sign commitments but submit nothing.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Process every market against the snapshot. Chain time is read once up
    /// front; failure to read it is the only batch-level error.
    pub async fn run(
        &self,
        snapshot: &Snapshot,
        markets: &[MarketDefinition],
    ) -> Result<BatchSummary, OracleError> {
        let chain_time = self.chain.latest_block_timestamp().await?;
        info!(
            "batch start: {} market(s), {} snapshot entries, chain time {}, snapshot hash {}",
            markets.len(),
            snapshot.len(),
            chain_time,
            snapshot_hash(snapshot)
        );

        let mut summary = BatchSummary::default();
        for def in markets {
            let label = def.kind.label();

            // Readiness gate, checked before any chain interaction.
            if chain_time < def.resolve_time {
                let wait_secs = def.resolve_time - chain_time;
                info!("[{}] not ready, {}s until resolve time", label, wait_secs);
                summary.record(label, MarketStatus::Skipped { wait_secs });
                continue;
            }

            let status = match self.resolve_one(def, snapshot, chain_time).await {
                Ok(status) => {
                    if let MarketStatus::Resolved { tx_hash } = &status {
                        info!("[{}] resolved in tx {}", label, tx_hash);
                    }
                    status
                }
                Err(OracleError::NotReadyYet { wait_secs }) => {
                    warn!("[{}] contract reports not ready, skipping", label);
                    MarketStatus::Skipped { wait_secs }
                }
                Err(e) => {
                    error!("[{}] failed: {}", label, e);
                    MarketStatus::Failed { error: e }
                }
            };
            summary.record(label, status);
        }

        info!(
            "batch done: {} resolved, {} skipped, {} failed",
            summary.resolved, summary.skipped, summary.failed
        );
        Ok(summary)
    }

    /// READY-state processing for a single market: id resolution, commitment
    /// construction, signing, submission.
    async fn resolve_one(
        &self,
        def: &MarketDefinition,
        snapshot: &Snapshot,
        chain_time: u64,
    ) -> Result<MarketStatus, OracleError> {
        let market_id =
            self.chain.resolve_market_id(def.question_digest, def.lock_time).await?;
        let market = def.clone().with_market_id(market_id);

        let commitment = Commitment::build(&market, snapshot, chain_time)?;
        let digest = commitment.blob_digest(self.verifying_contract);
        let signature = self.signer.sign_digest(digest).await?;

        if self.dry_run {
            info!(
                "[dry-run] market {} winner {} digest {} (not submitted)",
                commitment.market_id,
                commitment.winner.as_u8(),
                digest
            );
            return Ok(MarketStatus::Signed { digest });
        }

        let tx_hash = self.chain.submit(&SignedCommitment { commitment, signature }).await?;
        Ok(MarketStatus::Resolved { tx_hash })
    }
}
