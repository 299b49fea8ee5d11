//! JSON-RPC gateway to the settlement contract
//!
//! The engine only sees the `ChainGateway` trait: chain time for the
//! readiness gate, deterministic market id derivation, and commitment
//! submission. `RpcGateway` binds the trait to an alloy provider with the
//! oracle key wired into the transaction wallet.
//!
//! Submission blocks until the transaction is mined; there is deliberately no
//! timeout on that path. Revert reasons that point at the contract's own time
//! gate are mapped to `NotReadyYet` so the driver records a skip, not a
//! failure.

use alloy::eips::BlockNumberOrTag;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, B256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

use crate::error::OracleError;
use crate::types::SignedCommitment;

sol! {
    /// Settlement contract surface used by the oracle.
    contract SettlementOracle {
        function computeMarketId(bytes32 questionDigest, uint64 lockTime)
            external view returns (bytes32);

        function resolve(
            bytes32 marketId,
            uint8 winner,
            bytes32 snapshotHash,
            uint64 resolvedAt,
            uint64 challengeUntil,
            uint256 nonce,
            bytes signature
        ) external;
    }
}

/// Engine-facing chain interface. Object safe so tests can substitute mocks.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Timestamp of the latest block (unix seconds); the batch gate compares
    /// market resolve times against this, never against wall-clock time.
    async fn latest_block_timestamp(&self) -> Result<u64, OracleError>;

    /// Deterministic market id from `questionDigest` and `lockTime` via the
    /// settlement contract's view function.
    async fn resolve_market_id(
        &self,
        question_digest: B256,
        lock_time: u64,
    ) -> Result<B256, OracleError>;

    /// Submit the signed commitment and block until mined. Returns the
    /// transaction hash on confirmation.
    async fn submit(&self, signed: &SignedCommitment) -> Result<B256, OracleError>;
}

/// Concrete gateway over a JSON-RPC provider.
pub struct RpcGateway {
    provider: DynProvider,
    oracle_address: Address,
}

impl RpcGateway {
    /// Connect with the oracle key wired into the transaction wallet.
    pub fn connect(rpc_url: Url, key: PrivateKeySigner, oracle_address: Address) -> Self {
        let wallet = EthereumWallet::from(key);
        let provider = ProviderBuilder::new().wallet(wallet).connect_http(rpc_url).erased();
        Self { provider, oracle_address }
    }

    /// Connect without a wallet; read-only calls only.
    pub fn connect_readonly(rpc_url: Url, oracle_address: Address) -> Self {
        let provider = ProviderBuilder::new().connect_http(rpc_url).erased();
        Self { provider, oracle_address }
    }

    fn rpc_unavailable(detail: impl std::fmt::Display) -> OracleError {
        OracleError::TransportUnavailable { what: "rpc".to_string(), detail: detail.to_string() }
    }
}

#[async_trait]
impl ChainGateway for RpcGateway {
    async fn latest_block_timestamp(&self) -> Result<u64, OracleError> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await
            .map_err(Self::rpc_unavailable)?
            .ok_or_else(|| Self::rpc_unavailable("no latest block"))?;
        Ok(block.header.timestamp)
    }

    async fn resolve_market_id(
        &self,
        question_digest: B256,
        lock_time: u64,
    ) -> Result<B256, OracleError> {
        let call = SettlementOracle::computeMarketIdCall {
            questionDigest: question_digest,
            lockTime: lock_time,
        };
        let tx = TransactionRequest::default()
            .with_to(self.oracle_address)
            .with_input(call.abi_encode());

        let out = self.provider.call(tx).await.map_err(Self::rpc_unavailable)?;
        let market_id = SettlementOracle::computeMarketIdCall::abi_decode_returns(&out)
            .map_err(|e| Self::rpc_unavailable(format!("bad computeMarketId response: {}", e)))?;

        if market_id == B256::ZERO {
            return Err(OracleError::MarketIdUnset { question_digest });
        }
        debug!("market id {} for digest {}", market_id, question_digest);
        Ok(market_id)
    }

    async fn submit(&self, signed: &SignedCommitment) -> Result<B256, OracleError> {
        let commitment = &signed.commitment;
        let call = SettlementOracle::resolveCall {
            marketId: commitment.market_id,
            winner: commitment.winner.as_u8(),
            snapshotHash: commitment.snapshot_hash,
            resolvedAt: commitment.resolved_at,
            challengeUntil: commitment.challenge_until,
            nonce: commitment.nonce,
            signature: Bytes::from(signed.signature.as_bytes().to_vec()),
        };
        let tx = TransactionRequest::default()
            .with_to(self.oracle_address)
            .with_input(call.abi_encode());

        let pending =
            self.provider.send_transaction(tx).await.map_err(classify_submit_error)?;
        let receipt = pending.get_receipt().await.map_err(classify_submit_error)?;

        if !receipt.status() {
            return Err(OracleError::ChainRejected {
                reason: format!("transaction {} reverted", receipt.transaction_hash),
            });
        }

        info!("submission mined in tx {}", receipt.transaction_hash);
        Ok(receipt.transaction_hash)
    }
}

/// Map a submission failure to an explicit kind. A revert whose reason points
/// at the contract's time gate is a skip-shaped outcome, not a failure.
fn classify_submit_error(err: impl std::fmt::Display) -> OracleError {
    let reason = err.to_string();
    let lower = reason.to_lowercase();
    if lower.contains("tooearly") || lower.contains("not ready") || lower.contains("before resolve")
    {
        OracleError::NotReadyYet { wait_secs: 0 }
    } else {
        OracleError::ChainRejected { reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_shaped_reverts_become_not_ready() {
        for reason in
            ["execution reverted: TooEarly()", "market not ready", "revert: before resolve time"]
        {
            let err = classify_submit_error(reason);
            assert!(matches!(err, OracleError::NotReadyYet { .. }), "misclassified: {}", reason);
        }
    }

    #[test]
    fn test_other_reverts_stay_rejected() {
        for reason in ["execution reverted: AlreadyResolved()", "nonce too low", "bad signer"] {
            let err = classify_submit_error(reason);
            assert!(matches!(err, OracleError::ChainRejected { .. }), "misclassified: {}", reason);
        }
    }
}
