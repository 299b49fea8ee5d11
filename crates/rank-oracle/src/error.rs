//! Error taxonomy for the settlement oracle
//!
//! Every failure carries an explicit kind so the batch driver can classify it
//! without inspecting message strings. Only [`OracleError::NotReadyYet`] is
//! downgraded to a skip; every other kind marks the market as failed and the
//! batch continues.

use alloy::primitives::B256;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
    /// Subject missing from the snapshot. Hard precondition failure for that
    /// market, not a recoverable business outcome.
    #[error("subject '{subject}' not present in snapshot")]
    NotFound { subject: String },

    /// The settlement contract returned a zero market id for this definition.
    #[error("market id unresolved for question digest {question_digest}")]
    MarketIdUnset { question_digest: B256 },

    /// A data-retrieval call exceeded its bound. Retryable by re-running the
    /// batch.
    #[error("{what} timed out")]
    Timeout { what: String },

    /// A collaborator is unreachable or answered with garbage. Retryable.
    #[error("{what} unavailable: {detail}")]
    TransportUnavailable { what: String, detail: String },

    /// Time gate not satisfied. Expected, surfaced as a skip rather than a
    /// failure. `wait_secs` is 0 when the rejection came from the contract
    /// and the remaining wait is unknown.
    #[error("market not ready ({wait_secs}s until resolve time)")]
    NotReadyYet { wait_secs: u64 },

    /// Submission reverted or was refused by the chain. Fatal for that
    /// market; the batch continues.
    #[error("chain rejected submission: {reason}")]
    ChainRejected { reason: String },

    /// Oracle private key could not be parsed.
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    /// Address document is missing a required role.
    #[error("address book is missing role '{role}'")]
    AddressBookIncomplete { role: &'static str },

    /// The local signer failed to produce a signature.
    #[error("signing failed: {0}")]
    Signing(String),
}

impl OracleError {
    /// Classify a reqwest error from a data-retrieval call: timeouts are a
    /// distinct, retryable kind rather than a generic transport failure.
    pub(crate) fn from_http(what: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            OracleError::Timeout { what: what.to_string() }
        } else {
            OracleError::TransportUnavailable { what: what.to_string(), detail: err.to_string() }
        }
    }
}
