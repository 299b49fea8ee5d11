//! Leaderboard Settlement Oracle
//!
//! Resolves competition markets from the daily ranked leaderboard and posts
//! signed outcome commitments to the on-chain settlement contract.
//!
//! # Components
//! - `types`: data model (entries, snapshots, markets, commitments)
//! - `commitment`: winner determination, canonical snapshot hash, blob digest
//! - `signer`: EIP-191 personal-sign over commitment digests
//! - `leaderboard`: HTTP client for the leaderboard / market definition API
//! - `chain`: address book and JSON-RPC gateway to the settlement contract
//! - `engine`: per-market readiness gate and batch driver
//!
//! # Correctness contract
//! The blob digest in `commitment` must byte-for-byte match the settlement
//! contract's own recomputation. Field order, ABI widths and the keccak256
//! hash function are fixed by the contract; any drift silently produces
//! signatures the contract will never accept.

pub mod chain;
pub mod commitment;
pub mod config;
pub mod engine;
pub mod error;
pub mod leaderboard;
pub mod signer;
pub mod types;

pub use config::OracleConfig;
pub use engine::{BatchSummary, MarketOutcome, MarketStatus, ResolutionEngine};
pub use error::OracleError;
pub use signer::CommitmentSigner;
pub use types::*;

/// Highest rank (inclusive) that counts as a win for a threshold market.
/// Fixed by market design, not configurable per call.
pub const TOP_RANK_THRESHOLD: u32 = 10;

/// Default base URL for the leaderboard / market definition API.
/// Override with `LEADERBOARD_API_BASE`.
pub const DEFAULT_LEADERBOARD_API_BASE: &str = "https://api.rankview.xyz/v1";

/// Default path of the contract address fallback file.
/// Override with `ADDRESS_BOOK_PATH`.
pub const DEFAULT_ADDRESS_BOOK_PATH: &str = "config/addresses.json";
