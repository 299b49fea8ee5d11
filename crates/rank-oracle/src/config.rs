//! Environment-based configuration
//!
//! Constructed once at startup; nothing here is re-read mid-run.
//!
//! Expected env vars:
//! - `ORACLE_PRIVATE_KEY` (required) - hex private key of the oracle signer
//! - `RPC_URL` (required) - JSON-RPC endpoint of the settlement chain
//! - `LEADERBOARD_API_BASE` (optional) - leaderboard / market API base URL
//! - `ADDRESS_BOOK_PATH` (optional) - contract address fallback file

use std::path::PathBuf;

use anyhow::{Context, Result};
use url::Url;

use crate::{DEFAULT_ADDRESS_BOOK_PATH, DEFAULT_LEADERBOARD_API_BASE};

pub struct OracleConfig {
    /// Hex private key; only ever read from the environment, never logged.
    pub private_key: String,
    pub rpc_url: Url,
    pub api_base: String,
    pub address_book_path: PathBuf,
}

impl OracleConfig {
    pub fn from_env() -> Result<Self> {
        let private_key =
            std::env::var("ORACLE_PRIVATE_KEY").context("ORACLE_PRIVATE_KEY is not set")?;

        let rpc_url = std::env::var("RPC_URL").context("RPC_URL is not set")?;
        let rpc_url: Url =
            rpc_url.parse().with_context(|| format!("invalid RPC_URL '{}'", rpc_url))?;

        let api_base = std::env::var("LEADERBOARD_API_BASE")
            .unwrap_or_else(|_| DEFAULT_LEADERBOARD_API_BASE.to_string());

        let address_book_path = std::env::var("ADDRESS_BOOK_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_ADDRESS_BOOK_PATH));

        Ok(Self { private_key, rpc_url, api_base, address_book_path })
    }
}

impl std::fmt::Debug for OracleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleConfig")
            .field("private_key", &"[REDACTED]")
            .field("rpc_url", &self.rpc_url.as_str())
            .field("api_base", &self.api_base)
            .field("address_book_path", &self.address_book_path)
            .finish()
    }
}
