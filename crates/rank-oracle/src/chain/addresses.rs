//! Contract address book
//!
//! Three roles must be known before any chain call: `settlementOracle`
//! (verifying contract and submission target), `marketFactory` and
//! `stakeToken`. The book is an explicit value constructed once at startup:
//! read the fallback file, then attempt a remote refresh and adopt it only
//! when the remote document carries all three roles. A partial remote
//! document is ignored with a warning; no address is ever patched in place.

use std::path::Path;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::OracleError;
use crate::leaderboard::LeaderboardClient;

/// Contract addresses per role, complete by construction.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AddressBook {
    pub settlement_oracle: Address,
    pub market_factory: Address,
    pub stake_token: Address,
}

/// Address document as served remotely or stored on disk; any role may be
/// absent.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentDoc {
    #[serde(default)]
    pub settlement_oracle: Option<Address>,
    #[serde(default)]
    pub market_factory: Option<Address>,
    #[serde(default)]
    pub stake_token: Option<Address>,
}

impl AddressBook {
    /// Build from a document, requiring every role.
    pub fn from_doc(doc: DeploymentDoc) -> Result<Self, OracleError> {
        Ok(Self {
            settlement_oracle: doc
                .settlement_oracle
                .ok_or(OracleError::AddressBookIncomplete { role: "settlementOracle" })?,
            market_factory: doc
                .market_factory
                .ok_or(OracleError::AddressBookIncomplete { role: "marketFactory" })?,
            stake_token: doc
                .stake_token
                .ok_or(OracleError::AddressBookIncomplete { role: "stakeToken" })?,
        })
    }

    /// Read the fallback file. The file must carry all three roles.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read address book {}", path.display()))?;
        let doc: DeploymentDoc = serde_json::from_str(&raw)
            .with_context(|| format!("Malformed address book {}", path.display()))?;
        Ok(Self::from_doc(doc)?)
    }

    /// Adopt the remote document only if it is complete; otherwise keep self.
    pub fn merged_with(self, remote: DeploymentDoc) -> Self {
        match Self::from_doc(remote) {
            Ok(refreshed) => {
                info!("Adopted remote deployment addresses");
                refreshed
            }
            Err(e) => {
                warn!("Remote deployment document rejected ({}), keeping fallback addresses", e);
                self
            }
        }
    }

    /// Startup construction: fallback file first, then best-effort remote
    /// refresh. A failed refresh is not fatal.
    pub async fn bootstrap(path: &Path, client: &LeaderboardClient) -> Result<Self> {
        let fallback = Self::from_file(path)?;
        match client.fetch_deployments().await {
            Ok(remote) => Ok(fallback.merged_with(remote)),
            Err(e) => {
                warn!("Deployment refresh failed ({}), using fallback addresses", e);
                Ok(fallback)
            }
        }
    }
}
