//! Commitment signer - EIP-191 personal sign over blob digests
//!
//! Wraps a local private key. The digest is wrapped in the standard
//! `"\x19Ethereum Signed Message:\n32"` envelope, hashed again, and signed
//! with nonce-based ECDSA; identical inputs may yield different signatures
//! across calls, which the contract accepts.

use alloy::primitives::{Address, Signature, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;

use crate::error::OracleError;

/// Stateless signer over commitment digests.
#[derive(Clone)]
pub struct CommitmentSigner {
    inner: PrivateKeySigner,
}

impl CommitmentSigner {
    pub fn new(inner: PrivateKeySigner) -> Self {
        Self { inner }
    }

    /// Parse a hex-encoded private key, `0x` prefix optional.
    pub fn from_hex(key: &str) -> Result<Self, OracleError> {
        let key = key.trim().trim_start_matches("0x");
        let inner: PrivateKeySigner =
            key.parse().map_err(|e| OracleError::InvalidKey(format!("{}", e)))?;
        Ok(Self { inner })
    }

    /// Address derived from the wrapped key; the settlement contract checks
    /// recovered signatures against this.
    pub fn address(&self) -> Address {
        self.inner.address()
    }

    /// Clone of the underlying key handle, for wiring the same identity into
    /// the transaction-signing wallet.
    pub fn key(&self) -> PrivateKeySigner {
        self.inner.clone()
    }

    /// Personal-sign the 32-byte blob digest.
    pub async fn sign_digest(&self, digest: B256) -> Result<Signature, OracleError> {
        self.inner
            .sign_message(digest.as_slice())
            .await
            .map_err(|e| OracleError::Signing(e.to_string()))
    }
}

impl std::fmt::Debug for CommitmentSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitmentSigner")
            .field("address", &self.inner.address())
            .field("key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::keccak256;

    // well-known anvil dev key, safe to embed
    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn test_from_hex_with_and_without_prefix() {
        let with = CommitmentSigner::from_hex(TEST_KEY).unwrap();
        let without = CommitmentSigner::from_hex(TEST_KEY.trim_start_matches("0x")).unwrap();
        assert_eq!(with.address(), without.address());
        assert_eq!(with.address(), TEST_ADDRESS.parse::<Address>().unwrap());
    }

    #[test]
    fn test_from_hex_rejects_garbage() {
        let err = CommitmentSigner::from_hex("not-a-key").unwrap_err();
        assert!(matches!(err, OracleError::InvalidKey(_)));
    }

    #[test]
    fn test_debug_redacts_key_material() {
        let signer = CommitmentSigner::from_hex(TEST_KEY).unwrap();
        let debug = format!("{:?}", signer);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.to_lowercase().contains(&TEST_KEY[2..10]));
    }

    #[tokio::test]
    async fn test_sign_round_trip_recovers_signer_address() {
        let signer = CommitmentSigner::from_hex(TEST_KEY).unwrap();
        let digest = keccak256(b"commitment digest under test");

        let signature = signer.sign_digest(digest).await.unwrap();
        assert_eq!(signature.as_bytes().len(), 65);

        let recovered = signature.recover_address_from_msg(digest.as_slice()).unwrap();
        assert_eq!(recovered, signer.address());
    }
}
