//! Commitment Builder - winner determination and commitment hashing
//!
//! # Correctness contract
//! [`Commitment::blob_digest`] must byte-for-byte match the settlement
//! contract's own recomputation: same type descriptor string, same field
//! order, same ABI widths, same keccak256. There is no runtime check that
//! catches a divergence; a wrong byte anywhere produces signatures the
//! contract silently never accepts.

use alloy::primitives::{keccak256, Address, B256, U256};
use alloy::sol_types::{sol_data, SolType};

use crate::error::OracleError;
use crate::types::{Commitment, IdentifiedMarket, MarketKind, Snapshot, Winner};
use crate::TOP_RANK_THRESHOLD;

/// Type descriptor hashed into the blob digest. Mirrors the schema string the
/// settlement contract hashes on its side, verbatim.
pub const RESOLVE_TYPE_DESCRIPTOR: &str = "Resolve(bytes32 marketId,uint8 winner,bytes32 snapshotHash,uint64 resolvedAt,uint64 challengeUntil,uint256 nonce,address this)";

/// keccak256 of [`RESOLVE_TYPE_DESCRIPTOR`].
pub fn resolve_type_hash() -> B256 {
    keccak256(RESOLVE_TYPE_DESCRIPTOR.as_bytes())
}

/// Solidity type of the pre-image blob. The `uint8` winner keeps its schema
/// width here; encoding still pads it to a full word.
type BlobTuple = (
    sol_data::FixedBytes<32>,
    sol_data::FixedBytes<32>,
    sol_data::Uint<8>,
    sol_data::FixedBytes<32>,
    sol_data::Uint<64>,
    sol_data::Uint<64>,
    sol_data::Uint<256>,
    sol_data::Address,
);

impl MarketKind {
    /// Determine the winning side from the snapshot.
    ///
    /// Fails with [`OracleError::NotFound`] if any named subject is absent;
    /// no signature is produced and nothing is submitted for that market.
    pub fn determine_winner(&self, snapshot: &Snapshot) -> Result<Winner, OracleError> {
        match self {
            MarketKind::Threshold { subject } => {
                let entry = snapshot
                    .entry(subject)
                    .ok_or_else(|| OracleError::NotFound { subject: subject.clone() })?;
                Ok(if entry.rank <= TOP_RANK_THRESHOLD { Winner::One } else { Winner::Two })
            }
            MarketKind::HeadToHead { subject_a, subject_b } => {
                let a = snapshot
                    .entry(subject_a)
                    .ok_or_else(|| OracleError::NotFound { subject: subject_a.clone() })?;
                let b = snapshot
                    .entry(subject_b)
                    .ok_or_else(|| OracleError::NotFound { subject: subject_b.clone() })?;
                // Equal ranks cannot occur while the store upholds rank
                // uniqueness; if it ever breaks, side two wins the comparison.
                Ok(if a.rank < b.rank { Winner::One } else { Winner::Two })
            }
        }
    }
}

/// Canonical content hash of the full ordered snapshot.
///
/// Serializes the entry sequence with fixed field order (name, rank, score,
/// logo) and stable numeric formatting, then applies keccak256. Identical
/// sequences hash identically on every call, platform and run; reordering the
/// sequence changes the digest even when the entry multiset is unchanged.
pub fn snapshot_hash(snapshot: &Snapshot) -> B256 {
    let bytes = serde_json::to_vec(snapshot.entries())
        .expect("entry serialization has no failure mode");
    keccak256(&bytes)
}

impl Commitment {
    /// Build the commitment for one market from the current snapshot.
    ///
    /// `resolved_at` is the chain time observed at the start of the run.
    /// `challenge_until` is reserved and always 0; `nonce` equals
    /// `resolved_at`.
    pub fn build(
        market: &IdentifiedMarket,
        snapshot: &Snapshot,
        resolved_at: u64,
    ) -> Result<Self, OracleError> {
        let winner = market.def.kind.determine_winner(snapshot)?;
        Ok(Self {
            market_id: market.market_id,
            winner,
            snapshot_hash: snapshot_hash(snapshot),
            resolved_at,
            challenge_until: 0,
            nonce: U256::from(resolved_at),
        })
    }

    /// The 32-byte digest the signature covers.
    ///
    /// ABI-encodes `(typeHash, marketId, winner, snapshotHash, resolvedAt,
    /// challengeUntil, nonce, verifyingContract)` as a static tuple of eight
    /// 32-byte words and hashes the result with keccak256.
    pub fn blob_digest(&self, verifying_contract: Address) -> B256 {
        keccak256(self.abi_blob(verifying_contract))
    }

    /// The raw ABI encoding the digest hashes over.
    fn abi_blob(&self, verifying_contract: Address) -> Vec<u8> {
        BlobTuple::abi_encode(&(
            resolve_type_hash(),
            self.market_id,
            self.winner.as_u8(),
            self.snapshot_hash,
            self.resolved_at,
            self.challenge_until,
            self.nonce,
            verifying_contract,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Entry, MarketDefinition};
    use alloy::primitives::address;

    fn snapshot_of(n: u32) -> Snapshot {
        Snapshot::from_entries(
            (1..=n)
                .map(|rank| Entry {
                    name: format!("entry-{}", rank),
                    rank,
                    score: 100.0 - rank as f64,
                    logo: format!("logo-{}.png", rank),
                })
                .collect(),
        )
    }

    fn identified(kind: MarketKind) -> IdentifiedMarket {
        MarketDefinition {
            kind,
            lock_time: 1_767_300_000,
            resolve_time: 1_767_386_400,
            question_digest: B256::repeat_byte(0x11),
        }
        .with_market_id(B256::repeat_byte(0xaa))
    }

    #[test]
    fn test_threshold_rank_ten_wins() {
        let snapshot = snapshot_of(12);
        let kind = MarketKind::Threshold { subject: "entry-10".into() };
        assert_eq!(kind.determine_winner(&snapshot).unwrap(), Winner::One);
    }

    #[test]
    fn test_threshold_rank_eleven_loses() {
        let snapshot = snapshot_of(12);
        let kind = MarketKind::Threshold { subject: "entry-11".into() };
        assert_eq!(kind.determine_winner(&snapshot).unwrap(), Winner::Two);
    }

    #[test]
    fn test_threshold_missing_subject() {
        let snapshot = snapshot_of(5);
        let kind = MarketKind::Threshold { subject: "ghost".into() };
        let err = kind.determine_winner(&snapshot).unwrap_err();
        assert!(matches!(err, OracleError::NotFound { subject } if subject == "ghost"));
    }

    #[test]
    fn test_head_to_head_better_rank_wins() {
        let snapshot = snapshot_of(12);
        let kind =
            MarketKind::HeadToHead { subject_a: "entry-3".into(), subject_b: "entry-7".into() };
        assert_eq!(kind.determine_winner(&snapshot).unwrap(), Winner::One);

        let reversed =
            MarketKind::HeadToHead { subject_a: "entry-7".into(), subject_b: "entry-3".into() };
        assert_eq!(reversed.determine_winner(&snapshot).unwrap(), Winner::Two);
    }

    #[test]
    fn test_head_to_head_missing_either_subject() {
        let snapshot = snapshot_of(5);

        let missing_a =
            MarketKind::HeadToHead { subject_a: "ghost".into(), subject_b: "entry-1".into() };
        assert!(matches!(
            missing_a.determine_winner(&snapshot),
            Err(OracleError::NotFound { .. })
        ));

        let missing_b =
            MarketKind::HeadToHead { subject_a: "entry-1".into(), subject_b: "ghost".into() };
        assert!(matches!(
            missing_b.determine_winner(&snapshot),
            Err(OracleError::NotFound { .. })
        ));
    }

    #[test]
    fn test_snapshot_hash_is_pure() {
        let snapshot = snapshot_of(8);
        assert_eq!(snapshot_hash(&snapshot), snapshot_hash(&snapshot.clone()));
    }

    #[test]
    fn test_snapshot_hash_is_order_sensitive() {
        let snapshot = snapshot_of(8);
        let mut entries = snapshot.entries().to_vec();
        entries.reverse();
        let reordered = Snapshot::from_entries(entries);
        assert_ne!(snapshot_hash(&snapshot), snapshot_hash(&reordered));
    }

    #[test]
    fn test_build_sets_reserved_fields() {
        let snapshot = snapshot_of(12);
        let market = identified(MarketKind::Threshold { subject: "entry-2".into() });

        let commitment = Commitment::build(&market, &snapshot, 1_767_400_000).unwrap();
        assert_eq!(commitment.market_id, B256::repeat_byte(0xaa));
        assert_eq!(commitment.winner, Winner::One);
        assert_eq!(commitment.snapshot_hash, snapshot_hash(&snapshot));
        assert_eq!(commitment.resolved_at, 1_767_400_000);
        assert_eq!(commitment.challenge_until, 0);
        assert_eq!(commitment.nonce, U256::from(1_767_400_000u64));
    }

    #[test]
    fn test_blob_digest_is_deterministic() {
        let snapshot = snapshot_of(12);
        let market = identified(MarketKind::Threshold { subject: "entry-2".into() });
        let commitment = Commitment::build(&market, &snapshot, 1_767_400_000).unwrap();

        let verifying = address!("00000000000000000000000000000000000000a1");
        assert_eq!(commitment.blob_digest(verifying), commitment.blob_digest(verifying));
    }

    #[test]
    fn test_blob_digest_changes_with_every_field() {
        let base = Commitment {
            market_id: B256::repeat_byte(0x01),
            winner: Winner::One,
            snapshot_hash: B256::repeat_byte(0x02),
            resolved_at: 1_767_400_000,
            challenge_until: 0,
            nonce: U256::from(1_767_400_000u64),
        };
        let verifying = address!("00000000000000000000000000000000000000a1");
        let reference = base.blob_digest(verifying);

        let variants = [
            Commitment { market_id: B256::repeat_byte(0x03), ..base.clone() },
            Commitment { winner: Winner::Two, ..base.clone() },
            Commitment { snapshot_hash: B256::repeat_byte(0x04), ..base.clone() },
            Commitment { resolved_at: 1_767_400_001, ..base.clone() },
            Commitment { challenge_until: 1, ..base.clone() },
            Commitment { nonce: U256::from(7u64), ..base.clone() },
        ];
        for variant in variants {
            assert_ne!(variant.blob_digest(verifying), reference);
        }

        let other_contract = address!("00000000000000000000000000000000000000b2");
        assert_ne!(base.blob_digest(other_contract), reference);
    }

    #[test]
    fn test_blob_encoding_layout() {
        // Eight static fields, one 32-byte word each.
        let commitment = Commitment {
            market_id: B256::repeat_byte(0x01),
            winner: Winner::Two,
            snapshot_hash: B256::repeat_byte(0x02),
            resolved_at: 42,
            challenge_until: 0,
            nonce: U256::from(42u64),
        };
        let verifying = address!("00000000000000000000000000000000000000a1");
        let encoded = commitment.abi_blob(verifying);
        assert_eq!(encoded.len(), 8 * 32);

        // winner occupies the low byte of its word, zero-padded per ABI rules
        assert_eq!(encoded[2 * 32 + 31], 2);
        assert_eq!(&encoded[2 * 32..2 * 32 + 31], &[0u8; 31]);

        assert_eq!(commitment.blob_digest(verifying), keccak256(&encoded));
    }
}
