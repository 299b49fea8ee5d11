//! Data model for the settlement oracle
//!
//! # Design Principles
//! 1. Snapshot and market definitions are loaded once per run and read-only
//!    thereafter; commitments are created, used and discarded per market.
//! 2. Market kind is a tagged enum, never a stringly-typed branch.
//! 3. A market without an on-chain id is a distinct type from one with an id;
//!    the id is attached by an explicit resolution step, not mutated in place.

use alloy::primitives::{Signature, B256, U256};
use serde::{Deserialize, Serialize};

/// One ranked leaderboard entry.
///
/// Field order is part of the canonical snapshot hash (see
/// [`crate::commitment::snapshot_hash`]); do not reorder.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    /// Unique name within a snapshot
    pub name: String,
    /// Dense 1-based rank, unique within a snapshot
    pub rank: u32,
    /// Current score
    pub score: f64,
    /// Opaque logo reference, carried through the hash unchanged
    pub logo: String,
}

/// Ordered ranked snapshot for one day. Ordering is rank order.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Snapshot {
    entries: Vec<Entry>,
}

impl Snapshot {
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Look up an entry by name. `None` means the subject is absent from the
    /// snapshot, which is a hard precondition failure for winner determination.
    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Market outcome side. Draws and abstentions cannot occur.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Winner {
    One,
    Two,
}

impl Winner {
    /// Encoding used on the wire and in the ABI blob (1 or 2).
    pub fn as_u8(self) -> u8 {
        match self {
            Winner::One => 1,
            Winner::Two => 2,
        }
    }
}

/// Market kind with its subjects.
///
/// Adding a new kind is a closed, type-checked extension point: implement its
/// arm in [`MarketKind::determine_winner`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind")]
pub enum MarketKind {
    /// "Is this subject within the top-10 ranked entries?"
    #[serde(rename = "single-entry-threshold")]
    Threshold {
        #[serde(rename = "subjectA")]
        subject: String,
    },
    /// "Which of two named subjects ranks better?"
    #[serde(rename = "head-to-head", rename_all = "camelCase")]
    HeadToHead { subject_a: String, subject_b: String },
}

impl MarketKind {
    /// Short human-readable label for status lines.
    pub fn label(&self) -> String {
        match self {
            MarketKind::Threshold { subject } => format!("top10:{}", subject),
            MarketKind::HeadToHead { subject_a, subject_b } => {
                format!("h2h:{}-vs-{}", subject_a, subject_b)
            }
        }
    }
}

/// Market definition as served by the market store. Carries no on-chain id;
/// see [`MarketDefinition::with_market_id`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarketDefinition {
    #[serde(flatten)]
    pub kind: MarketKind,
    /// When deposits close (unix seconds)
    pub lock_time: u64,
    /// Earliest time the market may be resolved (unix seconds)
    pub resolve_time: u64,
    /// keccak256 of the market question, fixed at creation
    pub question_digest: B256,
}

impl MarketDefinition {
    /// Attach the on-chain market id, producing a market that is ready for
    /// commitment construction. The id is derived deterministically from
    /// `question_digest` and `lock_time` by the settlement contract.
    pub fn with_market_id(self, market_id: B256) -> IdentifiedMarket {
        IdentifiedMarket { market_id, def: self }
    }
}

/// A market definition whose on-chain id has been resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct IdentifiedMarket {
    pub market_id: B256,
    pub def: MarketDefinition,
}

/// The tuple of fields describing a market's outcome. Signed and submitted
/// on-chain; never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commitment {
    pub market_id: B256,
    pub winner: Winner,
    /// Canonical content hash of the full ranked snapshot
    pub snapshot_hash: B256,
    /// Chain time at resolution (unix seconds)
    pub resolved_at: u64,
    /// Reserved, always 0
    pub challenge_until: u64,
    /// Replay protection, set equal to `resolved_at`
    pub nonce: U256,
}

/// A commitment together with the 65-byte signature over its blob digest.
#[derive(Clone, Debug)]
pub struct SignedCommitment {
    pub commitment: Commitment,
    pub signature: Signature,
}
