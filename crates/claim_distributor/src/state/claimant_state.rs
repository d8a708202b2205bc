use std::fmt;

use serde::{Deserialize, Serialize};

/**
 * Claimant record
 *
 * One entry of the distribution list as supplied by the creator. The handle is
 * either the claimant's own address (direct mode) or an off-ledger handle such
 * as an email, phone number or chat user (gated mode, which also carries a pin).
 *
 * Serialized form (claimant list JSON):
 *   { "handle": "...", "amount": 20, "edition": 3, "pin": 1234 }
 * `edition` only appears for edition distributions, `pin` only in gated mode.
 *
 * Records are never mutated: the derived identity and redemption URL are
 * returned as separate output artifacts.
 */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ClaimantEntry", into = "ClaimantEntry")]
pub struct ClaimantRecord {
    /// Address (direct mode) or off-ledger handle (gated mode)
    pub handle: String,
    /// What the claimant receives
    pub allocation: Allocation,
    /// Secret mixed into the gated identity, absent in direct mode
    pub pin: Option<Pin>,
}

impl ClaimantRecord {
    pub fn fungible(handle: impl Into<String>, amount: u64, pin: Option<Pin>) -> Self {
        Self {
            handle: handle.into(),
            allocation: Allocation::Fungible { amount },
            pin,
        }
    }

    pub fn edition(handle: impl Into<String>, amount: u64, edition: u64, pin: Option<Pin>) -> Self {
        Self {
            handle: handle.into(),
            allocation: Allocation::Edition { amount, edition },
            pin,
        }
    }
}

/// Allocation kind of one claimant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allocation {
    /// Token transfers and candy machine mint slots
    Fungible { amount: u64 },
    /// A specific print of a master edition, claimable `amount` times
    Edition { amount: u64, edition: u64 },
}

impl Allocation {
    pub fn amount(&self) -> u64 {
        match self {
            Self::Fungible { amount } | Self::Edition { amount, .. } => *amount,
        }
    }

    pub fn edition(&self) -> Option<u64> {
        match self {
            Self::Fungible { .. } => None,
            Self::Edition { edition, .. } => Some(*edition),
        }
    }
}

/// Gating pin. Never printed through `Debug`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pin(u32);

impl Pin {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// Seed form used by the gated derivation
    pub fn to_le_bytes(&self) -> [u8; 4] {
        self.0.to_le_bytes()
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pin(<redacted>)")
    }
}

impl From<u32> for Pin {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// How a claimant's ledger identity is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatingMode {
    /// The handle is the claimant's address
    Direct,
    /// The identity is a program address derived from (seed, handle, pin)
    Gated,
}

impl GatingMode {
    pub fn needs_pin(&self) -> bool {
        matches!(self, Self::Gated)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ClaimantEntry {
    handle: String,
    amount: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    edition: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pin: Option<Pin>,
}

impl From<ClaimantEntry> for ClaimantRecord {
    fn from(entry: ClaimantEntry) -> Self {
        let allocation = match entry.edition {
            Some(edition) => Allocation::Edition {
                amount: entry.amount,
                edition,
            },
            None => Allocation::Fungible {
                amount: entry.amount,
            },
        };
        Self {
            handle: entry.handle,
            allocation,
            pin: entry.pin,
        }
    }
}

impl From<ClaimantRecord> for ClaimantEntry {
    fn from(record: ClaimantRecord) -> Self {
        Self {
            handle: record.handle,
            amount: record.allocation.amount(),
            edition: record.allocation.edition(),
            pin: record.pin,
        }
    }
}
