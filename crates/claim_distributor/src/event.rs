use anchor_lang::prelude::Pubkey;
use tracing::{info, warn};

use crate::utils::{digest_hex, Digest};

/// Lifecycle events of a distribution, reported through `tracing` under the
/// `claim_distributor::event` target.
pub trait Event {
    fn emit(&self);
}

/// Event emitted when a distribution passed its self-check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionBuilt {
    /// The distributor account public key
    pub distributor: Pubkey,
    /// Merkle root of the accepted claimants
    pub root: Digest,
    /// Number of leaves committed by the root
    pub leaf_count: u64,
    /// Number of records dropped before tree construction
    pub rejected: usize,
    /// Sum of every committed amount
    pub total_amount: u64,
}

impl Event for DistributionBuilt {
    fn emit(&self) {
        info!(
            target: "claim_distributor::event",
            distributor = %self.distributor,
            root = %digest_hex(&self.root),
            leaf_count = self.leaf_count,
            rejected = self.rejected,
            total_amount = self.total_amount,
            "DistributionBuilt"
        );
    }
}

/// Event emitted for every claim that verified against the fresh root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimAssembled {
    /// The distributor account public key
    pub distributor: Pubkey,
    /// Leaf index of the claim
    pub index: u64,
    /// Claim identity committed in the leaf
    pub identity: Pubkey,
    /// Allocated amount
    pub amount: u64,
}

impl Event for ClaimAssembled {
    fn emit(&self) {
        info!(
            target: "claim_distributor::event",
            distributor = %self.distributor,
            index = self.index,
            identity = %self.identity,
            amount = self.amount,
            "ClaimAssembled"
        );
    }
}

/// Event emitted when a claimant record is dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimantRejected {
    /// Position of the record in the submitted list
    pub position: usize,
    /// Handle of the record; the pin is never reported
    pub handle: String,
    /// Why the record was dropped
    pub reason: String,
}

impl Event for ClaimantRejected {
    fn emit(&self) {
        warn!(
            target: "claim_distributor::event",
            position = self.position,
            handle = %self.handle,
            reason = %self.reason,
            "ClaimantRejected"
        );
    }
}
