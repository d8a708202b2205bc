use anchor_lang::prelude::{borsh, AnchorDeserialize, AnchorSerialize, Pubkey};
use serde::{Deserialize, Serialize};

use crate::state::Allocation;
use crate::utils::{Digest, MerkleProof};

/**
 * Claim payload
 *
 * Arguments the ledger's claim instruction re-verifies against the stored
 * root. Encoded with the ledger's Borsh codec, so every integer is
 * little-endian and `proof` is a length-prefixed list of 32-byte hashes.
 *
 * `leaf_count` locates the layers in which the claimed leaf has no sibling;
 * without it the verifier cannot replay the trailing-node rule.
 */
#[derive(Debug, Clone, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct ClaimPayload {
    /// Position of the leaf in the tree
    pub index: u64,
    /// Claim identity hashed into the leaf
    pub identity: Pubkey,
    /// Allocated amount
    pub amount: u64,
    /// Print number for edition distributions
    pub edition: Option<u64>,
    /// Number of leaves in the tree
    pub leaf_count: u64,
    /// Sibling hashes, bottom-up
    pub proof: Vec<Digest>,
}

impl ClaimPayload {
    pub fn allocation(&self) -> Allocation {
        match self.edition {
            Some(edition) => Allocation::Edition {
                amount: self.amount,
                edition,
            },
            None => Allocation::Fungible { amount: self.amount },
        }
    }

    pub fn merkle_proof(&self) -> MerkleProof {
        MerkleProof {
            leaf_index: self.index,
            leaf_count: self.leaf_count,
            siblings: self.proof.clone(),
        }
    }
}

/**
 * Distributor initialization data
 *
 * Everything the ledger needs to create the distributor account:
 * - Derivation: ["MerkleDistributor", base]
 * - The root is frozen once published
 */
#[derive(Debug, Clone, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct DistributorInit {
    /// Distributor program address
    pub distributor: Pubkey,
    /// Bump of the distributor program address
    pub bump: u8,
    /// Merkle root of the claimant list
    pub root: Digest,
    /// Number of leaves committed by `root`
    pub leaf_count: u64,
    /// Key that must co-sign gated claims
    pub temporal: Pubkey,
    /// Sum of every committed amount
    pub total_amount: u64,
}

/// Assembled claim for one accepted claimant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub handle: String,
    pub amount: u64,
    /// Redemption link delivered to the claimant
    pub url: String,
    pub payload: ClaimPayload,
}

/// Record that was dropped from the distribution.
///
/// Carries the handle and position in the input list, never the pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedClaimant {
    /// Position in the submitted list
    pub position: usize,
    pub handle: String,
    pub reason: String,
}

/// Entry of the `urls.json` artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlEntry {
    pub handle: String,
    pub amount: u64,
    pub url: String,
}

impl From<&Claim> for UrlEntry {
    fn from(claim: &Claim) -> Self {
        Self {
            handle: claim.handle.clone(),
            amount: claim.amount,
            url: claim.url.clone(),
        }
    }
}
