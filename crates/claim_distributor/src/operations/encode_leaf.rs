use anchor_lang::prelude::Pubkey;

use crate::constants::*;
use crate::state::Allocation;

/**
 * Encodes the canonical leaf of one claimant
 *
 * Layout (fixed width, little-endian integers):
 *   index (u64) || identity (32) || anchor (32) || amount (u64) || [edition (u64)]
 *
 * The edition field is present only for edition allocations. Every leaf of a
 * distribution shares one allocation kind, so lengths never collide inside a
 * tree and the encoding is injective.
 *
 * @param index - Position of the claimant in the tree
 * @param identity - Resolved claim identity
 * @param anchor - Mint, candy config or master mint of the distribution
 * @param allocation - Amount and optional edition
 */
pub fn encode_leaf(
    index: u64,
    identity: &Pubkey,
    anchor: &Pubkey,
    allocation: &Allocation,
) -> Vec<u8> {
    let capacity = match allocation {
        Allocation::Fungible { .. } => FUNGIBLE_LEAF_LEN,
        Allocation::Edition { .. } => EDITION_LEAF_LEN,
    };

    let mut leaf = Vec::with_capacity(capacity);
    leaf.extend_from_slice(&index.to_le_bytes());
    leaf.extend_from_slice(identity.as_ref());
    leaf.extend_from_slice(anchor.as_ref());
    leaf.extend_from_slice(&allocation.amount().to_le_bytes());
    if let Some(edition) = allocation.edition() {
        leaf.extend_from_slice(&edition.to_le_bytes());
    }
    leaf
}
