use anchor_lang::prelude::{constant, Pubkey};

/**
 * Crate Constants
 *
 * This module defines the fixed values shared by the tree builder, the leaf
 * encoder and the ledger program that re-verifies claims. Changing any of them
 * breaks every root that has already been published.
 */

#[constant]
/// ===== HASHING CONSTANTS =====

/// Domain separation tag for leaf hashes
/// - Prepended to the canonical claimant encoding before hashing
/// - Keeps a leaf pre-image from ever being read as an internal node
pub const LEAF_PREFIX: u8 = 0x00;

/// Domain separation tag for internal node hashes
/// - Prepended to `left || right` (or `left` alone for a trailing node)
pub const NODE_PREFIX: u8 = 0x01;

/// Width in bytes of every digest in the tree
pub const DIGEST_LEN: usize = 32;

/// ===== LEAF LAYOUT CONSTANTS =====

/// Leaf length for fungible allocations: index + identity + anchor + amount
pub const FUNGIBLE_LEAF_LEN: usize = 8 + 32 + 32 + 8;

/// Leaf length for edition allocations: fungible layout + edition
pub const EDITION_LEAF_LEN: usize = FUNGIBLE_LEAF_LEN + 8;

/// ===== PDA SEED CONSTANTS =====

/// Seed for distributor PDA derivation
/// - Used in: ["MerkleDistributor", base]
pub const DISTRIBUTOR_SEED: &str = "MerkleDistributor";

/// Seed for claim status PDA derivation (transfer claims)
/// - Used in: ["ClaimStatus", index_le, distributor]
pub const CLAIM_STATUS_SEED: &str = "ClaimStatus";

/// Seed for claim count PDA derivation (candy and edition claims)
/// - Used in: ["ClaimCount", index_le, distributor]
pub const CLAIM_COUNT_SEED: &str = "ClaimCount";

/// Seed for the distributor wallet PDA
/// - Used in: ["Wallet", distributor]
pub const WALLET_SEED: &str = "Wallet";

/// ===== DERIVATION LIMITS =====

/// Maximum length of a single PDA seed
pub const MAX_SEED_LEN: usize = 32;

/// Maximum number of seeds accepted by program address derivation
pub const MAX_SEEDS: usize = 16;

/// Handle bytes that fit in a gated derivation
/// - The distribution seed, the pin and the bump seed take one slot each
pub const MAX_HANDLE_LEN: usize = (MAX_SEEDS - 3) * MAX_SEED_LEN;

/// ===== REDEMPTION CONSTANTS =====

/// Path appended to the host for redemption links
pub const CLAIM_PATH: &str = "claim";

/// Placeholder written in the `pin` parameter of direct-mode links
pub const NO_PIN: &str = "NA";

/// ===== SIGNER CONSTANTS =====

/// Temporal signer operated by the hosted OTP service
/// - Used by gated distributions that enable OTP authorization
/// - MSv9H2sMceAzccBganUXwGq3GXgqYAstmZAbFDZYbAV
pub const OTP_TEMPORAL_SIGNER: Pubkey = Pubkey::new_from_array([
    5, 60, 235, 118, 223, 240, 0, 234, 251, 58, 54, 151, 101, 227, 144, 83,
    203, 190, 238, 130, 66, 53, 9, 59, 172, 205, 240, 34, 151, 211, 126, 198,
]);
