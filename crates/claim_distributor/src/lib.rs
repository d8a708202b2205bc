//! Claim Distributor
//!
//! Off-ledger half of a Merkle distributor: compresses a list of claimants into
//! one 32-byte root published by the distributor program, and produces for each
//! claimant the proof and redemption link that unlock their allocation.
//!
//! Key Features:
//! - Keccak Merkle tree with domain-separated leaves (0x00) and nodes (0x01)
//! - Direct distributions keyed by wallet address
//! - Gated distributions keyed by a program address derived from (seed, handle, pin),
//!   optionally co-signed by an OTP temporal signer
//! - Token transfer, candy machine and master edition integrations
//! - Per-claimant rejection: one bad handle never aborts the distribution
//! - Mandatory self-check of every proof before the root is handed out
//!
//! Architecture:
//! - utils: hash primitive, Merkle tree, program addresses
//! - state: claimant records, distribution configuration, claim payloads
//! - operations: leaf encoding, identity resolution, assembly, redemption links,
//!   claim-side verification, identity challenge
//!
//! Workflow:
//! 1. Creator submits claimants and a distribution configuration
//! 2. Identities are resolved and leaves encoded with consecutive indices
//! 3. The tree is built and every proof re-verified against the new root
//! 4. The creator confirms; the root goes to the ledger and links to claimants
//! 5. A claimant's link is parsed, re-derived and verified before submission

use anchor_lang::declare_id;

declare_id!("gdrpGjVffourzkdDRrQmySw4aTHr8a3xmQzzxSwFD1a");

pub mod constants;
pub mod error;
pub mod event;
pub mod logging;
pub mod operations;
pub mod state;
pub mod utils;

#[cfg(test)]
pub mod test;

pub use error::{ClaimError, Result};
pub use operations::*;
pub use state::*;
pub use utils::{Digest, MerkleProof, MerkleTree};
