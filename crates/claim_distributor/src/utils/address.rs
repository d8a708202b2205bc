use anchor_lang::prelude::Pubkey;

use crate::constants::*;
use crate::error::{ClaimError, Result};

/// A program address together with its bump seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramAddress {
    pub address: Pubkey,
    pub bump: u8,
}

/// Derive a program address, mapping an exhausted bump search or an
/// oversized seed list to `DerivationFailed`.
pub fn find_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<ProgramAddress> {
    if let Some(seed) = seeds.iter().find(|seed| seed.len() > MAX_SEED_LEN) {
        return Err(ClaimError::DerivationFailed {
            reason: format!("seed of {} bytes exceeds {} bytes", seed.len(), MAX_SEED_LEN),
        });
    }
    Pubkey::try_find_program_address(seeds, program_id)
        .map(|(address, bump)| ProgramAddress { address, bump })
        .ok_or_else(|| ClaimError::DerivationFailed {
            reason: format!("no program address for {} seeds under {}", seeds.len(), program_id),
        })
}

/// Distributor account
/// - Derived from: ["MerkleDistributor", base]
pub fn distributor_address(base: &Pubkey) -> Result<ProgramAddress> {
    find_program_address(&[DISTRIBUTOR_SEED.as_bytes(), base.as_ref()], &crate::ID)
}

/// Claim status of a transfer claim
/// - Derived from: ["ClaimStatus", index_le, distributor]
pub fn claim_status_address(index: u64, distributor: &Pubkey) -> Result<ProgramAddress> {
    find_program_address(
        &[CLAIM_STATUS_SEED.as_bytes(), &index.to_le_bytes(), distributor.as_ref()],
        &crate::ID,
    )
}

/// Claim count of a candy or edition claim
/// - Derived from: ["ClaimCount", index_le, distributor]
pub fn claim_count_address(index: u64, distributor: &Pubkey) -> Result<ProgramAddress> {
    find_program_address(
        &[CLAIM_COUNT_SEED.as_bytes(), &index.to_le_bytes(), distributor.as_ref()],
        &crate::ID,
    )
}

/// Distributor wallet that holds rent and candy payments
/// - Derived from: ["Wallet", distributor]
pub fn distributor_wallet_address(distributor: &Pubkey) -> Result<ProgramAddress> {
    find_program_address(&[WALLET_SEED.as_bytes(), distributor.as_ref()], &crate::ID)
}
