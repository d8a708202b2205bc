use std::collections::HashMap;
use std::str::FromStr;

use anchor_lang::prelude::Pubkey;
use tracing::trace;

use crate::constants::*;
use crate::error::{ClaimError, Result};
use crate::state::{GatingMode, Pin};
use crate::utils::find_program_address;

/// Derives the gated identity of a handle.
///
/// Implementations must be pure: the same `(seed, handle, pin)` always yields
/// the same address.
pub trait AddressDeriver {
    fn derive(&self, seed: &Pubkey, handle: &str, pin: Pin) -> Result<Pubkey>;
}

/**
 * Program address deriver
 *
 * Derives the identity with the ledger's program-address derivation:
 *   seeds = [seed (32), handle split into 32-byte chunks..., pin (u32 LE)]
 *
 * The ledger accepts at most 16 seeds including the bump, which bounds the
 * handle to `MAX_HANDLE_LEN` bytes.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramAddressDeriver {
    pub program_id: Pubkey,
}

impl ProgramAddressDeriver {
    pub fn new(program_id: Pubkey) -> Self {
        Self { program_id }
    }
}

impl Default for ProgramAddressDeriver {
    fn default() -> Self {
        Self::new(crate::ID)
    }
}

impl AddressDeriver for ProgramAddressDeriver {
    fn derive(&self, seed: &Pubkey, handle: &str, pin: Pin) -> Result<Pubkey> {
        if handle.trim().is_empty() {
            return Err(ClaimError::handle(handle, "empty handle"));
        }
        if handle.len() > MAX_HANDLE_LEN {
            return Err(ClaimError::handle(
                handle,
                format!(
                    "{} bytes exceeds the {} byte derivation limit",
                    handle.len(),
                    MAX_HANDLE_LEN
                ),
            ));
        }

        let pin = pin.to_le_bytes();
        let mut seeds: Vec<&[u8]> = Vec::with_capacity(MAX_SEEDS);
        seeds.push(seed.as_ref());
        seeds.extend(handle.as_bytes().chunks(MAX_SEED_LEN));
        seeds.push(&pin);

        Ok(find_program_address(&seeds, &self.program_id)?.address)
    }
}

/// Caller-owned cache of parsed direct-mode addresses.
#[derive(Debug, Clone, Default)]
pub struct AddressBook {
    entries: HashMap<String, Pubkey>,
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `handle` as an address, reusing an earlier parse when present.
    pub fn lookup(&mut self, handle: &str) -> Result<Pubkey> {
        if let Some(address) = self.entries.get(handle) {
            return Ok(*address);
        }
        let address = Pubkey::from_str(handle.trim())
            .map_err(|e| ClaimError::handle(handle, format!("not a wallet address: {}", e)))?;
        self.entries.insert(handle.to_string(), address);
        Ok(address)
    }

    pub fn get(&self, handle: &str) -> Option<&Pubkey> {
        self.entries.get(handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/**
 * Claimant identity resolver
 *
 * Maps a handle to the 32-byte identity hashed into its leaf:
 * - Direct mode: the handle parsed as an address. If a redeemer is asserted
 *   it must be that address.
 * - Gated mode: `deriver.derive(seed, handle, pin)`.
 *
 * Failures only concern the handle being resolved.
 */
pub struct IdentityResolver<'a, D: AddressDeriver + ?Sized> {
    mode: GatingMode,
    seed: Pubkey,
    deriver: &'a D,
    book: &'a mut AddressBook,
}

impl<'a, D: AddressDeriver + ?Sized> IdentityResolver<'a, D> {
    pub fn new(mode: GatingMode, seed: Pubkey, deriver: &'a D, book: &'a mut AddressBook) -> Self {
        Self {
            mode,
            seed,
            deriver,
            book,
        }
    }

    pub fn mode(&self) -> GatingMode {
        self.mode
    }

    /**
     * Resolves the identity of one handle
     *
     * @param handle - Wallet address or off-ledger handle
     * @param pin - Gating pin, required in gated mode
     * @param redeemer - Address asserted by the party redeeming the claim
     */
    pub fn resolve(
        &mut self,
        handle: &str,
        pin: Option<Pin>,
        redeemer: Option<&Pubkey>,
    ) -> Result<Pubkey> {
        match self.mode {
            GatingMode::Direct => {
                let identity = self.book.lookup(handle)?;
                if let Some(redeemer) = redeemer {
                    if *redeemer != identity {
                        return Err(ClaimError::IdentityMismatch {
                            expected: identity.to_string(),
                            asserted: redeemer.to_string(),
                        });
                    }
                }
                Ok(identity)
            }
            GatingMode::Gated => {
                let pin = pin.ok_or_else(|| {
                    ClaimError::input(format!("gated handle {:?} has no pin", handle))
                })?;
                let identity = self.deriver.derive(&self.seed, handle, pin)?;
                trace!("Derived gated identity {} for handle {:?}", identity, handle);
                Ok(identity)
            }
        }
    }
}
