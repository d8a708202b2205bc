use anchor_lang::prelude::Pubkey;
use tracing::{debug, warn};

use crate::error::{ClaimError, Result};
use crate::operations::{encode_leaf, AddressBook, AddressDeriver, IdentityResolver, Redemption};
use crate::state::ClaimPayload;
use crate::utils::{hash_leaf, verify_or_err, Digest};

/**
 * Verifies a claim payload against a published root
 *
 * Re-encodes the leaf from the payload and replays the proof. This is the
 * same check the ledger performs; it is a sanity gate, the ledger stays
 * authoritative.
 *
 * @param payload - Claim to check
 * @param anchor - Mint, candy config or master mint of the distribution
 * @param root - Published root
 */
pub fn verify_payload(payload: &ClaimPayload, anchor: &Pubkey, root: &Digest) -> Result<()> {
    let leaf = encode_leaf(payload.index, &payload.identity, anchor, &payload.allocation());
    verify_or_err(&hash_leaf(&leaf), &payload.merkle_proof(), root)
}

/**
 * Verifies a redemption reference before it is submitted
 *
 * 1. Re-derive the claim identity from the handle (and pin in gated mode).
 *    In direct mode the redeemer, when given, must be the handle's address.
 * 2. Re-encode the leaf and replay the proof against `root`.
 *
 * @param redemption - Parsed redemption link
 * @param root - Root stored in the distributor
 * @param redeemer - Wallet about to submit the claim
 * @param deriver - Gated identity derivation
 * @param book - Cache of parsed direct-mode addresses
 *
 * Returns the payload to hand to the ledger.
 */
pub fn verify_redemption<D: AddressDeriver + ?Sized>(
    redemption: &Redemption,
    root: &Digest,
    redeemer: Option<&Pubkey>,
    deriver: &D,
    book: &mut AddressBook,
) -> Result<ClaimPayload> {
    let mode = redemption.method.gating_mode();
    if mode.needs_pin() != redemption.pin.is_some() {
        return Err(ClaimError::redemption(format!(
            "method {} {} a pin",
            redemption.method,
            if mode.needs_pin() { "requires" } else { "does not take" }
        )));
    }

    let identity = IdentityResolver::new(mode, redemption.seed(), deriver, book).resolve(
        &redemption.handle,
        redemption.pin,
        redeemer,
    )?;

    let allocation = redemption.allocation();
    let payload = ClaimPayload {
        index: redemption.index,
        identity,
        amount: allocation.amount(),
        edition: allocation.edition(),
        leaf_count: redemption.leaf_count,
        proof: redemption.proof.clone(),
    };

    if let Err(err) = verify_payload(&payload, &redemption.terms.anchor(), root) {
        warn!(
            "Claim {} of distributor {} did not verify: {}",
            payload.index, redemption.distributor, err
        );
        return Err(err);
    }

    debug!("Claim {} of distributor {} verified", payload.index, redemption.distributor);
    Ok(payload)
}
