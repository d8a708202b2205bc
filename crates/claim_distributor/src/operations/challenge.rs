use std::fmt;

use anchor_lang::prelude::Pubkey;
use tracing::{info, warn};

use crate::error::{ClaimError, Result};
use crate::state::GatingMode;

/// Outcome of an interactive step: an identity challenge or the creator's
/// confirmation of a distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Approval<T> {
    Approved(T),
    Cancelled,
    Failed(String),
}

impl<T> Approval<T> {
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Approval<U> {
        match self {
            Self::Approved(value) => Approval::Approved(f(value)),
            Self::Cancelled => Approval::Cancelled,
            Self::Failed(reason) => Approval::Failed(reason),
        }
    }

    pub fn approved(self) -> Option<T> {
        match self {
            Self::Approved(value) => Some(value),
            _ => None,
        }
    }

    /// Challenge outcome as a `Result`
    pub fn into_challenge_result(self) -> Result<T> {
        match self {
            Self::Approved(value) => Ok(value),
            Self::Cancelled => Err(ClaimError::ChallengeCancelled),
            Self::Failed(reason) => Err(ClaimError::ChallengeFailed { reason }),
        }
    }

    /// Creation confirmation as a `Result`; a failed confirmation counts as declined
    pub fn into_creation_result(self) -> Result<T> {
        match self {
            Self::Approved(value) => Ok(value),
            Self::Cancelled => Err(ClaimError::Cancelled),
            Self::Failed(reason) => {
                warn!("Distribution confirmation failed: {}", reason);
                Err(ClaimError::Cancelled)
            }
        }
    }
}

/// Signature returned by the temporal signer once the claimant has proven
/// control of the handle. Travels as base58.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ApprovalToken([u8; 64]);

impl ApprovalToken {
    pub fn new(signature: [u8; 64]) -> Self {
        Self(signature)
    }

    pub fn from_base58(value: &str) -> Result<Self> {
        let bytes = bs58::decode(value.trim())
            .into_vec()
            .map_err(|e| ClaimError::ChallengeFailed {
                reason: format!("could not decode approval signature: {}", e),
            })?;
        let signature: [u8; 64] =
            bytes.try_into().map_err(|bytes: Vec<u8>| ClaimError::ChallengeFailed {
                reason: format!("approval signature is {} bytes, expected 64", bytes.len()),
            })?;
        Ok(Self(signature))
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl fmt::Debug for ApprovalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApprovalToken({})", self.to_base58())
    }
}

impl fmt::Display for ApprovalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

/// Data handed to the challenge channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeRequest {
    /// Handle the one-time code is delivered to
    pub handle: String,
    pub distributor: Pubkey,
    /// Serialized claim transaction message the temporal signer co-signs
    pub transaction: Vec<u8>,
}

/// Out-of-band identity challenge (OTP by email, SMS or chat).
pub trait ChallengeChannel {
    fn challenge(&mut self, request: &ChallengeRequest) -> Approval<ApprovalToken>;
}

/// Whether claims of a distribution need a temporal co-signature.
///
/// Direct claimants sign for their own identity, and a default temporal key
/// disables the check on the ledger.
pub fn challenge_required(mode: GatingMode, temporal: &Pubkey) -> bool {
    mode.needs_pin() && *temporal != Pubkey::default()
}

/**
 * Runs the identity challenge for one claim when the distribution needs it
 *
 * @param channel - Delivery channel of the one-time code
 * @param request - Handle and transaction to approve
 * @param mode - Gating mode of the distribution
 * @param temporal - Temporal signer stored in the distributor
 *
 * Returns `None` when no co-signature is needed.
 */
pub fn run_challenge<C: ChallengeChannel + ?Sized>(
    channel: &mut C,
    request: &ChallengeRequest,
    mode: GatingMode,
    temporal: &Pubkey,
) -> Result<Option<ApprovalToken>> {
    if !challenge_required(mode, temporal) {
        return Ok(None);
    }

    info!("Requesting identity challenge for distributor {}", request.distributor);
    let token = channel.challenge(request).into_challenge_result()?;
    Ok(Some(token))
}
