use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClaimError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimError {
    // Distribution-wide input errors (abort the whole build)
    #[error("Malformed claimant list: {reason}")]
    MalformedInput { reason: String },

    // Per-claimant identity errors (isolated to one record)
    #[error("Malformed handle {handle:?}: {reason}")]
    MalformedHandle { handle: String, reason: String },
    #[error("Redeemer {asserted} does not match claim identity {expected}")]
    IdentityMismatch { expected: String, asserted: String },
    #[error("Address derivation failed: {reason}")]
    DerivationFailed { reason: String },

    // Merkle proof errors
    #[error(
        "Proof verification failed for index {index}: expected root {expected}, computed {computed}"
    )]
    ProofVerificationFailed {
        index: u64,
        expected: String,
        computed: String,
    },
    #[error("Tree consistency violation: {reason}")]
    TreeConsistencyViolation { reason: String },

    // Redemption reference errors
    #[error("Malformed redemption reference: {reason}")]
    MalformedRedemption { reason: String },

    // Gating and confirmation outcomes
    #[error("Identity challenge cancelled")]
    ChallengeCancelled,
    #[error("Identity challenge failed: {reason}")]
    ChallengeFailed { reason: String },
    #[error("Distribution creation cancelled")]
    Cancelled,
}

impl ClaimError {
    pub(crate) fn input(reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn handle(handle: &str, reason: impl Into<String>) -> Self {
        Self::MalformedHandle {
            handle: handle.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn consistency(reason: impl Into<String>) -> Self {
        Self::TreeConsistencyViolation {
            reason: reason.into(),
        }
    }

    pub(crate) fn redemption(reason: impl Into<String>) -> Self {
        Self::MalformedRedemption {
            reason: reason.into(),
        }
    }

    /// Whether the error only invalidates a single claimant record.
    pub fn is_per_claimant(&self) -> bool {
        matches!(
            self,
            Self::MalformedHandle { .. }
                | Self::IdentityMismatch { .. }
                | Self::DerivationFailed { .. }
        )
    }
}
