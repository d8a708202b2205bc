pub mod claim_state;
pub mod claimant_state;
pub mod distribution_state;

pub use claim_state::*;
pub use claimant_state::*;
pub use distribution_state::*;
