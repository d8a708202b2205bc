pub mod build_distribution;
pub mod challenge;
pub mod encode_leaf;
pub mod redemption;
pub mod resolve_identity;
pub mod verify_claim;

pub use build_distribution::*;
pub use challenge::*;
pub use encode_leaf::*;
pub use redemption::*;
pub use resolve_identity::*;
pub use verify_claim::*;
