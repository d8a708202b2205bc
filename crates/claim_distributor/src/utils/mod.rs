pub mod address;
pub mod hash;
pub mod merkle;
pub mod pubkey_serde;
pub mod token;

pub use address::*;
pub use hash::*;
pub use merkle::*;
pub use token::*;
