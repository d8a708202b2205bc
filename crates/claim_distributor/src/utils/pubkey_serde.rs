//! Serde adapters that render addresses as base58 strings.

use std::str::FromStr;

use anchor_lang::prelude::Pubkey;
use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

pub fn serialize<S: Serializer>(
    key: &Pubkey,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(key)
}

pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Pubkey, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Pubkey::from_str(raw.trim())
        .map_err(|e| D::Error::custom(format!("invalid address {:?}: {}", raw, e)))
}

pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(
        key: &Option<Pubkey>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        match key {
            Some(key) => serializer.collect_str(key),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Option<Pubkey>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| {
                Pubkey::from_str(raw.trim())
                    .map_err(|e| D::Error::custom(format!("invalid address {:?}: {}", raw, e)))
            })
            .transpose()
    }
}
