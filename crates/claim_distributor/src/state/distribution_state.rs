use std::fmt;

use anchor_lang::prelude::Pubkey;
use serde::{Deserialize, Serialize};

use crate::constants::OTP_TEMPORAL_SIGNER;
use crate::state::{Allocation, GatingMode};

/**
 * Distribution configuration
 *
 * Parameters shared by every claimant of one distribution. Loaded from JSON:
 *
 *   {
 *     "host": "https://example.com",
 *     "base": "<base address>",
 *     "method": "aws-email",
 *     "integration": { "type": "transfer", "mint": "...", "wallet": "..." },
 *     "seed": "<optional, defaults to the anchor>",
 *     "otp_auth": true,
 *     "temporal": "<optional temporal signer override>"
 *   }
 *
 * The `base` key seeds the distributor program address; it is the key that
 * signs the distributor initialization.
 */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionConfig {
    /// Site serving the claim page, without a trailing path
    pub host: String,
    /// Base key of the distributor program address
    #[serde(with = "crate::utils::pubkey_serde")]
    pub base: Pubkey,
    /// How handles are delivered their claim
    pub method: DistributionMethod,
    /// What the claim unlocks
    pub integration: Integration,
    /// Gating seed; defaults to the integration anchor
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::utils::pubkey_serde::option"
    )]
    pub seed: Option<Pubkey>,
    /// Whether gated claims require the hosted OTP signer
    #[serde(default = "default_otp_auth")]
    pub otp_auth: bool,
    /// Explicit temporal signer, overriding `otp_auth`
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::utils::pubkey_serde::option"
    )]
    pub temporal: Option<Pubkey>,
}

fn default_otp_auth() -> bool {
    true
}

impl DistributionConfig {
    pub fn gating_mode(&self) -> GatingMode {
        self.method.gating_mode()
    }

    /// Seed mixed into every gated identity of this distribution
    pub fn seed(&self) -> Pubkey {
        self.seed.unwrap_or_else(|| self.integration.anchor())
    }

    /// Key that must co-sign gated claims.
    ///
    /// Direct distributions use the program id; there the claimant's own
    /// signature satisfies the ledger's temporal check. Gated ones use the
    /// override, the hosted OTP signer, or the default key when OTP is disabled.
    pub fn temporal(&self) -> Pubkey {
        match self.gating_mode() {
            GatingMode::Direct => crate::ID,
            GatingMode::Gated => match self.temporal {
                Some(temporal) => temporal,
                None if self.otp_auth => OTP_TEMPORAL_SIGNER,
                None => Pubkey::default(),
            },
        }
    }
}

/// Delivery channel of the redemption links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistributionMethod {
    /// Handles are wallet addresses
    Wallets,
    AwsEmail,
    AwsSms,
    Discord,
    /// Links are handed out by the creator
    Manual,
}

impl DistributionMethod {
    pub fn gating_mode(&self) -> GatingMode {
        match self {
            Self::Wallets => GatingMode::Direct,
            Self::AwsEmail | Self::AwsSms | Self::Discord | Self::Manual => GatingMode::Gated,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wallets => "wallets",
            Self::AwsEmail => "aws-email",
            Self::AwsSms => "aws-sms",
            Self::Discord => "discord",
            Self::Manual => "manual",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "wallets" => Some(Self::Wallets),
            "aws-email" => Some(Self::AwsEmail),
            "aws-sms" => Some(Self::AwsSms),
            "discord" => Some(Self::Discord),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }
}

impl fmt::Display for DistributionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a successful claim unlocks on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Integration {
    /// Token transfer out of the creator's associated token account
    Transfer {
        #[serde(with = "crate::utils::pubkey_serde")]
        mint: Pubkey,
        /// Owner of the source token account
        #[serde(with = "crate::utils::pubkey_serde")]
        wallet: Pubkey,
    },
    /// Whitelisted candy machine mint slots
    Candy {
        #[serde(with = "crate::utils::pubkey_serde")]
        config: Pubkey,
        uuid: String,
    },
    /// Prints of a master edition
    Edition {
        #[serde(with = "crate::utils::pubkey_serde")]
        master_mint: Pubkey,
    },
}

impl Integration {
    /// Address written into every leaf of the distribution
    pub fn anchor(&self) -> Pubkey {
        match self {
            Self::Transfer { mint, .. } => *mint,
            Self::Candy { config, .. } => *config,
            Self::Edition { master_mint } => *master_mint,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transfer { .. } => "transfer",
            Self::Candy { .. } => "candy",
            Self::Edition { .. } => "edition",
        }
    }

    /// Edition distributions carry an edition per leaf; the others never do
    pub fn accepts(&self, allocation: &Allocation) -> bool {
        matches!(
            (self, allocation),
            (Self::Edition { .. }, Allocation::Edition { .. })
                | (Self::Transfer { .. } | Self::Candy { .. }, Allocation::Fungible { .. })
        )
    }
}
