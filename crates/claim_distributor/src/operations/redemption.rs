use std::collections::HashMap;
use std::str::FromStr;

use anchor_lang::prelude::Pubkey;
use url::Url;

use crate::constants::*;
use crate::error::{ClaimError, Result};
use crate::state::{Allocation, DistributionMethod, Pin};
use crate::utils::Digest;

/// Integration-specific part of a redemption link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedemptionTerms {
    /// `tokenAcc` and `mint`
    Transfer { token_account: Pubkey, mint: Pubkey },
    /// `config` and `uuid`
    Candy { config: Pubkey, uuid: String },
    /// `master` and `edition`
    Edition { master_mint: Pubkey, edition: u64 },
}

impl RedemptionTerms {
    /// Address written into the leaf
    pub fn anchor(&self) -> Pubkey {
        match self {
            Self::Transfer { mint, .. } => *mint,
            Self::Candy { config, .. } => *config,
            Self::Edition { master_mint, .. } => *master_mint,
        }
    }
}

/**
 * Redemption reference
 *
 * Everything a claimant needs to replay a claim without the claimant list:
 *
 *   {host}/claim?distributor=..&method=..&handle=..&amount=..&index=..
 *       &leaves=..&proof=<b58,b58,..>&pin=<n|NA>&<integration params>
 *
 * `seed` is only written when the gating seed differs from the anchor.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redemption {
    pub distributor: Pubkey,
    pub method: DistributionMethod,
    pub handle: String,
    pub amount: u64,
    pub index: u64,
    pub leaf_count: u64,
    pub proof: Vec<Digest>,
    pub pin: Option<Pin>,
    pub seed: Option<Pubkey>,
    pub terms: RedemptionTerms,
}

impl Redemption {
    /// Allocation committed by this redemption
    pub fn allocation(&self) -> Allocation {
        match self.terms {
            RedemptionTerms::Edition { edition, .. } => Allocation::Edition {
                amount: self.amount,
                edition,
            },
            _ => Allocation::Fungible { amount: self.amount },
        }
    }

    /// Gating seed, falling back to the anchor
    pub fn seed(&self) -> Pubkey {
        self.seed.unwrap_or_else(|| self.terms.anchor())
    }

    /// Render the link under `host`.
    pub fn to_url(&self, host: &str) -> Result<String> {
        let mut url = Url::parse(host)
            .map_err(|e| ClaimError::input(format!("invalid host {:?}: {}", host, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClaimError::input(format!("host {:?} cannot carry a path", host)))?
            .pop_if_empty()
            .push(CLAIM_PATH);

        let proof = self
            .proof
            .iter()
            .map(|hash| bs58::encode(hash).into_string())
            .collect::<Vec<_>>()
            .join(",");
        let pin = self
            .pin
            .map(|pin| pin.value().to_string())
            .unwrap_or_else(|| NO_PIN.to_string());

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("distributor", &self.distributor.to_string())
                .append_pair("method", self.method.as_str())
                .append_pair("handle", &self.handle)
                .append_pair("amount", &self.amount.to_string())
                .append_pair("index", &self.index.to_string())
                .append_pair("leaves", &self.leaf_count.to_string())
                .append_pair("proof", &proof)
                .append_pair("pin", &pin);
            if let Some(seed) = &self.seed {
                query.append_pair("seed", &seed.to_string());
            }
            match &self.terms {
                RedemptionTerms::Transfer { token_account, mint } => {
                    query
                        .append_pair("tokenAcc", &token_account.to_string())
                        .append_pair("mint", &mint.to_string());
                }
                RedemptionTerms::Candy { config, uuid } => {
                    query
                        .append_pair("config", &config.to_string())
                        .append_pair("uuid", uuid);
                }
                RedemptionTerms::Edition { master_mint, edition } => {
                    query
                        .append_pair("master", &master_mint.to_string())
                        .append_pair("edition", &edition.to_string());
                }
            }
        }

        Ok(url.into())
    }

    /// Parse a link produced by [`Redemption::to_url`].
    pub fn parse(link: &str) -> Result<Self> {
        let url = Url::parse(link.trim())
            .map_err(|e| ClaimError::redemption(format!("invalid url: {}", e)))?;
        let params = QueryParams(url.query_pairs().into_owned().collect());

        let method_raw = params.required("method")?;
        let method = DistributionMethod::parse(method_raw)
            .ok_or_else(|| ClaimError::redemption(format!("unknown method {:?}", method_raw)))?;

        let proof_raw = params.required("proof")?;
        let proof = if proof_raw.is_empty() {
            Vec::new()
        } else {
            proof_raw.split(',').map(decode_proof_hash).collect::<Result<Vec<_>>>()?
        };

        let pin = match params.required("pin")? {
            NO_PIN => None,
            raw => Some(Pin::new(parse_number(raw, "pin")?)),
        };

        let terms = if params.get("tokenAcc").is_some() {
            RedemptionTerms::Transfer {
                token_account: params.address("tokenAcc")?,
                mint: params.address("mint")?,
            }
        } else if params.get("config").is_some() {
            RedemptionTerms::Candy {
                config: params.address("config")?,
                uuid: params.required("uuid")?.to_string(),
            }
        } else if params.get("master").is_some() {
            RedemptionTerms::Edition {
                master_mint: params.address("master")?,
                edition: parse_number(params.required("edition")?, "edition")?,
            }
        } else {
            return Err(ClaimError::redemption("no claim integration parameters"));
        };

        let seed = match params.get("seed") {
            Some(_) => Some(params.address("seed")?),
            None => None,
        };

        Ok(Self {
            distributor: params.address("distributor")?,
            method,
            handle: params.required("handle")?.to_string(),
            amount: parse_number(params.required("amount")?, "amount")?,
            index: parse_number(params.required("index")?, "index")?,
            leaf_count: parse_number(params.required("leaves")?, "leaves")?,
            proof,
            pin,
            seed,
            terms,
        })
    }
}

struct QueryParams(HashMap<String, String>);

impl QueryParams {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    fn required(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| ClaimError::redemption(format!("missing parameter {:?}", key)))
    }

    fn address(&self, key: &str) -> Result<Pubkey> {
        let raw = self.required(key)?;
        Pubkey::from_str(raw)
            .map_err(|e| ClaimError::redemption(format!("invalid {} {:?}: {}", key, raw, e)))
    }
}

fn parse_number<T: FromStr>(raw: &str, key: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| ClaimError::redemption(format!("invalid {} {:?}", key, raw)))
}

fn decode_proof_hash(raw: &str) -> Result<Digest> {
    let bytes = bs58::decode(raw)
        .into_vec()
        .map_err(|e| ClaimError::redemption(format!("invalid proof hash {:?}: {}", raw, e)))?;
    bytes
        .try_into()
        .map_err(|bytes: Vec<u8>| {
            ClaimError::redemption(format!("proof hash is {} bytes, expected 32", bytes.len()))
        })
}
