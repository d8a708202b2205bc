use std::collections::HashSet;

use anchor_lang::prelude::Pubkey;
use tracing::{debug, error, info};

use crate::error::{ClaimError, Result};
use crate::event::*;
use crate::operations::{
    encode_leaf, verify_payload, AddressBook, AddressDeriver, Approval, IdentityResolver,
    Redemption, RedemptionTerms,
};
use crate::state::*;
use crate::utils::{digest_hex, distributor_address, source_token_account, Digest, MerkleTree};

/**
 * Built distribution
 *
 * Output of the assembler: the data for the distributor initialization, one
 * claim per accepted claimant (index order) and the records that were dropped.
 */
#[derive(Debug, Clone)]
pub struct Distribution {
    pub init: DistributorInit,
    pub claims: Vec<Claim>,
    pub rejected: Vec<RejectedClaimant>,
    tree: MerkleTree,
}

impl Distribution {
    pub fn root(&self) -> Digest {
        self.init.root
    }

    pub fn leaf_count(&self) -> u64 {
        self.init.leaf_count
    }

    pub fn tree(&self) -> &MerkleTree {
        &self.tree
    }

    /// Entries of the `urls.json` artifact
    pub fn url_entries(&self) -> Vec<UrlEntry> {
        self.claims.iter().map(UrlEntry::from).collect()
    }
}

/**
 * Validates a claimant list before any identity is resolved
 *
 * Distribution-wide errors abort the build:
 * - Empty list
 * - Mixed gating modes, or pins that disagree with the configured method
 * - Zero amount
 * - Allocation kind that does not match the integration
 * - Edition of zero or duplicate edition
 */
pub fn validate_claimants(claimants: &[ClaimantRecord], config: &DistributionConfig) -> Result<()> {
    if claimants.is_empty() {
        return Err(ClaimError::input("claimant list is empty"));
    }

    let pinned = claimants.iter().filter(|c| c.pin.is_some()).count();
    if pinned != 0 && pinned != claimants.len() {
        return Err(ClaimError::input(format!(
            "mixed gating modes: {} of {} claimants carry a pin",
            pinned,
            claimants.len()
        )));
    }
    let needs_pin = config.gating_mode().needs_pin();
    if needs_pin != (pinned != 0) {
        return Err(ClaimError::input(format!(
            "method {} {} pins",
            config.method,
            if needs_pin { "requires" } else { "does not take" }
        )));
    }

    let mut editions = HashSet::new();
    for (position, claimant) in claimants.iter().enumerate() {
        if claimant.allocation.amount() == 0 {
            return Err(ClaimError::input(format!("claimant {} has a zero amount", position)));
        }
        if !config.integration.accepts(&claimant.allocation) {
            return Err(ClaimError::input(format!(
                "claimant {} allocation does not fit the {} integration",
                position,
                config.integration.as_str()
            )));
        }
        if let Allocation::Edition { edition, .. } = claimant.allocation {
            if edition == 0 {
                return Err(ClaimError::input(format!("claimant {} has edition 0", position)));
            }
            if !editions.insert(edition) {
                return Err(ClaimError::input(format!(
                    "claimant {} repeats edition {}",
                    position, edition
                )));
            }
        }
    }

    Ok(())
}

/**
 * Builds a distribution from a claimant list
 *
 * @param claimants - Records in submission order
 * @param config - Distribution parameters
 * @param deriver - Gated identity derivation
 * @param book - Cache of parsed direct-mode addresses
 *
 * Process:
 * 1. Validate the list (distribution-wide errors abort)
 * 2. Resolve identities; records with a bad handle are rejected individually
 * 3. Encode leaves with consecutive indices and build the tree
 * 4. Generate every proof and re-verify it against the new root
 * 5. Render the redemption links
 */
pub fn build_distribution<D: AddressDeriver + ?Sized>(
    claimants: &[ClaimantRecord],
    config: &DistributionConfig,
    deriver: &D,
    book: &mut AddressBook,
) -> Result<Distribution> {
    validate_claimants(claimants, config)?;

    // ===== IDENTITY PHASE =====

    let mode = config.gating_mode();
    let mut resolver = IdentityResolver::new(mode, config.seed(), deriver, book);
    let mut accepted: Vec<(&ClaimantRecord, Pubkey)> = Vec::with_capacity(claimants.len());
    let mut rejected = Vec::new();

    for (position, claimant) in claimants.iter().enumerate() {
        match resolver.resolve(&claimant.handle, claimant.pin, None) {
            Ok(identity) => accepted.push((claimant, identity)),
            Err(err) if err.is_per_claimant() => {
                let rejection = RejectedClaimant {
                    position,
                    handle: claimant.handle.clone(),
                    reason: err.to_string(),
                };
                ClaimantRejected {
                    position,
                    handle: rejection.handle.clone(),
                    reason: rejection.reason.clone(),
                }
                .emit();
                rejected.push(rejection);
            }
            Err(err) => return Err(err),
        }
    }

    if accepted.is_empty() {
        return Err(ClaimError::input(format!(
            "all {} claimants were rejected",
            claimants.len()
        )));
    }

    // ===== TREE PHASE =====

    let anchor = config.integration.anchor();
    let leaves: Vec<Vec<u8>> = accepted
        .iter()
        .enumerate()
        .map(|(index, (claimant, identity))| {
            encode_leaf(index as u64, identity, &anchor, &claimant.allocation)
        })
        .collect();

    let tree = MerkleTree::new(&leaves)?;
    let root = tree.root();
    let leaf_count = tree.leaf_count() as u64;
    let proofs = tree.proofs()?;

    let total_amount = accepted
        .iter()
        .try_fold(0u64, |total, (claimant, _)| total.checked_add(claimant.allocation.amount()))
        .ok_or_else(|| ClaimError::input("total amount overflows u64"))?;

    let distributor = distributor_address(&config.base)?;
    info!(
        "Committed {} claimants ({} rejected) to root {} for distributor {}",
        leaf_count,
        rejected.len(),
        digest_hex(&root),
        distributor.address
    );

    // ===== ASSEMBLY PHASE =====

    let seed = config.seed();
    let url_seed = (seed != anchor).then_some(seed);
    let mut claims = Vec::with_capacity(accepted.len());

    for ((claimant, identity), proof) in accepted.into_iter().zip(proofs) {
        let payload = ClaimPayload {
            index: proof.leaf_index,
            identity,
            amount: claimant.allocation.amount(),
            edition: claimant.allocation.edition(),
            leaf_count,
            proof: proof.siblings,
        };

        // Every claim must verify against the root about to be published
        verify_payload(&payload, &anchor, &root).map_err(|err| {
            error!("Claim {} failed self-verification: {}", payload.index, err);
            ClaimError::consistency(format!(
                "claim {} failed self-verification: {}",
                payload.index, err
            ))
        })?;

        let terms = match &config.integration {
            Integration::Transfer { mint, wallet } => RedemptionTerms::Transfer {
                token_account: source_token_account(wallet, mint),
                mint: *mint,
            },
            Integration::Candy { config, uuid } => RedemptionTerms::Candy {
                config: *config,
                uuid: uuid.clone(),
            },
            Integration::Edition { master_mint } => RedemptionTerms::Edition {
                master_mint: *master_mint,
                edition: claimant.allocation.edition().unwrap_or_default(),
            },
        };
        let redemption = Redemption {
            distributor: distributor.address,
            method: config.method,
            handle: claimant.handle.clone(),
            amount: payload.amount,
            index: payload.index,
            leaf_count,
            proof: payload.proof.clone(),
            pin: claimant.pin,
            seed: url_seed,
            terms,
        };
        let url = redemption.to_url(&config.host)?;

        ClaimAssembled {
            distributor: distributor.address,
            index: payload.index,
            identity: payload.identity,
            amount: payload.amount,
        }
        .emit();
        debug!("Assembled claim {} for {:?}", payload.index, claimant.handle);

        claims.push(Claim {
            handle: claimant.handle.clone(),
            amount: payload.amount,
            url,
            payload,
        });
    }

    let init = DistributorInit {
        distributor: distributor.address,
        bump: distributor.bump,
        root,
        leaf_count,
        temporal: config.temporal(),
        total_amount,
    };

    DistributionBuilt {
        distributor: init.distributor,
        root,
        leaf_count,
        rejected: rejected.len(),
        total_amount,
    }
    .emit();

    Ok(Distribution {
        init,
        claims,
        rejected,
        tree,
    })
}

/**
 * Builds a distribution and asks the creator to confirm it
 *
 * The confirmation sees the finished distribution (root, claims, rejected
 * records) before anything is published. A declined or failed confirmation
 * discards it.
 */
pub fn create_distribution<D, F>(
    claimants: &[ClaimantRecord],
    config: &DistributionConfig,
    deriver: &D,
    book: &mut AddressBook,
    confirm: F,
) -> Result<Approval<Distribution>>
where
    D: AddressDeriver + ?Sized,
    F: FnOnce(&Distribution) -> Approval<()>,
{
    let distribution = build_distribution(claimants, config, deriver, book)?;
    let approval = confirm(&distribution);
    if !approval.is_approved() {
        info!("Distribution {} was not confirmed", distribution.init.distributor);
    }
    Ok(approval.map(|()| distribution))
}
