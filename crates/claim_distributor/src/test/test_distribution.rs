use anchor_lang::prelude::Pubkey;
use std::str::FromStr;

use crate::constants::*;
use crate::error::{ClaimError, Result};
use crate::operations::*;
use crate::state::*;

const WALLETS: [&str; 3] = [
    "3gmBN8LBomg3sZEjTgp2YsECMYgJpjcT7xUfpnDB4gSs",
    "8G9xE8awr9vA2PZWFTJSHNhS16KLnXYdV6XEaJP1a2Yx",
    "A4mDtfFCkdt9CqGzEkfiSHhJD8d3bUMasVzwajudGtb2",
];

fn mint() -> Pubkey {
    Pubkey::from_str("4SX6nqv5VRLMoNfYM5phvHgcBNcBEwUEES4qPPjf1EqS").unwrap()
}

fn config(method: DistributionMethod, integration: Integration) -> DistributionConfig {
    DistributionConfig {
        host: "https://drop.example.com".to_string(),
        base: Pubkey::new_from_array([5u8; 32]),
        method,
        integration,
        seed: None,
        otp_auth: true,
        temporal: None,
    }
}

fn transfer_config(method: DistributionMethod) -> DistributionConfig {
    config(
        method,
        Integration::Transfer {
            mint: mint(),
            wallet: Pubkey::new_from_array([6u8; 32]),
        },
    )
}

fn wallet_claimants(amounts: [u64; 3]) -> Vec<ClaimantRecord> {
    WALLETS
        .iter()
        .zip(amounts)
        .map(|(wallet, amount)| ClaimantRecord::fungible(*wallet, amount, None))
        .collect()
}

fn build(claimants: &[ClaimantRecord], config: &DistributionConfig) -> Result<Distribution> {
    let deriver = ProgramAddressDeriver::default();
    build_distribution(claimants, config, &deriver, &mut AddressBook::new())
}

/// Deriver that refuses one handle.
struct RefusingDeriver {
    refused: &'static str,
}

impl AddressDeriver for RefusingDeriver {
    fn derive(&self, seed: &Pubkey, handle: &str, pin: Pin) -> Result<Pubkey> {
        if handle == self.refused {
            return Err(ClaimError::DerivationFailed {
                reason: "no valid bump".to_string(),
            });
        }
        ProgramAddressDeriver::default().derive(seed, handle, pin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_distribution() {
        crate::logging::init_test();
        let config = transfer_config(DistributionMethod::Wallets);
        let distribution = build(&wallet_claimants([10, 20, 30]), &config).unwrap();

        assert_eq!(distribution.claims.len(), 3);
        assert!(distribution.rejected.is_empty());
        assert_eq!(distribution.leaf_count(), 3);
        assert_eq!(distribution.init.total_amount, 60);
        assert_eq!(distribution.init.temporal, crate::ID);
        let distributor = crate::utils::distributor_address(&config.base).unwrap();
        assert_eq!(distribution.init.distributor, distributor.address);

        for (index, claim) in distribution.claims.iter().enumerate() {
            assert_eq!(claim.payload.index, index as u64);
            assert_eq!(claim.payload.identity, Pubkey::from_str(WALLETS[index]).unwrap());
            assert_eq!(claim.payload.leaf_count, 3);
            assert!(verify_payload(&claim.payload, &mint(), &distribution.root()).is_ok());
            assert!(claim.url.contains("pin=NA"));
            assert!(claim.url.starts_with("https://drop.example.com/claim?"));
        }
    }

    #[test]
    fn test_deterministic_distribution() {
        let config = transfer_config(DistributionMethod::Wallets);
        let first = build(&wallet_claimants([10, 20, 30]), &config).unwrap();
        let second = build(&wallet_claimants([10, 20, 30]), &config).unwrap();
        assert_eq!(first.root(), second.root());
        assert_eq!(first.url_entries(), second.url_entries());
    }

    #[test]
    fn test_amount_change_invalidates_claim() {
        let config = transfer_config(DistributionMethod::Wallets);
        let original = build(&wallet_claimants([10, 20, 30]), &config).unwrap();
        let changed = build(&wallet_claimants([10, 21, 30]), &config).unwrap();

        assert_ne!(original.root(), changed.root());

        // Claimant 1's old claim no longer matches the published root
        let stale = &original.claims[1].payload;
        assert!(matches!(
            verify_payload(stale, &mint(), &changed.root()),
            Err(ClaimError::ProofVerificationFailed { index: 1, .. })
        ));

        // Claimant 0's old proof embeds claimant 1's old leaf
        assert!(verify_payload(&original.claims[0].payload, &mint(), &changed.root()).is_err());
        assert!(verify_payload(&changed.claims[0].payload, &mint(), &changed.root()).is_ok());
    }

    #[test]
    fn test_rejected_claimant_is_isolated() {
        let config = transfer_config(DistributionMethod::Wallets);
        let claimants = vec![
            ClaimantRecord::fungible(WALLETS[0], 10, None),
            ClaimantRecord::fungible("not-a-wallet", 20, None),
            ClaimantRecord::fungible(WALLETS[2], 30, None),
        ];
        let distribution = build(&claimants, &config).unwrap();

        assert_eq!(distribution.rejected.len(), 1);
        assert_eq!(distribution.rejected[0].position, 1);
        assert_eq!(distribution.rejected[0].handle, "not-a-wallet");

        // Accepted claimants keep consecutive indices
        assert_eq!(distribution.leaf_count(), 2);
        assert_eq!(distribution.claims[0].handle, WALLETS[0]);
        assert_eq!(distribution.claims[1].handle, WALLETS[2]);
        assert_eq!(distribution.claims[1].payload.index, 1);
        assert_eq!(distribution.init.total_amount, 40);
        for claim in &distribution.claims {
            assert!(verify_payload(&claim.payload, &mint(), &distribution.root()).is_ok());
        }
    }

    #[test]
    fn test_empty_handle_is_isolated() {
        let config = transfer_config(DistributionMethod::Wallets);
        let claimants = vec![
            ClaimantRecord::fungible(WALLETS[0], 10, None),
            ClaimantRecord::fungible("", 20, None),
            ClaimantRecord::fungible(WALLETS[2], 30, None),
        ];
        let distribution = build(&claimants, &config).unwrap();
        assert_eq!(distribution.claims.len(), 2);
        assert_eq!(distribution.rejected.len(), 1);
        assert_eq!(distribution.rejected[0].position, 1);

        let gated = transfer_config(DistributionMethod::Manual);
        let claimants = vec![
            ClaimantRecord::fungible("alice", 1, Some(Pin::new(1))),
            ClaimantRecord::fungible("  ", 1, Some(Pin::new(2))),
        ];
        let distribution = build(&claimants, &gated).unwrap();
        assert_eq!(distribution.claims.len(), 1);
        assert_eq!(distribution.rejected[0].handle, "  ");
    }

    #[test]
    fn test_derivation_failure_is_isolated() {
        let config = transfer_config(DistributionMethod::AwsEmail);
        let claimants = vec![
            ClaimantRecord::fungible("alice@example.com", 5, Some(Pin::new(1))),
            ClaimantRecord::fungible("bob@example.com", 5, Some(Pin::new(987654))),
        ];
        let deriver = RefusingDeriver {
            refused: "bob@example.com",
        };
        let distribution =
            build_distribution(&claimants, &config, &deriver, &mut AddressBook::new()).unwrap();

        assert_eq!(distribution.claims.len(), 1);
        assert_eq!(distribution.rejected.len(), 1);
        assert_eq!(distribution.rejected[0].handle, "bob@example.com");
        assert!(!format!("{:?}", distribution.rejected).contains("987654"));
    }

    #[test]
    fn test_all_rejected_fails() {
        let config = transfer_config(DistributionMethod::Wallets);
        let claimants = vec![ClaimantRecord::fungible("nope", 1, None)];
        assert!(matches!(build(&claimants, &config), Err(ClaimError::MalformedInput { .. })));
    }

    #[test]
    fn test_gated_distribution() {
        let config = config(
            DistributionMethod::AwsEmail,
            Integration::Candy {
                config: mint(),
                uuid: "abc123".to_string(),
            },
        );
        let claimants = vec![
            ClaimantRecord::fungible("alice@example.com", 1, Some(Pin::new(1111))),
            ClaimantRecord::fungible("bob@example.com", 2, Some(Pin::new(2222))),
            ClaimantRecord::fungible("carol@example.com", 3, Some(Pin::new(3333))),
        ];
        let distribution = build(&claimants, &config).unwrap();
        let deriver = ProgramAddressDeriver::default();

        assert_eq!(distribution.init.temporal, OTP_TEMPORAL_SIGNER);
        for (claim, claimant) in distribution.claims.iter().zip(&claimants) {
            let expected = deriver
                .derive(&mint(), &claimant.handle, claimant.pin.unwrap())
                .unwrap();
            assert_eq!(claim.payload.identity, expected);
            assert!(claim.url.contains("uuid=abc123"));
            assert!(claim.url.contains(&format!("pin={}", claimant.pin.unwrap().value())));
        }
    }

    #[test]
    fn test_temporal_signer_selection() {
        let mut config = transfer_config(DistributionMethod::Discord);
        assert_eq!(config.temporal(), OTP_TEMPORAL_SIGNER);
        config.otp_auth = false;
        assert_eq!(config.temporal(), Pubkey::default());
        config.temporal = Some(Pubkey::new_from_array([8u8; 32]));
        assert_eq!(config.temporal(), Pubkey::new_from_array([8u8; 32]));

        let direct = transfer_config(DistributionMethod::Wallets);
        assert_eq!(direct.temporal(), crate::ID);
    }

    #[test]
    fn test_validation_errors() {
        let wallets = transfer_config(DistributionMethod::Wallets);
        let gated = transfer_config(DistributionMethod::Manual);
        let edition = config(
            DistributionMethod::Manual,
            Integration::Edition { master_mint: mint() },
        );

        let cases: Vec<(&str, Vec<ClaimantRecord>, &DistributionConfig)> = vec![
            ("empty list", vec![], &wallets),
            (
                "mixed pins",
                vec![
                    ClaimantRecord::fungible("a", 1, Some(Pin::new(1))),
                    ClaimantRecord::fungible("b", 1, None),
                ],
                &gated,
            ),
            (
                "pins in direct mode",
                vec![ClaimantRecord::fungible(WALLETS[0], 1, Some(Pin::new(1)))],
                &wallets,
            ),
            ("no pins in gated mode", vec![ClaimantRecord::fungible("a", 1, None)], &gated),
            ("zero amount", vec![ClaimantRecord::fungible(WALLETS[0], 0, None)], &wallets),
            ("edition zero", vec![ClaimantRecord::edition("a", 1, 0, Some(Pin::new(1)))], &edition),
            (
                "duplicate edition",
                vec![
                    ClaimantRecord::edition("a", 1, 4, Some(Pin::new(1))),
                    ClaimantRecord::edition("b", 1, 4, Some(Pin::new(2))),
                ],
                &edition,
            ),
            (
                "fungible in edition",
                vec![ClaimantRecord::fungible("a", 1, Some(Pin::new(1)))],
                &edition,
            ),
            (
                "edition in transfer",
                vec![ClaimantRecord::edition("a", 1, 1, Some(Pin::new(1)))],
                &gated,
            ),
        ];

        for (name, claimants, config) in cases {
            let result = build(&claimants, config);
            println!("{}: {:?}", name, result.as_ref().err());
            assert!(
                matches!(result, Err(ClaimError::MalformedInput { .. })),
                "{} should be rejected as malformed input",
                name
            );
        }
    }

    #[test]
    fn test_edition_distribution() {
        let config = config(
            DistributionMethod::Manual,
            Integration::Edition { master_mint: mint() },
        );
        let claimants = vec![
            ClaimantRecord::edition("alice", 1, 1, Some(Pin::new(10))),
            ClaimantRecord::edition("bob", 3, 2, Some(Pin::new(20))),
        ];
        let distribution = build(&claimants, &config).unwrap();

        assert_eq!(distribution.claims[1].payload.edition, Some(2));
        assert_eq!(distribution.claims[1].payload.amount, 3);
        assert!(distribution.claims[1].url.contains("edition=2"));
        for claim in &distribution.claims {
            assert!(verify_payload(&claim.payload, &mint(), &distribution.root()).is_ok());
        }
    }

    #[test]
    fn test_confirmation() {
        let config = transfer_config(DistributionMethod::Wallets);
        let claimants = wallet_claimants([1, 2, 3]);

        let approval = create_distribution(
            &claimants,
            &config,
            &ProgramAddressDeriver::default(),
            &mut AddressBook::new(),
            |_| Approval::Cancelled,
        )
        .unwrap();
        assert!(matches!(approval, Approval::Cancelled));
        assert_eq!(approval.into_creation_result().unwrap_err(), ClaimError::Cancelled);

        let approval = create_distribution(
            &claimants,
            &config,
            &ProgramAddressDeriver::default(),
            &mut AddressBook::new(),
            |distribution| {
                assert_eq!(distribution.claims.len(), 3);
                Approval::Approved(())
            },
        )
        .unwrap();
        assert_eq!(approval.approved().map(|d| d.leaf_count()), Some(3));
    }

    #[test]
    fn test_config_and_claimants_from_json() {
        let raw_config = r#"{
            "host": "https://drop.example.com",
            "base": "3gmBN8LBomg3sZEjTgp2YsECMYgJpjcT7xUfpnDB4gSs",
            "method": "aws-email",
            "integration": {
                "type": "transfer",
                "mint": "4SX6nqv5VRLMoNfYM5phvHgcBNcBEwUEES4qPPjf1EqS",
                "wallet": "8G9xE8awr9vA2PZWFTJSHNhS16KLnXYdV6XEaJP1a2Yx"
            }
        }"#;
        let config: DistributionConfig = serde_json::from_str(raw_config).unwrap();
        assert_eq!(config.method, DistributionMethod::AwsEmail);
        assert_eq!(config.seed(), mint());
        assert!(config.otp_auth);
        assert_eq!(config.temporal(), OTP_TEMPORAL_SIGNER);

        let raw_claimants = r#"[
            { "handle": "alice@example.com", "amount": 3, "pin": 1234 },
            { "handle": "bob@example.com", "amount": 1, "edition": 9, "pin": 99 }
        ]"#;
        let claimants: Vec<ClaimantRecord> = serde_json::from_str(raw_claimants).unwrap();
        assert_eq!(claimants[0].allocation, Allocation::Fungible { amount: 3 });
        assert_eq!(claimants[1].allocation, Allocation::Edition { amount: 1, edition: 9 });
        assert_eq!(claimants[0].pin, Some(Pin::new(1234)));

        let bad = raw_config.replace("aws-email", "pigeon");
        assert!(serde_json::from_str::<DistributionConfig>(&bad).is_err());
    }

    #[test]
    fn test_payload_borsh_layout() {
        let config = transfer_config(DistributionMethod::Wallets);
        let distribution = build(&wallet_claimants([10, 20, 30]), &config).unwrap();
        let payload = &distribution.claims[2].payload;
        let bytes = anchor_lang::prelude::borsh::to_vec(payload).unwrap();

        assert_eq!(&bytes[..8], &2u64.to_le_bytes());
        assert_eq!(&bytes[8..40], payload.identity.as_ref());
        assert_eq!(&bytes[40..48], &30u64.to_le_bytes());
        // edition: None, leaf_count, proof length prefix
        assert_eq!(bytes[48], 0);
        assert_eq!(&bytes[49..57], &3u64.to_le_bytes());
        assert_eq!(&bytes[57..61], &(payload.proof.len() as u32).to_le_bytes());
        assert_eq!(bytes.len(), 61 + 32 * payload.proof.len());
    }
}
