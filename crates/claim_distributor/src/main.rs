use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anchor_lang::prelude::Pubkey;
use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::Rng;
use serde::Serialize;

use claim_distributor::logging::{self, LogLevel};
use claim_distributor::utils::{
    claim_count_address, claim_status_address, digest_hex, distributor_wallet_address,
    parse_digest_hex,
};
use claim_distributor::{
    create_distribution, verify_redemption, AddressBook, Approval, ClaimantRecord, Distribution,
    DistributionConfig, Pin, ProgramAddressDeriver, Redemption, RedemptionTerms, RejectedClaimant,
};

#[derive(Parser, Debug)]
#[command(name = "claim-distributor")]
#[command(about = "Build and verify Merkle claim distributions", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Commit a claimant list and write the redemption links
    Build(BuildArgs),
    /// Check a redemption link against a published root
    Verify(VerifyArgs),
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Claimant list (JSON array of { handle, amount, edition?, pin? })
    #[arg(short, long)]
    claimants: PathBuf,

    /// Distribution configuration (JSON)
    #[arg(long)]
    config: PathBuf,

    /// Directory receiving urls.json and distributor.json
    #[arg(short, long, default_value = ".")]
    out: PathBuf,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

#[derive(Args, Debug)]
struct VerifyArgs {
    /// Redemption link
    #[arg(short, long)]
    url: String,

    /// Published root (hex)
    #[arg(short, long)]
    root: String,

    /// Wallet about to redeem the claim
    #[arg(short, long)]
    wallet: Option<String>,
}

/// Contents of `distributor.json`.
#[derive(Serialize)]
struct DistributorSummary {
    distributor: String,
    bump: u8,
    wallet: String,
    root: String,
    leaf_count: u64,
    temporal: String,
    total_amount: u64,
    rejected: Vec<RejectedClaimant>,
}

impl DistributorSummary {
    fn new(distribution: &Distribution) -> Result<Self> {
        let wallet = distributor_wallet_address(&distribution.init.distributor)?;
        Ok(Self {
            distributor: distribution.init.distributor.to_string(),
            bump: distribution.init.bump,
            wallet: wallet.address.to_string(),
            root: digest_hex(&distribution.init.root),
            leaf_count: distribution.init.leaf_count,
            temporal: distribution.init.temporal.to_string(),
            total_amount: distribution.init.total_amount,
            rejected: distribution.rejected.clone(),
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        LogLevel::quiet()
    } else {
        LogLevel::from_verbosity(cli.verbose)
    };
    logging::try_init(level, false).map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    match cli.command {
        Commands::Build(args) => build(args),
        Commands::Verify(args) => verify(args),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {:?}", path))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    fs::write(path, rendered).with_context(|| format!("Failed to write {:?}", path))
}

/// Gated lists submitted without pins get a random pin per claimant.
fn assign_pins(claimants: &mut [ClaimantRecord], config: &DistributionConfig) {
    if !config.gating_mode().needs_pin() || claimants.iter().any(|c| c.pin.is_some()) {
        return;
    }
    let mut rng = rand::thread_rng();
    for claimant in claimants.iter_mut() {
        claimant.pin = Some(Pin::new(rng.gen()));
    }
}

fn prompt_confirmation(distribution: &Distribution) -> Approval<()> {
    print!(
        "Create distributor {} with {} claims ({} rejected), root {}? [y/N] ",
        distribution.init.distributor,
        distribution.claims.len(),
        distribution.rejected.len(),
        digest_hex(&distribution.init.root),
    );
    if let Err(e) = io::stdout().flush() {
        return Approval::Failed(e.to_string());
    }

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) if matches!(answer.trim(), "y" | "Y" | "yes") => Approval::Approved(()),
        Ok(_) => Approval::Cancelled,
        Err(e) => Approval::Failed(e.to_string()),
    }
}

fn build(args: BuildArgs) -> Result<()> {
    let config: DistributionConfig = read_json(&args.config)?;
    let mut claimants: Vec<ClaimantRecord> = read_json(&args.claimants)?;
    assign_pins(&mut claimants, &config);

    let deriver = ProgramAddressDeriver::default();
    let mut book = AddressBook::new();
    let yes = args.yes;
    let approval = create_distribution(&claimants, &config, &deriver, &mut book, |distribution| {
        if yes {
            Approval::Approved(())
        } else {
            prompt_confirmation(distribution)
        }
    })?;
    let distribution = approval.into_creation_result()?;

    fs::create_dir_all(&args.out).with_context(|| format!("Failed to create {:?}", args.out))?;
    write_json(&args.out.join("urls.json"), &distribution.url_entries())?;
    write_json(&args.out.join("distributor.json"), &DistributorSummary::new(&distribution)?)?;

    println!("Distributor: {}", distribution.init.distributor);
    println!("Merkle root: 0x{}", digest_hex(&distribution.root()));
    println!("Claims: {} ({} rejected)", distribution.claims.len(), distribution.rejected.len());
    Ok(())
}

fn verify(args: VerifyArgs) -> Result<()> {
    let redemption = Redemption::parse(&args.url)?;
    let root = match parse_digest_hex(&args.root) {
        Some(root) => root,
        None => bail!("Invalid root {:?}", args.root),
    };
    let wallet = args
        .wallet
        .as_deref()
        .map(Pubkey::from_str)
        .transpose()
        .context("Invalid wallet address")?;

    let payload = verify_redemption(
        &redemption,
        &root,
        wallet.as_ref(),
        &ProgramAddressDeriver::default(),
        &mut AddressBook::new(),
    )?;

    let claim_account = match redemption.terms {
        RedemptionTerms::Transfer { .. } => {
            claim_status_address(payload.index, &redemption.distributor)?
        }
        RedemptionTerms::Candy { .. } | RedemptionTerms::Edition { .. } => {
            claim_count_address(payload.index, &redemption.distributor)?
        }
    };

    println!("Claim {} verified", payload.index);
    println!("Claim account: {}", claim_account.address);
    println!("Identity: {}", payload.identity);
    println!("Amount: {}", payload.amount);
    if let Some(edition) = payload.edition {
        println!("Edition: {}", edition);
    }
    Ok(())
}
