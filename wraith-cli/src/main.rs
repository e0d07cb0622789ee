//! Wraith CLI
//!
//! Command-line interface for the Wraith dual-key stealth address protocol.

use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wraith_core::constants::{DOMAIN_MESSAGE, SIGNATURE_SIZE};
use wraith_core::traits::BreadcrumbSource;
use wraith_core::types::{BreadcrumbRecord, LedgerAddress, MetaAddress};
use wraith_crypto::{derive_meta_address, derive_meta_keys, verify_signature};
use wraith_registry::{FileRegistry, MemoryRegistry};
use wraith_scanner::{CancelToken, ScanReport, Scanner, ScannerConfig};
use wraith_stealth::{StealthPaymentBuilder, StealthWallet};

mod config;

use config::CliConfig;

/// Wraith - Dual-Key Stealth Addresses for Ed25519 Ledgers
#[derive(Parser)]
#[command(name = "wraith")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the message a wallet must sign to derive Wraith keys
    Message,

    /// Derive the meta-address from a wallet signature
    Keys {
        /// 64-byte signature over the domain message (hex or base58)
        #[arg(short, long, env = "WRAITH_SIGNATURE", hide_env_values = true)]
        signature: String,
        /// Also print the scan and spend seeds
        #[arg(long)]
        show_seeds: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Build a stealth payment to a meta-address
    Pay {
        /// Recipient meta-address (wraith:<scan>:<spend>)
        #[arg(long)]
        to: String,
        /// Amount in base units
        #[arg(long)]
        amount: u64,
        /// Sender account (base58)
        #[arg(long)]
        sender: String,
        /// Settlement account receiving the funds (base58)
        #[arg(long)]
        settlement: String,
        /// Local label for the payment (never published)
        #[arg(long)]
        label: Option<String>,
        /// Record the breadcrumb in this registry file
        #[arg(long)]
        registry: Option<PathBuf>,
        /// Transaction reference to record (defaults to a local placeholder)
        #[arg(long)]
        tx_ref: Option<String>,
    },

    /// Scan a breadcrumb registry for payments
    Scan {
        /// 64-byte signature over the domain message (hex or base58)
        #[arg(short, long, env = "WRAITH_SIGNATURE", hide_env_values = true)]
        signature: String,
        /// Registry file to scan
        #[arg(short, long)]
        registry: Option<PathBuf>,
        /// Worker threads
        #[arg(short, long)]
        workers: Option<usize>,
        /// Candidates per batch
        #[arg(long)]
        batch_size: Option<usize>,
        /// Stop after this many matches
        #[arg(long)]
        stop_after: Option<usize>,
        /// Only scan records at or after this Unix timestamp
        #[arg(long)]
        from: Option<u64>,
        /// Only scan records at or before this Unix timestamp
        #[arg(long)]
        to: Option<u64>,
        /// Sign this challenge with every recovered stealth key
        #[arg(long)]
        prove: Option<String>,
        /// Print the recovered stealth key pairs (base58, 64 bytes)
        #[arg(long)]
        show_keys: bool,
    },

    /// Run benchmarks
    Bench {
        /// Number of breadcrumbs to generate
        #[arg(short, long, default_value = "10000")]
        count: usize,
        /// Worker threads
        #[arg(short, long)]
        workers: Option<usize>,
    },
}

impl Commands {
    /// Whether the command reads registry or scan settings from the environment.
    fn uses_env_config(&self) -> bool {
        matches!(self, Commands::Scan { .. } | Commands::Bench { .. })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before parsing so `env =` flags can see it
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let config = if cli.command.uses_env_config() {
        CliConfig::from_env().context("Invalid environment configuration")?
    } else {
        CliConfig::default()
    };

    // Initialize logging
    let filter = if cli.verbose {
        "wraith=debug,info"
    } else {
        "wraith=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    debug!(?config, "Loaded configuration");

    match cli.command {
        Commands::Message => cmd_message(),
        Commands::Keys {
            signature,
            show_seeds,
            json,
        } => cmd_keys(&signature, show_seeds, json),
        Commands::Pay {
            to,
            amount,
            sender,
            settlement,
            label,
            registry,
            tx_ref,
        } => {
            let payment = PayArgs {
                to,
                amount,
                sender,
                settlement,
                label,
                tx_ref,
            };
            cmd_pay(payment, registry.as_deref()).await
        }
        Commands::Scan {
            signature,
            registry,
            workers,
            batch_size,
            stop_after,
            from,
            to,
            prove,
            show_keys,
        } => {
            let registry_path = registry.unwrap_or_else(|| config.registry_path.clone());
            let mut scan_config = ScannerConfig::new()
                .batch_size(batch_size.unwrap_or(config.scan_batch_size));
            if let Some(workers) = workers.or(config.scan_workers) {
                scan_config = scan_config.workers(workers);
            }
            if let Some(n) = stop_after {
                scan_config = scan_config.stop_after(n);
            }
            scan_config.from_timestamp = from;
            scan_config.to_timestamp = to;

            cmd_scan(
                &signature,
                &registry_path,
                &scan_config,
                prove.as_deref(),
                show_keys,
            )
            .await
        }
        Commands::Bench { count, workers } => {
            cmd_bench(count, workers.or(config.scan_workers)).await
        }
    }
}

/// Print the domain message
fn cmd_message() -> Result<()> {
    let message = std::str::from_utf8(DOMAIN_MESSAGE).context("Domain message is not UTF-8")?;
    println!("{}", "✍️  Sign this message with your wallet:".cyan().bold());
    println!("\n   {}\n", message.yellow());
    println!("   Then pass the 64-byte signature to `wraith keys --signature <hex|base58>`.");
    println!("   Re-signing the same message always rebuilds the same keys.");
    Ok(())
}

/// Derive and display the meta-address
fn cmd_keys(signature: &str, show_seeds: bool, json: bool) -> Result<()> {
    let signature = parse_signature(signature)?;
    let seeds = derive_meta_keys(&signature).context("Failed to derive meta-keys")?;
    let meta = derive_meta_address(&seeds);

    if json {
        let mut keys_json = serde_json::json!({
            "metaAddress": meta.encode(),
            "scanPublicKey": meta.scan_public_key.to_base58(),
            "spendPublicKey": meta.spend_public_key.to_base58(),
        });
        if show_seeds {
            keys_json["scanSeed"] = hex::encode(seeds.scan_seed()).into();
            keys_json["spendSeed"] = hex::encode(seeds.spend_seed()).into();
        }
        println!("{}", serde_json::to_string_pretty(&keys_json)?);
        return Ok(());
    }

    println!("{}", "🔑 Wraith meta-address".cyan().bold());
    println!("\n   {}", meta.encode().green());
    println!("\n   {} {}", "Scan key: ".dimmed(), meta.scan_public_key);
    println!("   {} {}", "Spend key:".dimmed(), meta.spend_public_key);

    if show_seeds {
        println!("\n{}", "⚠️  SECRET seed material:".red().bold());
        println!("   {} {}", "Scan seed: ".dimmed(), hex::encode(seeds.scan_seed()));
        println!("   {} {}", "Spend seed:".dimmed(), hex::encode(seeds.spend_seed()));
        println!("   Anyone holding these can recognise and claim your payments.");
    } else {
        println!("\n   Publish the meta-address. Seeds stay in memory only.");
    }

    Ok(())
}

/// Arguments for building a payment.
struct PayArgs {
    to: String,
    amount: u64,
    sender: String,
    settlement: String,
    label: Option<String>,
    tx_ref: Option<String>,
}

/// Build a stealth payment
async fn cmd_pay(args: PayArgs, registry_path: Option<&Path>) -> Result<()> {
    println!("{} {}", "💸 Creating stealth payment to:".cyan().bold(), args.to);

    let recipient = MetaAddress::decode(&args.to).context("Invalid recipient meta-address")?;
    let sender = LedgerAddress::from_base58(&args.sender).context("Invalid sender account")?;
    let settlement =
        LedgerAddress::from_base58(&args.settlement).context("Invalid settlement account")?;

    let mut builder = StealthPaymentBuilder::new()
        .recipient(recipient)
        .amount(args.amount)
        .sender(sender)
        .settlement(settlement);
    if let Some(label) = args.label {
        builder = builder.memo_label(label);
    }

    let payment = builder.build().context("Failed to build stealth payment")?;

    println!("\n{}", "✅ Stealth payment created:".green().bold());
    println!("   {} {}", "Stealth address:".yellow(), payment.stealth_address);
    println!("   {} {}", "Breadcrumb:     ".dimmed(), payment.breadcrumb.to_base58());
    println!("   {} {}", "Amount:         ".dimmed(), payment.amount);
    if let Some(label) = &payment.label {
        println!("   {} {}", "Label:          ".dimmed(), label);
    }

    println!("\n{}", "📋 Instructions (JSON):".yellow().bold());
    println!("{}", serde_json::to_string_pretty(&payment.instructions)?);

    if let Some(path) = registry_path {
        let tx_ref = args
            .tx_ref
            .unwrap_or_else(|| format!("local-{}", payment.breadcrumb.to_base58()));
        let record = payment.to_record(tx_ref, unix_now());

        let registry = FileRegistry::new(path)
            .await
            .context("Failed to open registry file")?;
        let id = registry
            .publish(record)
            .await
            .context("Failed to record breadcrumb")?;
        registry.save().await.context("Failed to save registry")?;

        println!(
            "\n   {} #{} in {}",
            "Breadcrumb recorded as".green(),
            id,
            path.display()
        );
    } else {
        println!("\n{}", "ℹ️  Next steps:".cyan());
        println!("   1. Submit both instructions in one transaction");
        println!("   2. The recipient finds it by scanning indexed memos");
    }

    Ok(())
}

/// Scan a registry for payments
async fn cmd_scan(
    signature: &str,
    registry_path: &Path,
    config: &ScannerConfig,
    prove: Option<&str>,
    show_keys: bool,
) -> Result<()> {
    println!("{}", "🔎 Scanning for payments...".cyan().bold());

    let wallet = StealthWallet::from_signature(&parse_signature(signature)?)
        .context("Failed to derive wallet from signature")?;
    println!("   {} {}", "Meta-address:".dimmed(), wallet.meta_address());

    if !registry_path.exists() {
        bail!("Registry file not found: {}", registry_path.display());
    }
    println!("   Loading registry from: {}", registry_path.display());
    let registry = FileRegistry::new(registry_path)
        .await
        .context("Failed to load registry file")?;

    let records = registry.all().await?;
    if records.is_empty() {
        println!("\n{}", "⚠️  Registry is empty. No breadcrumbs to scan.".yellow());
        return Ok(());
    }

    let report = scan_with_bar(&Scanner::from_wallet(&wallet), &records, config)?;
    print_report(&report);

    for payment in &report.payments {
        println!("\n   {} {}", "Address:".green(), payment.stealth_address);
        println!("      {} {}", "Tx:".dimmed(), payment.tx_ref);
        println!("      {} {}", "Time:".dimmed(), payment.timestamp);

        if show_keys {
            let keypair = bs58::encode(payment.keypair.to_keypair_bytes()).into_string();
            println!("      {} {}", "Key pair:".red(), keypair);
        }

        if let Some(challenge) = prove {
            let proof = payment.prove_control(challenge.as_bytes());
            verify_signature(&payment.stealth_address, challenge.as_bytes(), &proof)
                .context("Proof of control failed to verify")?;
            println!("      {} {}", "Proof:".dimmed(), bs58::encode(proof).into_string());
        }
    }

    Ok(())
}

/// Run benchmarks
async fn cmd_bench(count: usize, workers: Option<usize>) -> Result<()> {
    println!("{} {} breadcrumbs", "📊 Benchmarking with".cyan().bold(), count);

    // Derive keys
    println!("\n{}", "1. Deriving keys...".dimmed());
    let start = Instant::now();
    let ours = StealthWallet::from_signature(&random_signature())?;
    let theirs = StealthWallet::from_signature(&random_signature())?;
    println!("   ✓ Key derivation: {:?}", start.elapsed() / 2);

    // Create breadcrumbs
    println!("\n{}", "2. Creating payments...".dimmed());
    let registry = MemoryRegistry::with_capacity(count);
    let sender = LedgerAddress::from_array([0x11; 32]);
    let settlement = LedgerAddress::from_array([0x22; 32]);

    let pb = ProgressBar::new(count as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("   [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let mut expected = 0usize;
    for i in 0..count {
        // Mix of our payments and someone else's
        let recipient = if i % 100 == 0 {
            expected += 1;
            ours.meta_address()
        } else {
            theirs.meta_address()
        };

        let payment = StealthPaymentBuilder::new()
            .recipient(recipient.clone())
            .amount(1 + i as u64)
            .sender(sender)
            .settlement(settlement)
            .build()?;
        registry
            .publish(payment.to_record(format!("bench-{}", i), i as u64))
            .await?;
        pb.inc(1);
    }
    pb.finish_and_clear();
    println!("   ✓ Created {} payments: {:?}", count, start.elapsed());

    // Scan
    println!("\n{}", "3. Scanning...".dimmed());
    let mut config = ScannerConfig::new();
    if let Some(workers) = workers {
        config = config.workers(workers);
    }
    println!("   Workers: {}", config.workers);

    let records = registry.all().await?;
    let report = scan_with_bar(&Scanner::from_wallet(&ours), &records, &config)?;
    let summary = report.summary();

    println!("\n{}", "📈 Results:".green().bold());
    println!("   Scan rate: {:.0} breadcrumbs/sec", summary.rate);
    if count > 0 {
        println!(
            "   Time per breadcrumb: {:.2}µs",
            summary.duration_ms as f64 * 1_000.0 / count as f64
        );
    }

    if report.payments.len() == expected {
        println!("   {} All {} expected payments found!", "✅".green(), expected);
    } else {
        println!(
            "   {} Expected {}, found {}",
            "❌".red(),
            expected,
            report.payments.len()
        );
    }

    Ok(())
}

fn scan_with_bar(
    scanner: &Scanner,
    records: &[BreadcrumbRecord],
    config: &ScannerConfig,
) -> Result<ScanReport> {
    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let bar = pb.clone();
    let report = scanner
        .scan_with_progress(
            records,
            config,
            &CancelToken::new(),
            Box::new(move |progress| bar.set_position(progress.scanned)),
        )
        .context("Scan failed")?;

    pb.finish_and_clear();
    Ok(report)
}

fn print_report(report: &ScanReport) {
    let summary = report.summary();
    println!(
        "\n   Scanned {} breadcrumbs in {} ms ({:.0}/sec)",
        summary.total_scanned, summary.duration_ms, summary.rate
    );
    if summary.skipped_invalid > 0 {
        println!(
            "   {} {} malformed breadcrumb(s) skipped",
            "⚠️".yellow(),
            summary.skipped_invalid
        );
    }

    if report.no_match_found() {
        println!("\n{}", "No payments found.".yellow());
    } else {
        println!("\n{} {} payment(s) found:", "✅".green(), report.matched);
    }
}

/// Accepts a 64-byte signature as hex (with or without `0x`) or base58.
fn parse_signature(input: &str) -> Result<Vec<u8>> {
    let trimmed = input.trim();
    let hex_body = trimmed.strip_prefix("0x").unwrap_or(trimmed);

    let bytes = if hex_body.len() == SIGNATURE_SIZE * 2
        && hex_body.chars().all(|c| c.is_ascii_hexdigit())
    {
        hex::decode(hex_body).context("Invalid hex signature")?
    } else {
        bs58::decode(trimmed)
            .into_vec()
            .context("Signature is neither hex nor base58")?
    };

    if bytes.len() != SIGNATURE_SIZE {
        bail!(
            "Signature must be {} bytes, got {}",
            SIGNATURE_SIZE,
            bytes.len()
        );
    }
    Ok(bytes)
}

fn random_signature() -> [u8; SIGNATURE_SIZE] {
    let mut signature = [0u8; SIGNATURE_SIZE];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut signature);
    signature
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
