//! walletkit — command line entry point for the wallet manager core.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};

use walletkit_types::{
    ClientTransferRecord, DisconnectReason, DisconnectReasonType, NetworkType, TransferBundle,
    TransferStateType, WalletManagerStateType, WireEnum,
};
use walletkit_utils::LogFormat;
use walletkit_wallet_core::{TransferRecord, WalletCoreError, WalletKitConfig, WalletManager};

#[derive(Parser)]
#[command(name = "walletkit", about = "Transfer bundle reconciliation tool")]
struct Cli {
    /// Network: btc, bch, bsv, eth, xrp, hbar or xtz.
    /// When a config file is provided, defaults to the file's network value.
    #[arg(long, env = "WALLETKIT_NETWORK")]
    network: Option<String>,

    /// The wallet's own addresses (comma-separated or repeated).
    #[arg(long = "address", env = "WALLETKIT_ADDRESSES", value_delimiter = ',')]
    addresses: Vec<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "WALLETKIT_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "WALLETKIT_LOG_FORMAT")]
    log_format: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Reconcile a JSON array of transfer records and print the result.
    Reconcile {
        /// File containing the records.
        #[arg(long)]
        bundles: PathBuf,

        /// Current chain height (defaults to the highest block seen).
        #[arg(long)]
        height: Option<u64>,
    },
    /// Decode a wire value into its tag.
    Decode {
        #[arg(long, value_enum)]
        kind: TagKind,

        value: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TagKind {
    Network,
    TransferState,
    DisconnectReason,
    ManagerState,
}

#[derive(Serialize)]
struct TransferReport {
    #[serde(flatten)]
    record: TransferRecord,
    confirmations: Option<u64>,
    is_final: bool,
}

#[derive(Serialize)]
struct Report {
    network: NetworkType,
    block_height: u64,
    balance: String,
    rejected: usize,
    transfers: Vec<TransferReport>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => WalletKitConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => WalletKitConfig::default(),
    };
    if let Some(ref network) = cli.network {
        config.network = network.parse::<NetworkType>()?;
    }
    if !cli.addresses.is_empty() {
        config.addresses = cli.addresses.clone();
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }

    let format: LogFormat = config.log_format.parse()?;
    walletkit_utils::init_tracing_with(format, &config.log_level)?;

    match cli.command {
        Command::Reconcile { bundles, height } => reconcile(&config, &bundles, height).await,
        Command::Decode { kind, value } => {
            println!("{}", decode(kind, value)?);
            Ok(())
        }
    }
}

fn decode(kind: TagKind, value: u32) -> anyhow::Result<String> {
    let tag = match kind {
        TagKind::Network => NetworkType::from_wire(value)?.to_string(),
        TagKind::TransferState => TransferStateType::from_wire(value)?.to_string(),
        TagKind::DisconnectReason => DisconnectReasonType::from_wire(value)?.to_string(),
        TagKind::ManagerState => WalletManagerStateType::from_wire(value)?.to_string(),
    };
    Ok(tag)
}

async fn reconcile(
    config: &WalletKitConfig,
    path: &Path,
    height: Option<u64>,
) -> anyhow::Result<()> {
    anyhow::ensure!(
        !config.addresses.is_empty(),
        "no wallet addresses configured; pass --address or set them in the config file"
    );
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let records: Vec<ClientTransferRecord> =
        serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?;
    tracing::info!(count = records.len(), file = %path.display(), "loaded transfer records");

    let (manager, mut events) = WalletManager::in_memory(config);
    let logger = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            tracing::debug!(?event, "wallet manager event");
        }
    });

    manager.connect()?;
    manager.sync()?;

    let mut rejected = 0;
    let mut highest = 0;
    for (index, record) in records.into_iter().enumerate() {
        let bundle = match TransferBundle::try_from(record) {
            Ok(bundle) => bundle,
            Err(e) => {
                tracing::warn!(index, error = %e, "rejected transfer record");
                rejected += 1;
                continue;
            }
        };
        highest = highest.max(bundle.block_height().unwrap_or(0));
        match manager.recover_transfer(bundle) {
            Ok(_) => {}
            Err(WalletCoreError::UnrelatedTransfer { .. }) => rejected += 1,
            Err(e) => return Err(e.into()),
        }
    }
    manager.sync_completed(height.unwrap_or(highest))?;

    let mut transfers = Vec::new();
    for record in manager.transfers()? {
        transfers.push(TransferReport {
            confirmations: manager.confirmations(&record)?,
            is_final: manager.is_final(&record)?,
            record,
        });
    }
    let report = Report {
        network: manager.network(),
        block_height: manager.block_height()?,
        balance: manager.balance()?.to_string(),
        rejected,
        transfers,
    };

    manager.disconnect(DisconnectReason::Requested)?;
    drop(manager);
    logger.await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
