// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Explorer CLI
//!
//! Runs one canonical explorer operation and prints the result as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use explorer_client::{ExplorerClient, ExplorerSettings};
use serde_json::{Value, json};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Query Insight and Iquidus blockchain explorers
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Settings file; `explorer.json` and `EXPLORER_*` variables are used otherwise
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Explorer provider (insight, iquidus)
    #[arg(long)]
    provider: Option<String>,

    /// Network (livenet, testnet)
    #[arg(long)]
    network: Option<String>,

    /// Explorer URL, comma-separated for several hosts
    #[arg(long)]
    url: Option<String>,

    /// Fixed fee rate per kilobyte
    #[arg(long)]
    fee_per_kb: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the provider, network and hosts
    Info,
    /// Current chain tip height
    Height,
    /// Unspent outputs of one or more addresses
    Utxos {
        /// Addresses to query
        #[arg(required = true)]
        addresses: Vec<String>,
        /// Use the single-address endpoint, which computes confirmations from the tip
        #[arg(long)]
        single: bool,
    },
    /// Fetch a transaction by id
    Tx {
        /// Transaction id
        txid: String,
    },
    /// Transaction history of addresses
    Txs {
        /// Addresses to query
        #[arg(required = true)]
        addresses: Vec<String>,
        /// First item index
        #[arg(long)]
        from: Option<u64>,
        /// Last item index, exclusive
        #[arg(long)]
        to: Option<u64>,
    },
    /// Whether an address has been used
    Activity {
        /// Address to query
        address: String,
    },
    /// Fee rate per kilobyte for confirmation targets
    Fee {
        /// Confirmation targets in blocks
        #[arg(value_delimiter = ',', default_values_t = [1, 2, 6])]
        targets: Vec<u32>,
    },
    /// Transaction ids contained in a block
    BlockTxids {
        /// Block hash
        hash: String,
    },
    /// Broadcast a raw transaction
    Broadcast {
        /// Raw transaction hex
        rawtx: String,
    },
}

impl Cli {
    fn settings(&self) -> Result<ExplorerSettings> {
        let mut settings = match &self.settings {
            Some(path) => ExplorerSettings::load_from_file(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?,
            None => ExplorerSettings::load().context("failed to load explorer settings")?,
        };

        if let Some(provider) = &self.provider {
            settings.provider.clone_from(provider);
        }
        if let Some(network) = &self.network {
            settings.network.clone_from(network);
        }
        if self.url.is_some() {
            settings.url.clone_from(&self.url);
        }
        if self.fee_per_kb.is_some() {
            settings.fee_per_kb = self.fee_per_kb;
        }
        Ok(settings)
    }
}

async fn run(client: &ExplorerClient, command: Command) -> Result<Value> {
    let output = match command {
        Command::Info => json!({
            "connection": client.connection_info(),
            "network": client.network(),
            "provider": client.config().dialect.provider,
            "hosts": client.config().hosts,
        }),
        Command::Height => json!(client.get_blockchain_height().await?),
        Command::Utxos { addresses, single } => {
            if single {
                let mut utxos = Vec::new();
                for address in &addresses {
                    utxos.extend(client.get_utxos_for_address(address).await?);
                }
                serde_json::to_value(utxos)?
            } else {
                serde_json::to_value(client.get_utxos(&addresses).await?)?
            }
        }
        Command::Tx { txid } => client.get_transaction(&txid).await?.unwrap_or(Value::Null),
        Command::Txs { addresses, from, to } => {
            serde_json::to_value(client.get_transactions(&addresses, from, to).await?)?
        }
        Command::Activity { address } => json!(client.get_address_activity(&address).await?),
        Command::Fee { targets } => serde_json::to_value(client.estimate_fee(&targets).await?)?,
        Command::BlockTxids { hash } => json!(client.get_txids_in_block(&hash).await?),
        Command::Broadcast { rawtx } => json!({ "txid": client.broadcast(&rawtx).await? }),
    };
    Ok(output)
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = cli.settings()?;
    let client = settings.create_client()?;
    info!(connection = %client.connection_info(), "explorer client ready");

    let output = run(&client, cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn fee_targets_default_and_split() {
        let cli = Cli::parse_from(["explorer-cli", "fee"]);
        assert!(matches!(cli.command, Command::Fee { ref targets } if targets == &[1, 2, 6]));

        let cli = Cli::parse_from(["explorer-cli", "--provider", "iquidus", "fee", "3,12"]);
        assert_eq!(cli.provider.as_deref(), Some("iquidus"));
        assert!(matches!(cli.command, Command::Fee { ref targets } if targets == &[3, 12]));
    }

    #[test]
    fn utxos_requires_an_address() {
        assert!(Cli::try_parse_from(["explorer-cli", "utxos"]).is_err());
        let cli = Cli::try_parse_from(["explorer-cli", "utxos", "--single", "A", "B"]).unwrap();
        assert!(matches!(cli.command, Command::Utxos { single: true, ref addresses } if addresses.len() == 2));
    }
}
