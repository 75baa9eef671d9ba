//! Command-line interface for the chainwatch client

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use owo_colors::OwoColorize;
use serde_json::Value;
use tokio::signal;
use tracing::info;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::logging::init_logging;
use crate::socket::{consumer_kinds, BrokerSocket, EVENT_ERROR, EVENT_OPENED};

#[derive(Parser)]
#[command(name = "chainwatch", about = "Blockchain notification client", version)]
pub struct Cli {
    /// Path to a YAML configuration file
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Subscribe to broker notifications and print them
    Watch(WatchArgs),
    /// Query the balance of an address
    Balance(BalanceArgs),
    /// Query metadata of a registered token
    Token(TokenArgs),
}

#[derive(Args)]
pub struct WatchArgs {
    /// Consumer identifier echoed in every subscription request
    #[arg(long, default_value = "chainwatch")]
    pub consumer: String,

    /// Addresses to watch for transfers (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub transfers: Vec<String>,

    /// Addresses to watch for transactions (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub transactions: Vec<String>,

    /// Contract addresses or aliases to watch for events and transactions
    /// (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub contracts: Vec<String>,
}

#[derive(Args)]
pub struct BalanceArgs {
    /// Account address
    pub address: String,
}

#[derive(Args)]
pub struct TokenArgs {
    /// Token address or registered alias
    pub address_or_alias: String,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        init_logging(self.verbose)?;

        let config = match &self.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::default(),
        };

        match self.command {
            Command::Watch(args) => watch(config, args).await,
            Command::Balance(args) => balance(config, args).await,
            Command::Token(args) => token(config, args).await,
        }
    }
}

async fn watch(config: ClientConfig, args: WatchArgs) -> Result<()> {
    if args.transfers.is_empty() && args.transactions.is_empty() && args.contracts.is_empty() {
        return Err(anyhow::anyhow!(
            "Nothing to watch: provide --transfers, --transactions or --contracts"
        ));
    }

    let url = config.broker.ws_url();
    info!(%url, consumer = %args.consumer, "Connecting to broker");

    let socket = BrokerSocket::connect(&url, &args.consumer).await?;

    // one channel carries both outcomes of the open handshake
    let (ready_tx, mut ready_rx) = tokio::sync::mpsc::unbounded_channel();
    let opened_tx = ready_tx.clone();
    socket.on(EVENT_OPENED, move |_| {
        let _ = opened_tx.send(Ok(()));
    });
    socket.on(EVENT_ERROR, move |payload| {
        eprintln!("{} {}", "broker error:".bright_red(), payload);
        let _ = ready_tx.send(Err(payload.to_string()));
    });

    let watched_kinds = [
        consumer_kinds::TRANSFER,
        consumer_kinds::TRANSACTION,
        consumer_kinds::CONTRACT_TRANSACTION,
        consumer_kinds::CONTRACT_DEPLOYMENT,
        consumer_kinds::CONTRACT_EVENT,
    ];
    for kind in watched_kinds {
        socket.on(kind, move |payload| print_notification(kind, payload));
    }

    match ready_rx.recv().await {
        Some(Ok(())) => {}
        Some(Err(e)) => return Err(anyhow::anyhow!("Broker connection failed: {}", e)),
        None => return Err(anyhow::anyhow!("Connection closed before it opened")),
    }
    println!("{}", "Connected to broker".bright_green());

    socket.watch_transfer(&args.transfers);
    socket.watch_transaction(&args.transactions);
    socket.watch_contract_event(&args.contracts);
    socket.watch_contract_transaction(&args.contracts);
    socket.watch_contract_deployment(&args.contracts);

    info!("Watching for notifications. Press Ctrl+C to stop.");
    signal::ctrl_c().await?;

    info!("Shutting down");
    socket.close();

    Ok(())
}

fn print_notification(kind: &str, payload: &Value) {
    println!("{} {}", kind.bright_cyan(), payload);
}

async fn balance(config: ClientConfig, args: BalanceArgs) -> Result<()> {
    let client = ApiClient::new(config)?;
    let balance = client.balance(&args.address).await?;

    println!("{} {} wei", args.address.bright_cyan(), balance);
    Ok(())
}

async fn token(config: ClientConfig, args: TokenArgs) -> Result<()> {
    let client = ApiClient::new(config)?;
    let metadata = client.token_metadata(&args.address_or_alias).await?;

    println!("{}", metadata.name.bright_cyan());
    println!("  symbol:       {}", metadata.symbol);
    println!("  decimals:     {}", metadata.decimals);
    println!("  total supply: {}", metadata.total_supply);
    Ok(())
}
