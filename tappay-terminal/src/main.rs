//! tappay-terminal
//!
//! Merchant terminal for NFC tap-to-pay.
//!
//! Commands:
//! - `encode`: build the URL and JSON records for a customer's tag
//! - `decode`: resolve a tag record or page URL into a payment intent
//! - `demo`: run one checkout against the simulated reader and wallet
//! - `networks`: list supported networks

mod commands;
mod config;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tappay_flow::DEFAULT_NETWORK;
use tracing::info;

use crate::commands::DemoOptions;
use crate::config::{ConfigArgs, TerminalConfig, ENV_NETWORK};

#[derive(Parser)]
#[command(name = "tappay-terminal", about = "NFC tap-to-pay merchant terminal")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tag records for a customer wallet.
    Encode(EncodeArgs),
    /// Decode a tag record or page URL.
    Decode(DecodeArgs),
    /// Run one simulated checkout.
    Demo(DemoArgs),
    /// List supported networks.
    Networks,
}

#[derive(Args)]
struct EncodeArgs {
    /// Customer wallet address.
    #[arg(long)]
    wallet: String,
    /// Agent offering to tag the intent with.
    #[arg(long)]
    agent: Option<String>,
    /// Order reference.
    #[arg(long)]
    order: Option<String>,
}

#[derive(Args)]
struct DecodeArgs {
    /// URL or JSON payload.
    input: String,
}

#[derive(Args)]
struct DemoArgs {
    /// Amount in the network's native currency.
    #[arg(long)]
    amount: Option<String>,
    /// Agent offering to select first (agent mode).
    #[arg(long)]
    agent: Option<String>,
    /// Make the wallet reject the transfer.
    #[arg(long)]
    fail: bool,
    /// Page URL to read the intent from instead of scanning.
    #[arg(long)]
    page_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tappay_terminal=info,tappay_flow=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let lines = match cli.command {
        Commands::Networks => {
            let selected = cli
                .config
                .resolve(ENV_NETWORK)
                .unwrap_or_else(|| DEFAULT_NETWORK.to_string());
            commands::list_networks(&selected)
        }
        command => {
            let config = TerminalConfig::load(&cli.config)?;
            info!(
                "Terminal for {} on {}",
                config.merchant_name, config.network_key
            );
            run(command, &config).await?
        }
    };

    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

async fn run(command: Commands, config: &TerminalConfig) -> Result<Vec<String>> {
    match command {
        Commands::Encode(args) => commands::encode_tag(
            config,
            &args.wallet,
            args.agent.as_deref(),
            args.order.as_deref(),
        ),
        Commands::Decode(args) => commands::decode_intent(config, &args.input),
        Commands::Demo(args) => {
            let options = DemoOptions {
                amount: args.amount,
                agent: args.agent,
                fail: args.fail,
                page_url: args.page_url,
            };
            commands::run_demo(config, &options).await
        }
        Commands::Networks => Ok(commands::list_networks(&config.network_key)),
    }
}
