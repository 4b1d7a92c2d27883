//! wallet-session
//!
//! Command line front end for the wallet session core, talking to a
//! JSON-RPC wallet relay.
//!
//! ```text
//! wallet-session networks            print the network catalog
//! wallet-session status              connect, refresh, print the account
//! wallet-session switch <chain-id>   connect, switch, print the account
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use wallet_session::app::{ViewState, WalletApp};
use wallet_session::config::{load_config, WalletConfig};
use wallet_session::network::ChainId;
use wallet_session::observability::init_logging;
use wallet_session::provider::RpcConnector;

#[derive(Parser)]
#[command(name = "wallet-session")]
#[command(about = "Inspect and switch the network of a wallet relay", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Wallet relay URL, overrides the configuration.
    #[arg(short, long)]
    rpc_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the known networks
    Networks,
    /// Show the connected account
    Status,
    /// Move the wallet to another network
    Switch {
        /// Decimal or 0x-prefixed hex chain id
        chain_id: ChainId,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => WalletConfig::default(),
    };
    if let Some(rpc_url) = cli.rpc_url {
        config.provider.rpc_url = rpc_url;
    }

    init_logging(&config.observability);
    tracing::debug!(
        networks = config.networks.len(),
        rpc_url = %config.provider.rpc_url,
        "Configuration loaded"
    );

    let connector = Arc::new(RpcConnector::new(config.provider.clone()));
    let app = WalletApp::from_config(&config, connector)?;

    match cli.command {
        Commands::Networks => {
            for network in app.registry().all() {
                println!(
                    "{:>6}  {:<10} {}",
                    network.chain_id, network.name, network.currency.symbol
                );
            }
        }
        Commands::Status => {
            app.connect().await?;
            print_view(&app.view());
            app.disconnect().await;
        }
        Commands::Switch { chain_id } => {
            app.connect().await?;
            let result = app.switch_network(chain_id).await;
            print_view(&app.view());
            app.disconnect().await;
            match result {
                Ok(Some(report)) if report.registered => {
                    println!("Registered {} with the wallet", app.registry().display_name(chain_id));
                }
                Ok(_) => {}
                // Already printed with the view.
                Err(_) => std::process::exit(1),
            }
        }
    }

    Ok(())
}

fn print_view(view: &ViewState) {
    match view {
        ViewState::Connect { .. } => println!("Not connected"),
        ViewState::Action { .. } => println!("Connected, no account loaded"),
        ViewState::Card { card, .. } => {
            println!("Address: {}", card.address);
            println!("Network: {}", card.network);
            println!("Balance: {}", card.balance);
        }
    }
    if let Some(error) = view.error() {
        eprintln!("Error: {}", error);
    }
}
