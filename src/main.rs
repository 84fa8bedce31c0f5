//! akash-client
//!
//! Command-line front end for the library: each subcommand maps to one client
//! operation and prints its result as JSON on stdout. Logs go to stderr.

#![deny(unused_imports)]
#![deny(unused_mut)]
#![deny(unused_variables)]
#![warn(unused_must_use)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use akash_client::config::LoggingConfig;
use akash_client::{AkashClient, Config, Seqs};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "AKASH_CLIENT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Print pipeline metrics (Prometheus text format) to stderr on exit
    #[arg(long)]
    print_metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sync status of the configured node
    Status,

    #[command(subcommand)]
    Deployment(DeploymentCommand),

    #[command(subcommand)]
    Lease(LeaseCommand),

    /// List bids on a deployment
    Bids {
        dseq: String,
        /// Defaults to the configured account
        #[arg(long)]
        owner: Option<String>,
    },

    /// Wait for an already broadcast transaction
    WaitTx { txhash: String },
}

#[derive(Subcommand, Debug)]
enum DeploymentCommand {
    Get {
        dseq: String,
        #[arg(long)]
        owner: Option<String>,
    },
    Create {
        manifest: PathBuf,
    },
    Update {
        dseq: String,
        manifest: PathBuf,
    },
    Close {
        dseq: String,
        #[arg(long)]
        owner: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum LeaseCommand {
    Create {
        #[command(flatten)]
        seqs: SeqArgs,
        #[arg(long)]
        provider: String,
    },
    Status {
        #[command(flatten)]
        seqs: SeqArgs,
        #[arg(long)]
        provider: String,
    },
    SendManifest {
        dseq: String,
        manifest: PathBuf,
        #[arg(long)]
        provider: String,
    },
}

#[derive(clap::Args, Debug)]
struct SeqArgs {
    #[arg(long)]
    dseq: String,
    #[arg(long, default_value = "1")]
    gseq: String,
    #[arg(long, default_value = "1")]
    oseq: String,
}

impl From<SeqArgs> for Seqs {
    fn from(args: SeqArgs) -> Self {
        Seqs {
            dseq: args.dseq,
            gseq: args.gseq,
            oseq: args.oseq,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    init_logging(&config.logging, args.verbose, args.json_logs)?;
    config.validate().context("Invalid configuration")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        net = %config.net,
        chain_id = %config.chain_id,
        "Starting akash-client"
    );

    let client = AkashClient::new(config).context("Failed to initialize client")?;
    let outcome = run(&client, args.command).await;

    if args.print_metrics {
        eprint!("{}", client.metrics().encode()?);
    }

    outcome
}

async fn run(client: &AkashClient, command: Command) -> Result<()> {
    let owner = |o: Option<String>| o.unwrap_or_else(|| client.config().account_address.clone());

    match command {
        Command::Status => print_json(&client.node_status().await?),
        Command::Bids { dseq, owner: o } => print_json(&client.list_bids(&owner(o), &dseq).await?),
        Command::WaitTx { txhash } => {
            let tx = client
                .wait_for_transaction(move || async move { Ok(txhash) })
                .await
                .context("Transaction not confirmed")?;
            print_json(&tx)
        }
        Command::Deployment(cmd) => match cmd {
            DeploymentCommand::Get { dseq, owner: o } => {
                print_json(&client.get_deployment(&dseq, &owner(o)).await?)
            }
            DeploymentCommand::Create { manifest } => {
                let seqs = client
                    .create_deployment(&path_str(&manifest)?)
                    .await
                    .context("Failed to create deployment")?;
                print_json(&seqs)
            }
            DeploymentCommand::Update { dseq, manifest } => {
                client
                    .update_deployment(&dseq, &path_str(&manifest)?)
                    .await
                    .context("Failed to update deployment")?;
                debug!(dseq = %dseq, "Update confirmed");
                Ok(())
            }
            DeploymentCommand::Close { dseq, owner: o } => {
                client
                    .delete_deployment(&dseq, &owner(o))
                    .await
                    .context("Failed to close deployment")?;
                Ok(())
            }
        },
        Command::Lease(cmd) => match cmd {
            LeaseCommand::Create { seqs, provider } => {
                let tx = client
                    .create_lease(&seqs.into(), &provider)
                    .await
                    .context("Failed to create lease")?;
                print_json(&tx)
            }
            LeaseCommand::Status { seqs, provider } => {
                print_json(&client.lease_status(&seqs.into(), &provider).await?)
            }
            LeaseCommand::SendManifest {
                dseq,
                manifest,
                provider,
            } => {
                let out = client
                    .send_manifest(&dseq, &provider, &path_str(&manifest)?)
                    .await
                    .context("Failed to send manifest")?;
                print!("{out}");
                Ok(())
            }
        },
    }
}

fn path_str(path: &std::path::Path) -> Result<String> {
    path.to_str()
        .map(str::to_string)
        .with_context(|| format!("Manifest path is not valid UTF-8: {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Initialize logging subsystem
fn init_logging(config: &LoggingConfig, verbose: bool, json: bool) -> Result<()> {
    let default_filter = if verbose {
        "akash_client=debug,info".to_string()
    } else {
        config.level.clone()
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&default_filter))
        .context("Invalid log filter")?;

    let registry = tracing_subscriber::registry().with(filter);
    let initialized = if json || config.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    initialized.context("Failed to initialize logging")?;

    Ok(())
}
