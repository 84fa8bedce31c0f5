//! Akash client library
//!
//! Drives the `provider-services` CLI to manage deployments and leases on the
//! Akash network. Transactions from one client are submitted one at a time
//! through a bounded queue and polled until the ledger confirms or rejects
//! them.

pub mod cli;
pub mod client;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod observability;
pub mod structured_logging;
pub mod tx_worker;
pub mod types;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

// Re-export commonly used types
pub use cli::{AkashCommand, CliContext, CommandRunner, EnvLookup};
pub use client::AkashClient;
pub use config::Config;
pub use errors::{ClientError, ClientResult};
pub use tx_worker::{TxQueue, TxResult};
pub use types::{Seqs, Transaction};
