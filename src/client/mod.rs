//! Akash client
//!
//! Owns the configuration, the CLI capabilities and the submission queue.
//! Operations are split by area:
//!
//! - **deployment**: create, read, update and close deployments
//! - **lease**: lease creation and the provider-facing commands
//! - **market**: bid listing
//! - **node**: node sync status
//!
//! Every state-changing operation goes through `wait_for_transaction`, so one
//! client never has two transactions in flight. Queries call the CLI directly.

mod deployment;
mod lease;
mod market;
mod node;

use std::future::Future;
use std::sync::Arc;
use tracing::info;

use crate::cli::{
    AkashCommand, CliContext, CommandRunner, EnvLookup, ProcessEnv, TokioProcessRunner,
};
use crate::config::Config;
use crate::errors::{ClientError, ClientResult};
use crate::metrics::Metrics;
use crate::tx_worker::{ConfirmationPoller, TxQueue, TxResult};
use crate::types::Transaction;

/// Client bound to one signing account
#[derive(Debug, Clone)]
pub struct AkashClient {
    config: Config,
    runner: Arc<dyn CommandRunner>,
    env: Arc<dyn EnvLookup>,
    queue: TxQueue,
    metrics: Arc<Metrics>,
    transaction_note: String,
}

impl AkashClient {
    /// Client running the real program in the process environment
    ///
    /// The submission worker is spawned here, so this fails with
    /// `ClientError::Configuration` outside a tokio runtime.
    pub fn new(config: Config) -> ClientResult<Self> {
        Self::with_components(config, Arc::new(TokioProcessRunner), Arc::new(ProcessEnv))
    }

    pub fn with_components(
        config: Config,
        runner: Arc<dyn CommandRunner>,
        env: Arc<dyn EnvLookup>,
    ) -> ClientResult<Self> {
        config.pipeline.validate()?;

        let metrics = Arc::new(
            Metrics::new().map_err(|e| ClientError::Configuration(format!("metrics: {e}")))?,
        );
        let base = AkashCommand::new(&Parts {
            path: &config.path,
            runner: &runner,
            env: &env,
        });
        let poller = ConfirmationPoller::new(
            base,
            config.node.clone(),
            config.pipeline.poll_interval(),
            config.pipeline.confirm_timeout(),
            metrics.clone(),
        );
        let queue = TxQueue::spawn(poller, &config.pipeline, metrics.clone())?;

        let client = Self {
            transaction_note: config.transaction_note.clone(),
            config,
            runner,
            env,
            queue,
            metrics,
        };

        info!(
            program = %client.cli().program(),
            node = %client.config.node,
            chain_id = %client.config.chain_id,
            "Akash client ready"
        );

        Ok(client)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    pub fn transaction_note(&self) -> &str {
        &self.transaction_note
    }

    /// Memo attached to every subsequent transaction
    pub fn set_global_transaction_note(&mut self, note: impl Into<String>) {
        self.transaction_note = note.into();
    }

    /// Bare command: the program name and nothing else
    pub fn cli(&self) -> AkashCommand {
        AkashCommand::new(self)
    }

    /// Submit through the queue and wait for the confirmed record
    pub async fn wait_for_transaction<F, Fut>(&self, handler: F) -> TxResult
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ClientResult<String>> + Send + 'static,
    {
        self.queue.submit(handler).await
    }

    /// Signing, routing and output options shared by every transaction
    fn tx_options(&self, cmd: AkashCommand) -> AkashCommand {
        let cmd = cmd
            .set_from(&self.config.key_name)
            .set_keyring_backend(&self.config.keyring_backend)
            .set_chain_id(&self.config.chain_id)
            .set_node(&self.config.node)
            .set_note(&self.transaction_note);

        let cmd = match self.config.fee_account() {
            Some(account) => cmd.set_fee_account(account),
            None => cmd,
        };

        cmd.auto_accept().output_json()
    }

    /// Broadcast `cmd` through the queue
    async fn submit_tx(&self, cmd: AkashCommand) -> ClientResult<Transaction> {
        self.wait_for_transaction(move || broadcast(cmd)).await
    }
}

/// Run a broadcast command and return the hash the ledger assigned
async fn broadcast(cmd: AkashCommand) -> ClientResult<String> {
    let response: Transaction = cmd.execute_json().await?;

    if response.rejected() {
        return Err(ClientError::transaction_failed(response.txhash, response.raw_log));
    }
    if response.txhash.is_empty() {
        return Err(ClientError::handler(format!(
            "broadcast returned no transaction hash: {}",
            response.raw_log
        )));
    }

    Ok(response.txhash)
}

/// Borrowed capabilities, used before the client itself exists
struct Parts<'a> {
    path: &'a str,
    runner: &'a Arc<dyn CommandRunner>,
    env: &'a Arc<dyn EnvLookup>,
}

impl CliContext for Parts<'_> {
    fn program_path(&self) -> &str {
        self.path
    }

    fn env(&self) -> Arc<dyn EnvLookup> {
        self.env.clone()
    }

    fn runner(&self) -> Arc<dyn CommandRunner> {
        self.runner.clone()
    }
}

impl CliContext for AkashClient {
    fn program_path(&self) -> &str {
        &self.config.path
    }

    fn env(&self) -> Arc<dyn EnvLookup> {
        self.env.clone()
    }

    fn runner(&self) -> Arc<dyn CommandRunner> {
        self.runner.clone()
    }
}
