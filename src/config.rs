//! Configuration module for the Akash client
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `AKASH_*` environment variables (`AKASH_NODE`, `AKASH_KEY_NAME`, ...).
//! Nested tables use a double underscore, e.g.
//! `AKASH_PIPELINE__CONFIRM_TIMEOUT_MS=120000`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

use crate::errors::{ClientError, ClientResult};

/// Main client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Name of the signing key in the keyring
    #[serde(default)]
    pub key_name: String,

    #[serde(default = "default_keyring_backend")]
    pub keyring_backend: String,

    /// Address owning deployments and leases
    #[serde(default)]
    pub account_address: String,

    #[serde(default = "default_net")]
    pub net: String,

    /// Chain software version, informational
    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub chain_id: String,

    /// RPC endpoint handed to the CLI with `--node`
    #[serde(default)]
    pub node: String,

    #[serde(default = "default_home")]
    pub home: String,

    /// Path of the `provider-services` binary
    #[serde(default = "default_path")]
    pub path: String,

    #[serde(default = "default_providers_api")]
    pub providers_api: String,

    /// Account paying the deployment deposit, if not the signer
    #[serde(default)]
    pub depositor_account: Option<String>,

    /// Fee granter account, if not the signer
    #[serde(default)]
    pub fee_account: Option<String>,

    /// Memo attached to every transaction
    #[serde(default = "default_transaction_note")]
    pub transaction_note: String,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Submission queue and confirmation timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Pending submissions buffered before `submit` starts waiting
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Caller-side wait for a submission result
    #[serde(default = "default_submit_timeout_ms")]
    pub submit_timeout_ms: u64,

    /// Worker-side deadline for confirmation polling
    #[serde(default = "default_confirm_timeout_ms")]
    pub confirm_timeout_ms: u64,

    /// Pause between confirmation queries
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

// Default value functions
fn default_keyring_backend() -> String { "os".to_string() }
fn default_net() -> String { "mainnet".to_string() }
fn default_path() -> String { crate::cli::DEFAULT_PROGRAM.to_string() }
fn default_providers_api() -> String { "http://providers-api.quasarch.cloud".to_string() }
fn default_transaction_note() -> String { "Akash Rust Client".to_string() }
fn default_queue_capacity() -> usize { 100 }
fn default_submit_timeout_ms() -> u64 { 30_000 }
fn default_confirm_timeout_ms() -> u64 { 90_000 }
fn default_poll_interval_ms() -> u64 { 500 }
fn default_log_level() -> String { "info".to_string() }

fn default_home() -> String {
    match std::env::var_os("HOME") {
        Some(home) => Path::new(&home).join(".akash").to_string_lossy().into_owned(),
        None => ".akash".to_string(),
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            submit_timeout_ms: default_submit_timeout_ms(),
            confirm_timeout_ms: default_confirm_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl PipelineConfig {
    pub fn submit_timeout(&self) -> Duration {
        Duration::from_millis(self.submit_timeout_ms)
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_millis(self.confirm_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn validate(&self) -> ClientResult<()> {
        if self.queue_capacity == 0 {
            return Err(ClientError::Configuration(
                "pipeline.queue_capacity must be > 0".to_string(),
            ));
        }
        for (name, value) in [
            ("submit_timeout_ms", self.submit_timeout_ms),
            ("confirm_timeout_ms", self.confirm_timeout_ms),
            ("poll_interval_ms", self.poll_interval_ms),
        ] {
            if value == 0 {
                return Err(ClientError::Configuration(format!(
                    "pipeline.{name} must be > 0"
                )));
            }
        }

        if self.submit_timeout_ms < self.confirm_timeout_ms {
            // Callers may give up while the worker is still polling
            warn!(
                submit_timeout_ms = self.submit_timeout_ms,
                confirm_timeout_ms = self.confirm_timeout_ms,
                "Submission timeout is shorter than the confirmation deadline"
            );
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key_name: String::new(),
            keyring_backend: default_keyring_backend(),
            account_address: String::new(),
            net: default_net(),
            version: String::new(),
            chain_id: String::new(),
            node: String::new(),
            home: default_home(),
            path: default_path(),
            providers_api: default_providers_api(),
            depositor_account: None,
            fee_account: None,
            transaction_note: default_transaction_note(),
            pipeline: PipelineConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file only
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Defaults, then `path` if given and present, then `AKASH_*` variables
    ///
    /// A `.env` file in the working directory is loaded first, if any.
    pub fn load(path: Option<&Path>) -> ClientResult<Self> {
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("AKASH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .and_then(|c| c.try_deserialize::<Config>())
            .map_err(|e| ClientError::Configuration(e.to_string()))
    }

    /// Every parameter the pipeline needs must be set
    pub fn validate(&self) -> ClientResult<()> {
        let required = [
            ("key_name", &self.key_name),
            ("keyring_backend", &self.keyring_backend),
            ("account_address", &self.account_address),
            ("chain_id", &self.chain_id),
            ("node", &self.node),
            ("home", &self.home),
            ("path", &self.path),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ClientError::Configuration(format!(
                    "Parameter '{name}' was not provided and is not available on the system"
                )));
            }
        }

        self.pipeline.validate()
    }

    /// Depositor account, ignoring blanks
    pub fn depositor_account(&self) -> Option<&str> {
        self.depositor_account.as_deref().filter(|s| !s.is_empty())
    }

    /// Fee account, ignoring blanks
    pub fn fee_account(&self) -> Option<&str> {
        self.fee_account.as_deref().filter(|s| !s.is_empty())
    }
}
