//! Chainable invocation builder for `provider-services`
//!
//! Every step consumes the builder and returns a new value with exactly one
//! more token (two for flag/value options). Token order is call order, so the
//! caller is responsible for matching the CLI grammar: subcommands first, then
//! positional values, then flags.
//!
//! Deriving several commands from one base goes through `.clone()`, which
//! copies the token vector; variants never share mutable storage.

use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::error;

use super::env::{
    EnvLookup, ENV_CHAIN_ID, ENV_GAS, ENV_GAS_ADJUSTMENT, ENV_GAS_PRICES, ENV_KEYRING_BACKEND,
    ENV_NODE, ENV_SIGN_MODE,
};
use super::executor::{decode_json, execute_raw, CommandRunner};
use crate::errors::ClientResult;

/// Binary used when the configured path is empty
pub const DEFAULT_PROGRAM: &str = "provider-services";

/// Fee denomination appended to integer fee amounts
pub const FEE_DENOM: &str = "uakt";

/// Gas price used by `gas_prices` callers that have no better value
pub const DEFAULT_GAS_PRICES: &str = "0.025uakt";

/// Gas adjustment used by `default_gas`
pub const DEFAULT_GAS_ADJUSTMENT: f64 = 1.5;

/// Sign modes accepted by the CLI
pub const SUPPORTED_SIGN_MODES: [&str; 2] = ["default", "amino-json"];

/// What a command needs from its owner
pub trait CliContext {
    /// Configured program path, may be empty
    fn program_path(&self) -> &str;
    fn env(&self) -> Arc<dyn EnvLookup>;
    fn runner(&self) -> Arc<dyn CommandRunner>;
}

/// An invocation of the external program, built one token at a time
#[derive(Debug, Clone)]
#[must_use = "builder steps return a new command"]
pub struct AkashCommand {
    content: Vec<String>,
    env: Arc<dyn EnvLookup>,
    runner: Arc<dyn CommandRunner>,
}

impl AkashCommand {
    pub fn new(ctx: &impl CliContext) -> Self {
        let path = match ctx.program_path() {
            "" => DEFAULT_PROGRAM,
            p => p,
        };

        Self {
            content: vec![path.to_string()],
            env: ctx.env(),
            runner: ctx.runner(),
        }
    }

    fn append(mut self, token: impl Into<String>) -> Self {
        self.content.push(token.into());
        self
    }

    fn append_pair(self, flag: &str, value: impl Into<String>) -> Self {
        self.append(flag).append(value)
    }

    /// Append `tokens` only when `key` is absent from the environment
    fn append_unless_env(self, key: &str, tokens: &[String]) -> Self {
        if self.env.exists(key) {
            return self;
        }
        tokens.iter().fold(self, |cmd, t| cmd.append(t.as_str()))
    }

    /* ---------- steps ---------- */

    pub fn tx(self) -> Self {
        self.append("tx")
    }

    pub fn query(self) -> Self {
        self.append("query")
    }

    /// The `tx` lookup under `query`
    pub fn query_tx(self) -> Self {
        self.append("tx")
    }

    pub fn set_hash(self, hash: &str) -> Self {
        self.append(hash)
    }

    pub fn deployment(self) -> Self {
        self.append("deployment")
    }

    pub fn get(self) -> Self {
        self.append("get")
    }

    pub fn create(self) -> Self {
        self.append("create")
    }

    pub fn update(self) -> Self {
        self.append("update")
    }

    pub fn close(self) -> Self {
        self.append("close")
    }

    pub fn market(self) -> Self {
        self.append("market")
    }

    pub fn lease(self) -> Self {
        self.append("lease")
    }

    pub fn bid(self) -> Self {
        self.append("bid")
    }

    pub fn list(self) -> Self {
        self.append("list")
    }

    pub fn provider(self) -> Self {
        self.append("provider")
    }

    pub fn lease_status(self) -> Self {
        self.append("lease-status")
    }

    pub fn send_manifest(self, path: &str) -> Self {
        self.append("send-manifest").append(path)
    }

    pub fn node(self) -> Self {
        self.append("node")
    }

    pub fn status(self) -> Self {
        self.append("status")
    }

    /// Positional manifest (SDL) path
    pub fn manifest(self, path: &str) -> Self {
        self.append(path)
    }

    /* ---------- options ---------- */

    pub fn set_dseq(self, dseq: &str) -> Self {
        self.append_pair("--dseq", dseq)
    }

    pub fn set_gseq(self, gseq: &str) -> Self {
        self.append_pair("--gseq", gseq)
    }

    pub fn set_oseq(self, oseq: &str) -> Self {
        self.append_pair("--oseq", oseq)
    }

    pub fn set_provider(self, provider: &str) -> Self {
        self.append_pair("--provider", provider)
    }

    pub fn set_home(self, home: &str) -> Self {
        self.append_pair("--home", home)
    }

    pub fn set_owner(self, owner: &str) -> Self {
        self.append_pair("--owner", owner)
    }

    pub fn set_from(self, key: &str) -> Self {
        self.append_pair("--from", key)
    }

    pub fn set_fees(self, amount: u64) -> Self {
        self.append_pair("--fees", format!("{amount}{FEE_DENOM}"))
    }

    /// Transaction memo. Passed as its own argument, so no quoting is needed.
    pub fn set_note(self, note: &str) -> Self {
        self.append_pair("--note", note)
    }

    pub fn set_depositor_account(self, account: &str) -> Self {
        self.append_pair("--depositor-account", account)
    }

    pub fn set_fee_account(self, account: &str) -> Self {
        self.append_pair("--fee-account", account)
    }

    pub fn auto_accept(self) -> Self {
        self.append("-y")
    }

    pub fn output_json(self) -> Self {
        self.append_pair("-o", "json")
    }

    /* ---------- environment-guarded options ---------- */

    pub fn set_chain_id(self, chain_id: &str) -> Self {
        self.append_unless_env(ENV_CHAIN_ID, &["--chain-id".to_string(), chain_id.to_string()])
    }

    pub fn set_node(self, node: &str) -> Self {
        self.append_unless_env(ENV_NODE, &["--node".to_string(), node.to_string()])
    }

    pub fn set_keyring_backend(self, backend: &str) -> Self {
        self.append_unless_env(
            ENV_KEYRING_BACKEND,
            &["--keyring-backend".to_string(), backend.to_string()],
        )
    }

    pub fn gas_auto(self) -> Self {
        self.append_unless_env(ENV_GAS, &["--gas=auto".to_string()])
    }

    pub fn set_gas_adjustment(self, adjustment: f64) -> Self {
        self.append_unless_env(
            ENV_GAS_ADJUSTMENT,
            &[format!("--gas-adjustment={adjustment:.6}")],
        )
    }

    pub fn set_gas_prices(self, prices: &str) -> Self {
        self.append_unless_env(ENV_GAS_PRICES, &[format!("--gas-prices={prices}")])
    }

    /// Automatic gas estimation with the standard adjustment and price
    pub fn default_gas(self) -> Self {
        self.gas_auto()
            .set_gas_adjustment(DEFAULT_GAS_ADJUSTMENT)
            .set_gas_prices(DEFAULT_GAS_PRICES)
    }

    /// Unsupported modes are logged and the flag is left out; the command is
    /// still usable and the CLI falls back to its own default mode.
    pub fn set_sign_mode(self, mode: &str) -> Self {
        if self.env.exists(ENV_SIGN_MODE) {
            return self;
        }

        if !SUPPORTED_SIGN_MODES.contains(&mode) {
            error!(mode = %mode, "Sign mode not supported, omitting --sign-mode");
            return self;
        }

        self.append_pair("--sign-mode", mode)
    }

    /* ---------- terminal operations ---------- */

    /// Program name
    pub fn program(&self) -> &str {
        &self.content[0]
    }

    /// Every token, program name included
    pub fn tokens(&self) -> &[String] {
        &self.content
    }

    /// Argument list without the program name
    pub fn headless(&self) -> &[String] {
        &self.content[1..]
    }

    /// Run and return stdout
    pub async fn execute(&self) -> ClientResult<Vec<u8>> {
        execute_raw(self.runner.as_ref(), self.program(), self.headless()).await
    }

    /// Run and decode stdout as JSON
    pub async fn execute_json<T: DeserializeOwned>(&self) -> ClientResult<T> {
        let out = self.execute().await?;
        decode_json(&out)
    }
}

impl std::fmt::Display for AkashCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content.join(" "))
    }
}
