//! Environment override lookup
//!
//! The external program reads a fixed set of `AKASH_*` variables on its own.
//! When one of them is present the builder must not pass the matching flag,
//! so the lookup sits behind a trait that tests can replace with a map.

use std::collections::HashMap;

pub const ENV_CHAIN_ID: &str = "AKASH_CHAIN_ID";
pub const ENV_NODE: &str = "AKASH_NODE";
pub const ENV_KEYRING_BACKEND: &str = "AKASH_KEYRING_BACKEND";
pub const ENV_GAS_PRICES: &str = "AKASH_GAS_PRICES";
pub const ENV_SIGN_MODE: &str = "AKASH_SIGN_MODE";
pub const ENV_GAS_ADJUSTMENT: &str = "AKASH_GAS_ADJUSTMENT";
pub const ENV_GAS: &str = "AKASH_GAS";

/// All variables whose presence suppresses an explicit flag
pub const GUARDED_VARIABLES: [&str; 7] = [
    ENV_CHAIN_ID,
    ENV_NODE,
    ENV_KEYRING_BACKEND,
    ENV_GAS_PRICES,
    ENV_SIGN_MODE,
    ENV_GAS_ADJUSTMENT,
    ENV_GAS,
];

/// Answers "is this override variable set?"
pub trait EnvLookup: Send + Sync + std::fmt::Debug {
    fn exists(&self, key: &str) -> bool;
}

/// Reads the real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn exists(&self, key: &str) -> bool {
        // Presence is what matters, an empty value still counts
        std::env::var_os(key).is_some()
    }
}

/// Fixed set of variables, used by tests and by embedders that manage the
/// child environment themselves
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    vars: HashMap<String, String>,
}

impl StaticEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl EnvLookup for StaticEnv {
    fn exists(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }
}
