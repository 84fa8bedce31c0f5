//! Command construction and execution for the `provider-services` CLI
//!
//! - **env**: injectable lookup of the `AKASH_*` override variables
//! - **command**: the immutable, chainable `AkashCommand` builder
//! - **executor**: the `CommandRunner` capability and JSON decoding

pub mod command;
pub mod env;
pub mod executor;

pub use command::{AkashCommand, CliContext, DEFAULT_PROGRAM};
pub use env::{EnvLookup, ProcessEnv, StaticEnv};
pub use executor::{CommandRunner, ProcessOutput, TokioProcessRunner};
