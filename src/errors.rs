//! Error types for the Akash client
//!
//! One taxonomy covers the whole submission lifecycle:
//! - Command building (unsupported option combinations)
//! - Process execution of the external CLI
//! - JSON decoding of CLI output
//! - Ledger-level transaction failures
//! - Submission and confirmation deadlines

use thiserror::Error;

/// Convenience alias used across the crate
pub type ClientResult<T> = Result<T, ClientError>;

/// Comprehensive error type for all client operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// A command could not be assembled from the requested options
    #[error("Command build error: {0}")]
    Build(String),

    /// The external program ran but exited unsuccessfully
    ///
    /// `stderr` is kept verbatim so the caller can inspect the CLI's message.
    #[error("Execution of '{program}' failed (exit code {exit_code:?}): {stderr}")]
    Execution {
        program: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The external program could not be spawned or its pipes failed
    #[error("I/O error running '{program}': {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Output was not valid JSON for the requested shape
    ///
    /// During confirmation polling this means "not indexed yet" and is retried;
    /// for one-shot queries it is surfaced as-is.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The ledger answered, but the transaction did not succeed
    #[error("transaction failed: {raw_log}")]
    TransactionFailed { txhash: String, raw_log: String },

    /// The worker-side confirmation deadline elapsed
    #[error("timeout waiting for transaction confirmation (txhash: {txhash}, after {timeout_ms}ms)")]
    ConfirmationTimeout { txhash: String, timeout_ms: u64 },

    /// The caller-side submission deadline elapsed
    #[error("timeout waiting for transaction submission result (after {timeout_ms}ms)")]
    SubmissionTimeout { timeout_ms: u64 },

    /// The submission worker is no longer running
    #[error("Transaction queue closed")]
    QueueClosed,

    /// An expected event attribute was missing from a transaction record
    #[error("attribute not found: {0}")]
    AttributeNotFound(String),

    /// Configuration or validation error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A submission handler failed for a reason outside the categories above
    #[error("Handler error: {0}")]
    Handler(String),
}

impl ClientError {
    /// Check if retrying the same operation might succeed
    ///
    /// Nothing in the crate retries automatically except the confirmation
    /// poller; this is a hint for callers deciding whether to resubmit.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Decode(_) => true,
            Self::Execution { .. } => true,
            Self::SubmissionTimeout { .. } => true,
            Self::ConfirmationTimeout { .. } => true,
            Self::QueueClosed => false,

            Self::Build(_) => false,
            Self::Io { .. } => false,
            Self::TransactionFailed { raw_log, .. } => {
                // Sequence mismatches clear up once the earlier transaction lands
                raw_log.contains("account sequence mismatch")
            }
            Self::AttributeNotFound(_) => false,
            Self::Configuration(_) => false,
            Self::Handler(_) => false,
        }
    }

    /// True for either of the two deadline errors
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::SubmissionTimeout { .. } | Self::ConfirmationTimeout { .. }
        )
    }

    /// Get the error category for metrics and observability
    pub fn category(&self) -> &'static str {
        match self {
            Self::Build(_) => "build",
            Self::Execution { .. } => "execution",
            Self::Io { .. } => "io",
            Self::Decode(_) => "decode",
            Self::TransactionFailed { .. } => "ledger",
            Self::ConfirmationTimeout { .. } | Self::SubmissionTimeout { .. } => "timeout",
            Self::QueueClosed => "queue",
            Self::AttributeNotFound(_) => "attribute",
            Self::Configuration(_) => "config",
            Self::Handler(_) => "handler",
        }
    }
}

// Convenience constructors for common error scenarios
impl ClientError {
    /// Create a ledger-level failure carrying the raw diagnostic log
    pub fn transaction_failed(txhash: impl Into<String>, raw_log: impl Into<String>) -> Self {
        Self::TransactionFailed {
            txhash: txhash.into(),
            raw_log: raw_log.into(),
        }
    }

    /// Create an I/O error for a program invocation
    pub fn io(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            program: program.into(),
            source,
        }
    }

    /// Create a handler error from any displayable reason
    pub fn handler(reason: impl std::fmt::Display) -> Self {
        Self::Handler(reason.to_string())
    }
}
