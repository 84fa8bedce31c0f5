//! Confirmation polling
//!
//! `Polling → {Confirmed, Failed, TimedOut}`. Each round runs
//! `query tx <hash>`; an answer that is not yet a transaction record keeps the
//! poller in `Polling` for another round after a fixed pause. The deadline
//! wraps the whole loop, so it fires even in the middle of a CLI call.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, trace};

use crate::cli::AkashCommand;
use crate::errors::{ClientError, ClientResult};
use crate::metrics::Metrics;
use crate::types::Transaction;

/// Final state of a confirmation poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Confirmed,
    Failed,
    TimedOut,
}

impl PollOutcome {
    /// Classify a poll result
    pub fn of(result: &ClientResult<Transaction>) -> Option<Self> {
        match result {
            Ok(_) => Some(Self::Confirmed),
            Err(ClientError::TransactionFailed { .. }) => Some(Self::Failed),
            Err(ClientError::ConfirmationTimeout { .. }) => Some(Self::TimedOut),
            Err(_) => None,
        }
    }
}

/// Polls the ledger until a transaction hash reaches a final state
#[derive(Debug, Clone)]
pub struct ConfirmationPoller {
    base: AkashCommand,
    node: String,
    poll_interval: Duration,
    deadline: Duration,
    metrics: Arc<Metrics>,
}

impl ConfirmationPoller {
    /// `base` is a bare command (program only) whose runner and environment
    /// the queries reuse
    pub fn new(
        base: AkashCommand,
        node: impl Into<String>,
        poll_interval: Duration,
        deadline: Duration,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            base,
            node: node.into(),
            poll_interval,
            deadline,
            metrics,
        }
    }

    pub fn query_command(&self, txhash: &str) -> AkashCommand {
        let cmd = self.base.clone().query().query_tx().set_hash(txhash);
        let cmd = if self.node.is_empty() {
            cmd
        } else {
            cmd.set_node(&self.node)
        };
        cmd.output_json()
    }

    /// Resolve `txhash` to its confirmed record, a ledger failure, or a timeout
    pub async fn wait_for_tx(&self, txhash: &str) -> ClientResult<Transaction> {
        match timeout(self.deadline, self.poll(txhash)).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::ConfirmationTimeout {
                txhash: txhash.to_string(),
                timeout_ms: self.deadline.as_millis() as u64,
            }),
        }
    }

    async fn poll(&self, txhash: &str) -> ClientResult<Transaction> {
        let cmd = self.query_command(txhash);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            self.metrics.poll_attempts.inc();
            trace!(txhash = %txhash, attempt, "Querying transaction");

            match cmd.execute_json::<Transaction>().await {
                Ok(tx) if tx.failed() => {
                    return Err(ClientError::transaction_failed(txhash, tx.raw_log));
                }
                Ok(tx) => return Ok(tx),
                // Not indexed yet: empty or non-JSON output, or "tx not found"
                Err(e @ (ClientError::Decode(_) | ClientError::Execution { .. })) => {
                    debug!(
                        txhash = %txhash,
                        attempt,
                        reason = %e,
                        "Transaction not available yet"
                    );
                    sleep(self.poll_interval).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::StaticEnv;
    use crate::test_utils::{
        confirmed_tx_json, failed_tx_json, ScriptedResponse, ScriptedRunner, TestContext,
    };
    use tokio::time::Instant;

    const INTERVAL: Duration = Duration::from_millis(500);

    fn poller(runner: &ScriptedRunner, deadline: Duration) -> ConfirmationPoller {
        let ctx = TestContext::new("provider-services", StaticEnv::new(), runner.clone());
        ConfirmationPoller::new(
            AkashCommand::new(&ctx),
            "http://node:26657",
            INTERVAL,
            deadline,
            Arc::new(Metrics::new().unwrap()),
        )
    }

    #[test]
    fn test_query_command_tokens() {
        let runner = ScriptedRunner::empty();
        let cmd = poller(&runner, Duration::from_secs(90)).query_command("ABC");
        assert_eq!(
            cmd.headless(),
            &["query", "tx", "ABC", "--node", "http://node:26657", "-o", "json"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmed_after_exactly_k_backoffs() {
        for k in 0..4u32 {
            let mut script: Vec<_> = (0..k).map(|_| ScriptedResponse::not_indexed()).collect();
            script.push(ScriptedResponse::stdout(confirmed_tx_json("ABC")));
            let runner = ScriptedRunner::new(script);
            let poller = poller(&runner, Duration::from_secs(90));

            let start = Instant::now();
            let tx = poller.wait_for_tx("ABC").await.unwrap();

            assert_eq!(tx.txhash, "ABC");
            // Exactly k pauses, never fewer
            let elapsed = start.elapsed();
            assert!(elapsed >= INTERVAL * k, "k={k} elapsed={elapsed:?}");
            assert!(elapsed < INTERVAL * k + INTERVAL / 2, "k={k} elapsed={elapsed:?}");
            assert_eq!(runner.call_count(), k as usize + 1);
            assert_eq!(poller.metrics.poll_attempts.get(), u64::from(k) + 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_exit_is_retried() {
        let runner = ScriptedRunner::new(vec![
            ScriptedResponse::failure(1, "Error: tx (ABC) not found"),
            ScriptedResponse::stdout(confirmed_tx_json("ABC")),
        ]);
        let result = poller(&runner, Duration::from_secs(90)).wait_for_tx("ABC").await;
        assert_eq!(PollOutcome::of(&result), Some(PollOutcome::Confirmed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_logs_fail_with_raw_log() {
        let runner = ScriptedRunner::with_fallback(
            Vec::new(),
            ScriptedResponse::stdout(failed_tx_json("DEAD", "insufficient funds")),
        );
        let result = poller(&runner, Duration::from_secs(90)).wait_for_tx("DEAD").await;

        assert_eq!(PollOutcome::of(&result), Some(PollOutcome::Failed));
        assert!(result.unwrap_err().to_string().contains("insufficient funds"));
        assert_eq!(runner.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_null_logs_fail_on_first_answer() {
        let runner = ScriptedRunner::with_fallback(
            Vec::new(),
            ScriptedResponse::stdout(
                r#"{"height":"5","txhash":"DEAD","logs":null,"raw_log":"insufficient funds"}"#,
            ),
        );
        let result = poller(&runner, Duration::from_secs(5)).wait_for_tx("DEAD").await;

        let Err(ClientError::TransactionFailed { raw_log, .. }) = result else {
            panic!("expected a ledger failure, got {result:?}");
        };
        assert_eq!(raw_log, "insufficient funds");
        assert_eq!(runner.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_before_any_record_times_out() {
        let runner = ScriptedRunner::with_fallback(Vec::new(), ScriptedResponse::not_indexed());
        let deadline = Duration::from_secs(3);

        let start = Instant::now();
        let result = poller(&runner, deadline).wait_for_tx("SLOW").await;

        assert_eq!(PollOutcome::of(&result), Some(PollOutcome::TimedOut));
        let elapsed = start.elapsed();
        assert!(elapsed >= deadline && elapsed < deadline + INTERVAL);
        assert!(runner.call_count() >= 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_fires_during_slow_cli_call() {
        let runner = ScriptedRunner::with_delay(
            Vec::new(),
            Some(ScriptedResponse::stdout(confirmed_tx_json("LATE"))),
            Duration::from_secs(10),
        );
        let result = poller(&runner, Duration::from_secs(2)).wait_for_tx("LATE").await;
        assert!(matches!(result, Err(ClientError::ConfirmationTimeout { .. })));
    }

    #[tokio::test]
    async fn test_spawn_failure_is_not_retried() {
        let runner = ScriptedRunner::with_fallback(Vec::new(), ScriptedResponse::spawn_error());
        let result = poller(&runner, Duration::from_secs(90)).wait_for_tx("X").await;
        assert!(matches!(result, Err(ClientError::Io { .. })));
        assert_eq!(runner.call_count(), 1);
    }
}
