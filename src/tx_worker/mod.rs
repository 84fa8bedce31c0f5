//! Serialized transaction submission
//!
//! Transactions signed by one account must reach the ledger one at a time,
//! otherwise concurrent broadcasts race on the account sequence number. Every
//! client therefore owns a single worker task fed by a bounded FIFO queue:
//!
//! 1. `TxQueue::submit` enqueues a handler and waits on a private oneshot
//! 2. The worker runs the handler, which broadcasts and returns the tx hash
//! 3. The worker polls for confirmation and sends the outcome back
//!
//! At most one handler or confirmation poll is in flight per client. Read-only
//! queries do not go through here.

pub mod poller;

pub use poller::{ConfirmationPoller, PollOutcome};

use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout, Instant};
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::errors::{ClientError, ClientResult};
use crate::metrics::Metrics;
use crate::observability::CorrelationId;
use crate::structured_logging::StructuredLogger;
use crate::types::Transaction;

/// Broadcasts a transaction and yields its hash
pub type TxHandler = Box<dyn FnOnce() -> BoxFuture<'static, ClientResult<String>> + Send>;

/// Outcome delivered to the submitter: the confirmed record, or why not
pub type TxResult = ClientResult<Transaction>;

/// One queued submission
pub struct TxRequest {
    pub handler: TxHandler,
    pub result: oneshot::Sender<TxResult>,
    pub correlation_id: CorrelationId,
    pub enqueued_at: Instant,
}

impl std::fmt::Debug for TxRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxRequest")
            .field("correlation_id", &self.correlation_id)
            .field("enqueued_at", &self.enqueued_at)
            .finish_non_exhaustive()
    }
}

/// Handle to a client's submission queue
///
/// Cloning shares the same queue and worker. The worker exits once every
/// handle has been dropped and the queue is drained.
#[derive(Debug, Clone)]
pub struct TxQueue {
    sender: mpsc::Sender<TxRequest>,
    submit_timeout: Duration,
    metrics: Arc<Metrics>,
}

impl TxQueue {
    /// Create the queue and spawn its worker on the current tokio runtime
    ///
    /// Fails outside a runtime instead of panicking.
    pub fn spawn(
        poller: ConfirmationPoller,
        config: &PipelineConfig,
        metrics: Arc<Metrics>,
    ) -> ClientResult<Self> {
        let runtime = Handle::try_current().map_err(|e| {
            ClientError::Configuration(format!("submission worker needs a tokio runtime: {e}"))
        })?;
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));

        let worker = TxWorker {
            receiver,
            poller,
            metrics: metrics.clone(),
        };
        runtime.spawn(worker.run());

        Ok(Self {
            sender,
            submit_timeout: config.submit_timeout(),
            metrics,
        })
    }

    /// Queue `handler` and wait for its confirmation
    ///
    /// Waits for queue space when the queue is full. The submission deadline
    /// starts once the request is queued.
    pub async fn submit<F, Fut>(&self, handler: F) -> TxResult
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ClientResult<String>> + Send + 'static,
    {
        self.submit_boxed(Box::new(move || handler().boxed())).await
    }

    pub async fn submit_boxed(&self, handler: TxHandler) -> TxResult {
        let (result_tx, result_rx) = oneshot::channel();
        let correlation_id = CorrelationId::new();
        let logger = StructuredLogger::new(correlation_id.clone());

        let request = TxRequest {
            handler,
            result: result_tx,
            correlation_id,
            enqueued_at: Instant::now(),
        };

        // Nothing is counted while waiting for space, so a cancelled caller
        // leaves the gauge untouched. Counted before the send so the worker
        // never decrements first.
        let permit = self
            .sender
            .reserve()
            .await
            .map_err(|_| ClientError::QueueClosed)?;
        self.metrics.queue_depth.inc();
        permit.send(request);
        self.metrics.submissions_total.inc();
        logger.log_enqueued(self.metrics.queue_depth.get());

        match timeout(self.submit_timeout, result_rx).await {
            Ok(Ok(result)) => result,
            // Worker dropped the sender without answering
            Ok(Err(_)) => Err(ClientError::QueueClosed),
            Err(_) => {
                self.metrics.submission_timeouts.inc();
                Err(ClientError::SubmissionTimeout {
                    timeout_ms: self.submit_timeout.as_millis() as u64,
                })
            }
        }
    }

    /// True once the worker has stopped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// The single consumer of a `TxQueue`
struct TxWorker {
    receiver: mpsc::Receiver<TxRequest>,
    poller: ConfirmationPoller,
    metrics: Arc<Metrics>,
}

impl TxWorker {
    async fn run(mut self) {
        debug!("Transaction worker started");

        while let Some(request) = self.receiver.recv().await {
            self.metrics.queue_depth.dec();
            self.metrics.in_flight.inc();
            self.process(request).await;
            self.metrics.in_flight.dec();
        }

        info!("Transaction worker stopped, queue closed");
    }

    async fn process(&self, request: TxRequest) {
        let TxRequest {
            handler,
            result,
            correlation_id,
            enqueued_at,
        } = request;
        let logger = StructuredLogger::new(correlation_id);

        // A caller that already timed out would never see this transaction land
        if result.is_closed() {
            self.metrics.submissions_abandoned.inc();
            logger.log_abandoned();
            return;
        }

        logger.log_dispatched(enqueued_at.elapsed());
        let outcome = self.dispatch(handler, &logger).await;

        if result.send(outcome).is_err() {
            logger.log_undelivered();
        }
    }

    async fn dispatch(&self, handler: TxHandler, logger: &StructuredLogger) -> TxResult {
        let started = Instant::now();

        let broadcast = AssertUnwindSafe(async move { handler().await })
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(ClientError::handler("submission handler panicked")));

        // Exactly one result per request: a failed handler never reaches the poller
        let txhash = match broadcast {
            Ok(txhash) => txhash,
            Err(e) => {
                self.metrics.handler_errors.inc();
                logger.log_handler_failure(&e);
                return Err(e);
            }
        };

        logger.log_broadcast(&txhash);
        let confirmation = self.poller.wait_for_tx(&txhash).await;

        let latency = started.elapsed();
        self.metrics
            .confirmation_latency
            .observe(latency.as_secs_f64());

        match &confirmation {
            Ok(tx) => {
                self.metrics.submissions_confirmed.inc();
                logger.log_confirmed(&txhash, &tx.height, latency);
            }
            Err(e) => {
                match e {
                    ClientError::TransactionFailed { .. } => self.metrics.submissions_failed.inc(),
                    ClientError::ConfirmationTimeout { .. } => {
                        self.metrics.confirmation_timeouts.inc()
                    }
                    _ => {}
                }
                logger.log_confirmation_error(&txhash, e, latency);
            }
        }

        confirmation
    }
}
