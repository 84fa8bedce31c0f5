//! Metrics collection and export module
//!
//! Each client owns its own registry so several clients in one process do not
//! collide on metric names.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry, TextEncoder,
};

/// Pipeline metrics for one client
pub struct Metrics {
    registry: Registry,

    // Counters
    pub submissions_total: IntCounter,
    pub submissions_confirmed: IntCounter,
    pub submissions_failed: IntCounter,
    pub handler_errors: IntCounter,
    pub submissions_abandoned: IntCounter,
    pub confirmation_timeouts: IntCounter,
    pub submission_timeouts: IntCounter,
    pub poll_attempts: IntCounter,

    // Gauges
    pub queue_depth: IntGauge,
    pub in_flight: IntGauge,

    // Histograms
    pub confirmation_latency: Histogram,
}

impl Metrics {
    /// Create new metrics instance
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let submissions_total = IntCounter::with_opts(Opts::new(
            "akash_tx_submissions_total",
            "Transactions handed to the submission queue",
        ))?;

        let submissions_confirmed = IntCounter::with_opts(Opts::new(
            "akash_tx_confirmed_total",
            "Transactions confirmed on the ledger",
        ))?;

        let submissions_failed = IntCounter::with_opts(Opts::new(
            "akash_tx_failed_total",
            "Transactions the ledger reported as failed",
        ))?;

        let handler_errors = IntCounter::with_opts(Opts::new(
            "akash_tx_handler_errors_total",
            "Submissions whose handler failed before producing a hash",
        ))?;

        let submissions_abandoned = IntCounter::with_opts(Opts::new(
            "akash_tx_abandoned_total",
            "Queued submissions skipped because the caller stopped waiting",
        ))?;

        let confirmation_timeouts = IntCounter::with_opts(Opts::new(
            "akash_tx_confirmation_timeouts_total",
            "Confirmation polls that hit the worker deadline",
        ))?;

        let submission_timeouts = IntCounter::with_opts(Opts::new(
            "akash_tx_submission_timeouts_total",
            "Callers that gave up waiting for a result",
        ))?;

        let poll_attempts = IntCounter::with_opts(Opts::new(
            "akash_tx_poll_attempts_total",
            "Confirmation queries issued",
        ))?;

        let queue_depth = IntGauge::with_opts(Opts::new(
            "akash_tx_queue_depth",
            "Submissions waiting for the worker",
        ))?;

        let in_flight = IntGauge::with_opts(Opts::new(
            "akash_tx_in_flight",
            "Submissions currently being processed (0 or 1)",
        ))?;

        let confirmation_latency = Histogram::with_opts(
            HistogramOpts::new(
                "akash_tx_confirmation_latency_seconds",
                "Time from dispatch to final status",
            )
            .buckets(vec![0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 45.0, 90.0]),
        )?;

        registry.register(Box::new(submissions_total.clone()))?;
        registry.register(Box::new(submissions_confirmed.clone()))?;
        registry.register(Box::new(submissions_failed.clone()))?;
        registry.register(Box::new(handler_errors.clone()))?;
        registry.register(Box::new(submissions_abandoned.clone()))?;
        registry.register(Box::new(confirmation_timeouts.clone()))?;
        registry.register(Box::new(submission_timeouts.clone()))?;
        registry.register(Box::new(poll_attempts.clone()))?;
        registry.register(Box::new(queue_depth.clone()))?;
        registry.register(Box::new(in_flight.clone()))?;
        registry.register(Box::new(confirmation_latency.clone()))?;

        Ok(Self {
            registry,
            submissions_total,
            submissions_confirmed,
            submissions_failed,
            handler_errors,
            submissions_abandoned,
            confirmation_timeouts,
            submission_timeouts,
            poll_attempts,
            queue_depth,
            in_flight,
            confirmation_latency,
        })
    }

    /// Get the registry for exporting
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Prometheus text exposition of every metric
    pub fn encode(&self) -> anyhow::Result<String> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("submissions_total", &self.submissions_total.get())
            .field("queue_depth", &self.queue_depth.get())
            .field("in_flight", &self.in_flight.get())
            .finish_non_exhaustive()
    }
}
