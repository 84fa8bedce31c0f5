//! Structured logging for submission lifecycle events

use std::time::Duration;

use crate::errors::ClientError;
use crate::observability::CorrelationId;

/// Emits one tracing event per lifecycle step of a submission
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    correlation_id: CorrelationId,
}

impl StructuredLogger {
    pub fn new(correlation_id: CorrelationId) -> Self {
        Self { correlation_id }
    }

    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    pub fn log_enqueued(&self, queue_depth: i64) {
        tracing::debug!(
            correlation_id = %self.correlation_id,
            queue_depth = queue_depth,
            "Submission enqueued"
        );
    }

    pub fn log_dispatched(&self, waited: Duration) {
        tracing::debug!(
            correlation_id = %self.correlation_id,
            waited_ms = waited.as_millis() as u64,
            "Submission dispatched to CLI"
        );
    }

    pub fn log_broadcast(&self, txhash: &str) {
        tracing::info!(
            correlation_id = %self.correlation_id,
            txhash = %txhash,
            "Transaction broadcast, awaiting confirmation"
        );
    }

    pub fn log_handler_failure(&self, error: &ClientError) {
        tracing::warn!(
            correlation_id = %self.correlation_id,
            category = error.category(),
            error = %error,
            "Submission handler failed"
        );
    }

    pub fn log_confirmed(&self, txhash: &str, height: &str, latency: Duration) {
        tracing::info!(
            correlation_id = %self.correlation_id,
            txhash = %txhash,
            height = %height,
            latency_ms = latency.as_millis() as u64,
            "Transaction confirmed"
        );
    }

    pub fn log_confirmation_error(&self, txhash: &str, error: &ClientError, latency: Duration) {
        tracing::warn!(
            correlation_id = %self.correlation_id,
            txhash = %txhash,
            category = error.category(),
            error = %error,
            latency_ms = latency.as_millis() as u64,
            "Transaction not confirmed"
        );
    }

    pub fn log_abandoned(&self) {
        tracing::warn!(
            correlation_id = %self.correlation_id,
            "Caller stopped waiting before dispatch, skipping submission"
        );
    }

    pub fn log_undelivered(&self) {
        tracing::debug!(
            correlation_id = %self.correlation_id,
            "Result dropped, caller no longer waiting"
        );
    }
}
