use std::time::Duration;

use batch_distributor_types::{BatchKind, ValidationError};
use prometheus::{Encoder, TextEncoder};

use crate::metrics::*;

/// Metrics collector for the batch distributor
#[derive(Debug, Default)]
pub struct MetricsCollector;

impl MetricsCollector {
    pub fn new() -> Self {
        Self
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // BATCH METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Record a batch that landed on the ledger
    pub fn record_batch_submitted(&self, kind: BatchKind, invoices: usize, latency: Duration) {
        let label = [kind.as_str()];
        BATCHES_SUBMITTED.with_label_values(&label).inc();
        INVOICES_DISTRIBUTED
            .with_label_values(&label)
            .inc_by(invoices as u64);
        SUBMISSION_LATENCY
            .with_label_values(&label)
            .observe(latency.as_millis() as f64);
    }

    /// Record a batch refused before it reached the ledger
    pub fn record_batch_rejected(&self, kind: BatchKind, reason: RejectReason) {
        BATCHES_REJECTED
            .with_label_values(&[kind.as_str(), reason.as_str()])
            .inc();
    }

    /// Record a batch the ledger reverted
    pub fn record_batch_reverted(&self, kind: BatchKind) {
        BATCHES_REVERTED.with_label_values(&[kind.as_str()]).inc();
    }

    /// Record every failed check returned by invoice validation
    pub fn record_validation_errors(&self, errors: &[ValidationError]) {
        for error in errors {
            VALIDATION_ERRORS
                .with_label_values(&[error.code.as_str()])
                .inc();
        }
    }

    pub fn record_token_registered(&self) {
        TOKENS_REGISTERED.inc();
    }

    pub fn record_allowance_granted(&self) {
        ALLOWANCES_GRANTED.inc();
    }

    pub fn record_ledger_error(&self, error_type: &str) {
        LEDGER_ERRORS.with_label_values(&[error_type]).inc();
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // EXPORT
    // ═══════════════════════════════════════════════════════════════════════════

    /// Export metrics in Prometheus text format
    pub fn export_metrics(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = prometheus::gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| MetricsError::EncodingError(e.to_string()))?;

        String::from_utf8(buffer).map_err(|e| MetricsError::EncodingError(e.to_string()))
    }
}

/// Why a batch never reached the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// At least one invoice failed validation
    Validation,
    /// Held balance plus funding does not cover the batch
    InsufficientFunds,
    /// More invoices than the configured maximum
    TooLarge,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::Validation => "validation",
            RejectReason::InsufficientFunds => "insufficient_funds",
            RejectReason::TooLarge => "too_large",
        }
    }
}

/// Metrics error types
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("encoding error: {0}")]
    EncodingError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use batch_distributor_types::ErrorCode;

    #[test]
    fn test_metrics_collector_creation() {
        let collector = MetricsCollector::new();
        assert!(collector.export_metrics().is_ok());
    }

    #[test]
    fn test_record_batch_metrics() {
        let collector = MetricsCollector::new();

        collector.record_batch_submitted(BatchKind::Native, 3, Duration::from_millis(800));
        collector.record_batch_rejected(BatchKind::Token, RejectReason::Validation);
        collector.record_batch_reverted(BatchKind::Token);

        let metrics = collector.export_metrics().unwrap();
        assert!(metrics.contains("batch_distributor_batches_submitted_total"));
        assert!(metrics.contains("batch_distributor_invoices_distributed_total"));
        assert!(metrics.contains("batch_distributor_submission_latency_ms"));
        assert!(metrics.contains("batch_distributor_batches_rejected_total"));
        assert!(metrics.contains("reason=\"validation\""));
        assert!(metrics.contains("batch_distributor_batches_reverted_total"));
    }

    #[test]
    fn test_record_validation_errors_by_code() {
        let collector = MetricsCollector::new();
        let before = VALIDATION_ERRORS
            .with_label_values(&[ErrorCode::TokenNotInContract.as_str()])
            .get();

        collector.record_validation_errors(&[
            ValidationError::token_not_in_contract(0, "cosmos1token"),
            ValidationError::token_not_in_contract(2, "cosmos1token"),
        ]);

        let after = VALIDATION_ERRORS
            .with_label_values(&[ErrorCode::TokenNotInContract.as_str()])
            .get();
        assert!(after >= before + 2);

        let metrics = collector.export_metrics().unwrap();
        assert!(metrics.contains("TOKEN_NOT_IN_CONTRACT"));
    }

    #[test]
    fn test_reject_reason_labels() {
        assert_eq!(RejectReason::InsufficientFunds.as_str(), "insufficient_funds");
        assert_eq!(RejectReason::TooLarge.as_str(), "too_large");
    }
}
