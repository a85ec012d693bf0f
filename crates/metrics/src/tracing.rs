use std::sync::Arc;
use tracing::{field::Visit, Event, Level, Subscriber};
use tracing_subscriber::{
    fmt,
    layer::{Context, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use batch_distributor_types::BatchKind;

use crate::collector::MetricsCollector;

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "info,batch_distributor=debug";

/// Initialize JSON tracing output with a fresh metrics collector
pub fn init_tracing(default_filter: &str) -> Result<Arc<MetricsCollector>, TracingError> {
    let collector = Arc::new(MetricsCollector::new());
    init_tracing_with_metrics(collector.clone(), default_filter)?;
    Ok(collector)
}

/// Initialize tracing with metrics integration
pub fn init_tracing_with_metrics(
    collector: Arc<MetricsCollector>,
    default_filter: &str,
) -> Result<(), TracingError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_level(true)
        .json();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(MetricsLayer::new(collector))
        .try_init()
        .map_err(|e| TracingError::InitError(e.to_string()))?;

    Ok(())
}

/// Tracing layer that counts error events carrying an `error_type` field
pub struct MetricsLayer {
    collector: Arc<MetricsCollector>,
}

impl MetricsLayer {
    pub fn new(collector: Arc<MetricsCollector>) -> Self {
        Self { collector }
    }
}

impl<S> Layer<S> for MetricsLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::ERROR {
            return;
        }

        let mut visitor = ErrorTypeVisitor::default();
        event.record(&mut visitor);

        if let Some(error_type) = visitor.error_type {
            self.collector.record_ledger_error(&error_type);
        }
    }
}

#[derive(Default)]
struct ErrorTypeVisitor {
    error_type: Option<String>,
}

impl Visit for ErrorTypeVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "error_type" {
            self.error_type = Some(format!("{value:?}"));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "error_type" {
            self.error_type = Some(value.to_string());
        }
    }
}

/// Correlation ID tying together every log line of one batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationId(uuid::Uuid);

impl CorrelationId {
    /// Generate a new correlation ID
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Get the correlation ID as a string
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Span context for one batch submission
#[derive(Debug, Clone)]
pub struct BatchSpan {
    pub correlation_id: CorrelationId,
    pub kind: BatchKind,
    pub invoices: usize,
}

impl BatchSpan {
    pub fn new(kind: BatchKind, invoices: usize) -> Self {
        Self {
            correlation_id: CorrelationId::new(),
            kind,
            invoices,
        }
    }

    /// Tracing span for this batch; attach it to a future with `Instrument`
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "batch",
            correlation_id = %self.correlation_id,
            kind = self.kind.as_str(),
            invoices = self.invoices,
        )
    }
}

/// Tracing error types
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("tracing initialization error: {0}")]
    InitError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::LEDGER_ERRORS;

    #[test]
    fn test_correlation_id_generation() {
        let id1 = CorrelationId::new();
        let id2 = CorrelationId::new();

        assert_ne!(id1, id2);
        assert_eq!(id1.as_str().len(), 36);
    }

    #[test]
    fn test_batch_span_creation() {
        let batch = BatchSpan::new(BatchKind::Token, 4);

        assert_eq!(batch.kind, BatchKind::Token);
        assert_eq!(batch.invoices, 4);
    }

    #[test]
    fn test_metrics_layer_counts_error_events() {
        let collector = Arc::new(MetricsCollector::new());
        let subscriber = tracing_subscriber::registry().with(MetricsLayer::new(collector));

        let before = LEDGER_ERRORS.with_label_values(&["layer_test"]).get();

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(error_type = "layer_test", "ledger unreachable");
            tracing::warn!(error_type = "layer_test", "not counted");
            tracing::error!("no error type, not counted");
        });

        let after = LEDGER_ERRORS.with_label_values(&["layer_test"]).get();
        assert_eq!(after, before + 1);
    }
}
