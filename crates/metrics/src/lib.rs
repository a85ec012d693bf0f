//! Metrics and monitoring for the batch distributor
//!
//! This crate tracks batch submissions, validation failures, and ledger
//! reverts, and wires `tracing` output to them.
//!
//! # Features
//!
//! - Prometheus metrics exposition
//! - Tracing integration with correlation IDs
//! - Span tracking for batch submissions
//!
//! # Example
//!
//! ```no_run
//! use batch_distributor_metrics::{init_tracing_with_metrics, MetricsCollector};
//! use std::sync::Arc;
//!
//! let collector = Arc::new(MetricsCollector::new());
//! init_tracing_with_metrics(collector.clone(), "info").unwrap();
//!
//! collector.record_token_registered();
//! println!("{}", collector.export_metrics().unwrap());
//! ```

pub mod collector;
pub mod metrics;
pub mod tracing;

pub use crate::collector::{MetricsCollector, MetricsError, RejectReason};
pub use crate::tracing::{
    init_tracing, init_tracing_with_metrics, BatchSpan, CorrelationId, MetricsLayer,
    TracingError, DEFAULT_FILTER,
};
