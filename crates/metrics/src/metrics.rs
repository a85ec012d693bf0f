use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};

lazy_static! {
    // ═══════════════════════════════════════════════════════════════════════════
    // BATCH METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Batches that landed on the ledger, by kind
    pub static ref BATCHES_SUBMITTED: IntCounterVec = register_int_counter_vec!(
        "batch_distributor_batches_submitted_total",
        "Total batches executed on the ledger",
        &["kind"]
    )
    .unwrap();

    /// Batches refused before any ledger write
    pub static ref BATCHES_REJECTED: IntCounterVec = register_int_counter_vec!(
        "batch_distributor_batches_rejected_total",
        "Total batches rejected before submission",
        &["kind", "reason"]
    )
    .unwrap();

    /// Batches the ledger reverted as a whole
    pub static ref BATCHES_REVERTED: IntCounterVec = register_int_counter_vec!(
        "batch_distributor_batches_reverted_total",
        "Total batches reverted by the ledger",
        &["kind"]
    )
    .unwrap();

    /// Individual transfers carried by landed batches
    pub static ref INVOICES_DISTRIBUTED: IntCounterVec = register_int_counter_vec!(
        "batch_distributor_invoices_distributed_total",
        "Total invoices paid out by landed batches",
        &["kind"]
    )
    .unwrap();

    /// Submission latency histogram (in milliseconds), from validation to inclusion
    pub static ref SUBMISSION_LATENCY: HistogramVec = register_histogram_vec!(
        "batch_distributor_submission_latency_ms",
        "Batch submission latency in milliseconds",
        &["kind"],
        vec![100.0, 500.0, 1000.0, 5000.0, 10000.0, 30000.0, 60000.0]
    )
    .unwrap();

    // ═══════════════════════════════════════════════════════════════════════════
    // VALIDATION METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Failed invoice checks by error code
    pub static ref VALIDATION_ERRORS: IntCounterVec = register_int_counter_vec!(
        "batch_distributor_validation_errors_total",
        "Total invoice validation failures by code",
        &["code"]
    )
    .unwrap();

    // ═══════════════════════════════════════════════════════════════════════════
    // REGISTRY AND ALLOWANCE METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    pub static ref TOKENS_REGISTERED: IntCounter = register_int_counter!(
        "batch_distributor_tokens_registered_total",
        "Total tokens registered with the distributor"
    )
    .unwrap();

    pub static ref ALLOWANCES_GRANTED: IntCounter = register_int_counter!(
        "batch_distributor_allowances_granted_total",
        "Total max-allowance grants submitted"
    )
    .unwrap();

    // ═══════════════════════════════════════════════════════════════════════════
    // LEDGER METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Ledger transport errors by type, fed from error-level tracing events
    pub static ref LEDGER_ERRORS: IntCounterVec = register_int_counter_vec!(
        "batch_distributor_ledger_errors_total",
        "Total ledger errors by type",
        &["error_type"]
    )
    .unwrap();
}
