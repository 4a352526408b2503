// Private module declaration
mod server;

use prometheus::{Histogram, HistogramOpts, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::{configure, health_handler, metrics_handler};

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Submission outcomes (completed, stored but not notified, rejected, failed)
// - Store operations by backend result
// - Publish attempts
// - Lookups by result
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Outcome label values for `order_submissions_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Completed,
    NotNotified,
    Rejected,
    StoreFailed,
}

impl SubmissionOutcome {
    fn label(&self) -> &'static str {
        match self {
            SubmissionOutcome::Completed => "completed",
            SubmissionOutcome::NotNotified => "not_notified",
            SubmissionOutcome::Rejected => "rejected",
            SubmissionOutcome::StoreFailed => "store_failed",
        }
    }
}

/// Central metrics registry for the service
pub struct Metrics {
    registry: Registry,

    pub submissions: IntCounterVec,
    pub submission_duration: Histogram,
    pub store_operations: IntCounterVec,
    pub publishes: IntCounterVec,
    pub lookups: IntCounterVec,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let submissions = IntCounterVec::new(
            Opts::new("order_submissions_total", "Order submissions by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(submissions.clone()))?;

        let submission_duration = Histogram::with_opts(
            HistogramOpts::new(
                "order_submission_duration_seconds",
                "Time spent storing and publishing one order",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        )?;
        registry.register(Box::new(submission_duration.clone()))?;

        let store_operations = IntCounterVec::new(
            Opts::new("order_store_operations_total", "Order store calls"),
            &["operation", "result"],
        )?;
        registry.register(Box::new(store_operations.clone()))?;

        let publishes = IntCounterVec::new(
            Opts::new("order_publish_total", "Order notification publish attempts"),
            &["result"],
        )?;
        registry.register(Box::new(publishes.clone()))?;

        let lookups = IntCounterVec::new(
            Opts::new("order_lookups_total", "Order lookups by result"),
            &["result"],
        )?;
        registry.register(Box::new(lookups.clone()))?;

        Ok(Self {
            registry,
            submissions,
            submission_duration,
            store_operations,
            publishes,
            lookups,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_submission(&self, outcome: SubmissionOutcome, duration_secs: f64) {
        self.submissions.with_label_values(&[outcome.label()]).inc();
        if outcome != SubmissionOutcome::Rejected {
            self.submission_duration.observe(duration_secs);
        }
    }

    pub fn record_store_operation(&self, operation: &str, success: bool) {
        let result = if success { "ok" } else { "error" };
        self.store_operations
            .with_label_values(&[operation, result])
            .inc();
    }

    pub fn record_publish(&self, success: bool) {
        let result = if success { "ok" } else { "error" };
        self.publishes.with_label_values(&[result]).inc();
    }

    pub fn record_lookup(&self, result: &str) {
        self.lookups.with_label_values(&[result]).inc();
    }
}
