//! Store metrics collection.
//!
//! Provides functions for recording document-store operation metrics.

use metrics::histogram;
use std::time::Instant;

/// Record a store operation duration.
pub fn record_op_duration(op_name: &str, duration_secs: f64) {
    histogram!(
        "store_op_duration_seconds",
        "op" => op_name.to_string()
    )
    .record(duration_secs);
}

/// A helper to time store operations and record metrics.
///
/// Usage:
/// ```ignore
/// let timer = OpTimer::new("tasks_list_active");
/// let result = store.list(&collection).await;
/// timer.record();
/// result
/// ```
pub struct OpTimer {
    op_name: String,
    start: Instant,
}

impl OpTimer {
    /// Create a new timer for the given operation name.
    pub fn new(op_name: impl Into<String>) -> Self {
        Self {
            op_name: op_name.into(),
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration to metrics.
    pub fn record(self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_op_duration(&self.op_name, duration);
    }
}
