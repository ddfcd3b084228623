//! # Built-in exception handlers.
//!
//! Each builder returns a ready-to-install [`ExceptionHandler`]. The log
//! variants write structured `tracing` records; the collecting variants
//! append to a caller-owned [`ErrorLog`] for batch inspection.
//!
//! ```rust
//! use emissary::{policies, Broker};
//!
//! let broker = Broker::new();
//! let log = policies::ErrorLog::new();
//! broker.set_subscriber_exception_handler(Some(policies::collect_and_continue(&log)));
//! // … emit, then inspect log.records()
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

use super::decision::{Decision, ExceptionHandler};

/// One collected callback failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionRecord {
    /// The namespace being emitted when the callback failed.
    pub namespace: String,
    /// Name of the failing callback.
    pub callback: String,
    /// Rendered error message.
    pub error: String,
}

/// Shared, appendable log of callback failures.
///
/// Cheap to clone; every clone views the same records. One log may back
/// both policy slots, or each slot may get its own.
#[derive(Clone, Default)]
pub struct ErrorLog {
    records: Arc<Mutex<Vec<ExceptionRecord>>>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record.
    pub fn push(&self, record: ExceptionRecord) {
        self.records.lock().push(record);
    }

    /// Copies out the collected records.
    pub fn records(&self) -> Vec<ExceptionRecord> {
        self.records.lock().clone()
    }

    /// Removes and returns the collected records.
    pub fn drain(&self) -> Vec<ExceptionRecord> {
        std::mem::take(&mut *self.records.lock())
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

/// Records the failure at `error` level, then stops the pipeline.
///
/// Installed in both slots by default.
pub fn stop_and_log() -> ExceptionHandler {
    Arc::new(|callback, namespace, error| {
        tracing::error!(%namespace, callback, %error, "callback failed; stopping delivery");
        Decision::Stop
    })
}

/// Records the failure at `warn` level, then continues with the next entry.
pub fn log_and_continue() -> ExceptionHandler {
    Arc::new(|callback, namespace, error| {
        tracing::warn!(%namespace, callback, %error, "callback failed; continuing");
        Decision::Continue
    })
}

/// Swallows the failure entirely and continues.
pub fn silent() -> ExceptionHandler {
    Arc::new(|_, _, _| Decision::Continue)
}

/// Appends an [`ExceptionRecord`] to `log`, then continues.
pub fn collect_and_continue(log: &ErrorLog) -> ExceptionHandler {
    let log = log.clone();
    Arc::new(move |callback, namespace, error| {
        log.push(ExceptionRecord {
            namespace: namespace.to_string(),
            callback: callback.to_string(),
            error: error.to_string(),
        });
        Decision::Continue
    })
}

/// Appends an [`ExceptionRecord`] to `log`, then stops the pipeline.
pub fn collect_and_stop(log: &ErrorLog) -> ExceptionHandler {
    let log = log.clone();
    Arc::new(move |callback, namespace, error| {
        log.push(ExceptionRecord {
            namespace: namespace.to_string(),
            callback: callback.to_string(),
            error: error.to_string(),
        });
        Decision::Stop
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boom() -> crate::error::CallbackError {
        "boom".into()
    }

    #[test]
    fn collecting_handlers_append_and_decide() {
        let log = ErrorLog::new();
        let cont = collect_and_continue(&log);
        let stop = collect_and_stop(&log);

        assert_eq!(cont("cb_a", "test.ns", &boom()), Decision::Continue);
        assert_eq!(stop("cb_b", "test.ns", &boom()), Decision::Stop);

        let records = log.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].callback, "cb_a");
        assert_eq!(records[1].error, "boom");
    }

    #[test]
    fn drain_empties_the_log() {
        let log = ErrorLog::new();
        collect_and_continue(&log)("cb", "ns", &boom());
        assert_eq!(log.len(), 1);
        assert_eq!(log.drain().len(), 1);
        assert!(log.is_empty());
    }

    #[test]
    fn silent_always_continues() {
        assert_eq!(silent()("cb", "ns", &boom()), Decision::Continue);
    }
}
