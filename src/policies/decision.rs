//! # The policy decision contract.

use std::sync::Arc;

use crate::error::CallbackError;

/// What an exception handler tells the pipeline to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Abort the remaining pipeline for this emission. For a subscriber
    /// failure, remaining delivery is skipped; for a transformer failure,
    /// the emission ends as if blocked.
    Stop,
    /// Carry on with the next entry. A failed transformer's output is
    /// treated as a no-op (kwargs pass through unchanged).
    Continue,
}

/// Handler consulted when a callback fails.
///
/// Receives the failing callback's name, the emitted namespace, and the
/// error (callback panics arrive as [`PanicError`]). Swapping a slot takes
/// effect for all subsequent failures; a delivery loop already past the
/// decision point for a given callback is not revisited.
///
/// [`PanicError`]: crate::PanicError
pub type ExceptionHandler =
    Arc<dyn Fn(&str, &str, &CallbackError) -> Decision + Send + Sync>;
