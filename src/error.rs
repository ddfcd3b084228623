//! Error types used by the broker.
//!
//! This module defines:
//!
//! - [`Error`] — failures surfaced to the caller of a registration or emit call.
//! - [`CallbackError`] — the boxed error type subscriber and transformer
//!   bodies return; routed through the configured exception policy.
//! - [`PanicError`] — a caught callback panic, adapted into [`CallbackError`]
//!   so panics flow through the same policy slots as ordinary errors.
//! - [`EmitStatus`] — the non-error outcome of an emission.
//!
//! Signature errors ([`Error::SignatureConflict`], [`Error::ArgumentMismatch`])
//! are always surfaced synchronously and never consult the exception policy;
//! [`Error::Subscriber`] / [`Error::Transformer`] appear only when the
//! corresponding policy slot is disabled.

use thiserror::Error;

/// Boxed error returned by subscriber and transformer bodies.
///
/// The broker does not interpret the payload; it forwards it to the configured
/// exception handler, or wraps it in [`Error`] when the handler slot is
/// disabled.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of an emission that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitStatus {
    /// The event passed the transformer pipeline and was offered to every
    /// matched subscriber (delivery may have been cut short by a `Stop`
    /// policy decision).
    Delivered,
    /// A transformer blocked the event; no subscriber was invoked.
    Blocked,
}

impl EmitStatus {
    /// Returns `true` if the emission was blocked by a transformer.
    #[inline]
    pub fn is_blocked(&self) -> bool {
        matches!(self, EmitStatus::Blocked)
    }
}

/// # Errors produced by broker operations.
///
/// Registration errors leave the registry untouched. Emission errors abort
/// the emission; already-delivered subscribers are not rolled back.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    /// A namespace string failed validation at registration or emit time.
    #[error("invalid namespace '{namespace}': {reason}")]
    InvalidNamespace {
        /// The offending namespace string.
        namespace: String,
        /// What the string violated.
        reason: &'static str,
    },

    /// A non-flexible subscriber's declared argument names disagree with the
    /// signature record already set for the namespace. The registration was
    /// rejected; no state was mutated.
    #[error(
        "subscriber signature mismatch for namespace '{namespace}': \
         expected parameters {expected:?}, but got {provided:?}"
    )]
    SignatureConflict {
        /// The namespace whose record was violated.
        namespace: String,
        /// Parameter names recorded for the namespace, sorted.
        expected: Vec<String>,
        /// Parameter names the rejected subscriber declared, sorted.
        provided: Vec<String>,
    },

    /// Emitted kwargs disagree with a matched namespace's signature record.
    /// Raised before any subscriber runs.
    #[error(
        "argument mismatch when emitting to '{emitted}': \
         subscribers in '{namespace}' expect {expected:?}, but got {provided:?}"
    )]
    ArgumentMismatch {
        /// The namespace the emit call targeted.
        emitted: String,
        /// The matched namespace whose record was violated.
        namespace: String,
        /// Parameter names recorded for the matched namespace, sorted.
        expected: Vec<String>,
        /// Keys of the emitted kwargs, sorted.
        provided: Vec<String>,
    },

    /// A transformer failed while the transformer policy slot was disabled.
    #[error("transformer '{transformer}' failed for namespace '{namespace}': {source}")]
    Transformer {
        /// The namespace being emitted when the transformer ran.
        namespace: String,
        /// Name of the failing transformer.
        transformer: String,
        /// The underlying callback error.
        source: CallbackError,
    },

    /// A subscriber failed while the subscriber policy slot was disabled.
    /// Remaining delivery for that emission was aborted.
    #[error("subscriber '{subscriber}' failed for namespace '{namespace}': {source}")]
    Subscriber {
        /// The namespace being emitted when the subscriber ran.
        namespace: String,
        /// Name of the failing subscriber.
        subscriber: String,
        /// The underlying callback error.
        source: CallbackError,
    },
}

impl Error {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Error::InvalidNamespace { .. } => "invalid_namespace",
            Error::SignatureConflict { .. } => "signature_conflict",
            Error::ArgumentMismatch { .. } => "argument_mismatch",
            Error::Transformer { .. } => "transformer_failed",
            Error::Subscriber { .. } => "subscriber_failed",
        }
    }

    /// Returns `true` for the registration/emission signature errors that are
    /// never routed through the exception policy slots.
    pub fn is_signature_error(&self) -> bool {
        matches!(
            self,
            Error::SignatureConflict { .. } | Error::ArgumentMismatch { .. }
        )
    }
}

/// A panic caught inside a subscriber or transformer body.
///
/// Delivery isolates callback panics and converts the payload into this
/// error so the configured policy decides whether to stop or continue, the
/// same as for an ordinary error return.
#[derive(Debug)]
pub struct PanicError {
    message: String,
}

impl PanicError {
    /// Extracts a printable message from a `catch_unwind` payload.
    pub fn from_payload(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        Self { message }
    }
}

impl std::fmt::Display for PanicError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "panic: {}", self.message)
    }
}

impl std::error::Error for PanicError {}
