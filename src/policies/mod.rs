//! # Exception policies.
//!
//! When a subscriber or transformer fails (error return or caught panic),
//! the broker consults a policy slot instead of deciding itself. Two
//! independent slots exist — one per callback class — each holding either a
//! handler or the disabled sentinel (`None`), in which case the failure
//! propagates to the emit call site.
//!
//! ## Contents
//! - [`Decision`] — what a handler tells the delivery loop to do.
//! - [`ExceptionHandler`] — the handler contract for either slot.
//! - Built-ins: [`stop_and_log`], [`log_and_continue`], [`silent`],
//!   [`collect_and_continue`], [`collect_and_stop`].
//! - [`ErrorLog`] / [`ExceptionRecord`] — the shared log the collecting
//!   variants append to.
//!
//! ## Defaults
//! A new broker installs [`stop_and_log`] in both slots: failures are
//! recorded and halt the remaining pipeline without reaching the caller.

mod decision;
mod handlers;

pub use decision::{Decision, ExceptionHandler};
pub use handlers::{
    collect_and_continue, collect_and_stop, log_and_continue, silent, stop_and_log, ErrorLog,
    ExceptionRecord,
};
