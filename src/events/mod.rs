//! # Events and meta-notification plumbing.
//!
//! This module defines what actually travels through the broker:
//! - [`Event`] — one emission: namespace, final kwargs, sequence, timestamp.
//! - [`Kwargs`] — the keyword-argument map subscribers receive.
//! - [`notify`] — reserved namespace constants for the broker's own
//!   structural events, plus [`NotifyFlags`] to toggle them individually.

mod event;
pub mod notify;

pub use event::{Event, Kwargs};
pub use notify::NotifyFlags;
