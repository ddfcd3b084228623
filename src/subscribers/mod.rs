//! # Event subscribers.
//!
//! A subscriber is a callback registered to a namespace. Two kinds exist:
//!
//! - [`Subscribe`] — synchronous; invoked by both `emit` and `emit_async`.
//! - [`SubscribeAsync`] — asynchronous; invoked (and awaited to completion)
//!   only by `emit_async`. Plain `emit` skips these entirely.
//!
//! The broker holds subscribers weakly: drop your last `Arc` and the entry
//! retires itself at the next resolution, delivery, or [`reap`] sweep —
//! the broker never keeps a subscriber's owner alive.
//!
//! ## Implementing a subscriber
//! ```rust
//! use emissary::{Event, Signature, Subscribe, CallbackError};
//!
//! struct AlertSink;
//!
//! impl Subscribe for AlertSink {
//!     fn on_event(&self, event: &Event) -> Result<(), CallbackError> {
//!         println!("alert: {:?}", event.get_str("message"));
//!         Ok(())
//!     }
//!
//!     fn signature(&self) -> Signature {
//!         Signature::exact(["message"])
//!     }
//!
//!     fn name(&self) -> &str {
//!         "alert-sink"
//!     }
//! }
//! ```
//!
//! For one-off closures, [`SubscriberFn`] / [`AsyncSubscriberFn`] wrap a
//! function without a dedicated type.
//!
//! [`reap`]: crate::Broker::reap

mod adapters;
mod subscribe;

pub use adapters::{AsyncSubscriberFn, SubscriberFn};
pub use subscribe::{AsyncSubscriberRef, Subscribe, SubscribeAsync, SubscriberRef};
