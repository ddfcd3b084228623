//! # The dispatch coordinator.
//!
//! [`Broker`] ties the pieces together: it owns the namespace registry,
//! the two exception-policy slots and the notification flags, and drives
//! every emission end-to-end (transform → resolve → validate → deliver →
//! meta-notify).

mod broker;

pub use broker::{Broker, BrokerStats};
