//! # emissary
//!
//! **Emissary** is an in-process publish/subscribe event broker for Rust.
//!
//! Producers emit named events under hierarchical, dot-delimited namespaces;
//! independently registered subscribers receive them, optionally after a
//! chain of mutating/filtering transformers. The crate is designed as a
//! building block for decoupled application wiring, not a network broker:
//! everything is in-memory, single-process, and delivery is best-effort
//! within one emission.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  emit("system.io.file", kwargs)        register_subscriber("system.io.*", …)
//!        │                                              │
//!        ▼                                              ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Broker (dispatch coordinator)                                    │
//! │  - Namespace tree (subscribers, transformers, signature records)  │
//! │  - Exception policy slots (subscriber-side, transformer-side)     │
//! │  - Notification flags (broker.notify.* meta-events)               │
//! └──────┬───────────────────┬───────────────────┬────────────────────┘
//!        ▼                   ▼                   ▼
//!  transformer chain   signature check     delivery loop
//!  (priority order,    (kwargs must match  (priority order over the
//!   may rewrite or      matched records)    matched snapshot; dead
//!   Block)                                  entries retired)
//! ```
//!
//! ### One emission
//! ```text
//! emit(ns, kwargs)
//!   ├─► resolve transformers: literal node + every covering `*` ancestor
//!   ├─► run chain (priority desc, seq asc)
//!   │      └─ Flow::Block ─► return Blocked (no error, nothing delivered)
//!   ├─► resolve subscribers, filter by kind (emit: sync only)
//!   ├─► validate kwargs against matched signature records
//!   ├─► deliver in (priority desc, seq asc); failures → policy slot
//!   └─► fire ON_EMIT / ON_EMIT_ALL meta-notifications (if enabled)
//! ```
//!
//! ## Features
//! | Area              | Description                                               | Key types / traits                      |
//! |-------------------|-----------------------------------------------------------|-----------------------------------------|
//! | **Namespaces**    | Hierarchical paths with subtree wildcards (`system.*`).   | [`Broker`]                              |
//! | **Subscribers**   | Sync and async callbacks with priorities, held weakly.    | [`Subscribe`], [`SubscribeAsync`]       |
//! | **Transformers**  | Rewrite or block events before delivery.                  | [`Transform`], [`Flow`]                 |
//! | **Signatures**    | One agreed kwargs shape per namespace.                    | [`Signature`]                           |
//! | **Policies**      | Pluggable failure handling per callback class.            | [`policies`], [`Decision`]              |
//! | **Meta-events**   | The broker's own lifecycle on `broker.notify.*`.          | [`notify`], [`NotifyFlags`]             |
//!
//! ## Example
//! ```rust
//! use emissary::{json, kwargs, Broker, Flow, Signature, SubscriberFn,
//!                SubscriberRef, TransformFn, TransformerRef};
//!
//! fn main() -> Result<(), emissary::Error> {
//!     let broker = Broker::new();
//!
//!     // Subscriber at a literal namespace, with a declared signature.
//!     let on_startup: SubscriberRef = SubscriberFn::arc(
//!         "on_startup",
//!         Signature::exact(["timestamp"]),
//!         |event| {
//!             println!("started at {:?}", event.get("timestamp"));
//!             Ok(())
//!         },
//!     );
//!     broker.register_subscriber("system.startup", &on_startup, 0)?;
//!
//!     // Transformer on the whole `system` subtree adds the timestamp.
//!     let add_timestamp: TransformerRef = TransformFn::arc("add_timestamp", |_ns, mut kw| {
//!         kw.insert("timestamp".into(), json!(1_722_000_000));
//!         Ok(Flow::Next(kw))
//!     });
//!     broker.register_transformer("system.*", &add_timestamp, 10)?;
//!
//!     let status = broker.emit("system.startup", kwargs! {})?;
//!     assert!(!status.is_blocked());
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency model
//! One logical thread of control drives registrations and emissions. The
//! broker is `Send + Sync` and callbacks may safely re-enter it (a
//! subscriber can unregister itself mid-delivery), because every delivery
//! pass iterates a snapshot resolved at emission start. Multi-threaded
//! concurrent mutation is not a supported pattern. `emit` never suspends;
//! `emit_async` awaits asynchronous subscribers strictly one at a time, and
//! dropping its future aborts the remaining delivery.

mod core;
mod error;
mod events;
mod namespaces;
pub mod policies;
mod subscribers;
mod transformers;

// ---- Public re-exports ----

pub use crate::core::{Broker, BrokerStats};
pub use error::{CallbackError, EmitStatus, Error, PanicError};
pub use events::{notify, Event, Kwargs, NotifyFlags};
pub use namespaces::Signature;
pub use policies::{Decision, ErrorLog, ExceptionHandler, ExceptionRecord};
pub use subscribers::{
    AsyncSubscriberFn, AsyncSubscriberRef, Subscribe, SubscribeAsync, SubscriberFn, SubscriberRef,
};
pub use transformers::{Flow, Transform, TransformFn, TransformerRef};

// `kwargs!` expands to `$crate::json!`, so the macro is part of the surface.
pub use serde_json::{json, Value};
