//! # Hierarchical namespace registry.
//!
//! Namespaces are dot-delimited paths (`system.io.file`) stored as a tree.
//! A trailing `*` segment is the subtree wildcard: entries registered at
//! `system.io.*` match emissions to anything strictly below `system.io`.
//!
//! ## Architecture
//! ```text
//! register("system.io.*", …)          emit("system.io.file.open", …)
//!         │                                   │
//!         ▼                                   ▼
//!       Registry ── ensure(path) ──►  resolve_subscribers(path)
//!         │                                   │
//!   (root) ─ system ─ io ─ *                  ├─ literal node entries
//!                      └── file ─ open        └─ every strict-prefix
//!                                                ancestor's `*` child
//! ```
//!
//! ## Rules
//! - Nodes are created lazily on first registration through them and deleted
//!   when they hold no entries and no children; both transitions are
//!   reported so the broker can fire namespace lifecycle notifications.
//! - Resolution returns a point-in-time snapshot ordered globally by
//!   `(priority desc, sequence asc)`; delivery never iterates live registry
//!   state.
//! - Signature records live on the node they were set for and die with it.

mod entry;
mod node;
pub(crate) mod path;
mod registry;
mod signature;

pub(crate) use entry::{
    LiveSubscriber, ResolvedSubscriber, ResolvedTransformer, SubscriberHandle,
};
pub(crate) use registry::Registry;
pub(crate) use signature::validate_emission;

pub use signature::Signature;
