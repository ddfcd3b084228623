//! # Registry entries and resolution snapshots.
//!
//! Entries hold weak handles so the broker never keeps a callback's owner
//! alive; a dead handle is detected at resolution or delivery time and the
//! entry is retired. Resolution clones entries into `Resolved*` snapshot
//! values so delivery iterates frozen state while callbacks are free to
//! mutate the registry.

use std::collections::BTreeSet;
use std::sync::{Arc, Weak};

use crate::subscribers::{Subscribe, SubscribeAsync};
use crate::transformers::Transform;

/// Weak handle to a subscriber callback, tagged with its delivery kind.
#[derive(Clone)]
pub(crate) enum SubscriberHandle {
    Sync(Weak<dyn Subscribe>),
    Async(Weak<dyn SubscribeAsync>),
}

/// Strong handle obtained by upgrading a [`SubscriberHandle`] for one call.
pub(crate) enum LiveSubscriber {
    Sync(Arc<dyn Subscribe>),
    Async(Arc<dyn SubscribeAsync>),
}

impl SubscriberHandle {
    #[inline]
    pub(crate) fn is_async(&self) -> bool {
        matches!(self, SubscriberHandle::Async(_))
    }

    /// Upgrades to a strong handle, or `None` if the owner was dropped.
    pub(crate) fn upgrade(&self) -> Option<LiveSubscriber> {
        match self {
            SubscriberHandle::Sync(weak) => weak.upgrade().map(LiveSubscriber::Sync),
            SubscriberHandle::Async(weak) => weak.upgrade().map(LiveSubscriber::Async),
        }
    }

    #[inline]
    pub(crate) fn is_dead(&self) -> bool {
        match self {
            SubscriberHandle::Sync(weak) => weak.strong_count() == 0,
            SubscriberHandle::Async(weak) => weak.strong_count() == 0,
        }
    }

    /// Identity comparison against a live sync callback.
    pub(crate) fn ptr_eq_sync(&self, callback: &Arc<dyn Subscribe>) -> bool {
        match self {
            SubscriberHandle::Sync(weak) => weak.ptr_eq(&Arc::downgrade(callback)),
            SubscriberHandle::Async(_) => false,
        }
    }

    /// Identity comparison against a live async callback.
    pub(crate) fn ptr_eq_async(&self, callback: &Arc<dyn SubscribeAsync>) -> bool {
        match self {
            SubscriberHandle::Sync(_) => false,
            SubscriberHandle::Async(weak) => weak.ptr_eq(&Arc::downgrade(callback)),
        }
    }
}

/// A subscriber registered at one namespace node.
pub(crate) struct SubscriberEntry {
    pub handle: SubscriberHandle,
    /// Name captured at registration, so retired entries stay identifiable.
    pub name: Arc<str>,
    /// Higher runs earlier.
    pub priority: i32,
    /// Global registration sequence; earlier wins priority ties.
    pub seq: u64,
    /// Declared `Signature::Flexible`; exempt from signature checks.
    pub flexible: bool,
}

/// A transformer registered at one namespace node.
pub(crate) struct TransformerEntry {
    pub handle: Weak<dyn Transform>,
    pub name: Arc<str>,
    pub priority: i32,
    pub seq: u64,
}

/// Snapshot of one matched subscriber, frozen at resolution time.
#[derive(Clone)]
pub(crate) struct ResolvedSubscriber {
    pub handle: SubscriberHandle,
    pub name: Arc<str>,
    pub priority: i32,
    pub seq: u64,
    pub flexible: bool,
    /// Path of the node the entry is registered on (may be a wildcard path).
    pub owner: Arc<str>,
    /// The owner node's signature record at resolution time.
    pub owner_signature: Option<Arc<BTreeSet<String>>>,
}

/// Snapshot of one matched transformer, frozen at resolution time.
#[derive(Clone)]
pub(crate) struct ResolvedTransformer {
    pub handle: Weak<dyn Transform>,
    pub name: Arc<str>,
    pub priority: i32,
    pub seq: u64,
    pub owner: Arc<str>,
}
