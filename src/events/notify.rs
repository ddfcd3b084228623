//! # Reserved meta-notification namespaces.
//!
//! The broker re-injects its own structural events as ordinary emissions on
//! reserved namespaces under `broker.notify.`, so wildcards, priorities and
//! transformers apply to them uniformly. Subscribe to a constant below (or a
//! wildcard such as `broker.notify.subscriber.*`) to observe the broker
//! itself.
//!
//! ## Payload shape
//! Every meta-notification carries `{"namespace": <originating path>}`.
//! The three emit kinds additionally carry `{"kwargs": <final payload>}`.
//!
//! ## Rules
//! - Each kind is individually toggled via [`NotifyFlags`]; everything is
//!   off by default so unused kinds cost nothing.
//! - Emissions to reserved namespaces never trigger further
//!   meta-notifications (recursion guard).
//! - A blocked emission fires no emit notifications.

/// Prefix of every reserved meta-notification namespace.
pub const NOTIFY_ROOT: &str = "broker.notify.";

/// A subscriber was registered (`register_subscriber`).
pub const ON_SUBSCRIBER_ADDED: &str = "broker.notify.subscriber.added";
/// A subscriber was unregistered (`unregister_subscriber`).
pub const ON_SUBSCRIBER_REMOVED: &str = "broker.notify.subscriber.removed";
/// A subscriber's owner was dropped and the entry was retired.
pub const ON_SUBSCRIBER_COLLECTED: &str = "broker.notify.subscriber.collected";

/// A transformer was registered (`register_transformer`).
pub const ON_TRANSFORMER_ADDED: &str = "broker.notify.transformer.added";
/// A transformer was unregistered (`unregister_transformer`).
pub const ON_TRANSFORMER_REMOVED: &str = "broker.notify.transformer.removed";
/// A transformer's owner was dropped and the entry was retired.
pub const ON_TRANSFORMER_COLLECTED: &str = "broker.notify.transformer.collected";

/// `emit()` completed (or was cut short by a `Stop` policy decision).
pub const ON_EMIT: &str = "broker.notify.emit.sync";
/// `emit_async()` completed (or was cut short by a `Stop` policy decision).
pub const ON_EMIT_ASYNC: &str = "broker.notify.emit.async";
/// Either emit entry point completed.
pub const ON_EMIT_ALL: &str = "broker.notify.emit.all";

/// A namespace node was created (one notification per new node).
pub const ON_NAMESPACE_CREATED: &str = "broker.notify.namespace.created";
/// A namespace node became empty and was deleted (one per pruned node).
pub const ON_NAMESPACE_DELETED: &str = "broker.notify.namespace.deleted";

/// Returns `true` for namespaces under the reserved meta prefix.
#[inline]
pub(crate) fn is_reserved(namespace: &str) -> bool {
    namespace.starts_with(NOTIFY_ROOT)
}

/// Per-kind toggles for meta-notification emission.
///
/// All flags default to `false`. Enable the kinds you observe:
///
/// ```rust
/// use emissary::{Broker, NotifyFlags};
///
/// let broker = Broker::new();
/// broker.set_flag_states(NotifyFlags {
///     on_namespace_created: true,
///     on_namespace_deleted: true,
///     ..NotifyFlags::default()
/// });
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NotifyFlags {
    /// Notify on `register_subscriber` ([`ON_SUBSCRIBER_ADDED`]).
    pub on_subscribe: bool,
    /// Notify on `unregister_subscriber` ([`ON_SUBSCRIBER_REMOVED`]).
    pub on_unsubscribe: bool,
    /// Notify when a dead subscriber entry is retired ([`ON_SUBSCRIBER_COLLECTED`]).
    pub on_subscriber_collected: bool,

    /// Notify on `register_transformer` ([`ON_TRANSFORMER_ADDED`]).
    pub on_transformer_add: bool,
    /// Notify on `unregister_transformer` ([`ON_TRANSFORMER_REMOVED`]).
    pub on_transformer_remove: bool,
    /// Notify when a dead transformer entry is retired ([`ON_TRANSFORMER_COLLECTED`]).
    pub on_transformer_collected: bool,

    /// Notify after each `emit()` ([`ON_EMIT`]).
    pub on_emit: bool,
    /// Notify after each `emit_async()` ([`ON_EMIT_ASYNC`]).
    pub on_emit_async: bool,
    /// Notify after either emit entry point ([`ON_EMIT_ALL`]).
    pub on_emit_all: bool,

    /// Notify per newly created namespace node ([`ON_NAMESPACE_CREATED`]).
    pub on_namespace_created: bool,
    /// Notify per deleted namespace node ([`ON_NAMESPACE_DELETED`]).
    pub on_namespace_deleted: bool,
}

impl NotifyFlags {
    /// Returns flags with every notification kind enabled.
    pub fn all() -> Self {
        Self {
            on_subscribe: true,
            on_unsubscribe: true,
            on_subscriber_collected: true,
            on_transformer_add: true,
            on_transformer_remove: true,
            on_transformer_collected: true,
            on_emit: true,
            on_emit_async: true,
            on_emit_all: true,
            on_namespace_created: true,
            on_namespace_deleted: true,
        }
    }
}
