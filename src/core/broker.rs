//! # The event broker.
//!
//! ## Emission pipeline
//! ```text
//! emit(ns, kwargs) / emit_async(ns, kwargs)
//!     │
//!     ├─ 1. transformer pipeline   (priority order; may rewrite or Block)
//!     ├─ 2. resolve subscribers    (literal node + covering wildcards,
//!     │                             snapshot; emit() keeps sync entries only)
//!     ├─ 3. validate kwargs        (against matched signature records)
//!     ├─ 4. deliver                (global priority order; dead entries
//!     │                             purged; failures → policy slots)
//!     └─ 5. meta-notifications     (ON_EMIT / ON_EMIT_ASYNC / ON_EMIT_ALL)
//! ```
//!
//! ## Concurrency model
//! One logical thread of control is assumed: a single execution context
//! drives registrations and emissions. The registry sits behind a mutex so
//! the broker is `Send + Sync` and — more importantly — so callbacks can
//! re-enter the broker mid-delivery (a subscriber may unregister itself, or
//! emit). Locks are never held across a callback invocation or an await
//! point; every delivery loop iterates a snapshot resolved at emission
//! start, so concurrent registry mutation never affects an in-flight pass.
//! This is re-entrancy safety, not a cross-thread ordering guarantee:
//! mutating the registry from multiple threads at once is unsupported.
//!
//! `emit` never suspends. `emit_async` suspends only inside asynchronous
//! subscriber calls, one at a time; dropping its future aborts the
//! remaining delivery (already-delivered subscribers are not rolled back).

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::{CallbackError, EmitStatus, Error, PanicError};
use crate::events::notify;
use crate::events::{Event, Kwargs, NotifyFlags};
use crate::namespaces::{
    validate_emission, LiveSubscriber, Registry, ResolvedSubscriber, ResolvedTransformer,
    SubscriberHandle,
};
use crate::namespaces::path;
use crate::policies::{self, Decision, ExceptionHandler};
use crate::subscribers::{AsyncSubscriberRef, SubscriberRef};
use crate::transformers::{Flow, TransformerRef};

/// Broker-wide registry totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokerStats {
    /// Number of existing namespace nodes (intermediates included).
    pub namespaces: usize,
    /// Subscriber entries, dead references included.
    pub subscribers: usize,
    /// Subscriber entries whose owner is still alive.
    pub live_subscribers: usize,
    /// Transformer entries, dead references included.
    pub transformers: usize,
    /// Transformer entries whose owner is still alive.
    pub live_transformers: usize,
}

impl BrokerStats {
    /// Subscriber entries awaiting retirement.
    #[inline]
    pub fn dead_subscribers(&self) -> usize {
        self.subscribers - self.live_subscribers
    }

    /// Transformer entries awaiting retirement.
    #[inline]
    pub fn dead_transformers(&self) -> usize {
        self.transformers - self.live_transformers
    }
}

/// In-process publish/subscribe event broker.
///
/// Construct one per process (or per isolated event domain) and share it by
/// reference or `Arc`; there is no global instance.
///
/// ```rust
/// use emissary::{kwargs, Broker, Signature, SubscriberFn, SubscriberRef};
///
/// let broker = Broker::new();
///
/// let on_alert: SubscriberRef = SubscriberFn::arc(
///     "on_alert",
///     Signature::exact(["message"]),
///     |event| {
///         println!("alert: {}", event.get_str("message").unwrap_or("?"));
///         Ok(())
///     },
/// );
/// broker.register_subscriber("system.alert", &on_alert, 0)?;
///
/// let status = broker.emit("system.alert", kwargs! { "message" => "Warning!" })?;
/// assert!(!status.is_blocked());
/// # Ok::<(), emissary::Error>(())
/// ```
pub struct Broker {
    registry: Mutex<Registry>,
    flags: Mutex<NotifyFlags>,
    subscriber_handler: Mutex<Option<ExceptionHandler>>,
    transformer_handler: Mutex<Option<ExceptionHandler>>,
}

impl Default for Broker {
    /// A broker with every notification kind off and [`stop_and_log`]
    /// installed in both exception-policy slots.
    ///
    /// [`stop_and_log`]: crate::policies::stop_and_log
    fn default() -> Self {
        Self {
            registry: Mutex::new(Registry::new()),
            flags: Mutex::new(NotifyFlags::default()),
            subscriber_handler: Mutex::new(Some(policies::stop_and_log())),
            transformer_handler: Mutex::new(Some(policies::stop_and_log())),
        }
    }
}

impl Broker {
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------------
    // Subscriber management
    // ---------------------------

    /// Registers a synchronous subscriber to a namespace.
    ///
    /// `namespace` may be a literal path (`system.io.file`) or a subtree
    /// wildcard (`system.io.*`, bare `*`). Higher `priority` runs earlier;
    /// ties go to the earlier registration.
    ///
    /// # Errors
    /// [`Error::SignatureConflict`] if the callback declares an exact
    /// signature disagreeing with the namespace's record — the callback is
    /// not added. [`Error::InvalidNamespace`] on malformed paths.
    pub fn register_subscriber(
        &self,
        namespace: &str,
        callback: &SubscriberRef,
        priority: i32,
    ) -> Result<(), Error> {
        self.add_subscriber(
            namespace,
            SubscriberHandle::Sync(Arc::downgrade(callback)),
            callback.name().into(),
            priority,
            &callback.signature(),
        )
    }

    /// Registers an asynchronous subscriber to a namespace.
    ///
    /// Async subscribers are invoked only by [`emit_async`](Self::emit_async);
    /// plain [`emit`](Self::emit) skips them. Same ordering and signature
    /// rules as [`register_subscriber`](Self::register_subscriber).
    pub fn register_async_subscriber(
        &self,
        namespace: &str,
        callback: &AsyncSubscriberRef,
        priority: i32,
    ) -> Result<(), Error> {
        self.add_subscriber(
            namespace,
            SubscriberHandle::Async(Arc::downgrade(callback)),
            callback.name().into(),
            priority,
            &callback.signature(),
        )
    }

    fn add_subscriber(
        &self,
        namespace: &str,
        handle: SubscriberHandle,
        name: Arc<str>,
        priority: i32,
        signature: &crate::namespaces::Signature,
    ) -> Result<(), Error> {
        let registration = self.registry.lock().register_subscriber(
            namespace,
            handle,
            name,
            priority,
            signature,
        )?;

        let flags = self.flags();
        if flags.on_namespace_created {
            for created in &registration.created {
                self.notify(notify::ON_NAMESPACE_CREATED, created, None);
            }
        }
        if flags.on_subscribe {
            self.notify(notify::ON_SUBSCRIBER_ADDED, namespace, None);
        }
        Ok(())
    }

    /// Removes a synchronous subscriber from a namespace.
    ///
    /// Returns `true` if at least one entry was removed. Emptied namespace
    /// nodes are deleted (firing [`ON_NAMESPACE_DELETED`] when enabled).
    ///
    /// [`ON_NAMESPACE_DELETED`]: crate::events::notify::ON_NAMESPACE_DELETED
    pub fn unregister_subscriber(&self, namespace: &str, callback: &SubscriberRef) -> bool {
        let removal = self
            .registry
            .lock()
            .remove_subscribers(namespace, |e| e.handle.ptr_eq_sync(callback));
        if removal.removed == 0 {
            return false;
        }

        if self.flags().on_unsubscribe {
            self.notify(notify::ON_SUBSCRIBER_REMOVED, namespace, None);
        }
        self.notify_deleted(&removal.deleted);
        true
    }

    /// Removes an asynchronous subscriber from a namespace.
    pub fn unregister_async_subscriber(
        &self,
        namespace: &str,
        callback: &AsyncSubscriberRef,
    ) -> bool {
        let removal = self
            .registry
            .lock()
            .remove_subscribers(namespace, |e| e.handle.ptr_eq_async(callback));
        if removal.removed == 0 {
            return false;
        }

        if self.flags().on_unsubscribe {
            self.notify(notify::ON_SUBSCRIBER_REMOVED, namespace, None);
        }
        self.notify_deleted(&removal.deleted);
        true
    }

    // ---------------------------
    // Transformer management
    // ---------------------------

    /// Registers a transformer for a namespace (literal or wildcard).
    ///
    /// Matched transformers run before delivery in `(priority desc,
    /// sequence asc)` order and may rewrite the kwargs or block the event.
    pub fn register_transformer(
        &self,
        namespace: &str,
        transformer: &TransformerRef,
        priority: i32,
    ) -> Result<(), Error> {
        let registration = self.registry.lock().register_transformer(
            namespace,
            Arc::downgrade(transformer),
            transformer.name().into(),
            priority,
        )?;

        let flags = self.flags();
        if flags.on_namespace_created {
            for created in &registration.created {
                self.notify(notify::ON_NAMESPACE_CREATED, created, None);
            }
        }
        if flags.on_transformer_add {
            self.notify(notify::ON_TRANSFORMER_ADDED, namespace, None);
        }
        Ok(())
    }

    /// Removes a transformer from a namespace.
    pub fn unregister_transformer(&self, namespace: &str, transformer: &TransformerRef) -> bool {
        let weak = Arc::downgrade(transformer);
        let removal = self
            .registry
            .lock()
            .remove_transformers(namespace, |e| e.handle.ptr_eq(&weak));
        if removal.removed == 0 {
            return false;
        }

        if self.flags().on_transformer_remove {
            self.notify(notify::ON_TRANSFORMER_REMOVED, namespace, None);
        }
        self.notify_deleted(&removal.deleted);
        true
    }

    // ---------------------------
    // Policy & notification configuration
    // ---------------------------

    /// Sets the subscriber exception handler, or disables it with `None`.
    ///
    /// Disabled means a subscriber failure propagates to the emit call site
    /// as [`Error::Subscriber`], aborting remaining delivery.
    pub fn set_subscriber_exception_handler(&self, handler: Option<ExceptionHandler>) {
        *self.subscriber_handler.lock() = handler;
    }

    /// Sets the transformer exception handler, or disables it with `None`.
    ///
    /// Disabled means a transformer failure propagates to the emit call
    /// site as [`Error::Transformer`], aborting the emission.
    pub fn set_transformer_exception_handler(&self, handler: Option<ExceptionHandler>) {
        *self.transformer_handler.lock() = handler;
    }

    /// Replaces the meta-notification toggles.
    pub fn set_flag_states(&self, flags: NotifyFlags) {
        *self.flags.lock() = flags;
    }

    // ---------------------------
    // Emission
    // ---------------------------

    /// Emits an event to all matching synchronous subscribers.
    ///
    /// Asynchronous subscribers are skipped entirely; use
    /// [`emit_async`](Self::emit_async) to reach them. Never suspends.
    ///
    /// # Errors
    /// [`Error::ArgumentMismatch`] if the (transformed) kwargs disagree
    /// with a matched signature record — no subscriber runs.
    /// [`Error::Transformer`] / [`Error::Subscriber`] only when the
    /// corresponding policy slot is disabled.
    pub fn emit(&self, namespace: &str, kwargs: Kwargs) -> Result<EmitStatus, Error> {
        path::validate(namespace)?;

        let Some(kwargs) = self.run_transformers(namespace, kwargs)? else {
            return Ok(EmitStatus::Blocked);
        };

        let matched: Vec<ResolvedSubscriber> = self
            .registry
            .lock()
            .resolve_subscribers(namespace)
            .into_iter()
            .filter(|s| !s.handle.is_async())
            .collect();
        validate_emission(namespace, &matched, &kwargs)?;

        let event = Event::new(namespace, kwargs);
        self.deliver_sync(&event, &matched)?;

        let flags = self.flags();
        if flags.on_emit {
            self.notify(notify::ON_EMIT, namespace, Some(&event.kwargs));
        }
        if flags.on_emit_all {
            self.notify(notify::ON_EMIT_ALL, namespace, Some(&event.kwargs));
        }
        Ok(EmitStatus::Delivered)
    }

    /// Emits an event to all matching subscribers, awaiting async ones.
    ///
    /// Both callback kinds are interleaved in one global `(priority desc,
    /// sequence asc)` order; each asynchronous subscriber is awaited to
    /// completion before the next entry runs, so delivery is strictly
    /// sequential regardless of kind. Dropping the returned future aborts
    /// the remaining delivery; already-delivered subscribers stay
    /// delivered.
    pub async fn emit_async(&self, namespace: &str, kwargs: Kwargs) -> Result<EmitStatus, Error> {
        path::validate(namespace)?;

        let Some(kwargs) = self.run_transformers(namespace, kwargs)? else {
            return Ok(EmitStatus::Blocked);
        };

        let matched = self.registry.lock().resolve_subscribers(namespace);
        validate_emission(namespace, &matched, &kwargs)?;

        let event = Event::new(namespace, kwargs);
        self.deliver_mixed(&event, &matched).await?;

        let flags = self.flags();
        if flags.on_emit_async {
            self.notify(notify::ON_EMIT_ASYNC, namespace, Some(&event.kwargs));
        }
        if flags.on_emit_all {
            self.notify(notify::ON_EMIT_ALL, namespace, Some(&event.kwargs));
        }
        Ok(EmitStatus::Delivered)
    }

    /// Threads kwargs through the matched transformer chain.
    ///
    /// Returns `None` when the event was blocked (or a handler decided
    /// `Stop` on failure).
    fn run_transformers(&self, namespace: &str, kwargs: Kwargs) -> Result<Option<Kwargs>, Error> {
        let resolved = self.registry.lock().resolve_transformers(namespace);
        let mut current = kwargs;

        for tx in &resolved {
            let Some(live) = tx.handle.upgrade() else {
                self.purge_collected_transformer(tx);
                continue;
            };

            let input = current.clone();
            let applied = catch_unwind(AssertUnwindSafe(|| live.apply(namespace, input)));
            let outcome: Result<Flow, CallbackError> = match applied {
                Ok(result) => result,
                Err(payload) => Err(Box::new(PanicError::from_payload(payload))),
            };

            match outcome {
                Ok(Flow::Next(kwargs)) => current = kwargs,
                Ok(Flow::Block) => return Ok(None),
                Err(error) => {
                    let handler = self.transformer_handler.lock().clone();
                    match handler {
                        None => {
                            return Err(Error::Transformer {
                                namespace: namespace.to_string(),
                                transformer: tx.name.to_string(),
                                source: error,
                            });
                        }
                        Some(decide) => match decide(&tx.name, namespace, &error) {
                            Decision::Stop => return Ok(None),
                            Decision::Continue => {}
                        },
                    }
                }
            }
        }
        Ok(Some(current))
    }

    fn deliver_sync(&self, event: &Event, matched: &[ResolvedSubscriber]) -> Result<(), Error> {
        for sub in matched {
            let Some(live) = sub.handle.upgrade() else {
                self.purge_collected_subscriber(sub);
                continue;
            };
            let LiveSubscriber::Sync(callback) = live else {
                continue;
            };

            let invoked = catch_unwind(AssertUnwindSafe(|| callback.on_event(event)));
            let outcome: Result<(), CallbackError> = match invoked {
                Ok(result) => result,
                Err(payload) => Err(Box::new(PanicError::from_payload(payload))),
            };

            if let Err(error) = outcome {
                match self.decide_subscriber_failure(sub, event, error)? {
                    Decision::Stop => break,
                    Decision::Continue => {}
                }
            }
        }
        Ok(())
    }

    async fn deliver_mixed(
        &self,
        event: &Event,
        matched: &[ResolvedSubscriber],
    ) -> Result<(), Error> {
        for sub in matched {
            let Some(live) = sub.handle.upgrade() else {
                self.purge_collected_subscriber(sub);
                continue;
            };

            let outcome: Result<(), CallbackError> = match live {
                LiveSubscriber::Sync(callback) => {
                    match catch_unwind(AssertUnwindSafe(|| callback.on_event(event))) {
                        Ok(result) => result,
                        Err(payload) => Err(Box::new(PanicError::from_payload(payload))),
                    }
                }
                LiveSubscriber::Async(callback) => {
                    match AssertUnwindSafe(callback.on_event(event)).catch_unwind().await {
                        Ok(result) => result,
                        Err(payload) => Err(Box::new(PanicError::from_payload(payload))),
                    }
                }
            };

            if let Err(error) = outcome {
                match self.decide_subscriber_failure(sub, event, error)? {
                    Decision::Stop => break,
                    Decision::Continue => {}
                }
            }
        }
        Ok(())
    }

    fn decide_subscriber_failure(
        &self,
        sub: &ResolvedSubscriber,
        event: &Event,
        error: CallbackError,
    ) -> Result<Decision, Error> {
        let handler = self.subscriber_handler.lock().clone();
        match handler {
            None => Err(Error::Subscriber {
                namespace: event.namespace.to_string(),
                subscriber: sub.name.to_string(),
                source: error,
            }),
            Some(decide) => Ok(decide(&sub.name, &event.namespace, &error)),
        }
    }

    // ---------------------------
    // Lifecycle
    // ---------------------------

    /// Eagerly retires every dead subscriber and transformer entry.
    ///
    /// Dead entries are otherwise purged lazily when an emission touches
    /// them; call this to retire them (and fire the collected/deleted
    /// notifications) without waiting for traffic. Returns the number of
    /// entries retired.
    pub fn reap(&self) -> usize {
        let report = self.registry.lock().reap();

        let flags = self.flags();
        if flags.on_subscriber_collected {
            for (owner, _) in &report.subscribers {
                self.notify(notify::ON_SUBSCRIBER_COLLECTED, owner, None);
            }
        }
        if flags.on_transformer_collected {
            for (owner, _) in &report.transformers {
                self.notify(notify::ON_TRANSFORMER_COLLECTED, owner, None);
            }
        }
        self.notify_deleted(&report.deleted);

        report.subscribers.len() + report.transformers.len()
    }

    fn purge_collected_subscriber(&self, sub: &ResolvedSubscriber) {
        let removal = self
            .registry
            .lock()
            .remove_subscribers(&sub.owner, |e| e.seq == sub.seq);
        if removal.removed == 0 {
            return; // already retired by an earlier observer
        }

        if self.flags().on_subscriber_collected {
            self.notify(notify::ON_SUBSCRIBER_COLLECTED, &sub.owner, None);
        }
        self.notify_deleted(&removal.deleted);
    }

    fn purge_collected_transformer(&self, tx: &ResolvedTransformer) {
        let removal = self
            .registry
            .lock()
            .remove_transformers(&tx.owner, |e| e.seq == tx.seq);
        if removal.removed == 0 {
            return;
        }

        if self.flags().on_transformer_collected {
            self.notify(notify::ON_TRANSFORMER_COLLECTED, &tx.owner, None);
        }
        self.notify_deleted(&removal.deleted);
    }

    /// Drops every registration, record, and node. Notification flags and
    /// policy slots are untouched. Intended for tests and full resets; no
    /// notifications fire.
    pub fn clear(&self) {
        self.registry.lock().clear();
    }

    /// Removes every transformer everywhere, deleting emptied nodes.
    pub fn clear_transformers(&self) {
        let deleted = self.registry.lock().clear_transformers();
        self.notify_deleted(&deleted);
    }

    // ---------------------------
    // Meta-notifications
    // ---------------------------

    /// Re-injects a structural event as an ordinary emission.
    ///
    /// Skipped when the originating namespace is itself reserved, which is
    /// what stops notification recursion. A failed meta-emission is logged
    /// and swallowed so it can never corrupt the primary operation's
    /// result.
    fn notify(&self, kind: &'static str, origin: &str, payload: Option<&Kwargs>) {
        if notify::is_reserved(origin) {
            return;
        }

        let mut kwargs = Kwargs::new();
        kwargs.insert("namespace".into(), Value::String(origin.to_string()));
        if let Some(payload) = payload {
            kwargs.insert("kwargs".into(), Value::Object(payload.clone()));
        }

        if let Err(error) = self.emit(kind, kwargs) {
            tracing::warn!(kind, origin, %error, "meta-notification emission failed");
        }
    }

    fn notify_deleted(&self, deleted: &[Arc<str>]) {
        if deleted.is_empty() || !self.flags().on_namespace_deleted {
            return;
        }
        for path in deleted {
            self.notify(notify::ON_NAMESPACE_DELETED, path, None);
        }
    }

    #[inline]
    fn flags(&self) -> NotifyFlags {
        *self.flags.lock()
    }

    // ---------------------------
    // Introspection
    // ---------------------------

    /// Subscriber entries registered exactly at `namespace` (dead included).
    pub fn subscriber_count(&self, namespace: &str) -> usize {
        self.registry.lock().subscriber_count(namespace)
    }

    /// Subscriber entries at `namespace` whose owner is still alive.
    pub fn live_subscriber_count(&self, namespace: &str) -> usize {
        self.registry.lock().live_subscriber_count(namespace)
    }

    /// Transformer entries registered exactly at `namespace` (dead included).
    pub fn transformer_count(&self, namespace: &str) -> usize {
        self.registry.lock().transformer_count(namespace)
    }

    /// Transformer entries at `namespace` whose owner is still alive.
    pub fn live_transformer_count(&self, namespace: &str) -> usize {
        self.registry.lock().live_transformer_count(namespace)
    }

    /// Whether `callback` is registered at `namespace`.
    pub fn is_subscribed(&self, namespace: &str, callback: &SubscriberRef) -> bool {
        self.registry.lock().is_subscribed(namespace, callback)
    }

    /// Whether async `callback` is registered at `namespace`.
    pub fn is_async_subscribed(&self, namespace: &str, callback: &AsyncSubscriberRef) -> bool {
        self.registry.lock().is_async_subscribed(namespace, callback)
    }

    /// Whether `transformer` is registered at `namespace`.
    pub fn is_transformed(&self, namespace: &str, transformer: &TransformerRef) -> bool {
        self.registry.lock().is_transformed(namespace, transformer)
    }

    /// Every existing namespace node path, sorted.
    pub fn namespaces(&self) -> Vec<String> {
        self.registry.lock().namespaces()
    }

    /// Whether a node exists at `namespace`.
    pub fn namespace_exists(&self, namespace: &str) -> bool {
        self.registry.lock().namespace_exists(namespace)
    }

    /// Broker-wide totals.
    pub fn stats(&self) -> BrokerStats {
        let (namespaces, subscribers, live_subscribers, transformers, live_transformers) =
            self.registry.lock().totals();
        BrokerStats {
            namespaces,
            subscribers,
            live_subscribers,
            transformers,
            live_transformers,
        }
    }

    /// JSON snapshot of every namespace holding entries.
    pub fn to_json(&self) -> Value {
        self.registry.lock().to_json()
    }

    /// Pretty-printed [`to_json`](Self::to_json).
    pub fn to_string_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.to_json()).unwrap_or_default()
    }

    /// Writes the pretty-printed registry snapshot to `path`.
    pub fn export(&self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        let text = serde_json::to_string_pretty(&self.to_json())
            .map_err(std::io::Error::other)?;
        std::fs::write(path, text)
    }
}
