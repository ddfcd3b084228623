//! # Function-backed subscribers.
//!
//! [`SubscriberFn`] and [`AsyncSubscriberFn`] wrap closures so call sites
//! can register a subscriber without defining a type. This is pure sugar
//! over the [`Subscribe`]/[`SubscribeAsync`] traits.
//!
//! ## Example
//! ```rust
//! use emissary::{Broker, Signature, SubscriberFn, SubscriberRef};
//!
//! let broker = Broker::new();
//! let on_alert: SubscriberRef = SubscriberFn::arc(
//!     "on_alert",
//!     Signature::exact(["message"]),
//!     |event| {
//!         println!("{}", event.get_str("message").unwrap_or("?"));
//!         Ok(())
//!     },
//! );
//! broker.register_subscriber("system.alert", &on_alert, 0).unwrap();
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CallbackError;
use crate::events::Event;
use crate::namespaces::Signature;

use super::subscribe::{Subscribe, SubscribeAsync};

/// Closure-backed synchronous subscriber.
pub struct SubscriberFn<F> {
    name: Cow<'static, str>,
    signature: Signature,
    f: F,
}

impl<F> SubscriberFn<F>
where
    F: Fn(&Event) -> Result<(), CallbackError> + Send + Sync + 'static,
{
    /// Creates a new function-backed subscriber.
    ///
    /// Prefer [`SubscriberFn::arc`] when you immediately need a
    /// [`SubscriberRef`](super::SubscriberRef).
    pub fn new(name: impl Into<Cow<'static, str>>, signature: Signature, f: F) -> Self {
        Self {
            name: name.into(),
            signature,
            f,
        }
    }

    /// Creates the subscriber and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, signature: Signature, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, signature, f))
    }
}

impl<F> Subscribe for SubscriberFn<F>
where
    F: Fn(&Event) -> Result<(), CallbackError> + Send + Sync + 'static,
{
    fn on_event(&self, event: &Event) -> Result<(), CallbackError> {
        (self.f)(event)
    }

    fn signature(&self) -> Signature {
        self.signature.clone()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Closure-backed asynchronous subscriber.
///
/// The closure receives an owned [`Event`] clone and creates a fresh future
/// per delivery, so no state is shared between invocations.
pub struct AsyncSubscriberFn<F> {
    name: Cow<'static, str>,
    signature: Signature,
    f: F,
}

impl<F> AsyncSubscriberFn<F> {
    /// Creates a new function-backed async subscriber.
    pub fn new(name: impl Into<Cow<'static, str>>, signature: Signature, f: F) -> Self {
        Self {
            name: name.into(),
            signature,
            f,
        }
    }

    /// Creates the subscriber and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, signature: Signature, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, signature, f))
    }
}

#[async_trait]
impl<F, Fut> SubscribeAsync for AsyncSubscriberFn<F>
where
    F: Fn(Event) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
{
    async fn on_event(&self, event: &Event) -> Result<(), CallbackError> {
        (self.f)(event.clone()).await
    }

    fn signature(&self) -> Signature {
        self.signature.clone()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
