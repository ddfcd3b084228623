//! # The transformer contract and its closure adapter.

use std::borrow::Cow;
use std::sync::Arc;

use crate::error::CallbackError;
use crate::events::Kwargs;

/// Shared handle to a transformer.
pub type TransformerRef = Arc<dyn Transform>;

/// What a transformer decided about one emission.
#[derive(Debug)]
pub enum Flow {
    /// Continue the chain with these (possibly rewritten) kwargs.
    Next(Kwargs),
    /// Stop the emission. No further transformer runs, no subscriber is
    /// invoked, and the emit call reports `Blocked` — not an error.
    Block,
}

/// Contract for event transformers.
///
/// `apply` receives the emitted namespace and the current kwargs (as left
/// by higher-priority transformers) and returns a [`Flow`]. An `Err`
/// return (or a panic) is routed through the configured transformer
/// exception policy.
pub trait Transform: Send + Sync + 'static {
    /// Inspect, rewrite, or block one emission.
    fn apply(&self, namespace: &str, kwargs: Kwargs) -> Result<Flow, CallbackError>;

    /// Human-readable name (for logs, errors, and the registry export).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Closure-backed transformer.
///
/// ```rust
/// use emissary::{json, Broker, Flow, TransformFn, TransformerRef};
///
/// let broker = Broker::new();
/// let stamp: TransformerRef = TransformFn::arc("add_source", |_ns, mut kwargs| {
///     kwargs.insert("source".into(), json!("gateway"));
///     Ok(Flow::Next(kwargs))
/// });
/// broker.register_transformer("system.*", &stamp, 10).unwrap();
/// ```
pub struct TransformFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TransformFn<F>
where
    F: Fn(&str, Kwargs) -> Result<Flow, CallbackError> + Send + Sync + 'static,
{
    /// Creates a new function-backed transformer.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the transformer and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F> Transform for TransformFn<F>
where
    F: Fn(&str, Kwargs) -> Result<Flow, CallbackError> + Send + Sync + 'static,
{
    fn apply(&self, namespace: &str, kwargs: Kwargs) -> Result<Flow, CallbackError> {
        (self.f)(namespace, kwargs)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
