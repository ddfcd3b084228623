//! # Core subscriber traits.
//!
//! Both traits declare a [`Signature`] describing the keyword arguments the
//! callback accepts. The default is [`Signature::Flexible`] (accept
//! anything); declare [`Signature::exact`] to opt into the namespace's
//! argument contract — the first non-flexible subscriber on a namespace
//! freezes the contract for everyone after it.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CallbackError;
use crate::events::Event;
use crate::namespaces::Signature;

/// Shared handle to a synchronous subscriber.
pub type SubscriberRef = Arc<dyn Subscribe>;

/// Shared handle to an asynchronous subscriber.
pub type AsyncSubscriberRef = Arc<dyn SubscribeAsync>;

/// Contract for synchronous subscribers.
///
/// Called inline from `emit`/`emit_async`; implementations must not block
/// for long. An `Err` return (or a panic) is routed through the configured
/// subscriber exception policy.
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event.
    fn on_event(&self, event: &Event) -> Result<(), CallbackError>;

    /// The keyword arguments this callback accepts.
    fn signature(&self) -> Signature {
        Signature::Flexible
    }

    /// Human-readable name (for logs, errors, and the registry export).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Contract for asynchronous subscribers.
///
/// Invoked only by `emit_async`, which awaits each call to completion
/// before moving to the next matched entry — delivery stays strictly
/// sequential and priority-ordered across both callback kinds.
#[async_trait]
pub trait SubscribeAsync: Send + Sync + 'static {
    /// Handle a single event.
    async fn on_event(&self, event: &Event) -> Result<(), CallbackError>;

    /// The keyword arguments this callback accepts.
    fn signature(&self) -> Signature {
        Signature::Flexible
    }

    /// Human-readable name (for logs, errors, and the registry export).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
