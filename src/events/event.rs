//! # The event value delivered to subscribers.
//!
//! An [`Event`] is one emission: the namespace it was emitted to, the final
//! keyword arguments (after the transformer pipeline), a globally unique
//! sequence number, and a wall-clock timestamp.
//!
//! ## Ordering guarantees
//! `seq` increases monotonically across all emissions in the process. Within
//! one emission every subscriber sees the same `Event`; across emissions
//! `seq` restores the order in which `emit`/`emit_async` calls built their
//! events.
//!
//! ## Kwargs
//! [`Kwargs`] is a JSON object map. Subscribers pull values out with
//! [`Event::get`] or iterate `event.kwargs` directly. The [`kwargs!`] macro
//! builds a map inline:
//!
//! ```rust
//! use emissary::kwargs;
//!
//! let kw = kwargs! { "message" => "Warning!", "code" => 17 };
//! assert_eq!(kw.len(), 2);
//! ```
//!
//! [`kwargs!`]: crate::kwargs

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use serde_json::Value;

/// Keyword arguments carried by an emission: a JSON object map.
pub type Kwargs = serde_json::Map<String, Value>;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// One emission, as seen by subscribers.
#[derive(Clone, Debug)]
pub struct Event {
    /// The literal namespace the emit call targeted. Wildcard subscribers
    /// see the emitted path here, not their own registration pattern.
    pub namespace: Arc<str>,
    /// Final keyword arguments, after the transformer pipeline.
    pub kwargs: Kwargs,
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp taken when the event was built.
    pub at: SystemTime,
}

impl Event {
    /// Creates a new event with the next sequence number and current
    /// timestamp.
    pub fn new(namespace: impl Into<Arc<str>>, kwargs: Kwargs) -> Self {
        Self {
            namespace: namespace.into(),
            kwargs,
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
        }
    }

    /// Looks up a keyword argument by name.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.kwargs.get(key)
    }

    /// Looks up a keyword argument and views it as a string.
    #[inline]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.kwargs.get(key).and_then(Value::as_str)
    }
}

/// Builds a [`Kwargs`] map inline.
///
/// Keys are any `ToString` expressions; values go through [`json!`] and
/// accept anything `serde_json` can represent.
///
/// [`json!`]: crate::json
#[macro_export]
macro_rules! kwargs {
    () => { $crate::Kwargs::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::Kwargs::new();
        $( map.insert(($key).to_string(), $crate::json!($value)); )+
        map
    }};
}
