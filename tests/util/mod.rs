//! Shared test helper: a recorder that subscribers append to, so tests can
//! assert on delivery order without reaching into broker internals.

use std::sync::Arc;

use parking_lot::Mutex;

use emissary::{Signature, SubscriberFn, SubscriberRef};

#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<String>>>);

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    /// A subscriber that records its label on every delivery.
    pub fn subscriber(&self, label: &'static str, signature: Signature) -> SubscriberRef {
        let rec = self.clone();
        SubscriberFn::arc(label, signature, move |_event| {
            rec.push(label);
            Ok(())
        })
    }

    /// A subscriber that records `label:<value of kwarg>` on every delivery.
    pub fn subscriber_with_arg(
        &self,
        label: &'static str,
        arg: &'static str,
        signature: Signature,
    ) -> SubscriberRef {
        let rec = self.clone();
        SubscriberFn::arc(label, signature, move |event| {
            let value = event
                .get(arg)
                .map(|v| v.to_string())
                .unwrap_or_else(|| "<missing>".into());
            rec.push(format!("{label}:{value}"));
            Ok(())
        })
    }
}
