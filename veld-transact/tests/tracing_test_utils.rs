//! Test utilities for verifying tracing span emission.
//!
//! Provides a capture layer that records span names and fields during tests,
//! allowing assertions on the spans produced by instrumented code.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::span::{Attributes, Id};
use tracing::Subscriber;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// A recorded span with its name and fields.
#[derive(Debug, Clone)]
pub struct CapturedSpan {
    pub name: &'static str,
    pub fields: HashMap<String, String>,
}

/// Shared storage for captured spans.
#[derive(Debug, Clone, Default)]
pub struct SpanStore(Arc<Mutex<Vec<CapturedSpan>>>);

impl SpanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if a span with the given name was captured.
    pub fn has_span(&self, name: &str) -> bool {
        self.0.lock().unwrap().iter().any(|s| s.name == name)
    }

    /// Returns the first span with the given name, if any.
    pub fn find_span(&self, name: &str) -> Option<CapturedSpan> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.name == name)
            .cloned()
    }
}

/// A tracing `Layer` that captures span creation into a `SpanStore`.
pub struct SpanCaptureLayer {
    store: SpanStore,
}

/// Visitor that records span fields as string key-value pairs.
struct FieldVisitor(HashMap<String, String>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0
            .insert(field.name().to_string(), format!("{:?}", value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
}

impl<S> Layer<S> for SpanCaptureLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut fields = FieldVisitor(HashMap::new());
        attrs.record(&mut fields);

        let span_ref = ctx.span(id).expect("span should exist");
        self.store.0.lock().unwrap().push(CapturedSpan {
            name: span_ref.metadata().name(),
            fields: fields.0,
        });
    }
}

/// Initialize a tracing subscriber that captures spans into the returned
/// `SpanStore`. The guard must be held for the duration of the test.
pub fn init_test_tracing() -> (SpanStore, tracing::subscriber::DefaultGuard) {
    let store = SpanStore::new();
    let layer = SpanCaptureLayer {
        store: store.clone(),
    };

    use tracing_subscriber::layer::SubscriberExt;
    let subscriber = tracing_subscriber::registry().with(layer);
    let guard = tracing::subscriber::set_default(subscriber);

    (store, guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_capture_records_names_and_fields() {
        let (store, _guard) = init_test_tracing();

        let span = tracing::debug_span!("test_span", count = 42u64);
        let _enter = span.enter();

        assert!(store.has_span("test_span"));
        let captured = store.find_span("test_span").unwrap();
        assert_eq!(captured.fields.get("count").unwrap(), "42");
    }
}
