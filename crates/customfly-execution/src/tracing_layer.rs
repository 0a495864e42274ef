//! Tracing layer that streams action lifecycle events to a live audit feed.
//!
//! Controllers and executors log under `customfly::*` targets; this layer
//! captures those events and forwards them through a tokio channel, e.g.
//! to push them to the admin UI.

use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Event data sent to the feed
#[derive(Debug, Clone, serde::Serialize)]
pub struct ActionEvent {
    /// Event target (e.g., "customfly::action")
    pub target: String,
    /// Log level (INFO, DEBUG, WARN, ERROR)
    pub level: String,
    /// Human-readable message
    pub message: String,
    /// Structured fields (action_id, kind, status, ...)
    pub fields: HashMap<String, Value>,
    pub timestamp: String,
}

impl ActionEvent {
    /// The `action_id` field, if the event carried one.
    pub fn action_id(&self) -> Option<&str> {
        self.fields.get("action_id").and_then(|v| v.as_str())
    }
}

/// Forwards events whose target starts with a prefix to a channel.
pub struct ActionEventLayer {
    sender: mpsc::UnboundedSender<ActionEvent>,
    target_prefix: String,
}

impl ActionEventLayer {
    /// Create a layer forwarding all `customfly` events
    pub fn new(sender: mpsc::UnboundedSender<ActionEvent>) -> Self {
        Self::with_prefix(sender, "customfly")
    }

    pub fn with_prefix(
        sender: mpsc::UnboundedSender<ActionEvent>,
        target_prefix: impl Into<String>,
    ) -> Self {
        Self {
            sender,
            target_prefix: target_prefix.into(),
        }
    }
}

impl<S> Layer<S> for ActionEventLayer
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let target = event.metadata().target();
        if !target.starts_with(&self.target_prefix) {
            return;
        }

        let mut fields = HashMap::new();
        event.record(&mut FieldVisitor(&mut fields));

        let message = fields
            .remove("message")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();

        let action_event = ActionEvent {
            target: target.to_string(),
            level: event.metadata().level().to_string(),
            message,
            fields,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        // Receiver may be gone; the feed is best effort
        let _ = self.sender.send(action_event);
    }
}

/// Field visitor that extracts tracing event fields into a HashMap
struct FieldVisitor<'a>(&'a mut HashMap<String, Value>);

impl tracing::field::Visit for FieldVisitor<'_> {
    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(
            field.name().to_string(),
            serde_json::json!(format!("{:?}", value)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn test_forwards_only_matching_targets() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscriber = tracing_subscriber::registry().with(ActionEventLayer::new(tx));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "customfly::action", action_id = "a-1", status = "executed", "Action executed");
            tracing::info!(target: "hyper::client", "unrelated");
        });

        let event = rx.try_recv().unwrap();
        assert_eq!(event.target, "customfly::action");
        assert_eq!(event.level, "INFO");
        assert_eq!(event.message, "Action executed");
        assert_eq!(event.action_id(), Some("a-1"));
        assert_eq!(event.fields.get("status"), Some(&serde_json::json!("executed")));
        assert!(rx.try_recv().is_err());
    }
}
