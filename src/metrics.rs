//! Mutation-event accounting.
//!
//! The pipeline reports each applied mutation through [`MutationRecorder`],
//! injected once at startup. Recording is fire-and-forget: the trait is
//! infallible and implementations must never block the request path.

use anyhow::Context as _;
use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::PrometheusBuilder;

pub const MUTATED_COUNTER: &str = "toleration_webhook_mutated_total";

/// Collaborator receiving one event per applied mutation. Implementations
/// must be safe for concurrent use; one request task calls in at a time per
/// event, but many tasks run at once.
pub trait MutationRecorder: Send + Sync {
    fn record_mutation(&self, operation: &str, kind: &str, name: &str, namespace: &str);
}

/// Production recorder backed by the global `metrics` facade.
pub struct PrometheusRecorder;

impl MutationRecorder for PrometheusRecorder {
    fn record_mutation(&self, operation: &str, kind: &str, name: &str, namespace: &str) {
        counter!(
            MUTATED_COUNTER,
            "event_type" => operation.to_string(),
            "obj_type" => kind.to_string(),
            "name" => name.to_string(),
            "namespace" => namespace.to_string(),
        )
        .increment(1);
    }
}

/// Recorder that drops every event; for wiring the pipeline in tests.
pub struct NoopRecorder;

impl MutationRecorder for NoopRecorder {
    fn record_mutation(&self, _operation: &str, _kind: &str, _name: &str, _namespace: &str) {}
}

/// Install the Prometheus exporter on its own plain-HTTP listener. Must be
/// called once, from within the runtime, before the first request.
pub fn init_prometheus_server(port: u16) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .context("Failed to install prometheus server")?;
    describe_counter!(
        MUTATED_COUNTER,
        "Total number of k8s objects mutated by the toleration webhook"
    );
    Ok(())
}
