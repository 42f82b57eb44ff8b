// crates/trustnet-core/src/sink.rs
//
// Publish destinations and the vector sink registry.
//
// A computed global-trust vector can be pushed to zero or more
// destinations after each successful store write. Destinations are a
// closed tagged union keyed by scheme; the embedding application
// supplies the handler for each scheme through the registry. Publish
// failures are reported to the caller but never unwind the already
// committed store write.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::entity::VectorSnapshot;
use crate::error::TrustNetError;

/// A publish destination, tagged by scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "lowercase")]
pub enum Destination {
    /// Emit the vector through structured logging.
    Log,
    /// Push the vector to a remote gRPC endpoint. No handler ships
    /// in-core; the embedding application registers one.
    Grpc { endpoint: String },
}

impl Destination {
    /// The scheme tag used for registry dispatch.
    pub fn scheme(&self) -> &'static str {
        match self {
            Destination::Log => "log",
            Destination::Grpc { .. } => "grpc",
        }
    }
}

/// A handler that pushes a computed vector to one destination kind.
#[async_trait]
pub trait VectorSink: Send + Sync {
    async fn publish(
        &self,
        snapshot: &VectorSnapshot,
        destination: &Destination,
    ) -> Result<(), TrustNetError>;
}

/// Scheme-keyed registry of vector sinks.
#[derive(Default)]
pub struct SinkRegistry {
    handlers: HashMap<&'static str, Arc<dyn VectorSink>>,
}

impl SinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for a scheme, replacing any previous one.
    pub fn register(&mut self, scheme: &'static str, sink: Arc<dyn VectorSink>) {
        self.handlers.insert(scheme, sink);
    }

    /// Publish a vector to one destination, dispatching by scheme.
    ///
    /// Fails `InvalidArgument` if no handler is registered for the
    /// destination's scheme.
    pub async fn publish(
        &self,
        snapshot: &VectorSnapshot,
        destination: &Destination,
    ) -> Result<(), TrustNetError> {
        match self.handlers.get(destination.scheme()) {
            Some(sink) => sink.publish(snapshot, destination).await,
            None => Err(TrustNetError::InvalidArgument(format!(
                "no sink registered for scheme '{}'",
                destination.scheme()
            ))),
        }
    }
}

/// Built-in sink that emits the vector through `tracing`.
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl VectorSink for LogSink {
    async fn publish(
        &self,
        snapshot: &VectorSnapshot,
        _destination: &Destination,
    ) -> Result<(), TrustNetError> {
        tracing::info!(
            vector = %snapshot.header.id,
            timestamp = %snapshot.header.timestamp,
            entries = snapshot.entries.len(),
            "published global trust vector"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn destination_serde_is_scheme_tagged() {
        let json = serde_json::to_value(&Destination::Log).unwrap();
        assert_eq!(json, serde_json::json!({ "scheme": "log" }));

        let dest: Destination = serde_json::from_value(serde_json::json!({
            "scheme": "grpc",
            "endpoint": "http://10.0.0.2:50051",
        }))
        .unwrap();
        assert_eq!(
            dest,
            Destination::Grpc {
                endpoint: "http://10.0.0.2:50051".to_string()
            }
        );
    }

    #[tokio::test]
    async fn unknown_scheme_is_a_publish_error() {
        let registry = SinkRegistry::new();
        let snapshot = VectorSnapshot::empty(Uuid::now_v7());
        let err = registry
            .publish(
                &snapshot,
                &Destination::Grpc {
                    endpoint: "http://localhost:1".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TrustNetError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn log_sink_accepts_any_vector() {
        let mut registry = SinkRegistry::new();
        registry.register("log", Arc::new(LogSink));
        let snapshot = VectorSnapshot::empty(Uuid::now_v7());
        registry
            .publish(&snapshot, &Destination::Log)
            .await
            .unwrap();
    }
}
