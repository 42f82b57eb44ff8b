// crates/trustnet-rpc/src/server.rs
//
// RPC server setup: TrustNetRpcServer and RpcConfig.
//
// Uses a JSON-RPC-over-gRPC approach: a single tonic unary service
// accepts JSON-encoded requests with a method field, dispatches to the
// appropriate handler, and returns JSON-encoded responses. This avoids
// proto codegen while still using tonic's server infrastructure for
// transport and middleware.

use std::sync::Arc;

use http_body::Body as HttpBody;
use http_body_util::BodyExt;
use serde::{Deserialize, Serialize};
use tonic::transport::Server;
use tonic::Status;

use trustnet_engine::ComputeEngine;
use trustnet_scheduler::JobScheduler;
use trustnet_store::TrustStore;

use crate::handlers;
use crate::middleware;

// ---------------------------------------------------------------------------
// RpcConfig
// ---------------------------------------------------------------------------

/// Configuration for the RPC server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Host to bind to (e.g., "127.0.0.1" or "0.0.0.0").
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 50061,
        }
    }
}

// ---------------------------------------------------------------------------
// JSON-RPC Envelope
// ---------------------------------------------------------------------------

/// A JSON-RPC-style request envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// The RPC method to invoke (e.g., "matrix/update", "compute/basic").
    pub method: String,
    /// JSON-encoded parameters for the method.
    pub params: serde_json::Value,
}

/// A JSON-RPC-style response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Whether the request succeeded.
    pub success: bool,
    /// The result data (if success).
    pub result: Option<serde_json::Value>,
    /// Error message (if not success).
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// TrustNetRpcServer
// ---------------------------------------------------------------------------

/// The main RPC server for the trustnet service.
///
/// Holds Arc references to the shared store, compute engine, and job
/// scheduler, and exposes a tonic-based server with JSON-RPC
/// dispatching.
#[derive(Clone)]
pub struct TrustNetRpcServer {
    config: RpcConfig,
    store: Arc<TrustStore>,
    engine: Arc<ComputeEngine>,
    scheduler: Arc<JobScheduler>,
}

impl std::fmt::Debug for TrustNetRpcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustNetRpcServer")
            .field("config", &self.config)
            .finish()
    }
}

impl TrustNetRpcServer {
    pub fn new(
        config: RpcConfig,
        store: Arc<TrustStore>,
        engine: Arc<ComputeEngine>,
        scheduler: Arc<JobScheduler>,
    ) -> Self {
        Self {
            config,
            store,
            engine,
            scheduler,
        }
    }

    /// Start the RPC server and listen for requests until the process
    /// is terminated.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = format!("{}:{}", self.config.host, self.config.port).parse()?;

        tracing::info!("trustnet RPC server starting on {}", addr);

        let service = TrustNetServiceImpl {
            store: self.store.clone(),
            engine: self.engine.clone(),
            scheduler: self.scheduler.clone(),
        };

        Server::builder()
            .accept_http1(true)
            .add_service(tonic::service::interceptor::InterceptedService::new(
                TrustNetJsonRpcServer::new(service),
                middleware::logging_interceptor,
            ))
            .serve(addr)
            .await?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Service implementation and dispatch
// ---------------------------------------------------------------------------

/// The internal service implementation that holds shared state and
/// dispatches JSON-RPC calls to the appropriate handler.
#[derive(Clone)]
struct TrustNetServiceImpl {
    store: Arc<TrustStore>,
    engine: Arc<ComputeEngine>,
    scheduler: Arc<JobScheduler>,
}

impl TrustNetServiceImpl {
    /// Dispatch a JSON-RPC request based on the method name.
    async fn dispatch(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let result = match request.method.as_str() {
            // Trust matrices
            "matrix/create" => {
                dispatch_handler(request.params, |r| {
                    let store = self.store.clone();
                    async move { handlers::matrix::handle_create_matrix(&store, r).await }
                })
                .await
            }
            "matrix/get" => {
                dispatch_handler(request.params, |r| {
                    let store = self.store.clone();
                    async move { handlers::matrix::handle_get_matrix(&store, r).await }
                })
                .await
            }
            "matrix/update" => {
                dispatch_handler(request.params, |r| {
                    let store = self.store.clone();
                    async move { handlers::matrix::handle_update_matrix(&store, r).await }
                })
                .await
            }
            "matrix/flush" => {
                dispatch_handler(request.params, |r| {
                    let store = self.store.clone();
                    async move { handlers::matrix::handle_flush_matrix(&store, r).await }
                })
                .await
            }
            "matrix/delete" => {
                dispatch_handler(request.params, |r| {
                    let store = self.store.clone();
                    async move { handlers::matrix::handle_delete_matrix(&store, r).await }
                })
                .await
            }

            // Trust vectors
            "vector/create" => {
                dispatch_handler(request.params, |r| {
                    let store = self.store.clone();
                    async move { handlers::vector::handle_create_vector(&store, r).await }
                })
                .await
            }
            "vector/get" => {
                dispatch_handler(request.params, |r| {
                    let store = self.store.clone();
                    async move { handlers::vector::handle_get_vector(&store, r).await }
                })
                .await
            }
            "vector/update" => {
                dispatch_handler(request.params, |r| {
                    let store = self.store.clone();
                    async move { handlers::vector::handle_update_vector(&store, r).await }
                })
                .await
            }
            "vector/flush" => {
                dispatch_handler(request.params, |r| {
                    let store = self.store.clone();
                    async move { handlers::vector::handle_flush_vector(&store, r).await }
                })
                .await
            }
            "vector/delete" => {
                dispatch_handler(request.params, |r| {
                    let store = self.store.clone();
                    async move { handlers::vector::handle_delete_vector(&store, r).await }
                })
                .await
            }

            // Compute
            "compute/basic" => {
                dispatch_handler(request.params, |r| {
                    let engine = self.engine.clone();
                    async move { handlers::compute::handle_basic_compute(&engine, r).await }
                })
                .await
            }

            // Periodic jobs
            "job/create" => {
                dispatch_handler(request.params, |r| {
                    let scheduler = self.scheduler.clone();
                    async move { handlers::job::handle_create_job(&scheduler, r).await }
                })
                .await
            }
            "job/delete" => {
                dispatch_handler(request.params, |r| {
                    let scheduler = self.scheduler.clone();
                    async move { handlers::job::handle_delete_job(&scheduler, r).await }
                })
                .await
            }

            _ => Err(format!("Unknown method: {}", request.method)),
        };

        match result {
            Ok(value) => JsonRpcResponse {
                success: true,
                result: Some(value),
                error: None,
            },
            Err(err) => JsonRpcResponse {
                success: false,
                result: None,
                error: Some(err),
            },
        }
    }
}

/// Generic dispatch helper: deserialize params into a request type,
/// call the handler, and serialize the result to JSON.
async fn dispatch_handler<Req, Resp, F, Fut>(
    params: serde_json::Value,
    handler: F,
) -> Result<serde_json::Value, String>
where
    Req: serde::de::DeserializeOwned,
    Resp: serde::Serialize,
    F: FnOnce(Req) -> Fut,
    Fut: std::future::Future<Output = Result<Resp, String>>,
{
    let request: Req = serde_json::from_value(params)
        .map_err(|e| format!("Failed to deserialize request: {}", e))?;
    let response = handler(request).await?;
    serde_json::to_value(response).map_err(|e| format!("Failed to serialize response: {}", e))
}

// ---------------------------------------------------------------------------
// Tonic Service Wiring
// ---------------------------------------------------------------------------
// A single gRPC service with one method: `Call`. The request and
// response are raw bytes (JSON-encoded JsonRpcRequest/Response), so no
// proto codegen is needed.

/// The tonic service wrapper. Implements the low-level gRPC service by
/// accepting bytes, deserializing as JSON-RPC, and dispatching.
#[derive(Clone)]
pub struct TrustNetJsonRpcServer {
    inner: TrustNetServiceImpl,
}

impl std::fmt::Debug for TrustNetJsonRpcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustNetJsonRpcServer").finish()
    }
}

impl TrustNetJsonRpcServer {
    fn new(inner: TrustNetServiceImpl) -> Self {
        Self { inner }
    }
}

impl tonic::server::NamedService for TrustNetJsonRpcServer {
    const NAME: &'static str = "trustnet.rpc.TrustNetService";
}

impl<B> tower_service::Service<http::Request<B>> for TrustNetJsonRpcServer
where
    B: HttpBody + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send,
    B::Data: Send,
{
    type Response = http::Response<tonic::body::BoxBody>;
    type Error = std::convert::Infallible;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        let inner = self.inner.clone();

        Box::pin(async move {
            let body = req.into_body();
            let body_bytes = match collect_body(body).await {
                Ok(b) => b,
                Err(e) => {
                    tracing::error!("Failed to read request body: {}", e);
                    return Ok(error_response(format!("Failed to read request body: {}", e)));
                }
            };

            let rpc_request: JsonRpcRequest = match serde_json::from_slice(&body_bytes) {
                Ok(r) => r,
                Err(e) => {
                    return Ok(error_response(format!("Invalid JSON-RPC request: {}", e)));
                }
            };

            let rpc_response = inner.dispatch(rpc_request).await;
            let json = serde_json::to_vec(&rpc_response).unwrap_or_default();
            Ok(build_response(json))
        })
    }
}

/// Collect the body of an HTTP request into bytes.
async fn collect_body<B>(body: B) -> Result<Vec<u8>, String>
where
    B: HttpBody + Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    B::Data: Send,
{
    let mut collected = Vec::new();
    let mut body = std::pin::pin!(body);

    loop {
        match std::future::poll_fn(|cx| HttpBody::poll_frame(body.as_mut(), cx)).await {
            Some(Ok(frame)) => {
                if let Ok(data) = frame.into_data() {
                    use bytes::Buf;
                    collected.extend_from_slice(data.chunk());
                }
            }
            Some(Err(e)) => return Err(e.into().to_string()),
            None => break,
        }
    }

    Ok(collected)
}

/// Build a failed JSON-RPC envelope as an HTTP response.
fn error_response(error: String) -> http::Response<tonic::body::BoxBody> {
    let resp = JsonRpcResponse {
        success: false,
        result: None,
        error: Some(error),
    };
    build_response(serde_json::to_vec(&resp).unwrap_or_default())
}

/// Build an HTTP response with the given JSON body.
fn build_response(json: Vec<u8>) -> http::Response<tonic::body::BoxBody> {
    let body = tonic::body::BoxBody::new(
        http_body_util::Full::new(bytes::Bytes::from(json))
            .map_err(|e| Status::internal(format!("body error: {}", e))),
    );

    http::Response::builder()
        .status(200)
        .header("content-type", "application/json")
        .body(body)
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use trustnet_core::SinkRegistry;

    fn service() -> TrustNetServiceImpl {
        let store = Arc::new(TrustStore::new());
        let engine = Arc::new(ComputeEngine::new(
            store.clone(),
            Arc::new(SinkRegistry::new()),
        ));
        let scheduler = Arc::new(JobScheduler::new(store.clone(), engine.clone()));
        TrustNetServiceImpl {
            store,
            engine,
            scheduler,
        }
    }

    async fn call(service: &TrustNetServiceImpl, method: &str, params: serde_json::Value) -> JsonRpcResponse {
        service
            .dispatch(JsonRpcRequest {
                method: method.to_string(),
                params,
            })
            .await
    }

    #[tokio::test]
    async fn create_update_get_round_trip() {
        let service = service();

        let created = call(&service, "matrix/create", json!({})).await;
        assert!(created.success, "{:?}", created.error);
        let id = created.result.unwrap()["id"].clone();

        let updated = call(
            &service,
            "matrix/update",
            json!({
                "id": id,
                "timestamp": [7],
                "entries": [{ "truster": 1, "trustee": 2, "value": 0.5 }],
            }),
        )
        .await;
        assert!(updated.success, "{:?}", updated.error);

        let fetched = call(&service, "matrix/get", json!({ "id": id })).await;
        assert!(fetched.success);
        let result = fetched.result.unwrap();
        assert_eq!(result["header"]["timestamp"], json!([7]));
        assert_eq!(result["entries"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn stale_update_surfaces_in_the_envelope() {
        let service = service();
        let id = call(&service, "vector/create", json!({}))
            .await
            .result
            .unwrap()["id"]
            .clone();

        assert!(
            call(
                &service,
                "vector/update",
                json!({ "id": id, "timestamp": [10], "entries": [] })
            )
            .await
            .success
        );

        let stale = call(
            &service,
            "vector/update",
            json!({ "id": id, "timestamp": [4], "entries": [] }),
        )
        .await;
        assert!(!stale.success);
        assert!(stale.error.unwrap().contains("stale"));
    }

    #[tokio::test]
    async fn unknown_method_is_an_error() {
        let service = service();
        let resp = call(&service, "matrix/compute", json!({})).await;
        assert!(!resp.success);
        assert!(resp.error.unwrap().contains("Unknown method"));
    }
}
