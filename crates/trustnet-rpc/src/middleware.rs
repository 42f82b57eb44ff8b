// crates/trustnet-rpc/src/middleware.rs
//
// Middleware for the RPC server. Authentication and rate limiting are
// deployment concerns handled outside the core service; this layer
// only logs incoming requests.

use tonic::{Request, Status};

/// Logging interceptor for tonic gRPC requests.
///
/// Logs the metadata of each incoming request using the `tracing` crate.
pub fn logging_interceptor(req: Request<()>) -> Result<Request<()>, Status> {
    tracing::debug!("Incoming RPC request: {:?}", req.metadata());
    Ok(req)
}
