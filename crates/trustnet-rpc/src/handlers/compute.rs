// crates/trustnet-rpc/src/handlers/compute.rs
//
// One-shot compute handler.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use trustnet_core::{CancellationToken, ComputeParams, Timestamp};
use trustnet_engine::ComputeEngine;

/// Request to run one EigenTrust computation over the current store
/// state, synchronously.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicComputeRequest {
    #[serde(flatten)]
    pub params: ComputeParams,
}

/// Outcome of a one-shot computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicComputeResponse {
    pub iterations: u32,
    pub converged: bool,
    pub result_timestamp: Timestamp,
    pub publish_errors: u32,
}

pub async fn handle_basic_compute(
    engine: &Arc<ComputeEngine>,
    request: BasicComputeRequest,
) -> Result<BasicComputeResponse, String> {
    let outcome = engine
        .basic_compute(&request.params, &CancellationToken::new())
        .await
        .map_err(|e| e.to_string())?;
    Ok(BasicComputeResponse {
        iterations: outcome.iterations,
        converged: outcome.converged,
        result_timestamp: outcome.result_timestamp,
        publish_errors: outcome.publish_errors,
    })
}
