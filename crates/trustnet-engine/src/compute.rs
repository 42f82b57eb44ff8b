// crates/trustnet-engine/src/compute.rs
//
// The ComputeEngine: orchestrates one EigenTrust run end to end.
//
// Load inputs -> densify -> iterate -> write the result vector back
// through the store -> publish best-effort. Nothing is written on any
// error or cancellation before the final store update ("no partial
// writes"); publish failures are reported in the outcome but never
// unwind the committed write.

use std::sync::Arc;

use trustnet_core::{
    CancellationToken, ComputeParams, MatrixSnapshot, SinkRegistry, Timestamp, TrustNetError,
    VectorEntry, VectorHeader, VectorSnapshot,
};
use trustnet_store::TrustStore;

use crate::solver::Problem;

/// The three snapshots one compute run reads.
#[derive(Debug, Clone)]
pub struct ComputeInputs {
    pub matrix: MatrixSnapshot,
    pub pre_trust: VectorSnapshot,
    pub seed: VectorSnapshot,
}

/// What a finished compute run produced.
#[derive(Debug, Clone)]
pub struct ComputeOutcome {
    /// Power iterations executed.
    pub iterations: u32,
    /// Whether the L1 delta dropped below epsilon (false when the run
    /// was stopped by the iteration cap; the result is written anyway).
    pub converged: bool,
    /// Timestamp stamped on the written global-trust vector.
    pub result_timestamp: Timestamp,
    /// Number of destinations that failed to accept the result.
    pub publish_errors: u32,
}

/// EigenTrust compute engine bound to one store and sink registry.
pub struct ComputeEngine {
    store: Arc<TrustStore>,
    sinks: Arc<SinkRegistry>,
}

impl ComputeEngine {
    pub fn new(store: Arc<TrustStore>, sinks: Arc<SinkRegistry>) -> Self {
        Self { store, sinks }
    }

    /// One-shot compute over the current store state.
    ///
    /// The result timestamp is the maximum of the local-trust and
    /// pre-trust timestamps (documented policy; job-triggered runs
    /// pin the window start instead).
    pub async fn basic_compute(
        &self,
        params: &ComputeParams,
        cancel: &CancellationToken,
    ) -> Result<ComputeOutcome, TrustNetError> {
        params.validate()?;
        let inputs = ComputeInputs {
            matrix: self.store.get_matrix(&params.local_trust_id).await?,
            pre_trust: self.store.get_vector(&params.pre_trust_id).await?,
            seed: self.store.get_vector(&params.global_trust_id).await?,
        };
        let result_timestamp = inputs
            .matrix
            .header
            .timestamp
            .clone()
            .max(inputs.pre_trust.header.timestamp.clone());
        self.compute_with_inputs(params, inputs, result_timestamp, cancel)
            .await
    }

    /// Compute over caller-supplied snapshots, stamping the result
    /// with `result_timestamp`. Used by the scheduler, which captures
    /// its inputs before the triggering update applies.
    pub async fn compute_with_inputs(
        &self,
        params: &ComputeParams,
        inputs: ComputeInputs,
        result_timestamp: Timestamp,
        cancel: &CancellationToken,
    ) -> Result<ComputeOutcome, TrustNetError> {
        params.validate()?;

        let problem = Problem::build(&inputs.matrix, &inputs.pre_trust, &inputs.seed)?;
        let solution = problem.iterate(params.alpha, params.epsilon, params.max_iterations, cancel)?;

        if !solution.converged {
            tracing::warn!(
                matrix = %params.local_trust_id,
                iterations = solution.iterations,
                "compute stopped at iteration cap without convergence"
            );
        }

        // Sparse result: zeros are represented by absence.
        let entries: Vec<VectorEntry> = problem
            .peers
            .iter()
            .zip(solution.scores.iter())
            .filter(|(_, &value)| value != 0.0)
            .map(|(&trustee, &value)| VectorEntry { trustee, value })
            .collect();

        self.store
            .update_vector(&params.global_trust_id, result_timestamp.clone(), &entries)
            .await?;

        tracing::debug!(
            vector = %params.global_trust_id,
            timestamp = %result_timestamp,
            iterations = solution.iterations,
            converged = solution.converged,
            "global trust vector written"
        );

        let result = VectorSnapshot {
            header: VectorHeader {
                id: params.global_trust_id,
                timestamp: result_timestamp.clone(),
            },
            entries: entries
                .iter()
                .map(|e| (e.trustee, e.value))
                .collect(),
        };

        let mut publish_errors = 0;
        for destination in &params.destinations {
            if let Err(e) = self.sinks.publish(&result, destination).await {
                tracing::warn!(
                    vector = %params.global_trust_id,
                    scheme = destination.scheme(),
                    error = %e,
                    "publish failed"
                );
                publish_errors += 1;
            }
        }

        Ok(ComputeOutcome {
            iterations: solution.iterations,
            converged: solution.converged,
            result_timestamp,
            publish_errors,
        })
    }
}
