// crates/trustnet-engine/src/solver.rs
//
// The numeric core: dense problem assembly and power iteration.
//
// Sparse snapshots are densified over the union of peers that appear
// anywhere in the inputs. t_{k+1} = (1 - alpha) * C^T t_k + alpha * p,
// where C is the row-stochastic local-trust matrix with dangling rows
// replaced by the normalized pre-trust distribution p.

use std::collections::{BTreeSet, HashMap};

use trustnet_core::{CancellationToken, MatrixSnapshot, TrustNetError, VectorSnapshot};

/// Safety ceiling applied when the caller requests unbounded
/// iteration (`max_iterations == 0`). Power iteration on a damped
/// stochastic matrix converges geometrically, so hitting this means
/// the inputs are pathological; the result is still written.
pub(crate) const ITERATION_SAFETY_CEILING: u32 = 100_000;

/// A densified EigenTrust problem over a fixed peer index.
#[derive(Debug)]
pub(crate) struct Problem {
    /// Sorted peer ids; index in this list is the dense index.
    pub peers: Vec<u32>,
    /// Row-stochastic trust matrix, dangling rows already replaced.
    c: Vec<Vec<f64>>,
    /// Unit-sum pre-trust distribution.
    p: Vec<f64>,
    /// Iteration start vector (seed used verbatim, not renormalized).
    seed: Vec<f64>,
}

/// How an iteration run ended.
#[derive(Debug)]
pub(crate) struct Solution {
    pub scores: Vec<f64>,
    pub iterations: u32,
    pub converged: bool,
}

impl Problem {
    /// Assemble the dense problem from sparse snapshots.
    ///
    /// Fails `InvalidArgument` ("degenerate pre-trust") when the
    /// pre-trust entries sum to zero — normalization is undefined and
    /// there is no distribution to damp toward or to substitute for
    /// dangling rows.
    pub fn build(
        matrix: &MatrixSnapshot,
        pre_trust: &VectorSnapshot,
        seed: &VectorSnapshot,
    ) -> Result<Self, TrustNetError> {
        let mut peer_set = BTreeSet::new();
        for &(truster, trustee) in matrix.entries.keys() {
            peer_set.insert(truster);
            peer_set.insert(trustee);
        }
        peer_set.extend(pre_trust.entries.keys().copied());
        peer_set.extend(seed.entries.keys().copied());

        let peers: Vec<u32> = peer_set.into_iter().collect();
        let n = peers.len();
        let index: HashMap<u32, usize> =
            peers.iter().enumerate().map(|(i, &u)| (u, i)).collect();

        // Normalized pre-trust distribution p.
        let pre_sum: f64 = pre_trust.entries.values().sum();
        if pre_sum <= 0.0 {
            return Err(TrustNetError::InvalidArgument(
                "degenerate pre-trust: entries sum to zero".into(),
            ));
        }
        let mut p = vec![0.0_f64; n];
        for (&trustee, &value) in &pre_trust.entries {
            p[index[&trustee]] = value / pre_sum;
        }

        // Row-normalize the local trust matrix; a truster with zero
        // out-weight gets the pre-trust distribution so its trust mass
        // does not vanish.
        let mut c = vec![vec![0.0_f64; n]; n];
        for (&(truster, trustee), &value) in &matrix.entries {
            c[index[&truster]][index[&trustee]] = value;
        }
        for row in c.iter_mut() {
            let row_sum: f64 = row.iter().sum();
            if row_sum > 0.0 {
                for x in row.iter_mut() {
                    *x /= row_sum;
                }
            } else {
                row.copy_from_slice(&p);
            }
        }

        // Seed: the existing global vector verbatim when it has any
        // nonzero entry, otherwise p. Stored snapshots never hold
        // zeros, so non-empty means nonzero.
        let seed_dense = if seed.entries.is_empty() {
            p.clone()
        } else {
            let mut t0 = vec![0.0_f64; n];
            for (&trustee, &value) in &seed.entries {
                t0[index[&trustee]] = value;
            }
            t0
        };

        Ok(Self {
            peers,
            c,
            p,
            seed: seed_dense,
        })
    }

    /// Run power iteration until the L1 delta between successive
    /// vectors drops below `epsilon` or the iteration cap is reached.
    /// Reaching the cap is not an error; `converged` reports it.
    pub fn iterate(
        &self,
        alpha: f64,
        epsilon: f64,
        max_iterations: u32,
        cancel: &CancellationToken,
    ) -> Result<Solution, TrustNetError> {
        let n = self.peers.len();
        let cap = if max_iterations == 0 {
            ITERATION_SAFETY_CEILING
        } else {
            max_iterations
        };

        let mut t = self.seed.clone();
        let mut iterations = 0;
        let mut converged = n == 0;

        while iterations < cap && !converged {
            if cancel.is_cancelled() {
                return Err(TrustNetError::Cancelled(
                    "compute aborted before convergence".into(),
                ));
            }

            let mut next = vec![0.0_f64; n];
            for (j, out) in next.iter_mut().enumerate() {
                let mut acc = 0.0;
                for i in 0..n {
                    acc += self.c[i][j] * t[i];
                }
                *out = (1.0 - alpha) * acc + alpha * self.p[j];
            }

            let delta: f64 = t
                .iter()
                .zip(next.iter())
                .map(|(a, b)| (a - b).abs())
                .sum();
            t = next;
            iterations += 1;
            converged = delta < epsilon;
        }

        Ok(Solution {
            scores: t,
            iterations,
            converged,
        })
    }
}
