// crates/trustnet-core/src/params.rs
//
// Compute parameters and periodic job specifications.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TrustNetError;
use crate::sink::Destination;
use crate::timestamp::Timestamp;

/// Parameters for one EigenTrust computation.
///
/// All three referenced entities must already exist in the store. The
/// `global_trust_id` vector is used both as the iteration seed (when
/// it has any nonzero entry) and as the result sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeParams {
    /// The local-trust matrix to compute over.
    pub local_trust_id: Uuid,
    /// The pre-trust (seed bias) vector.
    pub pre_trust_id: Uuid,
    /// Pre-trust retention strength at each step; must be in (0, 1].
    pub alpha: f64,
    /// Convergence threshold on the L1 delta between successive
    /// iterations; must be > 0.
    pub epsilon: f64,
    /// Seed and result-sink vector.
    pub global_trust_id: Uuid,
    /// Iteration bound; 0 means converge-only (an internal safety
    /// ceiling still applies — see the compute engine).
    #[serde(default)]
    pub max_iterations: u32,
    /// Destinations the result is published to after each write.
    #[serde(default)]
    pub destinations: Vec<Destination>,
}

impl ComputeParams {
    /// Validate the numeric parameters.
    pub fn validate(&self) -> Result<(), TrustNetError> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(TrustNetError::InvalidArgument(format!(
                "alpha must be in (0, 1], got {}",
                self.alpha
            )));
        }
        if !(self.epsilon > 0.0) {
            return Err(TrustNetError::InvalidArgument(format!(
                "epsilon must be > 0, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

/// A periodic compute job: compute parameters plus the window period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeJobSpec {
    pub params: ComputeParams,
    /// Window length, in the same composite-timestamp shape as entity
    /// timestamps; only its composite-integer value is used.
    pub period: Timestamp,
}

impl ComputeJobSpec {
    /// Validate the parameters and the period.
    pub fn validate(&self) -> Result<(), TrustNetError> {
        self.params.validate()?;
        if self.period.is_zero() {
            return Err(TrustNetError::InvalidArgument(
                "job period must be nonzero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(alpha: f64, epsilon: f64) -> ComputeParams {
        ComputeParams {
            local_trust_id: Uuid::now_v7(),
            pre_trust_id: Uuid::now_v7(),
            alpha,
            epsilon,
            global_trust_id: Uuid::now_v7(),
            max_iterations: 0,
            destinations: Vec::new(),
        }
    }

    #[test]
    fn accepts_valid_parameters() {
        assert!(params(0.15, 1e-6).validate().is_ok());
        assert!(params(1.0, 1e-12).validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_alpha() {
        assert!(params(0.0, 1e-6).validate().is_err());
        assert!(params(1.5, 1e-6).validate().is_err());
        assert!(params(f64::NAN, 1e-6).validate().is_err());
    }

    #[test]
    fn rejects_nonpositive_epsilon() {
        assert!(params(0.2, 0.0).validate().is_err());
        assert!(params(0.2, -1.0).validate().is_err());
    }

    #[test]
    fn job_spec_requires_nonzero_period() {
        let spec = ComputeJobSpec {
            params: params(0.2, 1e-6),
            period: Timestamp::zero(),
        };
        assert!(spec.validate().is_err());

        let spec = ComputeJobSpec {
            params: params(0.2, 1e-6),
            period: Timestamp::from(1000),
        };
        assert!(spec.validate().is_ok());
    }
}
