// crates/trustnet-engine/src/lib.rs
//
// trustnet-engine: EigenTrust computation for the trustnet service.
//
// Runs power iteration over a row-normalized local-trust matrix with
// pre-trust damping, writes the converged (or iteration-capped) global
// trust vector back through the store, and publishes it best-effort to
// the configured destinations.

pub mod compute;
mod solver;

pub use compute::{ComputeEngine, ComputeInputs, ComputeOutcome};
