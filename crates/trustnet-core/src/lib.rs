// crates/trustnet-core/src/lib.rs
//
// trustnet-core: Shared types and traits for the trustnet reputation service.
//
// Provides composite timestamps with windowing arithmetic, sparse trust
// matrix/vector snapshot types, compute parameters and job specs, the
// publish destination registry, the protocol-wide error type, and a
// cooperative cancellation token for long-running computes.

pub mod cancel;
pub mod entity;
pub mod error;
pub mod params;
pub mod sink;
pub mod timestamp;

// Re-export key types for ergonomic access from downstream crates.
pub use cancel::CancellationToken;
pub use entity::{
    MatrixEntry, MatrixHeader, MatrixSnapshot, VectorEntry, VectorHeader, VectorSnapshot,
};
pub use error::TrustNetError;
pub use params::{ComputeJobSpec, ComputeParams};
pub use sink::{Destination, LogSink, SinkRegistry, VectorSink};
pub use timestamp::Timestamp;
