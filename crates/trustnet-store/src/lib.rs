// crates/trustnet-store/src/lib.rs
//
// trustnet-store: Versioned storage for trust matrices and vectors.
//
// Entities are in-memory, sparse, and independently addressed; each
// carries a monotonically non-decreasing composite timestamp. Updates
// are linearized per entity so the timestamp check and the entry
// application are one atomic step. Successful updates are fanned out
// to registered observers, which is what drives periodic job
// triggering in trustnet-scheduler.

pub mod observer;
pub mod store;

pub use observer::{EntityKind, PreImage, UpdateEvent, UpdateObserver};
pub use store::TrustStore;
