// crates/trustnet-store/src/observer.rs
//
// Update observation: events emitted after each successful Update.
//
// Each event carries a pre-image — a snapshot of the entity taken
// before the triggering entries were applied. The scheduler needs this
// to run a window's compute against the store state strictly before
// the update that crossed the boundary.

use async_trait::async_trait;
use uuid::Uuid;

use trustnet_core::{MatrixSnapshot, Timestamp, VectorSnapshot};

/// Which kind of entity an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Matrix,
    Vector,
}

/// Snapshot of the updated entity as it was before the update applied.
#[derive(Debug, Clone)]
pub enum PreImage {
    Matrix(MatrixSnapshot),
    Vector(VectorSnapshot),
}

/// A successful update to a stored entity.
#[derive(Debug, Clone)]
pub struct UpdateEvent {
    pub kind: EntityKind,
    pub id: Uuid,
    /// The timestamp the entity was updated to.
    pub timestamp: Timestamp,
    pub pre_image: PreImage,
}

/// Observer of successful store updates.
///
/// Invoked after the update commits, outside the entity's write lock.
/// Observer errors must be handled internally; the store logs nothing
/// on their behalf and never fails an update because of an observer.
#[async_trait]
pub trait UpdateObserver: Send + Sync {
    async fn on_update(&self, event: &UpdateEvent);
}
