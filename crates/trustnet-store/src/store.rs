// crates/trustnet-store/src/store.rs
//
// The TrustStore: versioned, sparse, per-entity-locked storage for
// trust matrices and trust vectors.
//
// Concurrency model:
//   - The id -> entity maps are behind an outer RwLock that is held
//     only long enough to resolve an id to its entity handle.
//   - Each entity sits behind its own RwLock; Update/Flush take the
//     write lock so the timestamp check and the entry application are
//     one atomic step, and Get clones a consistent snapshot under the
//     read lock.
//   - All mutations serialize on a store-wide commit lock, held
//     through observer notification. An observer therefore reads the
//     store exactly as it stood when the triggering update committed
//     (plus that update itself), and events arrive in commit order.
//     Observers must not mutate the store from inside on_update; a
//     mutation belongs in a spawned task.
//
// The store is an explicit object (wrap it in an Arc to share it);
// multiple independent stores can coexist in one process.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use trustnet_core::{
    MatrixEntry, MatrixSnapshot, Timestamp, TrustNetError, VectorEntry, VectorSnapshot,
};

use crate::observer::{EntityKind, PreImage, UpdateEvent, UpdateObserver};

type Shelf<T> = RwLock<HashMap<Uuid, Arc<RwLock<T>>>>;

/// In-memory versioned store for trust matrices and trust vectors.
#[derive(Default)]
pub struct TrustStore {
    matrices: Shelf<MatrixSnapshot>,
    vectors: Shelf<VectorSnapshot>,
    observers: RwLock<Vec<Arc<dyn UpdateObserver>>>,
    /// Serializes mutations and is held through notification, so
    /// observers see no interleaved commits.
    commit: Mutex<()>,
}

impl TrustStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer for successful updates.
    pub async fn add_observer(&self, observer: Arc<dyn UpdateObserver>) {
        self.observers.write().await.push(observer);
    }

    async fn notify(&self, event: UpdateEvent) {
        let observers = self.observers.read().await.clone();
        for observer in observers {
            observer.on_update(&event).await;
        }
    }

    async fn lookup<T>(shelf: &Shelf<T>, id: &Uuid) -> Result<Arc<RwLock<T>>, TrustNetError> {
        shelf
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| TrustNetError::NotFound(format!("unknown entity id {}", id)))
    }

    // -----------------------------------------------------------------
    // Matrices
    // -----------------------------------------------------------------

    /// Allocate a fresh, empty trust matrix and return its id.
    pub async fn create_matrix(&self) -> Uuid {
        let id = Uuid::now_v7();
        let entity = Arc::new(RwLock::new(MatrixSnapshot::empty(id)));
        self.matrices.write().await.insert(id, entity);
        tracing::debug!(matrix = %id, "created trust matrix");
        id
    }

    /// Snapshot a matrix: header plus all current entries.
    pub async fn get_matrix(&self, id: &Uuid) -> Result<MatrixSnapshot, TrustNetError> {
        let entity = Self::lookup(&self.matrices, id).await?;
        let snapshot = entity.read().await.clone();
        Ok(snapshot)
    }

    /// Update a matrix: bump its timestamp and apply sparse upserts.
    ///
    /// Rejects `InvalidArgument` ("stale update") when `timestamp` is
    /// strictly less than the stored timestamp, leaving the entity
    /// unchanged. An empty entry list is a valid timestamp touch.
    ///
    /// Observers run before the next mutation is admitted.
    pub async fn update_matrix(
        &self,
        id: &Uuid,
        timestamp: Timestamp,
        entries: &[MatrixEntry],
    ) -> Result<(), TrustNetError> {
        let _commit = self.commit.lock().await;
        let entity = Self::lookup(&self.matrices, id).await?;
        let event = {
            let mut guard = entity.write().await;
            if timestamp < guard.header.timestamp {
                return Err(TrustNetError::InvalidArgument(format!(
                    "stale update: {} < stored {}",
                    timestamp, guard.header.timestamp
                )));
            }
            let pre_image = PreImage::Matrix(guard.clone());
            guard.apply(entries);
            guard.header.timestamp = timestamp.clone();
            UpdateEvent {
                kind: EntityKind::Matrix,
                id: *id,
                timestamp,
                pre_image,
            }
        };
        self.notify(event).await;
        Ok(())
    }

    /// Clear all entries of a matrix. The stored timestamp is
    /// preserved: flushing resets content, it is not a new observation.
    pub async fn flush_matrix(&self, id: &Uuid) -> Result<(), TrustNetError> {
        let _commit = self.commit.lock().await;
        let entity = Self::lookup(&self.matrices, id).await?;
        entity.write().await.entries.clear();
        Ok(())
    }

    /// Remove a matrix; its id is permanently invalid afterwards.
    pub async fn delete_matrix(&self, id: &Uuid) -> Result<(), TrustNetError> {
        let _commit = self.commit.lock().await;
        self.matrices
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| TrustNetError::NotFound(format!("unknown entity id {}", id)))
    }

    // -----------------------------------------------------------------
    // Vectors
    // -----------------------------------------------------------------

    /// Allocate a fresh, empty trust vector and return its id.
    pub async fn create_vector(&self) -> Uuid {
        let id = Uuid::now_v7();
        let entity = Arc::new(RwLock::new(VectorSnapshot::empty(id)));
        self.vectors.write().await.insert(id, entity);
        tracing::debug!(vector = %id, "created trust vector");
        id
    }

    /// Snapshot a vector: header plus all current entries.
    pub async fn get_vector(&self, id: &Uuid) -> Result<VectorSnapshot, TrustNetError> {
        let entity = Self::lookup(&self.vectors, id).await?;
        let snapshot = entity.read().await.clone();
        Ok(snapshot)
    }

    /// Update a vector; same semantics as `update_matrix`.
    pub async fn update_vector(
        &self,
        id: &Uuid,
        timestamp: Timestamp,
        entries: &[VectorEntry],
    ) -> Result<(), TrustNetError> {
        let _commit = self.commit.lock().await;
        let entity = Self::lookup(&self.vectors, id).await?;
        let event = {
            let mut guard = entity.write().await;
            if timestamp < guard.header.timestamp {
                return Err(TrustNetError::InvalidArgument(format!(
                    "stale update: {} < stored {}",
                    timestamp, guard.header.timestamp
                )));
            }
            let pre_image = PreImage::Vector(guard.clone());
            guard.apply(entries);
            guard.header.timestamp = timestamp.clone();
            UpdateEvent {
                kind: EntityKind::Vector,
                id: *id,
                timestamp,
                pre_image,
            }
        };
        self.notify(event).await;
        Ok(())
    }

    /// Clear all entries of a vector, preserving its timestamp.
    pub async fn flush_vector(&self, id: &Uuid) -> Result<(), TrustNetError> {
        let _commit = self.commit.lock().await;
        let entity = Self::lookup(&self.vectors, id).await?;
        entity.write().await.entries.clear();
        Ok(())
    }

    /// Remove a vector; its id is permanently invalid afterwards.
    pub async fn delete_vector(&self, id: &Uuid) -> Result<(), TrustNetError> {
        let _commit = self.commit.lock().await;
        self.vectors
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| TrustNetError::NotFound(format!("unknown entity id {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn entry(truster: u32, trustee: u32, value: f64) -> MatrixEntry {
        MatrixEntry {
            truster,
            trustee,
            value,
        }
    }

    #[tokio::test]
    async fn create_yields_empty_entity_with_zero_timestamp() {
        let store = TrustStore::new();
        let id = store.create_matrix().await;
        let snapshot = store.get_matrix(&id).await.unwrap();
        assert_eq!(snapshot.header.id, id);
        assert!(snapshot.header.timestamp.is_zero());
        assert!(snapshot.entries.is_empty());
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found() {
        let store = TrustStore::new();
        let err = store.get_matrix(&Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, TrustNetError::NotFound(_)));
    }

    #[tokio::test]
    async fn stale_update_is_rejected_without_side_effects() {
        let store = TrustStore::new();
        let id = store.create_matrix().await;

        store
            .update_matrix(&id, Timestamp::from(10), &[entry(1, 2, 0.5)])
            .await
            .unwrap();

        let err = store
            .update_matrix(&id, Timestamp::from(9), &[entry(1, 2, 0.9)])
            .await
            .unwrap_err();
        assert!(matches!(err, TrustNetError::InvalidArgument(_)));

        let snapshot = store.get_matrix(&id).await.unwrap();
        assert_eq!(snapshot.header.timestamp, Timestamp::from(10));
        assert_eq!(snapshot.entries.get(&(1, 2)), Some(&0.5));
    }

    #[tokio::test]
    async fn equal_timestamp_update_is_accepted_and_idempotent() {
        let store = TrustStore::new();
        let id = store.create_matrix().await;
        let entries = [entry(1, 2, 0.5), entry(2, 3, 0.25)];

        store
            .update_matrix(&id, Timestamp::from(7), &entries)
            .await
            .unwrap();
        let first = store.get_matrix(&id).await.unwrap();

        store
            .update_matrix(&id, Timestamp::from(7), &entries)
            .await
            .unwrap();
        let second = store.get_matrix(&id).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn zero_value_removes_and_empty_update_touches_timestamp() {
        let store = TrustStore::new();
        let id = store.create_vector().await;

        store
            .update_vector(
                &id,
                Timestamp::from(1),
                &[VectorEntry {
                    trustee: 4,
                    value: 0.3,
                }],
            )
            .await
            .unwrap();
        store
            .update_vector(
                &id,
                Timestamp::from(2),
                &[VectorEntry {
                    trustee: 4,
                    value: 0.0,
                }],
            )
            .await
            .unwrap();

        let snapshot = store.get_vector(&id).await.unwrap();
        assert!(snapshot.entries.is_empty());
        assert_eq!(snapshot.header.timestamp, Timestamp::from(2));

        // Timestamp touch: no entries, timestamp still advances.
        store
            .update_vector(&id, Timestamp::from(5), &[])
            .await
            .unwrap();
        let snapshot = store.get_vector(&id).await.unwrap();
        assert_eq!(snapshot.header.timestamp, Timestamp::from(5));
    }

    #[tokio::test]
    async fn flush_clears_entries_and_preserves_timestamp() {
        let store = TrustStore::new();
        let id = store.create_matrix().await;
        store
            .update_matrix(&id, Timestamp::from(42), &[entry(1, 2, 0.5)])
            .await
            .unwrap();

        store.flush_matrix(&id).await.unwrap();

        let snapshot = store.get_matrix(&id).await.unwrap();
        assert!(snapshot.entries.is_empty());
        assert_eq!(snapshot.header.timestamp, Timestamp::from(42));
    }

    #[tokio::test]
    async fn deleted_id_is_not_found_for_every_operation() {
        let store = TrustStore::new();
        let id = store.create_vector().await;
        store.delete_vector(&id).await.unwrap();

        assert!(matches!(
            store.get_vector(&id).await.unwrap_err(),
            TrustNetError::NotFound(_)
        ));
        assert!(matches!(
            store
                .update_vector(&id, Timestamp::from(1), &[])
                .await
                .unwrap_err(),
            TrustNetError::NotFound(_)
        ));
        assert!(matches!(
            store.flush_vector(&id).await.unwrap_err(),
            TrustNetError::NotFound(_)
        ));
        assert!(matches!(
            store.delete_vector(&id).await.unwrap_err(),
            TrustNetError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn matrix_and_vector_ids_are_independent_namespaces() {
        let store = TrustStore::new();
        let matrix_id = store.create_matrix().await;
        assert!(store.get_vector(&matrix_id).await.is_err());
    }

    /// Records the pre-image entry count of each observed update.
    struct RecordingObserver {
        seen: Mutex<Vec<(Timestamp, usize)>>,
    }

    #[async_trait]
    impl UpdateObserver for RecordingObserver {
        async fn on_update(&self, event: &UpdateEvent) {
            let pre_entries = match &event.pre_image {
                PreImage::Matrix(m) => m.entries.len(),
                PreImage::Vector(v) => v.entries.len(),
            };
            self.seen
                .lock()
                .unwrap()
                .push((event.timestamp.clone(), pre_entries));
        }
    }

    #[tokio::test]
    async fn observers_see_the_pre_update_snapshot() {
        let store = TrustStore::new();
        let observer = Arc::new(RecordingObserver {
            seen: Mutex::new(Vec::new()),
        });
        store.add_observer(observer.clone()).await;

        let id = store.create_matrix().await;
        store
            .update_matrix(&id, Timestamp::from(1), &[entry(1, 2, 0.5)])
            .await
            .unwrap();
        store
            .update_matrix(&id, Timestamp::from(2), &[entry(3, 4, 0.5)])
            .await
            .unwrap();

        let seen = observer.seen.lock().unwrap().clone();
        // The first event's pre-image is empty; the second sees only
        // the first update's entry, not its own.
        assert_eq!(seen, vec![(Timestamp::from(1), 0), (Timestamp::from(2), 1)]);
    }

    /// On a matrix event, signals that notification has begun, waits
    /// long enough for a racing writer to land if it could, then reads
    /// the watched vector.
    struct CoherenceObserver {
        store: Arc<TrustStore>,
        vector_id: Uuid,
        entered: Arc<tokio::sync::Notify>,
        seen: Mutex<Option<Timestamp>>,
    }

    #[async_trait]
    impl UpdateObserver for CoherenceObserver {
        async fn on_update(&self, event: &UpdateEvent) {
            if event.kind != EntityKind::Matrix {
                return;
            }
            self.entered.notify_one();
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            if let Ok(v) = self.store.get_vector(&self.vector_id).await {
                *self.seen.lock().unwrap() = Some(v.header.timestamp);
            }
        }
    }

    #[tokio::test]
    async fn concurrent_commits_wait_until_observers_finish() {
        let store = Arc::new(TrustStore::new());
        let matrix_id = store.create_matrix().await;
        let vector_id = store.create_vector().await;
        store
            .update_vector(&vector_id, Timestamp::from(1), &[])
            .await
            .unwrap();

        let entered = Arc::new(tokio::sync::Notify::new());
        let observer = Arc::new(CoherenceObserver {
            store: store.clone(),
            vector_id,
            entered: entered.clone(),
            seen: Mutex::new(None),
        });
        store.add_observer(observer.clone()).await;

        // Races a vector write against the matrix notification. The
        // write starts while the observer is mid-notify but must not
        // become visible to it.
        let writer = {
            let store = store.clone();
            let entered = entered.clone();
            tokio::spawn(async move {
                entered.notified().await;
                store
                    .update_vector(&vector_id, Timestamp::from(10900), &[])
                    .await
                    .unwrap();
            })
        };

        store
            .update_matrix(&matrix_id, Timestamp::from(10814), &[])
            .await
            .unwrap();
        writer.await.unwrap();

        assert_eq!(*observer.seen.lock().unwrap(), Some(Timestamp::from(1)));
        let after = store.get_vector(&vector_id).await.unwrap();
        assert_eq!(after.header.timestamp, Timestamp::from(10900));
    }

    #[tokio::test]
    async fn rejected_updates_do_not_notify() {
        let store = TrustStore::new();
        let observer = Arc::new(RecordingObserver {
            seen: Mutex::new(Vec::new()),
        });
        store.add_observer(observer.clone()).await;

        let id = store.create_matrix().await;
        store
            .update_matrix(&id, Timestamp::from(10), &[])
            .await
            .unwrap();
        let _ = store.update_matrix(&id, Timestamp::from(3), &[]).await;

        assert_eq!(observer.seen.lock().unwrap().len(), 1);
    }
}
