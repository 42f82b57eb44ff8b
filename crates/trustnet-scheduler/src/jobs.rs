// crates/trustnet-scheduler/src/jobs.rs
//
// The JobScheduler: owns periodic compute jobs and re-triggers the
// engine when fresh input data crosses into a new time window.
//
// Each job's trigger state is a small mutex-guarded machine:
//   - result_timestamp: window start of the last written result.
//   - running: whether a compute for this job is in flight.
//   - pending: the freshest coalesced trigger, run right after the
//     in-flight compute finishes if its window is still ahead.
// The mutex is never held across an await.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use trustnet_core::{CancellationToken, ComputeJobSpec, Timestamp, TrustNetError};
use trustnet_engine::{ComputeEngine, ComputeInputs};
use trustnet_store::{EntityKind, PreImage, TrustStore, UpdateEvent, UpdateObserver};

/// A registered periodic compute job.
struct Job {
    id: Uuid,
    spec: ComputeJobSpec,
    /// Cancelled when the job is deleted; aborts any in-flight run.
    cancel: CancellationToken,
    state: Mutex<RunState>,
}

struct RunState {
    result_timestamp: Timestamp,
    running: bool,
    pending: Option<PendingRun>,
}

struct PendingRun {
    window: Timestamp,
    inputs: ComputeInputs,
}

/// Owns periodic compute jobs; register it as a store observer so it
/// sees every successful update to a watched entity.
pub struct JobScheduler {
    store: Arc<TrustStore>,
    engine: Arc<ComputeEngine>,
    jobs: RwLock<HashMap<Uuid, Arc<Job>>>,
}

impl JobScheduler {
    pub fn new(store: Arc<TrustStore>, engine: Arc<ComputeEngine>) -> Self {
        Self {
            store,
            engine,
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// Register a periodic job watching its local-trust matrix and
    /// pre-trust vector.
    ///
    /// All three referenced entities must exist. The job's result
    /// timestamp starts at the global-trust vector's current
    /// timestamp floored to its window start, so only genuinely new
    /// windows trigger a recompute.
    pub async fn create_job(&self, spec: ComputeJobSpec) -> Result<Uuid, TrustNetError> {
        spec.validate()?;
        self.store.get_matrix(&spec.params.local_trust_id).await?;
        self.store.get_vector(&spec.params.pre_trust_id).await?;
        let global = self.store.get_vector(&spec.params.global_trust_id).await?;
        let result_timestamp = global.header.timestamp.window(&spec.period)?;

        let id = Uuid::now_v7();
        let job = Arc::new(Job {
            id,
            spec,
            cancel: CancellationToken::new(),
            state: Mutex::new(RunState {
                result_timestamp,
                running: false,
                pending: None,
            }),
        });
        self.jobs.write().await.insert(id, job);
        tracing::info!(job = %id, "compute job registered");
        Ok(id)
    }

    /// Stop watching and release the job. Cancels an in-flight run;
    /// the job's global-trust vector is left alone (independent
    /// lifecycle).
    pub async fn delete_job(&self, id: &Uuid) -> Result<(), TrustNetError> {
        let job = self
            .jobs
            .write()
            .await
            .remove(id)
            .ok_or_else(|| TrustNetError::NotFound(format!("unknown job id {}", id)))?;
        job.cancel.cancel();
        tracing::info!(job = %id, "compute job deleted");
        Ok(())
    }

    /// The window start of the job's last written result.
    pub async fn result_timestamp(&self, id: &Uuid) -> Result<Timestamp, TrustNetError> {
        let jobs = self.jobs.read().await;
        let job = jobs
            .get(id)
            .ok_or_else(|| TrustNetError::NotFound(format!("unknown job id {}", id)))?;
        let state = job.state.lock().expect("job state poisoned");
        Ok(state.result_timestamp.clone())
    }

    /// Evaluate the window rule for one job against one update event.
    async fn evaluate_trigger(&self, job: Arc<Job>, event: &UpdateEvent) {
        let window = match event.timestamp.window(&job.spec.period) {
            Ok(w) => w,
            Err(e) => {
                tracing::warn!(job = %job.id, error = %e, "bad window arithmetic; trigger skipped");
                return;
            }
        };

        // Cheap pre-check before snapshotting anything.
        {
            let state = job.state.lock().expect("job state poisoned");
            if window <= state.result_timestamp {
                return;
            }
        }

        // The recompute must reflect only data committed strictly
        // before the triggering update. The triggering entity comes
        // from the event's pre-image; the other inputs are read here,
        // inside the notification, where the store's commit lock
        // guarantees no later commit is visible yet.
        let inputs = match self.gather_inputs(&job, event).await {
            Ok(inputs) => inputs,
            Err(e) => {
                tracing::warn!(job = %job.id, error = %e, "inputs unavailable; trigger skipped");
                return;
            }
        };

        let mut state = job.state.lock().expect("job state poisoned");
        if window <= state.result_timestamp {
            return;
        }
        if state.running {
            // Coalesce: keep only the freshest window. Events for
            // different entities can arrive with decreasing windows,
            // so an older trigger must not displace a newer one.
            if state.pending.as_ref().map_or(true, |p| window > p.window) {
                state.pending = Some(PendingRun { window, inputs });
            }
            return;
        }
        state.running = true;
        drop(state);

        let engine = self.engine.clone();
        tokio::spawn(run_job(engine, job, window, inputs));
    }

    async fn gather_inputs(
        &self,
        job: &Job,
        event: &UpdateEvent,
    ) -> Result<ComputeInputs, TrustNetError> {
        let params = &job.spec.params;
        let matrix = match &event.pre_image {
            PreImage::Matrix(m) if event.id == params.local_trust_id => m.clone(),
            _ => self.store.get_matrix(&params.local_trust_id).await?,
        };
        let pre_trust = match &event.pre_image {
            PreImage::Vector(v) if event.id == params.pre_trust_id => v.clone(),
            _ => self.store.get_vector(&params.pre_trust_id).await?,
        };
        let seed = self.store.get_vector(&params.global_trust_id).await?;
        Ok(ComputeInputs {
            matrix,
            pre_trust,
            seed,
        })
    }
}

#[async_trait]
impl UpdateObserver for JobScheduler {
    async fn on_update(&self, event: &UpdateEvent) {
        let watching: Vec<Arc<Job>> = {
            let jobs = self.jobs.read().await;
            jobs.values()
                .filter(|job| match event.kind {
                    EntityKind::Matrix => event.id == job.spec.params.local_trust_id,
                    EntityKind::Vector => event.id == job.spec.params.pre_trust_id,
                })
                .cloned()
                .collect()
        };
        for job in watching {
            self.evaluate_trigger(job, event).await;
        }
    }
}

/// Run one job's compute, then any still-fresh coalesced trigger,
/// until the job goes idle. At most one instance of this task exists
/// per job at a time.
async fn run_job(
    engine: Arc<ComputeEngine>,
    job: Arc<Job>,
    mut window: Timestamp,
    mut inputs: ComputeInputs,
) {
    loop {
        let outcome = engine
            .compute_with_inputs(&job.spec.params, inputs, window.clone(), &job.cancel)
            .await;

        let mut state = job.state.lock().expect("job state poisoned");
        match outcome {
            Ok(outcome) => {
                state.result_timestamp = window.clone();
                tracing::debug!(
                    job = %job.id,
                    window = %window,
                    iterations = outcome.iterations,
                    converged = outcome.converged,
                    "window recompute finished"
                );
            }
            Err(e) => {
                // Skipped trigger: result_timestamp stays put so the
                // window can fire again on the next watched update.
                tracing::warn!(job = %job.id, window = %window, error = %e, "window recompute failed");
            }
        }

        match state.pending.take() {
            Some(next) if next.window > state.result_timestamp && !job.cancel.is_cancelled() => {
                window = next.window;
                inputs = next.inputs;
            }
            _ => {
                state.running = false;
                return;
            }
        }
    }
}
