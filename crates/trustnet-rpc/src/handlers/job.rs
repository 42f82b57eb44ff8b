// crates/trustnet-rpc/src/handlers/job.rs
//
// Periodic compute-job handlers: Create, Delete.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use trustnet_core::ComputeJobSpec;
use trustnet_scheduler::JobScheduler;

/// Request to register a periodic compute job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJobRequest {
    #[serde(flatten)]
    pub spec: ComputeJobSpec,
}

/// Response carrying the server-assigned job id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJobResponse {
    pub job_id: Uuid,
}

pub async fn handle_create_job(
    scheduler: &Arc<JobScheduler>,
    request: CreateJobRequest,
) -> Result<CreateJobResponse, String> {
    let job_id = scheduler
        .create_job(request.spec)
        .await
        .map_err(|e| e.to_string())?;
    Ok(CreateJobResponse { job_id })
}

/// Request to stop and release a periodic compute job. The job's
/// global-trust vector is not deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteJobRequest {
    pub job_id: Uuid,
}

/// Acknowledgement of a job deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteJobResponse {}

pub async fn handle_delete_job(
    scheduler: &Arc<JobScheduler>,
    request: DeleteJobRequest,
) -> Result<DeleteJobResponse, String> {
    scheduler
        .delete_job(&request.job_id)
        .await
        .map_err(|e| e.to_string())?;
    Ok(DeleteJobResponse {})
}
