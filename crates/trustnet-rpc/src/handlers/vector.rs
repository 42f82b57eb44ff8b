// crates/trustnet-rpc/src/handlers/vector.rs
//
// Trust vector handlers: Create, Get, Update, Flush, Delete.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use trustnet_core::{Timestamp, VectorEntry, VectorHeader};
use trustnet_store::TrustStore;

// ---------------------------------------------------------------------------
// CreateVector
// ---------------------------------------------------------------------------

/// Request to allocate a fresh, empty trust vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVectorRequest {}

/// Response carrying the server-assigned vector id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVectorResponse {
    pub id: Uuid,
}

pub async fn handle_create_vector(
    store: &Arc<TrustStore>,
    _request: CreateVectorRequest,
) -> Result<CreateVectorResponse, String> {
    Ok(CreateVectorResponse {
        id: store.create_vector().await,
    })
}

// ---------------------------------------------------------------------------
// GetVector
// ---------------------------------------------------------------------------

/// Request to read a trust vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetVectorRequest {
    pub id: Uuid,
}

/// The vector header followed by its entries (order unspecified).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetVectorResponse {
    pub header: VectorHeader,
    pub entries: Vec<VectorEntry>,
}

pub async fn handle_get_vector(
    store: &Arc<TrustStore>,
    request: GetVectorRequest,
) -> Result<GetVectorResponse, String> {
    let snapshot = store
        .get_vector(&request.id)
        .await
        .map_err(|e| e.to_string())?;
    Ok(GetVectorResponse {
        entries: snapshot.to_entries(),
        header: snapshot.header,
    })
}

// ---------------------------------------------------------------------------
// UpdateVector
// ---------------------------------------------------------------------------

/// Request to advance a vector to a new timestamp and apply upserts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateVectorRequest {
    pub id: Uuid,
    pub timestamp: Timestamp,
    #[serde(default)]
    pub entries: Vec<VectorEntry>,
}

/// Acknowledgement of a vector update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateVectorResponse {}

pub async fn handle_update_vector(
    store: &Arc<TrustStore>,
    request: UpdateVectorRequest,
) -> Result<UpdateVectorResponse, String> {
    store
        .update_vector(&request.id, request.timestamp, &request.entries)
        .await
        .map_err(|e| e.to_string())?;
    Ok(UpdateVectorResponse {})
}

// ---------------------------------------------------------------------------
// FlushVector
// ---------------------------------------------------------------------------

/// Request to clear all entries of a vector (timestamp preserved).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlushVectorRequest {
    pub id: Uuid,
}

/// Acknowledgement of a vector flush.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlushVectorResponse {}

pub async fn handle_flush_vector(
    store: &Arc<TrustStore>,
    request: FlushVectorRequest,
) -> Result<FlushVectorResponse, String> {
    store
        .flush_vector(&request.id)
        .await
        .map_err(|e| e.to_string())?;
    Ok(FlushVectorResponse {})
}

// ---------------------------------------------------------------------------
// DeleteVector
// ---------------------------------------------------------------------------

/// Request to delete a vector; the id becomes permanently invalid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteVectorRequest {
    pub id: Uuid,
}

/// Acknowledgement of a vector deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteVectorResponse {}

pub async fn handle_delete_vector(
    store: &Arc<TrustStore>,
    request: DeleteVectorRequest,
) -> Result<DeleteVectorResponse, String> {
    store
        .delete_vector(&request.id)
        .await
        .map_err(|e| e.to_string())?;
    Ok(DeleteVectorResponse {})
}
