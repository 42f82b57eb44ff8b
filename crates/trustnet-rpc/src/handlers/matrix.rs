// crates/trustnet-rpc/src/handlers/matrix.rs
//
// Trust matrix handlers: Create, Get, Update, Flush, Delete.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use trustnet_core::{MatrixEntry, MatrixHeader, Timestamp};
use trustnet_store::TrustStore;

// ---------------------------------------------------------------------------
// CreateMatrix
// ---------------------------------------------------------------------------

/// Request to allocate a fresh, empty trust matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMatrixRequest {}

/// Response carrying the server-assigned matrix id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMatrixResponse {
    pub id: Uuid,
}

pub async fn handle_create_matrix(
    store: &Arc<TrustStore>,
    _request: CreateMatrixRequest,
) -> Result<CreateMatrixResponse, String> {
    Ok(CreateMatrixResponse {
        id: store.create_matrix().await,
    })
}

// ---------------------------------------------------------------------------
// GetMatrix
// ---------------------------------------------------------------------------

/// Request to read a trust matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetMatrixRequest {
    pub id: Uuid,
}

/// The matrix header followed by its entries (order unspecified).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetMatrixResponse {
    pub header: MatrixHeader,
    pub entries: Vec<MatrixEntry>,
}

pub async fn handle_get_matrix(
    store: &Arc<TrustStore>,
    request: GetMatrixRequest,
) -> Result<GetMatrixResponse, String> {
    let snapshot = store
        .get_matrix(&request.id)
        .await
        .map_err(|e| e.to_string())?;
    Ok(GetMatrixResponse {
        entries: snapshot.to_entries(),
        header: snapshot.header,
    })
}

// ---------------------------------------------------------------------------
// UpdateMatrix
// ---------------------------------------------------------------------------

/// Request to advance a matrix to a new timestamp and apply upserts.
/// An empty entry list is a valid timestamp touch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMatrixRequest {
    pub id: Uuid,
    pub timestamp: Timestamp,
    #[serde(default)]
    pub entries: Vec<MatrixEntry>,
}

/// Acknowledgement of a matrix update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMatrixResponse {}

pub async fn handle_update_matrix(
    store: &Arc<TrustStore>,
    request: UpdateMatrixRequest,
) -> Result<UpdateMatrixResponse, String> {
    store
        .update_matrix(&request.id, request.timestamp, &request.entries)
        .await
        .map_err(|e| e.to_string())?;
    Ok(UpdateMatrixResponse {})
}

// ---------------------------------------------------------------------------
// FlushMatrix
// ---------------------------------------------------------------------------

/// Request to clear all entries of a matrix (timestamp preserved).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlushMatrixRequest {
    pub id: Uuid,
}

/// Acknowledgement of a matrix flush.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlushMatrixResponse {}

pub async fn handle_flush_matrix(
    store: &Arc<TrustStore>,
    request: FlushMatrixRequest,
) -> Result<FlushMatrixResponse, String> {
    store
        .flush_matrix(&request.id)
        .await
        .map_err(|e| e.to_string())?;
    Ok(FlushMatrixResponse {})
}

// ---------------------------------------------------------------------------
// DeleteMatrix
// ---------------------------------------------------------------------------

/// Request to delete a matrix; the id becomes permanently invalid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteMatrixRequest {
    pub id: Uuid,
}

/// Acknowledgement of a matrix deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteMatrixResponse {}

pub async fn handle_delete_matrix(
    store: &Arc<TrustStore>,
    request: DeleteMatrixRequest,
) -> Result<DeleteMatrixResponse, String> {
    store
        .delete_matrix(&request.id)
        .await
        .map_err(|e| e.to_string())?;
    Ok(DeleteMatrixResponse {})
}
