// crates/trustnet-core/src/entity.rs
//
// Sparse trust matrix and trust vector snapshot types.
//
// Both structures are sparse: absent keys are implicitly 0.0 and no
// stored value is ever 0.0 (an upsert of 0.0 removes the key). An
// all-zero structure is therefore indistinguishable from an empty one,
// which the compute engine's seed fallback relies on.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timestamp::Timestamp;

/// One sparse local-trust rating: how much `truster` trusts `trustee`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatrixEntry {
    pub truster: u32,
    pub trustee: u32,
    pub value: f64,
}

/// One sparse trust score for `trustee`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorEntry {
    pub trustee: u32,
    pub value: f64,
}

/// Identity and version of a stored trust matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixHeader {
    pub id: Uuid,
    pub timestamp: Timestamp,
}

/// Identity and version of a stored trust vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorHeader {
    pub id: Uuid,
    pub timestamp: Timestamp,
}

/// An owned point-in-time copy of a trust matrix: header first, then
/// the sparse `(truster, trustee) -> value` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixSnapshot {
    pub header: MatrixHeader,
    pub entries: HashMap<(u32, u32), f64>,
}

/// An owned point-in-time copy of a trust vector: header first, then
/// the sparse `trustee -> value` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorSnapshot {
    pub header: VectorHeader,
    pub entries: HashMap<u32, f64>,
}

impl MatrixSnapshot {
    /// A fresh empty matrix: zero timestamp, no entries.
    pub fn empty(id: Uuid) -> Self {
        Self {
            header: MatrixHeader {
                id,
                timestamp: Timestamp::zero(),
            },
            entries: HashMap::new(),
        }
    }

    /// Apply entries as sparse upserts: a value of 0.0 removes the
    /// pair, anything else inserts or replaces it.
    pub fn apply(&mut self, entries: &[MatrixEntry]) {
        for e in entries {
            if e.value == 0.0 {
                self.entries.remove(&(e.truster, e.trustee));
            } else {
                self.entries.insert((e.truster, e.trustee), e.value);
            }
        }
    }

    /// The stored entries in `MatrixEntry` form, in no particular order.
    pub fn to_entries(&self) -> Vec<MatrixEntry> {
        self.entries
            .iter()
            .map(|(&(truster, trustee), &value)| MatrixEntry {
                truster,
                trustee,
                value,
            })
            .collect()
    }
}

impl VectorSnapshot {
    /// A fresh empty vector: zero timestamp, no entries.
    pub fn empty(id: Uuid) -> Self {
        Self {
            header: VectorHeader {
                id,
                timestamp: Timestamp::zero(),
            },
            entries: HashMap::new(),
        }
    }

    /// Apply entries as sparse upserts: a value of 0.0 removes the
    /// key, anything else inserts or replaces it.
    pub fn apply(&mut self, entries: &[VectorEntry]) {
        for e in entries {
            if e.value == 0.0 {
                self.entries.remove(&e.trustee);
            } else {
                self.entries.insert(e.trustee, e.value);
            }
        }
    }

    /// The stored entries in `VectorEntry` form, in no particular order.
    pub fn to_entries(&self) -> Vec<VectorEntry> {
        self.entries
            .iter()
            .map(|(&trustee, &value)| VectorEntry { trustee, value })
            .collect()
    }
}
