// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Thread-safe record store with per-record locking.
//!
//! The id index sits behind a `RwLock` that is only write-locked by
//! [`RecordStore::insert`]. Each record sits behind its own `Mutex`, so
//! transitions on distinct records never wait on each other and transitions
//! on the same record are totally ordered. No lock is held across an await
//! point; every method here is synchronous.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use super::record::{ConfidentialRecord, RecordId, TransitionEvent, VerificationState};
use super::StoreError;

type RecordCell = Arc<Mutex<ConfidentialRecord>>;

#[derive(Default)]
struct StoreIndex {
    /// Insertion order, the tie-break for equal creation times.
    order: Vec<RecordId>,
    records: HashMap<RecordId, RecordCell>,
}

/// Exclusive owner of all confidential records.
#[derive(Default)]
pub struct RecordStore {
    index: RwLock<StoreIndex>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records in creation order, oldest first.
    ///
    /// Records imported from the ledger after newer local submissions still
    /// sort by their ledger timestamp. Equal timestamps keep insertion order.
    pub fn list_all(&self) -> Vec<ConfidentialRecord> {
        let mut records: Vec<ConfidentialRecord> = {
            let index = self.index.read().unwrap_or_else(PoisonError::into_inner);
            index
                .order
                .iter()
                .filter_map(|id| index.records.get(id))
                .map(|cell| lock(cell).clone())
                .collect()
        };
        records.sort_by_key(|record| record.created_at);
        records
    }

    pub fn get(&self, id: &RecordId) -> Result<ConfidentialRecord, StoreError> {
        let cell = self.cell(id)?;
        let record = lock(&cell).clone();
        Ok(record)
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .order
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a new record. Fails with `DuplicateId` if the id is taken.
    pub fn insert(&self, record: ConfidentialRecord) -> Result<(), StoreError> {
        let mut index = self.index.write().unwrap_or_else(PoisonError::into_inner);
        if index.records.contains_key(&record.id) {
            return Err(StoreError::DuplicateId(record.id));
        }
        index.order.push(record.id.clone());
        index
            .records
            .insert(record.id.clone(), Arc::new(Mutex::new(record)));
        Ok(())
    }

    /// Atomically apply one legal edge of the verification state machine.
    ///
    /// Of any number of callers racing `StartDisclosure` on the same record,
    /// exactly one succeeds; the rest get `AlreadyInFlight`.
    pub fn transition(
        &self,
        id: &RecordId,
        event: TransitionEvent,
    ) -> Result<VerificationState, StoreError> {
        let cell = self.cell(id)?;
        let mut record = lock(&cell);
        let next = record.apply(event)?;
        tracing::debug!(record_id = %id, event = event.name(), state = next.name(), "Record transition");
        Ok(next)
    }

    /// Record a value the ledger already reports as verified.
    ///
    /// Applies `StartDisclosure` and `MarkVerified(value)` under one lock
    /// hold. A record that is already verified keeps its stored value, which
    /// is returned. A record with a disclosure in flight is left alone.
    pub fn adopt_verified(&self, id: &RecordId, value: u64) -> Result<u64, StoreError> {
        let cell = self.cell(id)?;
        let mut record = lock(&cell);
        if let Some(existing) = record.verification().clear_value() {
            return Ok(existing);
        }
        record.apply(TransitionEvent::StartDisclosure)?;
        record.apply(TransitionEvent::MarkVerified(value))?;
        tracing::debug!(record_id = %id, "Adopted ledger-verified value");
        Ok(value)
    }

    fn cell(&self, id: &RecordId) -> Result<RecordCell, StoreError> {
        self.index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }
}

// Every mutation is a single assignment, so a poisoned record is still consistent.
fn lock(cell: &RecordCell) -> MutexGuard<'_, ConfidentialRecord> {
    cell.lock().unwrap_or_else(PoisonError::into_inner)
}
