// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Ledger Sync
//!
//! Background task that mirrors the ledger's records into the local store.
//!
//! ## Strategy
//!
//! 1. List every record id on the ledger.
//! 2. Unknown ids are fetched (entry + encrypted handle) and inserted
//!    `Unverified`.
//! 3. Any record the ledger reports verified is adopted as `Verified` with the
//!    ledger's stored clear value, unless a local disclosure is in flight.
//!
//! A failure on one record is logged and skipped; only a failed id listing
//! aborts the pass.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use utoipa::ToSchema;

use crate::adapters::{AdapterError, LedgerGateway, RecordView};
use crate::records::{ConfidentialRecord, RecordId, RecordStore, StoreError};

/// Default poll interval between sync passes.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(15);

/// Outcome of one sync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct SyncReport {
    /// Records newly mirrored from the ledger.
    pub imported: usize,
    /// Records that became `Verified` from the ledger's stored value.
    pub verified: usize,
    /// Records skipped because a ledger read failed.
    pub failed: usize,
}

/// Ledger to store mirroring.
pub struct LedgerSync {
    store: Arc<RecordStore>,
    ledger: Arc<dyn LedgerGateway>,
    interval: Duration,
}

impl LedgerSync {
    pub fn new(store: Arc<RecordStore>, ledger: Arc<dyn LedgerGateway>) -> Self {
        Self {
            store,
            ledger,
            interval: DEFAULT_SYNC_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run the sync loop until the cancellation token is triggered.
    ///
    /// ```rust,ignore
    /// tokio::spawn(sync.clone().run(shutdown.clone()));
    /// ```
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) {
        tracing::info!(
            contract = %self.ledger.contract_address(),
            interval_secs = self.interval.as_secs(),
            "Ledger sync starting"
        );

        loop {
            if shutdown.is_cancelled() {
                tracing::info!("Ledger sync shutting down");
                return;
            }

            match self.sync_once().await {
                Ok(report) if report != SyncReport::default() => {
                    tracing::info!(
                        imported = report.imported,
                        verified = report.verified,
                        failed = report.failed,
                        "Ledger sync pass complete"
                    );
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Ledger sync failed, will retry"),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    tracing::info!("Ledger sync shutting down");
                    return;
                }
            }
        }
    }

    /// Execute one sync pass.
    pub async fn sync_once(&self) -> Result<SyncReport, AdapterError> {
        let ids = self.ledger.list_ids().await?;
        let mut report = SyncReport::default();

        for id in ids {
            let local = self.store.get(&id).ok();
            if local.as_ref().is_some_and(|r| r.verification().is_verified()) {
                continue;
            }

            let view = match self.ledger.get_record(&id).await {
                Ok(view) => view,
                Err(e) => {
                    tracing::warn!(record_id = %id, error = %e, "Skipping record, ledger read failed");
                    report.failed += 1;
                    continue;
                }
            };

            if local.is_none() {
                match self.import(&id, &view).await {
                    Ok(true) => report.imported += 1,
                    Ok(false) => {}
                    Err(e) => {
                        tracing::warn!(record_id = %id, error = %e, "Skipping record, handle read failed");
                        report.failed += 1;
                        continue;
                    }
                }
            }

            if view.is_verified && self.adopt(&id, view.decrypted_value) {
                report.verified += 1;
            }
        }

        Ok(report)
    }

    /// Insert a ledger record. Returns false if it appeared locally meanwhile.
    async fn import(&self, id: &RecordId, view: &RecordView) -> Result<bool, AdapterError> {
        let handle = self.ledger.get_encrypted_handle(id).await?;
        let record = ConfidentialRecord::new(
            id.clone(),
            view.name.clone(),
            view.description.clone(),
            handle,
            view.public_value1,
            view.public_value2,
            view.creator.clone(),
            view.created_at,
        );
        match self.store.insert(record) {
            Ok(()) => {
                tracing::debug!(record_id = %id, "Imported ledger record");
                Ok(true)
            }
            Err(StoreError::DuplicateId(_)) => Ok(false),
            Err(e) => {
                tracing::warn!(record_id = %id, error = %e, "Unexpected store error on import");
                Ok(false)
            }
        }
    }

    fn adopt(&self, id: &RecordId, value: u64) -> bool {
        match self.store.adopt_verified(id, value) {
            Ok(_) => true,
            // The in-flight disclosure settles it.
            Err(StoreError::AlreadyInFlight(_)) => false,
            Err(e) => {
                tracing::warn!(record_id = %id, error = %e, "Could not adopt verified value");
                false
            }
        }
    }
}
