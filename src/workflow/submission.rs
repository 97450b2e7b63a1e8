// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Record submission: encrypt, write to the ledger, then mirror locally.
//!
//! The store is only touched after the ledger has confirmed the write, so a
//! failed submission never leaves a partial record behind.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::adapters::{AdapterError, CreateRecord, EncryptionClient, LedgerGateway};
use crate::records::{ConfidentialRecord, RecordId, RecordStore, StoreError};

/// A reading to register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReading {
    pub creator: String,
    pub value: u64,
    pub name: String,
    pub description: String,
    pub zone_code: u64,
}

/// Orchestrates record creation.
pub struct SubmissionWorkflow {
    store: Arc<RecordStore>,
    encryption: Arc<dyn EncryptionClient>,
    ledger: Arc<dyn LedgerGateway>,
}

impl SubmissionWorkflow {
    pub fn new(
        store: Arc<RecordStore>,
        encryption: Arc<dyn EncryptionClient>,
        ledger: Arc<dyn LedgerGateway>,
    ) -> Self {
        Self {
            store,
            encryption,
            ledger,
        }
    }

    /// Register a new confidential reading.
    ///
    /// Returns the stored record, which starts `Unverified`. Nothing is
    /// retried; the caller decides whether to submit again.
    pub async fn submit(&self, reading: NewReading) -> Result<ConfidentialRecord, SubmissionError> {
        if reading.name.trim().is_empty() {
            return Err(SubmissionError::InvalidInput("name must not be empty".into()));
        }
        if reading.creator.trim().is_empty() {
            return Err(SubmissionError::InvalidInput("creator must not be empty".into()));
        }

        let id = RecordId::generate(Utc::now());
        let contract = self.ledger.contract_address();

        let input = self
            .encryption
            .encrypt(contract, &reading.creator, reading.value)
            .await
            .map_err(|e| {
                warn!(record_id = %id, error = %e, "Encryption failed");
                match e {
                    AdapterError::Unavailable(msg) => SubmissionError::AdapterUnavailable(msg),
                    other => SubmissionError::Encryption(other.to_string()),
                }
            })?;

        let request = CreateRecord {
            id: id.clone(),
            name: reading.name,
            description: reading.description,
            input,
            plaintext_echo: reading.value,
            zone_code: reading.zone_code,
        };

        let receipt = self.ledger.create_record(&request).await.map_err(|e| {
            warn!(record_id = %id, error = %e, "Ledger create failed");
            SubmissionError::SubmissionFailed(e.to_string())
        })?;

        info!(
            record_id = %id,
            tx_hash = %receipt.tx_hash,
            block_number = ?receipt.block_number,
            "Record confirmed on ledger"
        );

        // Ledger timestamp, so local and synced records order the same way.
        let created_at = match self.ledger.get_record(&request.id).await {
            Ok(view) => view.created_at,
            Err(e) => {
                warn!(record_id = %id, error = %e, "Could not read back confirmed record, using local time");
                Utc::now()
            }
        };

        let record = ConfidentialRecord::new(
            request.id,
            request.name,
            request.description,
            request.input.handle,
            request.plaintext_echo,
            request.zone_code,
            reading.creator,
            created_at,
        );

        match self.store.insert(record.clone()) {
            Ok(()) => Ok(record),
            // The ledger sync mirrored the confirmed record first.
            Err(StoreError::DuplicateId(id)) => Ok(self.store.get(&id)?),
            Err(e) => Err(e.into()),
        }
    }
}

/// Submission outcomes other than success.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("Invalid submission: {0}")]
    InvalidInput(String),

    /// The encryption engine rejected the input. Not retryable as-is.
    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Encryption service unavailable: {0}")]
    AdapterUnavailable(String),

    /// The ledger write failed; nothing was stored.
    #[error("Submission failed: {0}")]
    SubmissionFailed(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SubmissionError {
    /// Whether re-invoking the same submission could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SubmissionError::AdapterUnavailable(_) | SubmissionError::SubmissionFailed(_)
        )
    }
}
