// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Verified Disclosure
//!
//! Reveals the clear value behind a record's encrypted handle, trusting it
//! only once the ledger has checked the gateway's decryption proof.
//!
//! ## Protocol
//!
//! 1. A record already `Verified` locally is answered from the store with no
//!    adapter calls.
//! 2. If the ledger already holds a verified value (anyone's earlier
//!    disclosure), it is adopted without decrypting again.
//! 3. `StartDisclosure` claims the record. A second caller gets `Pending`.
//! 4. The handle is re-read from the ledger, never cached.
//! 5. The gateway returns the clear value with a decryption proof. The value
//!    kept is the one decoded from the proven encoding; a gateway whose
//!    listed value disagrees with it is treated as failed.
//! 6. The ledger re-checks the proof and stores the value.
//! 7. `MarkVerified` records the value locally.
//!
//! Any failure after step 3 reverts the record to `Unverified`. The same
//! happens if the caller drops the future mid-flight, so a record is never
//! left `Disclosing`.

use std::sync::Arc;

use alloy::primitives::U256;
use alloy::sol_types::SolValue;
use tracing::{debug, info, warn};

use crate::adapters::{AdapterError, DisclosureGateway, LedgerGateway};
use crate::records::{RecordId, RecordStore, StoreError, TransitionEvent};

/// Where a disclosed value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisclosureSource {
    /// Already verified in the local store.
    Cached,
    /// Already verified on the ledger by an earlier disclosure.
    Ledger,
    /// Freshly decrypted by the gateway and verified on-chain by this call.
    Gateway,
}

/// A successfully disclosed, on-chain-verified value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disclosure {
    pub record_id: RecordId,
    pub clear_value: u64,
    pub source: DisclosureSource,
}

/// Orchestrates verified decryption of a record.
pub struct DisclosureWorkflow {
    store: Arc<RecordStore>,
    ledger: Arc<dyn LedgerGateway>,
    gateway: Arc<dyn DisclosureGateway>,
}

impl DisclosureWorkflow {
    pub fn new(
        store: Arc<RecordStore>,
        ledger: Arc<dyn LedgerGateway>,
        gateway: Arc<dyn DisclosureGateway>,
    ) -> Self {
        Self {
            store,
            ledger,
            gateway,
        }
    }

    /// Disclose the hidden value of `id`.
    pub async fn disclose(&self, id: &RecordId) -> Result<Disclosure, DisclosureError> {
        if let Some(clear_value) = self.store.get(id)?.verification().clear_value() {
            debug!(record_id = %id, "Record already verified");
            return Ok(Disclosure {
                record_id: id.clone(),
                clear_value,
                source: DisclosureSource::Cached,
            });
        }

        let view = self
            .ledger
            .get_record(id)
            .await
            .map_err(DisclosureError::LedgerRead)?;
        if view.is_verified {
            let clear_value = match self.store.adopt_verified(id, view.decrypted_value) {
                Ok(value) => value,
                Err(StoreError::AlreadyInFlight(id)) => return Err(DisclosureError::Pending(id)),
                Err(e) => return Err(e.into()),
            };
            info!(record_id = %id, "Adopted value verified earlier on the ledger");
            return Ok(Disclosure {
                record_id: id.clone(),
                clear_value,
                source: DisclosureSource::Ledger,
            });
        }

        let claim = match InFlight::claim(&self.store, id) {
            Ok(claim) => claim,
            Err(StoreError::AlreadyInFlight(id)) => {
                debug!(record_id = %id, "Disclosure already in flight");
                return Err(DisclosureError::Pending(id));
            }
            Err(StoreError::IllegalTransition { .. }) => {
                // Verified by a concurrent caller since the first check.
                let record = self.store.get(id)?;
                if let Some(clear_value) = record.verification().clear_value() {
                    return Ok(Disclosure {
                        record_id: id.clone(),
                        clear_value,
                        source: DisclosureSource::Cached,
                    });
                }
                return Err(DisclosureError::Pending(id.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        let handle = match self.ledger.get_encrypted_handle(id).await {
            Ok(handle) => handle,
            Err(e) => {
                claim.revert("handle lookup failed");
                return Err(DisclosureError::LedgerRead(e));
            }
        };

        let contract = self.ledger.contract_address();
        let result = match self.gateway.request_disclosure(&[handle], contract).await {
            Ok(result) => result,
            Err(e) => {
                warn!(record_id = %id, error = %e, "Disclosure gateway failed");
                claim.revert("gateway failed");
                return Err(DisclosureError::GatewayFailed(e));
            }
        };

        let clear_value = match proven_clear_value(&result.abi_encoded_clear_values) {
            Ok(value) if result.clear_values.get(&handle) == Some(&value) => value,
            Ok(value) => {
                warn!(
                    record_id = %id,
                    handle = %handle,
                    proven = value,
                    listed = ?result.clear_values.get(&handle),
                    "Gateway clear value disagrees with the proven encoding"
                );
                claim.revert("gateway response inconsistent");
                return Err(DisclosureError::GatewayFailed(AdapterError::Rejected(format!(
                    "Clear value for handle {handle} does not match the proven value"
                ))));
            }
            Err(e) => {
                warn!(record_id = %id, error = %e, "Gateway returned undecodable clear values");
                claim.revert("gateway response malformed");
                return Err(DisclosureError::GatewayFailed(e));
            }
        };

        let receipt = match self
            .ledger
            .verify_disclosure(id, &result.abi_encoded_clear_values, &result.decryption_proof)
            .await
        {
            Ok(receipt) => receipt,
            Err(e) => {
                // The gateway answered but on-chain trust was not established:
                // the value is dropped here and never recorded.
                warn!(record_id = %id, error = %e, "On-chain verification failed");
                claim.revert("on-chain verification failed");
                return Err(DisclosureError::VerificationRejected(e));
            }
        };

        claim.complete(clear_value)?;
        info!(
            record_id = %id,
            tx_hash = %receipt.tx_hash,
            "Disclosure verified on-chain"
        );

        Ok(Disclosure {
            record_id: id.clone(),
            clear_value,
            source: DisclosureSource::Gateway,
        })
    }
}

/// Decode the single `uint256` clear value the decryption proof commits to.
fn proven_clear_value(encoded: &[u8]) -> Result<u64, AdapterError> {
    let value = U256::abi_decode(encoded)
        .map_err(|e| AdapterError::Rejected(format!("Malformed clear values: {e}")))?;
    u64::try_from(value)
        .map_err(|_| AdapterError::Rejected(format!("Clear value {value} out of range")))
}

/// Holds a record in `Disclosing` and reverts it on drop unless completed.
struct InFlight<'a> {
    store: &'a RecordStore,
    id: &'a RecordId,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn claim(store: &'a RecordStore, id: &'a RecordId) -> Result<Self, StoreError> {
        store.transition(id, TransitionEvent::StartDisclosure)?;
        Ok(Self {
            store,
            id,
            armed: true,
        })
    }

    fn complete(mut self, clear_value: u64) -> Result<(), StoreError> {
        self.armed = false;
        self.store
            .transition(self.id, TransitionEvent::MarkVerified(clear_value))
            .map(|_| ())
    }

    fn revert(mut self, reason: &str) {
        self.armed = false;
        self.release(reason);
    }

    fn release(&self, reason: &str) {
        if let Err(e) = self.store.transition(self.id, TransitionEvent::RevertDisclosure) {
            warn!(record_id = %self.id, error = %e, reason, "Failed to revert disclosure");
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.release("disclosure abandoned");
        }
    }
}

/// Disclosure outcomes other than success.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DisclosureError {
    /// Another disclosure of this record is in flight; poll instead of resubmitting.
    #[error("Disclosure pending for record {0}")]
    Pending(RecordId),

    #[error("Ledger read failed: {0}")]
    LedgerRead(#[source] AdapterError),

    /// The gateway failed; the record is `Unverified` again.
    #[error("Disclosure gateway failed: {0}")]
    GatewayFailed(#[source] AdapterError),

    /// The gateway answered but the ledger refused the proof; the record is
    /// `Unverified` again and the value was discarded.
    #[error("On-chain verification rejected: {0}")]
    VerificationRejected(#[source] AdapterError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DisclosureError {
    /// Whether re-invoking the disclosure from scratch could succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, DisclosureError::Store(_))
    }
}
