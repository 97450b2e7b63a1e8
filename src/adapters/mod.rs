// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # External Collaborator Adapters
//!
//! The core reaches the outside world only through three traits:
//!
//! - [`LedgerGateway`] - the record contract on the ledger
//! - [`EncryptionClient`] - the FHE engine that encrypts inputs and proves them
//! - [`DisclosureGateway`] - the decryption service that returns clear values
//!   together with an on-chain-checkable proof
//!
//! Adapters are stateless from the workflows' point of view and shared as
//! `Arc<dyn Trait>`. Re-submitting the same request must either succeed
//! harmlessly or fail cleanly.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::records::RecordId;

#[cfg(test)]
pub(crate) mod fake;

// =============================================================================
// Wire-Neutral Types
// =============================================================================

/// 32-byte opaque reference to a ciphertext held by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(pub [u8; 32]);

impl Handle {
    /// Parse a `0x`-prefixed (or bare) 64-character hex string.
    pub fn from_hex(raw: &str) -> Result<Self, AdapterError> {
        let bytes = alloy::hex::decode(raw)
            .map_err(|e| AdapterError::Rejected(format!("Invalid handle hex: {e}")))?;
        let array: [u8; 32] = bytes.try_into().map_err(|bytes: Vec<u8>| {
            AdapterError::Rejected(format!("Handle must be 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Handle(array))
    }

    pub fn to_hex(&self) -> String {
        alloy::hex::encode_prefixed(self.0)
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Opaque proof bytes (input proof or decryption proof).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Proof(pub Vec<u8>);

/// Result of encrypting one plaintext: the ciphertext handle plus its validity proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedInput {
    pub handle: Handle,
    pub proof: Proof,
}

/// Ledger-side view of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordView {
    pub id: RecordId,
    pub name: String,
    pub description: String,
    pub public_value1: u64,
    pub public_value2: u64,
    pub creator: String,
    pub created_at: DateTime<Utc>,
    pub is_verified: bool,
    /// Only meaningful when `is_verified` is set.
    pub decrypted_value: u64,
}

/// Everything the ledger's create operation needs, submitted atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRecord {
    pub id: RecordId,
    pub name: String,
    pub description: String,
    pub input: EncryptedInput,
    pub plaintext_echo: u64,
    pub zone_code: u64,
}

/// Confirmation of a ledger write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerReceipt {
    pub tx_hash: String,
    pub block_number: Option<u64>,
}

/// Clear values returned by the disclosure gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisclosureResult {
    pub clear_values: HashMap<Handle, u64>,
    /// ABI encoding of the clear values, exactly as the proof commits to them.
    pub abi_encoded_clear_values: Vec<u8>,
    pub decryption_proof: Proof,
}

// =============================================================================
// Adapter Traits
// =============================================================================

/// Read/write facade over the ledger's record contract.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Contract address used as the encryption and disclosure context.
    fn contract_address(&self) -> &str;

    async fn list_ids(&self) -> Result<Vec<RecordId>, AdapterError>;

    async fn get_record(&self, id: &RecordId) -> Result<RecordView, AdapterError>;

    async fn get_encrypted_handle(&self, id: &RecordId) -> Result<Handle, AdapterError>;

    /// Submit a new record. Either the whole record lands or nothing does.
    async fn create_record(&self, request: &CreateRecord) -> Result<LedgerReceipt, AdapterError>;

    /// Have the ledger check a decryption proof and durably record the clear value.
    async fn verify_disclosure(
        &self,
        id: &RecordId,
        abi_encoded_clear_values: &[u8],
        proof: &Proof,
    ) -> Result<LedgerReceipt, AdapterError>;

    async fn is_available(&self) -> Result<bool, AdapterError>;
}

/// Facade over the FHE engine.
#[async_trait]
pub trait EncryptionClient: Send + Sync {
    /// Encrypt `plaintext` for `contract`, bound to `recipient`.
    async fn encrypt(
        &self,
        contract: &str,
        recipient: &str,
        plaintext: u64,
    ) -> Result<EncryptedInput, AdapterError>;
}

/// Facade over the off-chain decryption-verification service.
#[async_trait]
pub trait DisclosureGateway: Send + Sync {
    async fn request_disclosure(
        &self,
        handles: &[Handle],
        contract: &str,
    ) -> Result<DisclosureResult, AdapterError>;
}

// =============================================================================
// Error Type
// =============================================================================

/// Errors reported by any adapter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    /// Network failure, timeout, or the service is down. Retryable.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The request itself is unacceptable (e.g. value out of range).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The service processed the request and refused it, or replied with
    /// something malformed (reverted transaction, bad proof, bad handle).
    #[error("Rejected: {0}")]
    Rejected(String),
}

impl AdapterError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, AdapterError::Unavailable(_))
    }
}
