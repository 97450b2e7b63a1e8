// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory adapters for tests. Every operation is counted so tests can
//! assert which collaborators a workflow touched.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Notify;

use super::{
    AdapterError, CreateRecord, DisclosureGateway, DisclosureResult, EncryptedInput,
    EncryptionClient, Handle, LedgerGateway, LedgerReceipt, Proof, RecordView,
};
use crate::records::RecordId;

pub(crate) const FAKE_CONTRACT: &str = "0x00000000000000000000000000000000000000c0";

/// ABI encoding of a single `uint256` clear value.
pub(crate) fn abi_encode_value(value: u64) -> Vec<u8> {
    let mut word = vec![0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

fn abi_decode_value(encoded: &[u8]) -> Option<u64> {
    let tail: [u8; 8] = encoded.get(24..32)?.try_into().ok()?;
    Some(u64::from_be_bytes(tail))
}

fn receipt(n: usize) -> LedgerReceipt {
    LedgerReceipt {
        tx_hash: format!("0x{n:064x}"),
        block_number: Some(n as u64),
    }
}

// =============================================================================
// Ledger
// =============================================================================

#[derive(Default)]
pub(crate) struct LedgerCalls {
    pub list_ids: AtomicUsize,
    pub get_record: AtomicUsize,
    pub get_handle: AtomicUsize,
    pub create: AtomicUsize,
    pub verify: AtomicUsize,
}

impl LedgerCalls {
    pub fn writes(&self) -> usize {
        self.create.load(Ordering::SeqCst) + self.verify.load(Ordering::SeqCst)
    }
}

struct LedgerEntry {
    view: RecordView,
    handle: Handle,
}

pub(crate) struct FakeLedger {
    entries: Mutex<Vec<LedgerEntry>>,
    pub calls: LedgerCalls,
    create_error: Mutex<Option<AdapterError>>,
    verify_error: Mutex<Option<AdapterError>>,
    read_error: Mutex<Option<AdapterError>>,
    available: AtomicBool,
}

impl Default for FakeLedger {
    fn default() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            calls: LedgerCalls::default(),
            create_error: Mutex::new(None),
            verify_error: Mutex::new(None),
            read_error: Mutex::new(None),
            available: AtomicBool::new(true),
        }
    }
}

impl FakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a record on the "chain" directly, as if another party created it.
    pub fn seed(&self, view: RecordView, handle: Handle) {
        self.entries.lock().unwrap().push(LedgerEntry { view, handle });
    }

    pub fn fail_create(&self, error: Option<AdapterError>) {
        *self.create_error.lock().unwrap() = error;
    }

    pub fn fail_verify(&self, error: Option<AdapterError>) {
        *self.verify_error.lock().unwrap() = error;
    }

    pub fn fail_reads(&self, error: Option<AdapterError>) {
        *self.read_error.lock().unwrap() = error;
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn view(&self, id: &RecordId) -> Option<RecordView> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|e| &e.view.id == id)
            .map(|e| e.view.clone())
    }

    fn check_reads(&self) -> Result<(), AdapterError> {
        match self.read_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl LedgerGateway for FakeLedger {
    fn contract_address(&self) -> &str {
        FAKE_CONTRACT
    }

    async fn list_ids(&self) -> Result<Vec<RecordId>, AdapterError> {
        self.calls.list_ids.fetch_add(1, Ordering::SeqCst);
        self.check_reads()?;
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.view.id.clone())
            .collect())
    }

    async fn get_record(&self, id: &RecordId) -> Result<RecordView, AdapterError> {
        self.calls.get_record.fetch_add(1, Ordering::SeqCst);
        self.check_reads()?;
        self.view(id)
            .ok_or_else(|| AdapterError::NotFound(format!("Record {id}")))
    }

    async fn get_encrypted_handle(&self, id: &RecordId) -> Result<Handle, AdapterError> {
        self.calls.get_handle.fetch_add(1, Ordering::SeqCst);
        self.check_reads()?;
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|e| &e.view.id == id)
            .map(|e| e.handle)
            .ok_or_else(|| AdapterError::NotFound(format!("Record {id}")))
    }

    async fn create_record(&self, request: &CreateRecord) -> Result<LedgerReceipt, AdapterError> {
        let n = self.calls.create.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(err) = self.create_error.lock().unwrap().clone() {
            return Err(err);
        }
        let mut entries = self.entries.lock().unwrap();
        if entries.iter().any(|e| e.view.id == request.id) {
            return Err(AdapterError::Rejected("Record already exists".into()));
        }
        entries.push(LedgerEntry {
            view: RecordView {
                id: request.id.clone(),
                name: request.name.clone(),
                description: request.description.clone(),
                public_value1: request.plaintext_echo,
                public_value2: request.zone_code,
                creator: "0xsigner".into(),
                created_at: Utc::now(),
                is_verified: false,
                decrypted_value: 0,
            },
            handle: request.input.handle,
        });
        Ok(receipt(n))
    }

    async fn verify_disclosure(
        &self,
        id: &RecordId,
        abi_encoded_clear_values: &[u8],
        _proof: &Proof,
    ) -> Result<LedgerReceipt, AdapterError> {
        let n = self.calls.verify.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(err) = self.verify_error.lock().unwrap().clone() {
            return Err(err);
        }
        let value = abi_decode_value(abi_encoded_clear_values)
            .ok_or_else(|| AdapterError::Rejected("Malformed clear values".into()))?;
        let mut entries = self.entries.lock().unwrap();
        let entry = entries
            .iter_mut()
            .find(|e| &e.view.id == id)
            .ok_or_else(|| AdapterError::NotFound(format!("Record {id}")))?;
        entry.view.is_verified = true;
        entry.view.decrypted_value = value;
        Ok(receipt(n))
    }

    async fn is_available(&self) -> Result<bool, AdapterError> {
        self.check_reads()?;
        Ok(self.available.load(Ordering::SeqCst))
    }
}

// =============================================================================
// FHE engine + disclosure gateway
// =============================================================================

/// Plays both the encryption engine and the disclosure gateway, sharing one
/// handle -> plaintext vault.
pub(crate) struct FakeFhe {
    vault: Mutex<HashMap<Handle, u64>>,
    pub encrypt_calls: AtomicUsize,
    pub disclose_calls: AtomicUsize,
    encrypt_error: Mutex<Option<AdapterError>>,
    disclose_error: Mutex<Option<AdapterError>>,
    hold_disclosure: AtomicBool,
    /// Signalled when a held disclosure request has arrived.
    pub entered: Notify,
    /// Releases a held disclosure request.
    pub release: Notify,
}

impl Default for FakeFhe {
    fn default() -> Self {
        Self {
            vault: Mutex::new(HashMap::new()),
            encrypt_calls: AtomicUsize::new(0),
            disclose_calls: AtomicUsize::new(0),
            encrypt_error: Mutex::new(None),
            disclose_error: Mutex::new(None),
            hold_disclosure: AtomicBool::new(false),
            entered: Notify::new(),
            release: Notify::new(),
        }
    }
}

impl FakeFhe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remember(&self, handle: Handle, value: u64) {
        self.vault.lock().unwrap().insert(handle, value);
    }

    pub fn fail_encrypt(&self, error: Option<AdapterError>) {
        *self.encrypt_error.lock().unwrap() = error;
    }

    pub fn fail_disclose(&self, error: Option<AdapterError>) {
        *self.disclose_error.lock().unwrap() = error;
    }

    /// Make disclosure requests wait for `release` after signalling `entered`.
    pub fn hold_disclosures(&self, hold: bool) {
        self.hold_disclosure.store(hold, Ordering::SeqCst);
    }

    pub fn encrypts(&self) -> usize {
        self.encrypt_calls.load(Ordering::SeqCst)
    }

    pub fn disclosures(&self) -> usize {
        self.disclose_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EncryptionClient for FakeFhe {
    async fn encrypt(
        &self,
        _contract: &str,
        _recipient: &str,
        plaintext: u64,
    ) -> Result<EncryptedInput, AdapterError> {
        let n = self.encrypt_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(err) = self.encrypt_error.lock().unwrap().clone() {
            return Err(err);
        }
        if plaintext > u64::from(u32::MAX) {
            return Err(AdapterError::InvalidInput(format!(
                "Value {plaintext} does not fit in 32 bits"
            )));
        }
        let mut bytes = [0xfe; 32];
        bytes[24..].copy_from_slice(&(n as u64).to_be_bytes());
        let handle = Handle(bytes);
        self.remember(handle, plaintext);
        Ok(EncryptedInput {
            handle,
            proof: Proof(vec![0x01, 0x02]),
        })
    }
}

#[async_trait]
impl DisclosureGateway for FakeFhe {
    async fn request_disclosure(
        &self,
        handles: &[Handle],
        _contract: &str,
    ) -> Result<DisclosureResult, AdapterError> {
        self.disclose_calls.fetch_add(1, Ordering::SeqCst);
        if self.hold_disclosure.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        if let Some(err) = self.disclose_error.lock().unwrap().clone() {
            return Err(err);
        }
        let vault = self.vault.lock().unwrap();
        let mut clear_values = HashMap::new();
        let mut encoded = Vec::new();
        for handle in handles {
            let value = *vault
                .get(handle)
                .ok_or_else(|| AdapterError::Rejected(format!("Unknown handle {handle}")))?;
            clear_values.insert(*handle, value);
            encoded.extend(abi_encode_value(value));
        }
        Ok(DisclosureResult {
            clear_values,
            abi_encoded_clear_values: encoded,
            decryption_proof: Proof(vec![0xd0]),
        })
    }
}
