// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API. All types derive `Serialize` or `Deserialize` plus
//! `ToSchema` for automatic JSON handling and OpenAPI documentation.
//!
//! ## Model Categories
//!
//! - **Records**: Submission requests and record views
//! - **Disclosure**: Verified clear values
//! - **Sync**: Ledger mirroring reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::records::{ConfidentialRecord, RecordId};
use crate::sync::SyncReport;
use crate::workflow::{Disclosure, DisclosureSource};

// =============================================================================
// Record Models
// =============================================================================

/// Request to register a new confidential reading.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateRecordRequest {
    /// Display name of the sensor reading.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Reading to encrypt. Must fit in 32 bits.
    pub value: u64,
    /// Zone the sensor is located in.
    pub zone_code: u64,
}

/// A confidential record as seen through the API.
///
/// `clear_value` is only present once the record is `verified`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct RecordResponse {
    pub id: RecordId,
    pub name: String,
    pub description: String,
    /// Cleartext echo of the submitted reading.
    pub public_value: u64,
    pub zone_code: u64,
    /// Display label derived from the zone code, e.g. `Zone 3`.
    pub location: String,
    pub creator: String,
    pub created_at: DateTime<Utc>,
    /// Ledger handle of the ciphertext, `0x`-prefixed hex.
    pub encrypted_handle: String,
    /// One of `unverified`, `disclosing`, `verified`.
    pub verification: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clear_value: Option<u64>,
}

impl From<ConfidentialRecord> for RecordResponse {
    fn from(record: ConfidentialRecord) -> Self {
        let verification = record.verification();
        Self {
            location: record.location_label(),
            id: record.id,
            name: record.name,
            description: record.description,
            public_value: record.public_value1,
            zone_code: record.public_value2,
            creator: record.creator,
            created_at: record.created_at,
            encrypted_handle: record.encrypted_handle.to_hex(),
            verification: verification.name().to_string(),
            clear_value: verification.clear_value(),
        }
    }
}

/// All records, in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordListResponse {
    pub records: Vec<RecordResponse>,
}

// =============================================================================
// Disclosure Models
// =============================================================================

/// A disclosed value whose decryption proof the ledger has accepted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DisclosureResponse {
    pub record_id: RecordId,
    pub clear_value: u64,
    /// `cached`, `ledger` or `gateway`.
    pub source: String,
}

impl From<Disclosure> for DisclosureResponse {
    fn from(disclosure: Disclosure) -> Self {
        let source = match disclosure.source {
            DisclosureSource::Cached => "cached",
            DisclosureSource::Ledger => "ledger",
            DisclosureSource::Gateway => "gateway",
        };
        Self {
            record_id: disclosure.record_id,
            clear_value: disclosure.clear_value,
            source: source.to_string(),
        }
    }
}

// =============================================================================
// Sync Models
// =============================================================================

/// Result of an on-demand ledger sync.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SyncResponse {
    #[serde(flatten)]
    pub report: SyncReport,
    /// Records in the local store after the pass.
    pub total_records: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::Handle;
    use crate::records::{RecordStore, TransitionEvent};

    fn record() -> ConfidentialRecord {
        ConfidentialRecord::new(
            RecordId::from("sensor-1"),
            "Temp-A".into(),
            "rooftop".into(),
            Handle([0xaa; 32]),
            42,
            3,
            "0xsigner".into(),
            Utc::now(),
        )
    }

    #[test]
    fn unverified_record_hides_clear_value() {
        let response = RecordResponse::from(record());
        assert_eq!(response.verification, "unverified");
        assert_eq!(response.location, "Zone 3");
        assert_eq!(response.public_value, 42);
        assert!(response.encrypted_handle.starts_with("0xaaaa"));

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("clear_value").is_none());
    }

    #[test]
    fn verified_record_exposes_clear_value() {
        let store = RecordStore::new();
        let id = RecordId::from("sensor-1");
        store.insert(record()).unwrap();
        store.transition(&id, TransitionEvent::StartDisclosure).unwrap();
        store.transition(&id, TransitionEvent::MarkVerified(42)).unwrap();

        let response = RecordResponse::from(store.get(&id).unwrap());
        assert_eq!(response.verification, "verified");
        assert_eq!(response.clear_value, Some(42));
    }

    #[test]
    fn sync_response_flattens_report() {
        let json = serde_json::to_value(SyncResponse {
            report: SyncReport {
                imported: 2,
                verified: 1,
                failed: 0,
            },
            total_records: 5,
        })
        .unwrap();
        assert_eq!(json["imported"], 2);
        assert_eq!(json["total_records"], 5);
    }
}
