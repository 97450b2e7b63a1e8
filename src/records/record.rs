// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Confidential record entity and its verification state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::StoreError;
use crate::adapters::Handle;

// =============================================================================
// Record Identifier
// =============================================================================

/// Opaque record identifier.
///
/// Generated identifiers have the form `sensor-<unix-millis>-<suffix>` where
/// the suffix is eight random hex characters.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(pub String);

impl RecordId {
    /// Derive a fresh identifier from the creation time plus a random suffix.
    pub fn generate(now: DateTime<Utc>) -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        RecordId(format!("sensor-{}-{}", now.timestamp_millis(), &suffix[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        RecordId(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId(value.to_string())
    }
}

// =============================================================================
// Verification State
// =============================================================================

/// Lifecycle state of a record's hidden value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerificationState {
    /// Value is hidden; no disclosure in flight.
    #[default]
    Unverified,
    /// A disclosure is in flight.
    Disclosing,
    /// The value was disclosed and its proof accepted on-chain. Terminal.
    Verified { clear_value: u64 },
}

impl VerificationState {
    pub fn name(&self) -> &'static str {
        match self {
            VerificationState::Unverified => "unverified",
            VerificationState::Disclosing => "disclosing",
            VerificationState::Verified { .. } => "verified",
        }
    }

    pub fn clear_value(&self) -> Option<u64> {
        match self {
            VerificationState::Verified { clear_value } => Some(*clear_value),
            _ => None,
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationState::Verified { .. })
    }
}

/// The three legal edges of the verification state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEvent {
    /// `Unverified -> Disclosing`
    StartDisclosure,
    /// `Disclosing -> Unverified`
    RevertDisclosure,
    /// `Disclosing -> Verified(value)`
    MarkVerified(u64),
}

impl TransitionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TransitionEvent::StartDisclosure => "start_disclosure",
            TransitionEvent::RevertDisclosure => "revert_disclosure",
            TransitionEvent::MarkVerified(_) => "mark_verified",
        }
    }
}

// =============================================================================
// Confidential Record
// =============================================================================

/// One registered sensor reading.
///
/// Everything except the verification state is fixed at creation. The
/// verification state can only be changed by the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfidentialRecord {
    pub id: RecordId,
    pub name: String,
    pub description: String,
    /// Ledger reference to the ciphertext of the hidden reading.
    pub encrypted_handle: Handle,
    /// Cleartext echo of the submitted reading.
    pub public_value1: u64,
    /// Zone code.
    pub public_value2: u64,
    pub creator: String,
    pub created_at: DateTime<Utc>,
    verification: VerificationState,
}

impl ConfidentialRecord {
    /// Create a new record in the `Unverified` state.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: RecordId,
        name: String,
        description: String,
        encrypted_handle: Handle,
        public_value1: u64,
        public_value2: u64,
        creator: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            encrypted_handle,
            public_value1,
            public_value2,
            creator,
            created_at,
            verification: VerificationState::Unverified,
        }
    }

    pub fn verification(&self) -> VerificationState {
        self.verification
    }

    /// Display label derived from the zone code.
    pub fn location_label(&self) -> String {
        format!("Zone {}", self.public_value2)
    }

    /// Apply one edge of the state machine in place.
    pub(super) fn apply(&mut self, event: TransitionEvent) -> Result<VerificationState, StoreError> {
        let next = match (self.verification, event) {
            (VerificationState::Unverified, TransitionEvent::StartDisclosure) => {
                VerificationState::Disclosing
            }
            (VerificationState::Disclosing, TransitionEvent::StartDisclosure) => {
                return Err(StoreError::AlreadyInFlight(self.id.clone()));
            }
            (VerificationState::Disclosing, TransitionEvent::RevertDisclosure) => {
                VerificationState::Unverified
            }
            (VerificationState::Disclosing, TransitionEvent::MarkVerified(clear_value)) => {
                VerificationState::Verified { clear_value }
            }
            (from, event) => {
                return Err(StoreError::IllegalTransition {
                    id: self.id.clone(),
                    from: from.name(),
                    event: event.name(),
                });
            }
        };
        self.verification = next;
        Ok(next)
    }
}
