// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Record Store
//!
//! In-memory mirror of the confidential records held by the ledger. The store
//! owns every [`ConfidentialRecord`]; callers receive clones and change the
//! verification state only through [`RecordStore::transition`].
//!
//! ## Verification State Machine
//!
//! ```text
//! Unverified --StartDisclosure--> Disclosing --MarkVerified(v)--> Verified(v)
//!      ^                              |
//!      +-------RevertDisclosure-------+
//! ```

pub mod record;
pub mod store;

pub use record::{ConfidentialRecord, RecordId, TransitionEvent, VerificationState};
pub use store::RecordStore;

/// Record store contract violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(RecordId),

    #[error("Record already exists: {0}")]
    DuplicateId(RecordId),

    #[error("Illegal transition for record {id}: {event} from {from}")]
    IllegalTransition {
        id: RecordId,
        from: &'static str,
        event: &'static str,
    },

    #[error("Disclosure already in flight for record {0}")]
    AlreadyInFlight(RecordId),
}
