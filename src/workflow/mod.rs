// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Record lifecycle workflows.
//!
//! - `submission` - encrypt a reading and register it on the ledger
//! - `disclosure` - reveal a hidden reading through gateway proof plus
//!   on-chain verification
//!
//! Each call reports exactly one outcome and never retries internally.

pub mod disclosure;
pub mod submission;

pub use disclosure::{Disclosure, DisclosureError, DisclosureSource, DisclosureWorkflow};
pub use submission::{NewReading, SubmissionError, SubmissionWorkflow};
