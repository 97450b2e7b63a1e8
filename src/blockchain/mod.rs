// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger integration for the confidential record registry on Sepolia.
//!
//! This module provides functionality for:
//! - Reading record entries and encrypted handles from the registry
//! - Submitting record creation and disclosure verification transactions
//! - Loading the service signer from PEM

pub mod client;
pub mod contract;
pub mod signing;
pub mod types;

pub use client::{LedgerClient, LedgerClientError};
pub use signing::signer_from_pem_file;
pub use types::*;
