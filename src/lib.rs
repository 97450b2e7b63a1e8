// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! SenseGrid - Confidential Sensor Record Service
//!
//! This crate registers FHE-encrypted sensor readings on an EVM ledger and
//! discloses them through a gateway proof that the ledger verifies on-chain.
//!
//! ## Modules
//!
//! - `records` - Record entity, verification state machine and store
//! - `workflow` - Submission and verified disclosure workflows
//! - `aggregation` - Summary statistics over the store
//! - `adapters` - Traits for the ledger, FHE engine and disclosure gateway
//! - `blockchain` - Ledger adapter over the record registry contract
//! - `relayer` - FHE relayer adapter (encryption and disclosure)
//! - `sync` - Background ledger mirroring
//! - `api` - HTTP API handlers (Axum)

pub mod adapters;
pub mod aggregation;
pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod models;
pub mod records;
pub mod relayer;
pub mod state;
pub mod sync;
pub mod workflow;
