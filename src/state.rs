// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;
use std::time::Duration;

use crate::adapters::{DisclosureGateway, EncryptionClient, LedgerGateway};
use crate::records::RecordStore;
use crate::sync::LedgerSync;
use crate::workflow::{DisclosureWorkflow, SubmissionWorkflow};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RecordStore>,
    pub ledger: Arc<dyn LedgerGateway>,
    pub submission: Arc<SubmissionWorkflow>,
    pub disclosure: Arc<DisclosureWorkflow>,
    pub sync: Arc<LedgerSync>,
    /// Address of the ledger signer; recorded as creator and used as the
    /// encryption recipient.
    pub creator: String,
}

impl AppState {
    /// Wire the workflows around one shared store.
    pub fn new(
        ledger: Arc<dyn LedgerGateway>,
        encryption: Arc<dyn EncryptionClient>,
        gateway: Arc<dyn DisclosureGateway>,
        creator: String,
        sync_interval: Duration,
    ) -> Self {
        let store = Arc::new(RecordStore::new());
        Self {
            submission: Arc::new(SubmissionWorkflow::new(
                store.clone(),
                encryption,
                ledger.clone(),
            )),
            disclosure: Arc::new(DisclosureWorkflow::new(
                store.clone(),
                ledger.clone(),
                gateway,
            )),
            sync: Arc::new(
                LedgerSync::new(store.clone(), ledger.clone()).with_interval(sync_interval),
            ),
            store,
            ledger,
            creator,
        }
    }
}
