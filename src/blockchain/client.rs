// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger client for the record registry contract.

use std::str::FromStr;

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, Bytes, FixedBytes, U256},
    providers::{
        fillers::{
            BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
            WalletFiller,
        },
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    rpc::types::TransactionReceipt,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::contract::ISensorRegistry;
use super::types::NetworkConfig;
use crate::adapters::{
    AdapterError, CreateRecord, Handle, LedgerGateway, LedgerReceipt, Proof, RecordView,
};
use crate::records::RecordId;

/// HTTP provider with all fillers plus the service wallet.
type SigningProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider<Ethereum>,
>;

type Registry = ISensorRegistry::ISensorRegistryInstance<SigningProvider>;

/// Record registry client.
pub struct LedgerClient {
    /// Network configuration
    network: NetworkConfig,
    /// Checksummed contract address, used as encryption/disclosure context
    contract_address: String,
    /// Contract binding over the signing provider
    registry: Registry,
}

impl LedgerClient {
    /// Create a client for the registry at `contract_address`.
    pub fn new(
        network: NetworkConfig,
        rpc_url: &str,
        contract_address: &str,
        wallet: EthereumWallet,
    ) -> Result<Self, LedgerClientError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| LedgerClientError::InvalidRpcUrl(e.to_string()))?;
        let address = Address::from_str(contract_address)
            .map_err(|e| LedgerClientError::InvalidAddress(e.to_string()))?;

        let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);
        let registry = ISensorRegistry::new(address, provider);

        Ok(Self {
            network,
            contract_address: address.to_checksum(None),
            registry,
        })
    }

    /// Get the network configuration.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Get the current block number.
    pub async fn get_block_number(&self) -> Result<u64, LedgerClientError> {
        self.registry
            .provider()
            .get_block_number()
            .await
            .map_err(|e| LedgerClientError::RpcError(e.to_string()))
    }

    fn explorer_tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.network.explorer_url, tx_hash)
    }

    /// Map a mined receipt to a ledger receipt, treating a revert as rejection.
    fn settle(&self, receipt: TransactionReceipt) -> Result<LedgerReceipt, AdapterError> {
        let tx_hash = format!("{:#x}", receipt.transaction_hash);
        if !receipt.status() {
            return Err(AdapterError::Rejected(format!(
                "Transaction reverted: {}",
                self.explorer_tx_url(&tx_hash)
            )));
        }
        Ok(LedgerReceipt {
            tx_hash,
            block_number: receipt.block_number,
        })
    }
}

#[async_trait]
impl LedgerGateway for LedgerClient {
    fn contract_address(&self) -> &str {
        &self.contract_address
    }

    async fn list_ids(&self) -> Result<Vec<RecordId>, AdapterError> {
        let ids = self
            .registry
            .getAllBusinessIds()
            .call()
            .await
            .map_err(|e| LedgerClientError::ContractError(e.to_string()))?;
        Ok(ids.into_iter().map(RecordId::from).collect())
    }

    async fn get_record(&self, id: &RecordId) -> Result<RecordView, AdapterError> {
        let data = self
            .registry
            .getBusinessData(id.0.clone())
            .call()
            .await
            .map_err(|e| LedgerClientError::ContractError(e.to_string()))?;

        // The registry returns a zeroed entry for unknown ids.
        if data.creator == Address::ZERO {
            return Err(AdapterError::NotFound(format!("Record {id}")));
        }

        Ok(RecordView {
            id: id.clone(),
            name: data.name,
            description: data.description,
            public_value1: data.publicValue1.saturating_to::<u64>(),
            public_value2: data.publicValue2.saturating_to::<u64>(),
            creator: data.creator.to_checksum(None),
            created_at: timestamp_to_datetime(data.timestamp),
            is_verified: data.isVerified,
            decrypted_value: u64::from(data.decryptedValue),
        })
    }

    async fn get_encrypted_handle(&self, id: &RecordId) -> Result<Handle, AdapterError> {
        let handle: FixedBytes<32> = self
            .registry
            .getEncryptedValue(id.0.clone())
            .call()
            .await
            .map_err(|e| LedgerClientError::ContractError(e.to_string()))?;
        if handle == FixedBytes::ZERO {
            return Err(AdapterError::NotFound(format!("Handle for record {id}")));
        }
        Ok(Handle(handle.0))
    }

    async fn create_record(&self, request: &CreateRecord) -> Result<LedgerReceipt, AdapterError> {
        let pending = self
            .registry
            .createBusinessData(
                request.id.0.clone(),
                request.name.clone(),
                FixedBytes::from(request.input.handle.0),
                Bytes::from(request.input.proof.0.clone()),
                U256::from(request.plaintext_echo),
                U256::from(request.zone_code),
                request.description.clone(),
            )
            .send()
            .await
            .map_err(|e| LedgerClientError::TransactionFailed(format!("Failed to send: {}", e)))?;

        tracing::debug!(record_id = %request.id, tx_hash = %pending.tx_hash(), "Create submitted");

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| LedgerClientError::RpcError(format!("Failed to get receipt: {}", e)))?;
        self.settle(receipt)
    }

    async fn verify_disclosure(
        &self,
        id: &RecordId,
        abi_encoded_clear_values: &[u8],
        proof: &Proof,
    ) -> Result<LedgerReceipt, AdapterError> {
        let pending = self
            .registry
            .verifyDecryption(
                id.0.clone(),
                Bytes::copy_from_slice(abi_encoded_clear_values),
                Bytes::from(proof.0.clone()),
            )
            .send()
            .await
            .map_err(|e| LedgerClientError::TransactionFailed(format!("Failed to send: {}", e)))?;

        tracing::debug!(record_id = %id, tx_hash = %pending.tx_hash(), "Verification submitted");

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| LedgerClientError::RpcError(format!("Failed to get receipt: {}", e)))?;
        self.settle(receipt)
    }

    async fn is_available(&self) -> Result<bool, AdapterError> {
        let available = self
            .registry
            .isAvailable()
            .call()
            .await
            .map_err(|e| LedgerClientError::ContractError(e.to_string()))?;
        Ok(available)
    }
}

/// Convert a unix-seconds contract timestamp, clamping out-of-range values.
fn timestamp_to_datetime(timestamp: U256) -> DateTime<Utc> {
    let secs = i64::try_from(timestamp.saturating_to::<u64>()).unwrap_or(i64::MAX);
    DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Errors that can occur during ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerClientError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Contract error: {0}")]
    ContractError(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
}

impl From<LedgerClientError> for AdapterError {
    fn from(e: LedgerClientError) -> Self {
        match e {
            LedgerClientError::RpcError(_) => AdapterError::Unavailable(e.to_string()),
            LedgerClientError::InvalidRpcUrl(_)
            | LedgerClientError::InvalidAddress(_)
            | LedgerClientError::InvalidPrivateKey(_) => AdapterError::InvalidInput(e.to_string()),
            // Reverts surface as contract/send errors; transport failures do too.
            LedgerClientError::ContractError(ref msg) | LedgerClientError::TransactionFailed(ref msg) => {
                if is_transport_failure(msg) {
                    AdapterError::Unavailable(e.to_string())
                } else {
                    AdapterError::Rejected(e.to_string())
                }
            }
        }
    }
}

fn is_transport_failure(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    ["error sending request", "connection", "timed out", "timeout", "transport"]
        .iter()
        .any(|needle| lower.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_conversion() {
        let dt = timestamp_to_datetime(U256::from(1_700_000_000u64));
        assert_eq!(dt.timestamp(), 1_700_000_000);

        // Absurd values clamp instead of panicking
        let far = timestamp_to_datetime(U256::MAX);
        assert_eq!(far, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_error_classification() {
        let down: AdapterError =
            LedgerClientError::ContractError("error sending request for url".into()).into();
        assert!(down.is_unavailable());

        let reverted: AdapterError =
            LedgerClientError::TransactionFailed("execution reverted: already verified".into())
                .into();
        assert!(matches!(reverted, AdapterError::Rejected(_)));

        let rpc: AdapterError = LedgerClientError::RpcError("receipt timeout".into()).into();
        assert!(rpc.is_unavailable());
    }

    #[test]
    fn test_client_rejects_bad_configuration() {
        let wallet = EthereumWallet::from(
            alloy::signers::local::PrivateKeySigner::from_slice(&[0x11; 32]).unwrap(),
        );
        let bad_url = LedgerClient::new(
            crate::blockchain::SEPOLIA,
            "not a url",
            "0x0000000000000000000000000000000000000001",
            wallet.clone(),
        );
        assert!(matches!(bad_url, Err(LedgerClientError::InvalidRpcUrl(_))));

        let bad_addr = LedgerClient::new(
            crate::blockchain::SEPOLIA,
            "https://ethereum-sepolia-rpc.publicnode.com",
            "0x1234",
            wallet,
        );
        assert!(matches!(bad_addr, Err(LedgerClientError::InvalidAddress(_))));
    }
}
