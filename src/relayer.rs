// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # FHE Relayer Client
//!
//! HTTP client for the relayer that fronts the FHE engine and the decryption
//! gateway. One client implements both [`EncryptionClient`] and
//! [`DisclosureGateway`].
//!
//! ## Endpoints
//!
//! | Operation | Request | Response |
//! |-----------|---------|----------|
//! | Encrypt | `POST /v1/input-proof` | `{handle, inputProof}` |
//! | Disclose | `POST /v1/public-decrypt` | `{clearValues, abiEncodedClearValues, decryptionProof}` |
//!
//! Byte fields travel as `0x`-prefixed hex. Clear values may be decimal
//! strings, hex strings or JSON numbers.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::adapters::{
    AdapterError, DisclosureGateway, DisclosureResult, EncryptedInput, EncryptionClient, Handle,
    Proof,
};

/// Width of the encrypted integer type used for sensor values.
pub const VALUE_BITS: u32 = 32;

const INPUT_PROOF_PATH: &str = "/v1/input-proof";
const PUBLIC_DECRYPT_PATH: &str = "/v1/public-decrypt";

#[derive(Debug, thiserror::Error)]
pub enum RelayerError {
    #[error("Invalid relayer URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputProofRequest<'a> {
    contract_address: &'a str,
    user_address: &'a str,
    value: String,
    bits: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InputProofResponse {
    handle: String,
    input_proof: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PublicDecryptRequest<'a> {
    ciphertext_handles: Vec<String>,
    contract_address: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublicDecryptResponse {
    clear_values: HashMap<String, Value>,
    abi_encoded_clear_values: String,
    decryption_proof: String,
}

/// Relayer HTTP client.
pub struct RelayerClient {
    base_url: String,
    http: Client,
}

impl RelayerClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RelayerError> {
        let parsed: url::Url = base_url
            .parse()
            .map_err(|e: url::ParseError| RelayerError::InvalidUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RelayerError::InvalidUrl(format!(
                "unsupported scheme `{}`",
                parsed.scheme()
            )));
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayerError::Client(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, AdapterError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(|e| AdapterError::Unavailable(format!("POST {path} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(path, %status, "Relayer returned an error");
            return Err(classify_status(path, status, &body));
        }

        response
            .json()
            .await
            .map_err(|e| AdapterError::Rejected(format!("POST {path} invalid JSON: {e}")))
    }
}

#[async_trait]
impl EncryptionClient for RelayerClient {
    async fn encrypt(
        &self,
        contract: &str,
        recipient: &str,
        plaintext: u64,
    ) -> Result<EncryptedInput, AdapterError> {
        check_value_range(plaintext)?;

        let request = InputProofRequest {
            contract_address: contract,
            user_address: recipient,
            value: plaintext.to_string(),
            bits: VALUE_BITS,
        };
        let response: InputProofResponse = self.post_json(INPUT_PROOF_PATH, &request).await?;
        let input = parse_input_proof(response)?;

        tracing::debug!(handle = %input.handle, "Encrypted input created");
        Ok(input)
    }
}

#[async_trait]
impl DisclosureGateway for RelayerClient {
    async fn request_disclosure(
        &self,
        handles: &[Handle],
        contract: &str,
    ) -> Result<DisclosureResult, AdapterError> {
        let request = PublicDecryptRequest {
            ciphertext_handles: handles.iter().map(Handle::to_hex).collect(),
            contract_address: contract,
        };
        let response: PublicDecryptResponse =
            self.post_json(PUBLIC_DECRYPT_PATH, &request).await?;
        parse_public_decrypt(response)
    }
}

fn check_value_range(plaintext: u64) -> Result<(), AdapterError> {
    if plaintext > u64::from(u32::MAX) {
        return Err(AdapterError::InvalidInput(format!(
            "Value {plaintext} does not fit in {VALUE_BITS} bits"
        )));
    }
    Ok(())
}

fn classify_status(path: &str, status: StatusCode, body: &str) -> AdapterError {
    let message = format!("POST {path} returned {status}: {body}");
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        AdapterError::Unavailable(message)
    } else if status == StatusCode::NOT_FOUND {
        AdapterError::NotFound(message)
    } else if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
        AdapterError::InvalidInput(message)
    } else {
        AdapterError::Rejected(message)
    }
}

fn decode_bytes(field: &str, raw: &str) -> Result<Vec<u8>, AdapterError> {
    alloy::hex::decode(raw).map_err(|e| AdapterError::Rejected(format!("Invalid {field} hex: {e}")))
}

fn parse_input_proof(response: InputProofResponse) -> Result<EncryptedInput, AdapterError> {
    Ok(EncryptedInput {
        handle: Handle::from_hex(&response.handle)?,
        proof: Proof(decode_bytes("inputProof", &response.input_proof)?),
    })
}

fn parse_clear_value(raw: &Value) -> Result<u64, AdapterError> {
    let parsed = match raw {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => match s.strip_prefix("0x") {
            Some(hex) => u64::from_str_radix(hex, 16).ok(),
            None => s.parse::<u64>().ok(),
        },
        _ => None,
    };
    parsed.ok_or_else(|| AdapterError::Rejected(format!("Invalid clear value: {raw}")))
}

fn parse_public_decrypt(response: PublicDecryptResponse) -> Result<DisclosureResult, AdapterError> {
    let clear_values = response
        .clear_values
        .iter()
        .map(|(handle, value)| Ok((Handle::from_hex(handle)?, parse_clear_value(value)?)))
        .collect::<Result<HashMap<_, _>, AdapterError>>()?;

    Ok(DisclosureResult {
        clear_values,
        abi_encoded_clear_values: decode_bytes(
            "abiEncodedClearValues",
            &response.abi_encoded_clear_values,
        )?,
        decryption_proof: Proof(decode_bytes("decryptionProof", &response.decryption_proof)?),
    })
}
