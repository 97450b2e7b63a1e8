// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger transaction signer loading.
//!
//! The service signs record-creation and disclosure-verification transactions
//! with a secp256k1 key stored on disk in SEC1 or PKCS#8 PEM format.

use std::path::Path;

use alloy::signers::local::PrivateKeySigner;
use k256::SecretKey;

use super::client::LedgerClientError;

/// Parse a private key from PEM format to hex string.
///
/// # Arguments
/// * `pem_bytes` - The PEM-encoded private key bytes
///
/// # Returns
/// * `Ok(String)` - Hex-encoded private key (64 characters, no 0x prefix)
/// * `Err(LedgerClientError)` - If PEM parsing fails
pub fn pem_to_hex(pem_bytes: &[u8]) -> Result<String, LedgerClientError> {
    let pem_str = std::str::from_utf8(pem_bytes)
        .map_err(|e| LedgerClientError::InvalidPrivateKey(format!("Invalid UTF-8: {}", e)))?;

    let pem = pem::parse(pem_str)
        .map_err(|e| LedgerClientError::InvalidPrivateKey(format!("Invalid PEM: {}", e)))?;

    let secret_key = SecretKey::from_sec1_der(pem.contents())
        .or_else(|_| parse_pkcs8_to_secret_key(pem.contents()))
        .map_err(|e| LedgerClientError::InvalidPrivateKey(format!("Invalid key format: {}", e)))?;

    Ok(alloy::hex::encode(secret_key.to_bytes()))
}

fn parse_pkcs8_to_secret_key(der: &[u8]) -> Result<SecretKey, String> {
    use k256::pkcs8::DecodePrivateKey;
    SecretKey::from_pkcs8_der(der).map_err(|e| e.to_string())
}

/// Create a signer from a hex private key (no 0x prefix).
pub fn signer_from_hex(private_key_hex: &str) -> Result<PrivateKeySigner, LedgerClientError> {
    let key_bytes = alloy::hex::decode(private_key_hex)
        .map_err(|e| LedgerClientError::InvalidPrivateKey(e.to_string()))?;

    PrivateKeySigner::from_slice(&key_bytes)
        .map_err(|e| LedgerClientError::InvalidPrivateKey(e.to_string()))
}

/// Create a signer from PEM-encoded private key bytes.
pub fn signer_from_pem(pem_bytes: &[u8]) -> Result<PrivateKeySigner, LedgerClientError> {
    let hex_key = pem_to_hex(pem_bytes)?;
    signer_from_hex(&hex_key)
}

/// Load the service signer from a PEM file.
pub fn signer_from_pem_file(path: &Path) -> Result<PrivateKeySigner, LedgerClientError> {
    let pem_bytes = std::fs::read(path).map_err(|e| {
        LedgerClientError::InvalidPrivateKey(format!("Cannot read {}: {}", path.display(), e))
    })?;
    let signer = signer_from_pem(&pem_bytes)?;
    tracing::info!(address = %signer.address(), "Loaded ledger signer");
    Ok(signer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::pkcs8::{EncodePrivateKey, LineEnding};

    const SCALAR: [u8; 32] = [0x11; 32];

    fn test_pem() -> String {
        SecretKey::from_slice(&SCALAR)
            .unwrap()
            .to_pkcs8_pem(LineEnding::LF)
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_pem_to_hex() {
        let hex = pem_to_hex(test_pem().as_bytes()).unwrap();
        assert_eq!(hex, "11".repeat(32));
    }

    #[test]
    fn test_signer_from_pem_matches_raw_key() {
        let from_pem = signer_from_pem(test_pem().as_bytes()).unwrap();
        let from_raw = PrivateKeySigner::from_slice(&SCALAR).unwrap();
        assert_eq!(from_pem.address(), from_raw.address());
    }

    #[test]
    fn test_invalid_pem_is_rejected() {
        let err = signer_from_pem(b"not a pem").unwrap_err();
        assert!(matches!(err, LedgerClientError::InvalidPrivateKey(_)));
    }

    #[test]
    fn test_missing_key_file() {
        let err = signer_from_pem_file(Path::new("/nonexistent/signer.pem")).unwrap_err();
        assert!(matches!(err, LedgerClientError::InvalidPrivateKey(_)));
    }
}
