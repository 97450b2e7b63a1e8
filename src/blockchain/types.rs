// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger network configuration.

/// EVM network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// Default RPC endpoint URL
    pub rpc_url: &'static str,
    /// Block explorer URL
    pub explorer_url: &'static str,
}

/// Ethereum Sepolia, where the FHE coprocessor and decryption gateway are deployed.
pub const SEPOLIA: NetworkConfig = NetworkConfig {
    name: "Ethereum Sepolia",
    chain_id: 11_155_111,
    rpc_url: "https://ethereum-sepolia-rpc.publicnode.com",
    explorer_url: "https://sepolia.etherscan.io",
};

/// Supported network identifier for this build.
pub const NETWORK_SEPOLIA: &str = "sepolia";

/// Validate a configured network name for the Sepolia-only runtime.
pub fn ensure_sepolia_network(raw: Option<&str>) -> Result<(), String> {
    let value = raw.unwrap_or(NETWORK_SEPOLIA).trim().to_ascii_lowercase();
    if value == NETWORK_SEPOLIA {
        Ok(())
    } else {
        Err(format!(
            "Only `{NETWORK_SEPOLIA}` network is supported in this deployment."
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_validation_accepts_sepolia_only() {
        assert!(ensure_sepolia_network(None).is_ok());
        assert!(ensure_sepolia_network(Some(" Sepolia ")).is_ok());
        assert!(ensure_sepolia_network(Some("mainnet")).is_err());
    }
}
