// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LEDGER_NETWORK` | Ledger network name | `sepolia` |
//! | `LEDGER_RPC_URL` | JSON-RPC endpoint of the ledger | Sepolia public RPC |
//! | `CONTRACT_ADDRESS` | Record registry contract address | Required |
//! | `SIGNER_KEY_PATH` | PEM secp256k1 key used to sign ledger writes | Required |
//! | `RELAYER_URL` | FHE relayer base URL | `https://relayer.testnet.zama.cloud` |
//! | `RELAYER_TIMEOUT_SECS` | Relayer request timeout | `30` |
//! | `SYNC_INTERVAL_SECS` | Ledger sync poll interval | `15` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;
use std::time::Duration;

use crate::blockchain::{ensure_sepolia_network, SEPOLIA};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Ledger network name. Only `sepolia` is supported.
pub const LEDGER_NETWORK_ENV: &str = "LEDGER_NETWORK";

/// JSON-RPC endpoint. Defaults to the network's public RPC.
pub const LEDGER_RPC_URL_ENV: &str = "LEDGER_RPC_URL";

/// Address of the deployed record registry.
pub const CONTRACT_ADDRESS_ENV: &str = "CONTRACT_ADDRESS";

/// Path to the PEM file (SEC1 or PKCS#8) holding the ledger signer key.
///
/// The signer pays for record creation and disclosure verification.
pub const SIGNER_KEY_PATH_ENV: &str = "SIGNER_KEY_PATH";

pub const RELAYER_URL_ENV: &str = "RELAYER_URL";
pub const RELAYER_TIMEOUT_SECS_ENV: &str = "RELAYER_TIMEOUT_SECS";
pub const SYNC_INTERVAL_SECS_ENV: &str = "SYNC_INTERVAL_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_RELAYER_URL: &str = "https://relayer.testnet.zama.cloud";
pub const DEFAULT_RELAYER_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 15;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Service configuration resolved at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub rpc_url: String,
    pub contract_address: String,
    pub signer_key_path: PathBuf,
    pub relayer_url: String,
    pub relayer_timeout: Duration,
    pub sync_interval: Duration,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ServiceConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset.
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        ensure_sepolia_network(get(LEDGER_NETWORK_ENV).as_deref()).map_err(|reason| {
            ConfigError::Invalid {
                var: LEDGER_NETWORK_ENV,
                reason,
            }
        })?;

        let port = match get(PORT_ENV) {
            Some(raw) => parse_number(PORT_ENV, &raw)?,
            None => DEFAULT_PORT,
        };

        let relayer_timeout_secs = match get(RELAYER_TIMEOUT_SECS_ENV) {
            Some(raw) => parse_number(RELAYER_TIMEOUT_SECS_ENV, &raw)?,
            None => DEFAULT_RELAYER_TIMEOUT_SECS,
        };
        let sync_interval_secs = match get(SYNC_INTERVAL_SECS_ENV) {
            Some(raw) => parse_number(SYNC_INTERVAL_SECS_ENV, &raw)?,
            None => DEFAULT_SYNC_INTERVAL_SECS,
        };
        for (var, secs) in [
            (RELAYER_TIMEOUT_SECS_ENV, relayer_timeout_secs),
            (SYNC_INTERVAL_SECS_ENV, sync_interval_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    var,
                    reason: "must be at least 1 second".into(),
                });
            }
        }

        let log_format = match get(LOG_FORMAT_ENV).map(|v| v.to_ascii_lowercase()).as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: LOG_FORMAT_ENV,
                    reason: format!("expected `json` or `pretty`, got `{other}`"),
                })
            }
        };

        Ok(Self {
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            rpc_url: get(LEDGER_RPC_URL_ENV).unwrap_or_else(|| SEPOLIA.rpc_url.to_string()),
            contract_address: get(CONTRACT_ADDRESS_ENV)
                .ok_or(ConfigError::Missing(CONTRACT_ADDRESS_ENV))?,
            signer_key_path: get(SIGNER_KEY_PATH_ENV)
                .map(PathBuf::from)
                .ok_or(ConfigError::Missing(SIGNER_KEY_PATH_ENV))?,
            relayer_url: get(RELAYER_URL_ENV).unwrap_or_else(|| DEFAULT_RELAYER_URL.to_string()),
            relayer_timeout: Duration::from_secs(relayer_timeout_secs),
            sync_interval: Duration::from_secs(sync_interval_secs),
            log_format,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_number<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServiceConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServiceConfig::from_lookup(|name| map.get(name).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        (CONTRACT_ADDRESS_ENV, "0x00000000000000000000000000000000000000c0"),
        (SIGNER_KEY_PATH_ENV, "/run/secrets/signer.pem"),
    ];

    #[test]
    fn defaults_apply_when_only_required_vars_are_set() {
        let config = load(&REQUIRED).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.rpc_url, SEPOLIA.rpc_url);
        assert_eq!(config.relayer_url, DEFAULT_RELAYER_URL);
        assert_eq!(config.relayer_timeout, Duration::from_secs(30));
        assert_eq!(config.sync_interval, Duration::from_secs(15));
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.signer_key_path, PathBuf::from("/run/secrets/signer.pem"));
    }

    #[test]
    fn missing_required_vars_are_reported_by_name() {
        assert_eq!(
            load(&REQUIRED[1..]).unwrap_err(),
            ConfigError::Missing(CONTRACT_ADDRESS_ENV)
        );
        // Blank is the same as unset.
        let blank = [REQUIRED[0], (SIGNER_KEY_PATH_ENV, "  ")];
        assert_eq!(
            load(&blank).unwrap_err(),
            ConfigError::Missing(SIGNER_KEY_PATH_ENV)
        );
    }

    #[test]
    fn overrides_are_parsed() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            (PORT_ENV, "9000"),
            (LOG_FORMAT_ENV, "JSON"),
            (SYNC_INTERVAL_SECS_ENV, "60"),
            (LEDGER_NETWORK_ENV, "Sepolia"),
        ]);
        let config = load(&vars).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.sync_interval, Duration::from_secs(60));
    }

    #[test]
    fn invalid_values_are_rejected() {
        for (var, value) in [
            (PORT_ENV, "eighty"),
            (LOG_FORMAT_ENV, "xml"),
            (RELAYER_TIMEOUT_SECS_ENV, "0"),
            (LEDGER_NETWORK_ENV, "mainnet"),
        ] {
            let mut vars = REQUIRED.to_vec();
            vars.push((var, value));
            assert!(
                matches!(load(&vars), Err(ConfigError::Invalid { var: v, .. }) if v == var),
                "{var}={value} should be rejected"
            );
        }
    }
}
