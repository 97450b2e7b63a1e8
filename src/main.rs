// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use alloy::network::EthereumWallet;
use sensegrid_server::{
    adapters::LedgerGateway,
    api::router,
    blockchain::{signer_from_pem_file, LedgerClient, SEPOLIA},
    config::{LogFormat, ServiceConfig, DEFAULT_LOG_FILTER},
    relayer::RelayerClient,
    state::AppState,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.compact().init(),
    }
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServiceConfig::from_env()?;
    init_tracing(config.log_format);

    // Ledger signer and record contract
    let signer = signer_from_pem_file(&config.signer_key_path)?;
    let creator = signer.address().to_checksum(None);
    let ledger = Arc::new(LedgerClient::new(
        SEPOLIA,
        &config.rpc_url,
        &config.contract_address,
        EthereumWallet::from(signer),
    )?);

    match ledger.get_block_number().await {
        Ok(block) => tracing::info!(
            network = ledger.network().name,
            chain_id = ledger.network().chain_id,
            contract = %ledger.contract_address(),
            block,
            "Connected to ledger"
        ),
        // Not fatal: readiness reports it until the RPC recovers.
        Err(e) => tracing::warn!(error = %e, "Ledger RPC not reachable at startup"),
    }

    // FHE relayer (encryption and disclosure gateway)
    let relayer = Arc::new(RelayerClient::new(
        &config.relayer_url,
        config.relayer_timeout,
    )?);

    let state = AppState::new(
        ledger,
        relayer.clone(),
        relayer,
        creator,
        config.sync_interval,
    );

    let shutdown = CancellationToken::new();
    let sync_task = tokio::spawn(state.sync.clone().run(shutdown.clone()));

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        "SenseGrid server listening (docs at /docs)"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    shutdown.cancel();
    sync_task.await?;
    tracing::info!("Server stopped");
    Ok(())
}
