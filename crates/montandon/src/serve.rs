// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `montandon serve` command implementation.
//!
//! Opens SQLite storage, recovers campaigns interrupted by a previous
//! process, wires the Apify search and Evolution messaging adapters into the
//! campaign dispatcher and HTTP API, and serves until SIGINT/SIGTERM.

use std::sync::Arc;

use montandon_apify::ApifySearch;
use montandon_campaign::{CampaignDispatcher, DispatchConfig};
use montandon_config::MontandonConfig;
use montandon_core::{
    HealthStatus, MessageGateway, MontandonError, PhoneNormalizer, PluginAdapter, SearchGateway,
    StorageAdapter,
};
use montandon_evolution::EvolutionGateway;
use montandon_gateway::{AppState, start_server};
use montandon_storage::SqliteStorage;
use tracing::{error, info, warn};

use crate::shutdown;

/// Runs the `montandon serve` command.
pub async fn run_serve(config: MontandonConfig) -> Result<(), MontandonError> {
    init_tracing(&config.server.log_level);

    info!("starting montandon serve");

    let storage: Arc<dyn StorageAdapter> = {
        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        Arc::new(storage)
    };

    recover_interrupted_campaigns(storage.as_ref()).await?;

    let search = ApifySearch::new(&config)?;
    log_health(&search).await;
    let search: Arc<dyn SearchGateway> = Arc::new(search);

    let messaging = EvolutionGateway::new(&config.evolution)?;
    log_health(&messaging).await;
    let messaging: Arc<dyn MessageGateway> = Arc::new(messaging);

    let dispatch_config = DispatchConfig::from_config(&config);
    info!(
        send_delay_secs = dispatch_config.send_delay.as_secs(),
        typing_delay_ms = dispatch_config.typing_delay_ms,
        "campaign dispatcher ready"
    );
    let dispatcher =
        CampaignDispatcher::new(Arc::clone(&storage), Arc::clone(&messaging), dispatch_config);

    let state = AppState::new(
        Arc::clone(&storage),
        search,
        messaging,
        dispatcher,
        PhoneNormalizer::new(config.phone.default_country_code.clone()),
    );

    let cancel = shutdown::install_signal_handler();
    let served = start_server(&config.server, state, cancel).await;

    // In-flight campaigns are not drained; the next start marks them ERROR.
    if let Err(e) = storage.close().await {
        error!(error = %e, "failed to checkpoint storage on shutdown");
    }
    served?;

    info!("montandon serve shutdown complete");
    Ok(())
}

/// Marks campaigns left `RUNNING` by a previous process as `ERROR`.
async fn recover_interrupted_campaigns(storage: &dyn StorageAdapter) -> Result<(), MontandonError> {
    let failed = storage.fail_running_campaigns().await?;
    if failed > 0 {
        warn!(count = failed, "marked interrupted campaigns as ERROR");
    }
    Ok(())
}

/// Logs an adapter's startup health. Never fatal: the server still starts so
/// the operator can inspect `/health`.
async fn log_health(adapter: &dyn PluginAdapter) {
    match adapter.health_check().await {
        Ok(HealthStatus::Healthy) => info!(adapter = adapter.name(), "adapter healthy"),
        Ok(HealthStatus::Degraded(reason)) => {
            warn!(adapter = adapter.name(), reason = %reason, "adapter degraded")
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            warn!(adapter = adapter.name(), reason = %reason, "adapter unhealthy")
        }
        Err(e) => warn!(adapter = adapter.name(), error = %e, "adapter health check failed"),
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("montandon={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
