// src/server/initialization.rs

//! The composition root: turns configuration into concrete collaborators.

use crate::config::{Config, ErrorTrackingMode, LiveConfig, ServiceMode};
use crate::core::delta::{DeltaStorageService, HttpDeltaStorage, InMemoryDeltaStorage, ReplayWindow};
use crate::core::service::{
    self, DeltaTransport, DisabledErrorTracker, DocumentService, ErrorTracker,
    LiveServiceOptions, LoggingErrorTracker,
};
use anyhow::{Context, Result, anyhow};
use std::sync::Arc;
use tracing::info;

pub fn build_error_tracker(mode: ErrorTrackingMode) -> Arc<dyn ErrorTracker> {
    match mode {
        ErrorTrackingMode::Log => Arc::new(LoggingErrorTracker),
        ErrorTrackingMode::Disabled => Arc::new(DisabledErrorTracker),
    }
}

pub fn build_live_options(config: &LiveConfig) -> LiveServiceOptions {
    LiveServiceOptions {
        error_tracker: build_error_tracker(config.error_tracking),
        disable_cache: config.disable_cache,
        historian_api: config.historian_api,
        credentials: config.credentials.clone(),
    }
}

/// The log store a replay reads from: a local JSON log when one is configured,
/// the delta endpoint otherwise.
pub fn build_replay_storage(config: &Config) -> Result<Arc<dyn DeltaStorageService>> {
    match &config.replay.log_file {
        Some(path) => {
            info!("Replaying from local log file '{}'", path);
            let storage = InMemoryDeltaStorage::from_json_file(
                &config.document.tenant_id,
                &config.document.document_id,
                path,
            )
            .with_context(|| format!("Failed to load replay log from '{path}'"))?;
            let storage: Arc<dyn DeltaStorageService> = Arc::new(storage);
            Ok(storage)
        }
        None => {
            info!("Replaying from delta endpoint {}", config.service.delta_url);
            let storage: Arc<dyn DeltaStorageService> =
                Arc::new(HttpDeltaStorage::new(&config.service.delta_url)?);
            Ok(storage)
        }
    }
}

/// Builds the configured document service. A live service needs a transport;
/// there is none built into this crate, so callers supply one.
pub fn build_document_service(
    config: &Config,
    transport: Option<Arc<dyn DeltaTransport>>,
) -> Result<Arc<dyn DocumentService>> {
    match config.service.mode {
        ServiceMode::Replay => {
            let storage = build_replay_storage(config)?;
            let window = ReplayWindow::new(config.replay.from, config.replay.to);
            Ok(service::create_replay_document_service_with_storage(
                storage, window,
            ))
        }
        ServiceMode::Live => {
            let transport = transport
                .ok_or_else(|| anyhow!("live mode requires a delta transport"))?;
            Ok(service::create_document_service(
                &config.service.delta_url,
                &config.service.git_url,
                transport,
                build_live_options(&config.live),
            )?)
        }
    }
}
