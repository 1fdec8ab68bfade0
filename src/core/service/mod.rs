// src/core/service/mod.rs

//! Document services and the factory functions that build them.
//!
//! A document service is the entry point the runtime uses to reach a
//! document's operation log and its delta stream. Live and replay services
//! implement the same trait, so calling code cannot tell them apart.

pub mod error_tracking;
pub mod live;
pub mod replay;

use crate::core::DocRelayError;
use crate::core::delta::{DeltaConnection, DeltaStorageService, HttpDeltaStorage, ReplayWindow};
use crate::core::messages::{DocumentTarget, User};
use async_trait::async_trait;
use std::sync::Arc;

pub use error_tracking::{DisabledErrorTracker, ErrorTracker, LoggingErrorTracker};
pub use live::{Credentials, DeltaTransport, LiveDocumentService, LiveServiceOptions};
pub use replay::ReplayDocumentService;

#[async_trait]
pub trait DocumentService: Send + Sync {
    /// The historical operation log of `target`.
    async fn connect_to_delta_storage(
        &self,
        target: &DocumentTarget,
    ) -> Result<Arc<dyn DeltaStorageService>, DocRelayError>;

    /// Opens the ordered operation stream of `target`.
    async fn connect_to_delta_stream(
        &self,
        target: &DocumentTarget,
        user: Option<User>,
    ) -> Result<Box<dyn DeltaConnection>, DocRelayError>;
}

/// Builds a service backed by a live transport.
pub fn create_document_service(
    delta_url: &str,
    storage_url: &str,
    transport: Arc<dyn DeltaTransport>,
    options: LiveServiceOptions,
) -> Result<Arc<dyn DocumentService>, DocRelayError> {
    let service: Arc<dyn DocumentService> = Arc::new(LiveDocumentService::new(
        delta_url,
        storage_url,
        transport,
        options,
    )?);
    Ok(service)
}

/// Builds a service replaying `[replay_from, replay_to)` from the delta
/// endpoint at `delta_url`.
pub fn create_replay_document_service(
    delta_url: &str,
    replay_from: u64,
    replay_to: u64,
) -> Result<Arc<dyn DocumentService>, DocRelayError> {
    let storage = Arc::new(HttpDeltaStorage::new(delta_url)?);
    Ok(create_replay_document_service_with_storage(
        storage,
        ReplayWindow::new(replay_from, replay_to),
    ))
}

/// Builds a replay service over an arbitrary log store.
pub fn create_replay_document_service_with_storage(
    storage: Arc<dyn DeltaStorageService>,
    window: ReplayWindow,
) -> Arc<dyn DocumentService> {
    Arc::new(ReplayDocumentService::new(storage, window))
}
