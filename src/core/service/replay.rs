// src/core/service/replay.rs

//! The document service whose connections replay history.

use super::DocumentService;
use crate::core::DocRelayError;
use crate::core::delta::{
    DeltaConnection, DeltaStorageService, ReplayDeltaConnection, ReplayWindow,
};
use crate::core::messages::{DocumentTarget, User};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

pub struct ReplayDocumentService {
    storage: Arc<dyn DeltaStorageService>,
    window: ReplayWindow,
}

impl ReplayDocumentService {
    pub fn new(storage: Arc<dyn DeltaStorageService>, window: ReplayWindow) -> Self {
        Self { storage, window }
    }

    pub fn window(&self) -> ReplayWindow {
        self.window
    }

    /// Opens a replay connection with its concrete type, for callers that
    /// want to observe replay progress.
    pub fn connect_replay(&self, target: &DocumentTarget) -> ReplayDeltaConnection {
        ReplayDeltaConnection::create(target.clone(), Arc::clone(&self.storage), self.window)
    }
}

#[async_trait]
impl DocumentService for ReplayDocumentService {
    async fn connect_to_delta_storage(
        &self,
        _target: &DocumentTarget,
    ) -> Result<Arc<dyn DeltaStorageService>, DocRelayError> {
        Ok(Arc::clone(&self.storage))
    }

    async fn connect_to_delta_stream(
        &self,
        target: &DocumentTarget,
        user: Option<User>,
    ) -> Result<Box<dyn DeltaConnection>, DocRelayError> {
        if let Some(user) = user {
            debug!(
                "Replay connections carry no identity; ignoring user '{}'",
                user.id
            );
        }
        Ok(Box::new(self.connect_replay(target)))
    }
}
