// src/core/service/live.rs

//! The document service backed by a live delta transport.
//!
//! The socket transport itself lives outside this crate; it plugs in through
//! the `DeltaTransport` trait. This service adds endpoint handling, the
//! storage/cache flags, and error tracking around it.

use super::DocumentService;
use super::error_tracking::ErrorTracker;
use crate::core::DocRelayError;
use crate::core::delta::{DeltaConnection, DeltaStorageService, HttpDeltaStorage};
use crate::core::messages::{DocumentTarget, User};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Basic credentials for the object-storage endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Settings of a live service. The error tracker is chosen by the caller.
#[derive(Clone)]
pub struct LiveServiceOptions {
    pub error_tracker: Arc<dyn ErrorTracker>,
    pub disable_cache: bool,
    pub historian_api: bool,
    pub credentials: Option<Credentials>,
}

impl LiveServiceOptions {
    /// Caching on, historian API on, no credentials.
    pub fn new(error_tracker: Arc<dyn ErrorTracker>) -> Self {
        Self {
            error_tracker,
            disable_cache: false,
            historian_api: true,
            credentials: None,
        }
    }
}

/// Everything a transport needs to open one delta connection.
#[derive(Debug, Clone)]
pub struct TransportConnect {
    pub target: DocumentTarget,
    pub user: Option<User>,
    pub delta_url: Url,
    pub storage_url: Url,
    pub disable_cache: bool,
    pub historian_api: bool,
    pub credentials: Option<Credentials>,
}

/// A live delta transport, such as a socket connection to the ordering service.
#[async_trait]
pub trait DeltaTransport: Send + Sync {
    async fn connect(
        &self,
        request: TransportConnect,
    ) -> Result<Box<dyn DeltaConnection>, DocRelayError>;
}

pub struct LiveDocumentService {
    delta_url: Url,
    storage_url: Url,
    transport: Arc<dyn DeltaTransport>,
    options: LiveServiceOptions,
    delta_storage: Arc<HttpDeltaStorage>,
}

impl LiveDocumentService {
    pub fn new(
        delta_url: &str,
        storage_url: &str,
        transport: Arc<dyn DeltaTransport>,
        options: LiveServiceOptions,
    ) -> Result<Self, DocRelayError> {
        let delta_storage = Arc::new(HttpDeltaStorage::new(delta_url)?);
        Ok(Self {
            delta_url: Url::parse(delta_url)?,
            storage_url: Url::parse(storage_url)?,
            transport,
            options,
            delta_storage,
        })
    }

    pub fn delta_url(&self) -> &Url {
        &self.delta_url
    }

    pub fn storage_url(&self) -> &Url {
        &self.storage_url
    }

    pub fn options(&self) -> &LiveServiceOptions {
        &self.options
    }
}

#[async_trait]
impl DocumentService for LiveDocumentService {
    async fn connect_to_delta_storage(
        &self,
        _target: &DocumentTarget,
    ) -> Result<Arc<dyn DeltaStorageService>, DocRelayError> {
        let storage: Arc<dyn DeltaStorageService> = self.delta_storage.clone();
        Ok(storage)
    }

    async fn connect_to_delta_stream(
        &self,
        target: &DocumentTarget,
        user: Option<User>,
    ) -> Result<Box<dyn DeltaConnection>, DocRelayError> {
        debug!(
            "Opening live delta connection to {}/{} via {}",
            target.tenant_id, target.document_id, self.delta_url
        );
        let request = TransportConnect {
            target: target.clone(),
            user,
            delta_url: self.delta_url.clone(),
            storage_url: self.storage_url.clone(),
            disable_cache: self.options.disable_cache,
            historian_api: self.options.historian_api,
            credentials: self.options.credentials.clone(),
        };

        self.transport.connect(request).await.inspect_err(|e| {
            self.options
                .error_tracker
                .track("live delta connection failed", e);
        })
    }
}
