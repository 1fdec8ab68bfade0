// src/core/delta/storage.rs

//! Access to the historical operation log of a document.
//!
//! Ranges follow the delta store's convention: `get(.., from, to)` returns the
//! messages whose sequence number lies strictly between `from` and `to`, in
//! sequence-number order. Fetching `(0, n)` therefore yields sequence numbers
//! `1..n`.

use crate::core::DocRelayError;
use crate::core::messages::SequencedMessage;
use async_trait::async_trait;
use dashmap::DashMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// The historical operation log store.
#[async_trait]
pub trait DeltaStorageService: Send + Sync {
    async fn get(
        &self,
        tenant_id: &str,
        document_id: &str,
        token: Option<&str>,
        from: u64,
        to: u64,
    ) -> Result<Vec<SequencedMessage>, DocRelayError>;
}

/// An operation log held in memory, keyed by tenant and document.
#[derive(Debug, Default)]
pub struct InMemoryDeltaStorage {
    logs: DashMap<(String, String), Vec<SequencedMessage>>,
}

impl InMemoryDeltaStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends messages to a document's log, keeping it ordered by sequence number.
    pub fn append(&self, tenant_id: &str, document_id: &str, messages: Vec<SequencedMessage>) {
        let mut log = self
            .logs
            .entry((tenant_id.to_string(), document_id.to_string()))
            .or_default();
        log.extend(messages);
        log.sort_by_key(|m| m.sequence_number);
    }

    /// Creates a store holding one document whose log is read from a JSON array file.
    pub fn from_json_file(
        tenant_id: &str,
        document_id: &str,
        path: impl AsRef<Path>,
    ) -> Result<Self, DocRelayError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let messages: Vec<SequencedMessage> = serde_json::from_str(&contents)?;
        debug!(
            "Loaded {} messages for {}/{} from {:?}",
            messages.len(),
            tenant_id,
            document_id,
            path.as_ref()
        );
        let storage = Self::new();
        storage.append(tenant_id, document_id, messages);
        Ok(storage)
    }
}

#[async_trait]
impl DeltaStorageService for InMemoryDeltaStorage {
    async fn get(
        &self,
        tenant_id: &str,
        document_id: &str,
        _token: Option<&str>,
        from: u64,
        to: u64,
    ) -> Result<Vec<SequencedMessage>, DocRelayError> {
        let key = (tenant_id.to_string(), document_id.to_string());
        let Some(log) = self.logs.get(&key) else {
            return Ok(Vec::new());
        };
        Ok(log
            .iter()
            .filter(|m| m.sequence_number > from && m.sequence_number < to)
            .cloned()
            .collect())
    }
}

/// Reads deltas from the delta service's REST endpoint:
/// `GET {base}/deltas/{tenant}/{document}?from=&to=`.
#[derive(Debug, Clone)]
pub struct HttpDeltaStorage {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpDeltaStorage {
    pub fn new(delta_url: &str) -> Result<Self, DocRelayError> {
        let base_url = Url::parse(delta_url)?;
        let client = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn deltas_url(&self, tenant_id: &str, document_id: &str) -> Result<Url, DocRelayError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let url = format!(
            "{base}/deltas/{}/{}",
            urlencoding::encode(tenant_id),
            urlencoding::encode(document_id)
        );
        Ok(Url::parse(&url)?)
    }
}

#[async_trait]
impl DeltaStorageService for HttpDeltaStorage {
    async fn get(
        &self,
        tenant_id: &str,
        document_id: &str,
        token: Option<&str>,
        from: u64,
        to: u64,
    ) -> Result<Vec<SequencedMessage>, DocRelayError> {
        let url = self.deltas_url(tenant_id, document_id)?;
        let mut request = self
            .client
            .get(url.clone())
            .query(&[("from", from), ("to", to)]);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Delta fetch from {} failed with status {}", url, status);
            return Err(DocRelayError::DeltaStorage(format!(
                "GET {url} returned {status}"
            )));
        }

        let mut messages: Vec<SequencedMessage> = response.json().await?;
        messages.sort_by_key(|m| m.sequence_number);
        Ok(messages)
    }
}
