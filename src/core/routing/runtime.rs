// src/core/routing/runtime.rs

//! The session handle the routing chain resolves components through.

use super::component::Component;
use crate::config::RoutingConfig;
use crate::core::DocRelayError;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::debug;

/// Whether resolution waits for a component that is not loaded yet, when the
/// request does not say.
pub const DEFAULT_WAIT: bool = true;

/// The running document session, as seen by request handlers.
#[async_trait]
pub trait HostRuntime: Send + Sync {
    /// Resolves a component by id. With `wait` the call suspends until the
    /// component becomes available; without it a missing component fails fast.
    async fn get_component_runtime(
        &self,
        id: &str,
        wait: Option<bool>,
    ) -> Result<Arc<dyn Component>, DocRelayError>;
}

/// A `HostRuntime` backed by an in-process table of components.
///
/// Waiters subscribe to the `registered` notification before checking the
/// table, so a registration racing with a lookup is never missed.
#[derive(Default)]
pub struct ComponentRegistry {
    components: DashMap<String, Arc<dyn Component>>,
    registered: Notify,
    /// Upper bound on a waiting lookup. `None` waits forever.
    wait_timeout: Option<Duration>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wait_timeout(wait_timeout: Duration) -> Self {
        Self {
            wait_timeout: Some(wait_timeout),
            ..Self::default()
        }
    }

    pub fn from_config(config: &RoutingConfig) -> Self {
        match config.component_wait_timeout_ms {
            0 => Self::new(),
            ms => Self::with_wait_timeout(Duration::from_millis(ms)),
        }
    }

    /// Registers a component under its id and wakes every waiting lookup.
    /// Returns the component previously registered under the same id.
    pub fn register(&self, component: Arc<dyn Component>) -> Option<Arc<dyn Component>> {
        let id = component.id().to_string();
        debug!("Registering component '{}'", id);
        let previous = self.components.insert(id, component);
        self.registered.notify_waiters();
        previous
    }

    pub fn unregister(&self, id: &str) -> Option<Arc<dyn Component>> {
        self.components.remove(id).map(|(_, component)| component)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.components.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    fn lookup(&self, id: &str) -> Option<Arc<dyn Component>> {
        self.components.get(id).map(|entry| Arc::clone(entry.value()))
    }

    async fn wait_for(&self, id: &str) -> Arc<dyn Component> {
        loop {
            let notified = self.registered.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(component) = self.lookup(id) {
                return component;
            }
            debug!("Waiting for component '{}' to be registered", id);
            notified.await;
        }
    }
}

#[async_trait]
impl HostRuntime for ComponentRegistry {
    async fn get_component_runtime(
        &self,
        id: &str,
        wait: Option<bool>,
    ) -> Result<Arc<dyn Component>, DocRelayError> {
        if !wait.unwrap_or(DEFAULT_WAIT) {
            return self
                .lookup(id)
                .ok_or_else(|| DocRelayError::ComponentNotFound(id.to_string()));
        }

        match self.wait_timeout {
            None => Ok(self.wait_for(id).await),
            Some(limit) => tokio::time::timeout(limit, self.wait_for(id))
                .await
                .map_err(|_| DocRelayError::ComponentNotFound(id.to_string())),
        }
    }
}
