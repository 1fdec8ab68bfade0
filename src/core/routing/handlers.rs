// src/core/routing/handlers.rs

//! The built-in request handlers.
//!
//! Each handler owns a route prefix structurally: it inspects the leading path
//! segments and declines with `Ok(None)` for anything it does not own. Handlers
//! hold no mutable state, so they can be composed in any chain.

use super::component::{Component, LoadableComponent};
use super::request::PathRequest;
use super::response::RouteResponse;
use super::runtime::HostRuntime;
use crate::core::DocRelayError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// The reserved first segment of every service route.
pub const SERVICE_ROUTE_PATH_ROOT: &str = "_services";

/// One routing policy in a `RequestHandlerChain`.
///
/// A handler returns `Ok(None)` for routes it does not own, never an error.
/// It returns a response (possibly a 4xx one) for routes it owns, and `Err`
/// only when a collaborator it delegated to failed.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle(
        &self,
        request: &PathRequest,
        runtime: &dyn HostRuntime,
    ) -> Result<Option<RouteResponse>, DocRelayError>;
}

/// Resolves the first segment as a component id and hands the rest of the
/// request to that component.
#[derive(Debug, Default, Clone, Copy)]
pub struct ComponentRequestHandler;

#[async_trait]
impl RequestHandler for ComponentRequestHandler {
    async fn handle(
        &self,
        request: &PathRequest,
        runtime: &dyn HostRuntime,
    ) -> Result<Option<RouteResponse>, DocRelayError> {
        let Some(id) = request.path_parts().first() else {
            return Ok(None);
        };

        let component = runtime.get_component_runtime(id, request.wait()).await?;
        component.request(request.create_sub_request(1)).await
    }
}

/// A static route to one pre-known component, matched by its own url.
pub struct LoadableComponentRequestHandler {
    component: Arc<dyn Component>,
    path_parts: Vec<String>,
}

impl LoadableComponentRequestHandler {
    pub fn new<C: LoadableComponent + 'static>(component: Arc<C>) -> Self {
        let path_parts = PathRequest::split_path(component.url());
        Self {
            component,
            path_parts,
        }
    }

    /// The bound route, already split into segments.
    pub fn path_parts(&self) -> &[String] {
        &self.path_parts
    }
}

#[async_trait]
impl RequestHandler for LoadableComponentRequestHandler {
    async fn handle(
        &self,
        request: &PathRequest,
        _runtime: &dyn HostRuntime,
    ) -> Result<Option<RouteResponse>, DocRelayError> {
        if !request.path_parts().starts_with(&self.path_parts) {
            return Ok(None);
        }
        Ok(Some(RouteResponse::component(Arc::clone(&self.component))))
    }
}

/// Owns the `_services/<service_id>` namespace for one backing component.
pub struct ServiceRequestHandler {
    service_id: String,
    component: Arc<dyn Component>,
}

impl ServiceRequestHandler {
    pub fn new(service_id: impl Into<String>, component: Arc<dyn Component>) -> Self {
        Self {
            service_id: service_id.into(),
            component,
        }
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    fn owns(&self, parts: &[String]) -> bool {
        parts.len() >= 2 && parts[0] == SERVICE_ROUTE_PATH_ROOT && parts[1] == self.service_id
    }
}

#[async_trait]
impl RequestHandler for ServiceRequestHandler {
    async fn handle(
        &self,
        request: &PathRequest,
        _runtime: &dyn HostRuntime,
    ) -> Result<Option<RouteResponse>, DocRelayError> {
        let parts = request.path_parts();
        if !self.owns(parts) {
            return Ok(None);
        }

        if parts.len() == 2 {
            return Ok(Some(RouteResponse::component(Arc::clone(&self.component))));
        }

        match self.component.router() {
            Some(router) => router.request(request.create_sub_request(2)).await,
            None => {
                debug!(
                    "Service '{}' received a sub-route but is not a router",
                    self.service_id
                );
                Ok(Some(RouteResponse::text(
                    400,
                    format!("{} service is not a router", request.url()),
                )))
            }
        }
    }
}
