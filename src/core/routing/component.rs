// src/core/routing/component.rs

//! The capabilities a component exposes to the routing chain.

use super::request::PathRequest;
use super::response::RouteResponse;
use crate::core::DocRelayError;
use async_trait::async_trait;

/// An addressable unit inside a session that can own routes.
#[async_trait]
pub trait Component: Send + Sync {
    /// The identifier the session resolves this component by.
    fn id(&self) -> &str;

    /// Handles the part of a request that remains once the route to this
    /// component has been consumed. `Ok(None)` means the component does not own it.
    async fn request(&self, request: PathRequest) -> Result<Option<RouteResponse>, DocRelayError>;

    /// The router capability, for components that serve a `_services` namespace.
    fn router(&self) -> Option<&dyn ComponentRouter> {
        None
    }
}

/// Routes sub-requests below a service namespace.
#[async_trait]
pub trait ComponentRouter: Send + Sync {
    async fn request(&self, request: PathRequest) -> Result<Option<RouteResponse>, DocRelayError>;
}

/// A component that knows its own route within the session.
pub trait LoadableComponent: Component {
    fn url(&self) -> &str;
}
