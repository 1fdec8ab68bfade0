// src/core/routing/chain.rs

//! The ordered handler chain and the session router built on top of it.

use super::handlers::RequestHandler;
use super::request::{PathRequest, RequestHeaders};
use super::response::RouteResponse;
use super::runtime::HostRuntime;
use crate::core::DocRelayError;
use std::sync::Arc;
use tracing::{Instrument, debug, info_span};

/// An ordered list of handlers, tried in registration order.
#[derive(Clone, Default)]
pub struct RequestHandlerChain {
    handlers: Vec<Arc<dyn RequestHandler>>,
}

impl RequestHandlerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler; it is consulted after every handler already registered.
    pub fn with_handler(mut self, handler: impl RequestHandler + 'static) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    pub fn push(&mut self, handler: Arc<dyn RequestHandler>) {
        self.handlers.push(handler);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Runs the chain. The first handler that answers ends it; `Ok(None)` means
    /// every handler declined. Upstream failures stop the chain and propagate.
    pub async fn resolve(
        &self,
        request: &PathRequest,
        runtime: &dyn HostRuntime,
    ) -> Result<Option<RouteResponse>, DocRelayError> {
        for (index, handler) in self.handlers.iter().enumerate() {
            if let Some(response) = handler.handle(request, runtime).await? {
                debug!(
                    "Handler #{} answered '{}' with status {}",
                    index,
                    request.url(),
                    response.status
                );
                return Ok(Some(response));
            }
        }
        Ok(None)
    }
}

/// Answers requests for one session: the chain plus the "not found" policy.
#[derive(Clone)]
pub struct SessionRouter {
    chain: RequestHandlerChain,
    runtime: Arc<dyn HostRuntime>,
}

impl SessionRouter {
    pub fn new(chain: RequestHandlerChain, runtime: Arc<dyn HostRuntime>) -> Self {
        Self { chain, runtime }
    }

    /// Resolves `request`, answering `404` when no handler owns the route.
    pub async fn request(&self, request: PathRequest) -> Result<RouteResponse, DocRelayError> {
        let span = info_span!(
            "route",
            url = %request.url(),
            segments = request.path_parts().len(),
        );

        async move {
            match self.chain.resolve(&request, self.runtime.as_ref()).await? {
                Some(response) => Ok(response),
                None => {
                    debug!("No handler owns '{}'", request.url());
                    Ok(RouteResponse::not_found(request.url()))
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Resolves a request whose url arrived as an untyped value. A malformed
    /// url is the caller's mistake and is answered with `400`; upstream
    /// failures are still returned as errors.
    pub async fn request_value(
        &self,
        url: &serde_json::Value,
        headers: RequestHeaders,
    ) -> Result<RouteResponse, DocRelayError> {
        match PathRequest::from_value(url, headers) {
            Ok(request) => self.request(request).await,
            Err(DocRelayError::MalformedRequest(reason)) => {
                debug!("Rejecting malformed request: {}", reason);
                Ok(RouteResponse::text(400, reason))
            }
            Err(e) => Err(e),
        }
    }
}
