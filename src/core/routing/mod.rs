// src/core/routing/mod.rs

//! Hierarchical request routing inside a document session.

pub mod chain;
pub mod component;
pub mod handlers;
pub mod request;
pub mod response;
pub mod runtime;

pub use chain::{RequestHandlerChain, SessionRouter};
pub use component::{Component, ComponentRouter, LoadableComponent};
pub use handlers::{
    ComponentRequestHandler, LoadableComponentRequestHandler, RequestHandler,
    SERVICE_ROUTE_PATH_ROOT, ServiceRequestHandler,
};
pub use request::{HeaderValue, PathRequest, RequestHeaders};
pub use response::{ResponseValue, RouteResponse};
pub use runtime::{ComponentRegistry, HostRuntime};
