// src/core/routing/response.rs

//! The response produced once a route has been resolved.

use super::component::Component;
use std::fmt;
use std::sync::Arc;

/// MIME type of a response whose value is a component.
pub const COMPONENT_MIME_TYPE: &str = "fluid/component";
pub const TEXT_MIME_TYPE: &str = "text/plain";
pub const JSON_MIME_TYPE: &str = "application/json";

/// The payload carried by a `RouteResponse`.
#[derive(Clone)]
pub enum ResponseValue {
    Component(Arc<dyn Component>),
    Text(String),
    Json(serde_json::Value),
}

impl fmt::Debug for ResponseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseValue::Component(c) => f.debug_tuple("Component").field(&c.id()).finish(),
            ResponseValue::Text(s) => f.debug_tuple("Text").field(s).finish(),
            ResponseValue::Json(v) => f.debug_tuple("Json").field(v).finish(),
        }
    }
}

/// The result of a successful route resolution: `{ status, mimeType, value }`.
#[derive(Debug, Clone)]
pub struct RouteResponse {
    /// An HTTP-style status code.
    pub status: u16,
    pub mime_type: String,
    pub value: ResponseValue,
}

impl RouteResponse {
    /// The standard `200 fluid/component` response for a resolved component.
    pub fn component(component: Arc<dyn Component>) -> Self {
        Self {
            status: 200,
            mime_type: COMPONENT_MIME_TYPE.to_string(),
            value: ResponseValue::Component(component),
        }
    }

    pub fn text(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            mime_type: TEXT_MIME_TYPE.to_string(),
            value: ResponseValue::Text(message.into()),
        }
    }

    pub fn json(status: u16, value: serde_json::Value) -> Self {
        Self {
            status,
            mime_type: JSON_MIME_TYPE.to_string(),
            value: ResponseValue::Json(value),
        }
    }

    /// The answer given when no handler owns `url`.
    pub fn not_found(url: &str) -> Self {
        Self::text(404, format!("{url} not found"))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The component carried by this response, if any.
    pub fn as_component(&self) -> Option<&Arc<dyn Component>> {
        match &self.value {
            ResponseValue::Component(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            ResponseValue::Text(s) => Some(s),
            _ => None,
        }
    }
}
