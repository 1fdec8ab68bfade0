// src/core/errors.rs

//! Defines the primary error type for the routing and delta subsystems.

use std::sync::Arc;
use thiserror::Error;

/// The main error enum, representing every failure the core can surface.
///
/// "Not my route" is never an error: handlers decline by returning `Ok(None)`.
/// Client mistakes that a handler owns are answered with a 4xx `RouteResponse`.
/// What remains here are malformed inputs at the dynamic boundary and upstream
/// failures, which are propagated to the caller unchanged.
#[derive(Error, Debug)]
pub enum DocRelayError {
    #[error("IO Error: {0}")]
    Io(Arc<std::io::Error>),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Component '{0}' not found")]
    ComponentNotFound(String),

    #[error("Component request failed: {0}")]
    ComponentRequest(String),

    #[error("Delta storage error: {0}")]
    DeltaStorage(String),

    #[error("HTTP client error: {0}")]
    HttpClientError(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

// Manual implementation of Clone because `std::io::Error` is not cloneable.
// Errors are cloned when they are fanned out as delta events.
impl Clone for DocRelayError {
    fn clone(&self) -> Self {
        match self {
            DocRelayError::Io(e) => DocRelayError::Io(Arc::clone(e)),
            DocRelayError::MalformedRequest(s) => DocRelayError::MalformedRequest(s.clone()),
            DocRelayError::ComponentNotFound(s) => DocRelayError::ComponentNotFound(s.clone()),
            DocRelayError::ComponentRequest(s) => DocRelayError::ComponentRequest(s.clone()),
            DocRelayError::DeltaStorage(s) => DocRelayError::DeltaStorage(s.clone()),
            DocRelayError::HttpClientError(s) => DocRelayError::HttpClientError(s.clone()),
            DocRelayError::Connection(s) => DocRelayError::Connection(s.clone()),
            DocRelayError::Internal(s) => DocRelayError::Internal(s.clone()),
        }
    }
}

impl PartialEq for DocRelayError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DocRelayError::Io(e1), DocRelayError::Io(e2)) => e1.to_string() == e2.to_string(),
            (DocRelayError::MalformedRequest(s1), DocRelayError::MalformedRequest(s2)) => s1 == s2,
            (DocRelayError::ComponentNotFound(s1), DocRelayError::ComponentNotFound(s2)) => {
                s1 == s2
            }
            (DocRelayError::ComponentRequest(s1), DocRelayError::ComponentRequest(s2)) => s1 == s2,
            (DocRelayError::DeltaStorage(s1), DocRelayError::DeltaStorage(s2)) => s1 == s2,
            (DocRelayError::HttpClientError(s1), DocRelayError::HttpClientError(s2)) => s1 == s2,
            (DocRelayError::Connection(s1), DocRelayError::Connection(s2)) => s1 == s2,
            (DocRelayError::Internal(s1), DocRelayError::Internal(s2)) => s1 == s2,
            _ => false,
        }
    }
}

// --- From trait implementations for easy error conversion ---

impl From<std::io::Error> for DocRelayError {
    fn from(e: std::io::Error) -> Self {
        DocRelayError::Io(Arc::new(e))
    }
}

impl From<reqwest::Error> for DocRelayError {
    fn from(e: reqwest::Error) -> Self {
        DocRelayError::HttpClientError(e.to_string())
    }
}

impl From<serde_json::Error> for DocRelayError {
    fn from(e: serde_json::Error) -> Self {
        DocRelayError::Internal(format!("JSON serialization/deserialization error: {e}"))
    }
}

impl From<url::ParseError> for DocRelayError {
    fn from(e: url::ParseError) -> Self {
        DocRelayError::Connection(format!("invalid endpoint url: {e}"))
    }
}
