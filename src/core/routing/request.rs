// src/core/routing/request.rs

//! Parses a routable request into path segments and typed headers.
//!
//! A request url is consumed left to right as it travels down the component
//! tree: every hop derives a sub-request that drops the segments it has already
//! matched. Sub-requests are new values; the parent request is never modified
//! and the header bag is shared read-only through an `Arc`.

use crate::core::DocRelayError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// The only header the routing chain interprets itself.
pub const WAIT_HEADER: &str = "wait";

/// A scalar header value. Anything that is not a scalar is not a header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Bool(bool),
    Number(i64),
    Text(String),
}

/// The typed header bag of a request.
///
/// `wait` is recognized and typed. Every other scalar header passes through
/// opaquely for components further down the chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestHeaders {
    pub wait: Option<bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub passthrough: BTreeMap<String, HeaderValue>,
}

impl RequestHeaders {
    /// Headers with only the `wait` flag set.
    pub fn with_wait(wait: bool) -> Self {
        Self {
            wait: Some(wait),
            passthrough: BTreeMap::new(),
        }
    }

    /// Builds typed headers from a dynamic header map.
    ///
    /// Policy: a `wait` entry that is not a boolean is ignored; other entries
    /// are kept when they are booleans, integers, or strings, and ignored when
    /// they are null, floats, arrays, or objects.
    pub fn from_map<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        let mut headers = Self::default();
        for (name, value) in entries {
            if name == WAIT_HEADER {
                match value {
                    serde_json::Value::Bool(wait) => headers.wait = Some(wait),
                    other => debug!("Ignoring non-boolean '{}' header: {}", WAIT_HEADER, other),
                }
                continue;
            }

            let typed = match value {
                serde_json::Value::Bool(b) => HeaderValue::Bool(b),
                serde_json::Value::String(s) => HeaderValue::Text(s),
                serde_json::Value::Number(n) => match n.as_i64() {
                    Some(i) => HeaderValue::Number(i),
                    None => {
                        debug!("Ignoring header '{}' with non-integer value {}", name, n);
                        continue;
                    }
                },
                other => {
                    debug!("Ignoring header '{}' with non-scalar value {}", name, other);
                    continue;
                }
            };
            headers.passthrough.insert(name, typed);
        }
        headers
    }

    /// Looks up an opaque header by name.
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.passthrough.get(name)
    }
}

/// A request routed within a running document session.
#[derive(Debug, Clone, PartialEq)]
pub struct PathRequest {
    url: String,
    path_parts: Vec<String>,
    query: Option<String>,
    headers: Arc<RequestHeaders>,
}

impl PathRequest {
    /// Parses `url` into path segments. An empty path is valid and has zero segments.
    pub fn new(url: &str, headers: RequestHeaders) -> Self {
        Self::with_shared_headers(url, Arc::new(headers))
    }

    /// Parses `url`, sharing an existing header bag.
    pub fn with_shared_headers(url: &str, headers: Arc<RequestHeaders>) -> Self {
        let (path, query) = split_query(url);
        Self {
            url: url.to_string(),
            path_parts: Self::split_path(path),
            query: query.map(str::to_string),
            headers,
        }
    }

    /// Parses a request whose url arrived as an untyped value, such as a field
    /// of a JSON message. Fails only when the url is not a string.
    pub fn from_value(
        url: &serde_json::Value,
        headers: RequestHeaders,
    ) -> Result<Self, DocRelayError> {
        match url {
            serde_json::Value::String(s) => Ok(Self::new(s, headers)),
            other => Err(DocRelayError::MalformedRequest(format!(
                "request url must be a string, got {other}"
            ))),
        }
    }

    /// Splits a path on `/`, dropping empty segments and percent-decoding the rest.
    /// Anything after `?` is not part of the path.
    pub fn split_path(url: &str) -> Vec<String> {
        let (path, _) = split_query(url);
        path.split('/')
            .filter(|part| !part.is_empty())
            .map(|part| match urlencoding::decode(part) {
                Ok(decoded) => decoded.into_owned(),
                Err(_) => part.to_string(),
            })
            .collect()
    }

    /// Derives the request that remains after consuming the first `start`
    /// segments. Consuming more segments than exist yields an empty path.
    pub fn create_sub_request(&self, start: usize) -> Self {
        let path_parts: Vec<String> = self.path_parts.iter().skip(start).cloned().collect();

        let mut url = String::from("/");
        let encoded: Vec<Cow<'_, str>> = path_parts
            .iter()
            .map(|part| urlencoding::encode(part))
            .collect();
        url.push_str(&encoded.join("/"));
        if let Some(query) = &self.query {
            url.push('?');
            url.push_str(query);
        }

        Self {
            url,
            path_parts,
            query: self.query.clone(),
            headers: Arc::clone(&self.headers),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn path_parts(&self) -> &[String] {
        &self.path_parts
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn headers(&self) -> &Arc<RequestHeaders> {
        &self.headers
    }

    /// The `wait` header, if the caller supplied one.
    pub fn wait(&self) -> Option<bool> {
        self.headers.wait
    }
}

fn split_query(url: &str) -> (&str, Option<&str>) {
    match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    }
}
