// src/config.rs

//! Manages configuration: loading, defaults, and validation.

use crate::core::messages::DocumentTarget;
use crate::core::service::Credentials;
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::warn;
use url::Url;

/// Which kind of document service the composition root builds.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceMode {
    Live,
    #[default]
    Replay,
}

/// How failures of a live service are reported.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorTrackingMode {
    #[default]
    Log,
    Disabled,
}

/// Endpoints of the document service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    #[serde(default)]
    pub mode: ServiceMode,
    /// The delta (ordering) service endpoint.
    #[serde(default = "default_delta_url")]
    pub delta_url: String,
    /// The object-storage (git/historian) endpoint.
    #[serde(default = "default_git_url")]
    pub git_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            mode: ServiceMode::default(),
            delta_url: default_delta_url(),
            git_url: default_git_url(),
        }
    }
}

fn default_delta_url() -> String {
    "http://localhost:3000".to_string()
}
fn default_git_url() -> String {
    "http://localhost:3001".to_string()
}

/// The document to connect to.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DocumentConfig {
    #[serde(default = "default_tenant_id")]
    pub tenant_id: String,
    #[serde(default)]
    pub document_id: String,
    #[serde(default)]
    pub token: Option<String>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            tenant_id: default_tenant_id(),
            document_id: String::new(),
            token: None,
        }
    }
}

fn default_tenant_id() -> String {
    "local".to_string()
}

impl DocumentConfig {
    pub fn target(&self) -> DocumentTarget {
        DocumentTarget {
            tenant_id: self.tenant_id.clone(),
            document_id: self.document_id.clone(),
            token: self.token.clone(),
        }
    }
}

/// The replay window and, optionally, a local log replacing the delta endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReplayConfig {
    #[serde(default)]
    pub from: u64,
    #[serde(default = "default_replay_to")]
    pub to: u64,
    /// A JSON array of sequenced messages to replay instead of fetching over HTTP.
    #[serde(default)]
    pub log_file: Option<String>,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            from: 0,
            to: default_replay_to(),
            log_file: None,
        }
    }
}

fn default_replay_to() -> u64 {
    u64::MAX
}

/// Settings of the live service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LiveConfig {
    #[serde(default)]
    pub error_tracking: ErrorTrackingMode,
    #[serde(default)]
    pub disable_cache: bool,
    #[serde(default = "default_historian_api")]
    pub historian_api: bool,
    #[serde(default)]
    pub credentials: Option<Credentials>,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            error_tracking: ErrorTrackingMode::default(),
            disable_cache: false,
            historian_api: default_historian_api(),
            credentials: None,
        }
    }
}

fn default_historian_api() -> bool {
    true
}

/// Settings of request routing within a session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RoutingConfig {
    /// How long a waiting component lookup may take. `0` waits forever.
    #[serde(default = "default_component_wait_timeout_ms")]
    pub component_wait_timeout_ms: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            component_wait_timeout_ms: default_component_wait_timeout_ms(),
        }
    }
}

fn default_component_wait_timeout_ms() -> u64 {
    30_000
}

/// The validated configuration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub document: DocumentConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
    #[serde(default)]
    pub live: LiveConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            service: ServiceConfig::default(),
            document: DocumentConfig::default(),
            replay: ReplayConfig::default(),
            live: LiveConfig::default(),
            routing: RoutingConfig::default(),
        }
    }
}

impl Config {
    /// Loads and validates the configuration from a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at '{path}'"))?;
        Self::from_toml(&contents).with_context(|| format!("Invalid configuration in '{path}'"))
    }

    /// Parses and validates the configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for logical consistency.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.service.delta_url)
            .with_context(|| format!("invalid delta_url '{}'", self.service.delta_url))?;
        if self.service.mode == ServiceMode::Live {
            Url::parse(&self.service.git_url)
                .with_context(|| format!("invalid git_url '{}'", self.service.git_url))?;
        }
        if self.document.tenant_id.trim().is_empty() {
            return Err(anyhow!("document.tenant_id cannot be empty"));
        }
        if self.document.document_id.trim().is_empty() {
            return Err(anyhow!("document.document_id cannot be empty"));
        }
        if self.replay.from > self.replay.to {
            return Err(anyhow!(
                "replay.from ({}) cannot be greater than replay.to ({})",
                self.replay.from,
                self.replay.to
            ));
        }
        // Sequence numbers start at 1 and the fetch bound is exclusive.
        if self.replay.to <= 1 {
            warn!(
                "replay.to = {} fetches no operations; nothing will be replayed",
                self.replay.to
            );
        }
        Ok(())
    }
}
