// src/core/messages.rs

//! Wire types shared by delta connections, delta storage, and document services.

use serde::{Deserialize, Serialize};

/// The identity attached to a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One committed operation. The total order of a document is defined solely by
/// `sequence_number`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequencedMessage {
    /// Author of the operation. System messages carry no client id.
    #[serde(default)]
    pub client_id: Option<String>,
    pub sequence_number: u64,
    #[serde(default)]
    pub minimum_sequence_number: u64,
    #[serde(default)]
    pub client_sequence_number: u64,
    #[serde(default)]
    pub reference_sequence_number: u64,
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub contents: serde_json::Value,
    #[serde(default)]
    pub timestamp: u64,
}

/// An outbound operation submitted by the local client, not yet sequenced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMessage {
    pub client_sequence_number: u64,
    pub reference_sequence_number: u64,
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub contents: serde_json::Value,
}

/// The handshake payload of a delta connection. Immutable once connected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDetails {
    pub user: Option<User>,
    pub client_id: String,
    pub existing: bool,
    pub parent_branch: Option<String>,
    pub initial_messages: Vec<SequencedMessage>,
}

impl ConnectionDetails {
    /// Details of a replayed connection. Replay never claims a server-assigned
    /// identity, so there is no client id, user, branch, or backlog.
    pub fn replay() -> Self {
        Self {
            user: None,
            client_id: String::new(),
            existing: true,
            parent_branch: None,
            initial_messages: Vec::new(),
        }
    }
}

/// Identifies one document on the service, with the token used to access it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTarget {
    pub tenant_id: String,
    pub document_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl DocumentTarget {
    pub fn new(tenant_id: impl Into<String>, document_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            document_id: document_id.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}
