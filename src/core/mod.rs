// src/core/mod.rs

//! The central module containing request routing, delta connections, and
//! document services.

pub mod delta;
pub mod errors;
pub mod messages;
pub mod routing;
pub mod service;

pub use errors::DocRelayError;
pub use messages::{ConnectionDetails, DocumentMessage, DocumentTarget, SequencedMessage, User};
