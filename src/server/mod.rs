// src/server/mod.rs

use crate::config::Config;
use anyhow::Result;

mod initialization;
mod replay_loop;

pub use initialization::{
    build_document_service, build_error_tracker, build_live_options, build_replay_storage,
};

/// The main entry point: builds the configured document service, connects to
/// the configured document, and streams its operations to stdout.
pub async fn run(config: Config) -> Result<()> {
    // 1. Build the document service from the configuration.
    let service = build_document_service(&config, None)?;

    // 2. Stream the document's operations until the connection stops emitting.
    replay_loop::run(service, config.document.target()).await
}
