// src/server/replay_loop.rs

//! Writes every operation of a delta connection to stdout as one JSON line.

use crate::core::delta::DeltaEvent;
use crate::core::messages::DocumentTarget;
use crate::core::service::DocumentService;
use anyhow::{Result, anyhow};
use std::sync::Arc;
use tokio::io::{AsyncWriteExt, stdout};
use tokio_stream::StreamExt;
use tracing::{info, warn};

pub async fn run(service: Arc<dyn DocumentService>, target: DocumentTarget) -> Result<()> {
    let connection = service.connect_to_delta_stream(&target, None).await?;
    let mut events = connection
        .take_events()
        .ok_or_else(|| anyhow!("delta connection events were already taken"))?;

    info!(
        "Connected to {}/{} (existing: {}, client id: '{}')",
        target.tenant_id,
        target.document_id,
        connection.existing(),
        connection.client_id()
    );

    let mut out = stdout();
    let mut written = 0usize;

    loop {
        tokio::select! {
            event = events.next() => match event {
                Some(DeltaEvent::Op { messages, .. }) => {
                    for message in messages {
                        let mut line = serde_json::to_vec(&message)?;
                        line.push(b'\n');
                        out.write_all(&line).await?;
                        written += 1;
                    }
                    out.flush().await?;
                }
                Some(DeltaEvent::Error(e)) => {
                    warn!("Delta connection failed: {}", e);
                    return Err(e.into());
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, disconnecting.");
                connection.disconnect();
            }
        }
    }

    info!("Delta stream ended after {} operations", written);
    Ok(())
}
