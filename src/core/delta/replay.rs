// src/core/delta/replay.rs

//! A deterministic delta connection that replays a document's history.
//!
//! On creation the connection fetches the log once, bounded by the end of the
//! replay window. Operations before the start of the window are delivered
//! immediately as one catch-up batch; the rest are delivered one per tick to
//! simulate live arrival. The fetched log and the cursor are owned by the
//! emitting task alone, so emissions can neither overlap nor reorder.
//!
//! Replay is read-only: submitted operations are dropped. Disconnecting (or
//! dropping the connection) stops the emitting task at its next tick and ends
//! the event stream.

use super::connection::{DeltaConnection, DeltaEvent, DeltaEventStream, EventChannel};
use super::storage::DeltaStorageService;
use crate::core::messages::{
    ConnectionDetails, DocumentMessage, DocumentTarget, SequencedMessage,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Simulated delay between two replayed operations.
pub const DELAY_INTERVAL: Duration = Duration::from_millis(50);

/// The `[from, to)` range of a replay. Operations before `from` are caught up
/// instantly; `to` bounds the fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayWindow {
    pub from: u64,
    pub to: u64,
}

impl ReplayWindow {
    pub fn new(from: u64, to: u64) -> Self {
        Self { from, to }
    }
}

/// Lifecycle of a replay connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayPhase {
    /// Waiting for the historical log.
    Fetching,
    /// Emitting one operation per tick.
    Streaming,
    /// Every fetched operation has been emitted.
    Drained,
    /// Disconnected before draining.
    Closed,
    /// The log could not be fetched.
    Failed,
}

impl ReplayPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Drained | Self::Closed | Self::Failed)
    }
}

/// A snapshot of where a replay stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayProgress {
    pub phase: ReplayPhase,
    /// Operations emitted so far; the replay cursor.
    pub emitted: usize,
    /// Size of the fetched log. Zero until the fetch completes.
    pub fetched: usize,
}

pub struct ReplayDeltaConnection {
    document_id: String,
    details: ConnectionDetails,
    events: EventChannel,
    progress: watch::Receiver<ReplayProgress>,
    shutdown_tx: broadcast::Sender<()>,
    dropped_submissions: AtomicU64,
}

impl ReplayDeltaConnection {
    /// Connects to `target` and starts replaying `window` from `storage`.
    /// Must be called from within a Tokio runtime.
    pub fn create(
        target: DocumentTarget,
        storage: Arc<dyn DeltaStorageService>,
        window: ReplayWindow,
    ) -> Self {
        let (events, events_tx) = EventChannel::new();
        let (progress_tx, progress) = watch::channel(ReplayProgress {
            phase: ReplayPhase::Fetching,
            emitted: 0,
            fetched: 0,
        });
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        info!(
            "Replaying {}/{} over [{}, {})",
            target.tenant_id, target.document_id, window.from, window.to
        );

        let document_id = target.document_id.clone();
        let task = ReplayTask {
            target,
            storage,
            window,
            events: events_tx,
            progress: progress_tx,
        };
        tokio::spawn(task.run(shutdown_rx));

        Self {
            document_id,
            details: ConnectionDetails::replay(),
            events,
            progress,
            shutdown_tx,
            dropped_submissions: AtomicU64::new(0),
        }
    }

    pub fn progress(&self) -> ReplayProgress {
        *self.progress.borrow()
    }

    /// A receiver notified on every phase change and emission.
    pub fn progress_updates(&self) -> watch::Receiver<ReplayProgress> {
        self.progress.clone()
    }

    /// Waits until the replay reaches a terminal phase.
    pub async fn finished(&self) -> ReplayProgress {
        let mut updates = self.progress.clone();
        let result = updates
            .wait_for(|p| p.phase.is_terminal())
            .await
            .map(|progress| *progress);
        // If the task is gone, its last published state is final.
        result.unwrap_or_else(|_| *updates.borrow())
    }

    /// How many submitted operations were discarded.
    pub fn dropped_submissions(&self) -> u64 {
        self.dropped_submissions.load(Ordering::Relaxed)
    }
}

impl DeltaConnection for ReplayDeltaConnection {
    fn document_id(&self) -> &str {
        &self.document_id
    }

    fn details(&self) -> &ConnectionDetails {
        &self.details
    }

    fn take_events(&self) -> Option<DeltaEventStream> {
        self.events.take()
    }

    fn submit(&self, message: DocumentMessage) {
        self.dropped_submissions.fetch_add(1, Ordering::Relaxed);
        debug!(
            "Dropping outbound '{}' message (csn {}) on read-only replay of {}",
            message.message_type, message.client_sequence_number, self.document_id
        );
    }

    fn disconnect(&self) {
        if self.shutdown_tx.send(()).is_ok() {
            info!("Disconnecting replay of {}", self.document_id);
        }
    }
}

/// The emitting side of a replay. Owns the fetched log and the cursor.
struct ReplayTask {
    target: DocumentTarget,
    storage: Arc<dyn DeltaStorageService>,
    window: ReplayWindow,
    events: mpsc::UnboundedSender<DeltaEvent>,
    progress: watch::Sender<ReplayProgress>,
}

impl ReplayTask {
    async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) {
        let fetch = self.storage.get(
            &self.target.tenant_id,
            &self.target.document_id,
            self.target.token.as_deref(),
            0,
            self.window.to,
        );

        let result = tokio::select! {
            biased;
            _ = shutdown_rx.recv() => {
                self.set_phase(ReplayPhase::Closed);
                return;
            }
            result = fetch => result,
        };

        let fetched = match result {
            Ok(ops) => ops,
            Err(e) => {
                warn!("Replay fetch for {} failed: {}", self.target.document_id, e);
                self.send(DeltaEvent::Error(e));
                self.set_phase(ReplayPhase::Failed);
                return;
            }
        };
        debug!(
            "Fetched {} operations for replay of {}",
            fetched.len(),
            self.target.document_id
        );
        self.progress.send_modify(|p| {
            p.phase = ReplayPhase::Streaming;
            p.fetched = fetched.len();
        });

        let mut cursor = 0usize;

        // Catch up everything before the window in one batch.
        if !fetched.is_empty() && self.window.from > 0 {
            let end = usize::try_from(self.window.from)
                .unwrap_or(usize::MAX)
                .min(fetched.len());
            self.emit(fetched[..end].to_vec());
            cursor = end;
            self.progress.send_modify(|p| p.emitted = cursor);
        }

        let mut interval = time::interval_at(Instant::now() + DELAY_INTERVAL, DELAY_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    self.set_phase(ReplayPhase::Closed);
                    return;
                }
                _ = interval.tick() => {
                    let Some(op) = fetched.get(cursor) else {
                        info!(
                            "Replay of {} drained after {} operations",
                            self.target.document_id, cursor
                        );
                        self.set_phase(ReplayPhase::Drained);
                        return;
                    };
                    self.emit(vec![op.clone()]);
                    cursor += 1;
                    self.progress.send_modify(|p| p.emitted = cursor);
                }
            }
        }
    }

    fn emit(&self, messages: Vec<SequencedMessage>) {
        self.send(DeltaEvent::Op {
            document_id: self.target.document_id.clone(),
            messages,
        });
    }

    fn send(&self, event: DeltaEvent) {
        if self.events.send(event).is_err() {
            debug!("Replay event for {} has no listener", self.target.document_id);
        }
    }

    fn set_phase(&self, phase: ReplayPhase) {
        self.progress.send_modify(|p| p.phase = phase);
    }
}
