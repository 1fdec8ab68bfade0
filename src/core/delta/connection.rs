// src/core/delta/connection.rs

//! The delta connection abstraction: connect-time metadata plus an ordered
//! stream of sequenced operations.

use crate::core::DocRelayError;
use crate::core::messages::{ConnectionDetails, DocumentMessage, SequencedMessage, User};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// An event delivered by a delta connection.
#[derive(Debug, Clone, PartialEq)]
pub enum DeltaEvent {
    /// One or more sequenced operations, in sequence-number order.
    Op {
        document_id: String,
        messages: Vec<SequencedMessage>,
    },
    /// The connection failed and will deliver nothing further.
    Error(DocRelayError),
}

/// The stream of events of one connection.
pub type DeltaEventStream = UnboundedReceiverStream<DeltaEvent>;

/// A client's live or replayed view of one document's operation stream.
///
/// Events are buffered from the moment the connection exists, so a listener
/// that takes the stream after connecting sees every event, including an
/// initial catch-up batch.
pub trait DeltaConnection: Send + Sync {
    fn document_id(&self) -> &str;

    fn details(&self) -> &ConnectionDetails;

    fn client_id(&self) -> &str {
        &self.details().client_id
    }

    fn existing(&self) -> bool {
        self.details().existing
    }

    fn parent_branch(&self) -> Option<&str> {
        self.details().parent_branch.as_deref()
    }

    fn user(&self) -> Option<&User> {
        self.details().user.as_ref()
    }

    fn initial_messages(&self) -> &[SequencedMessage] {
        &self.details().initial_messages
    }

    /// Hands out the event stream. The stream has a single owner: every call
    /// after the first returns `None`.
    fn take_events(&self) -> Option<DeltaEventStream>;

    /// Sends an operation to the service for sequencing.
    fn submit(&self, message: DocumentMessage);

    fn disconnect(&self);
}

/// The single-consumer event channel shared by connection implementations.
#[derive(Debug)]
pub struct EventChannel {
    receiver: Mutex<Option<mpsc::UnboundedReceiver<DeltaEvent>>>,
}

impl EventChannel {
    /// Creates the channel, returning the sending half for the emitting task.
    pub fn new() -> (Self, mpsc::UnboundedSender<DeltaEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                receiver: Mutex::new(Some(rx)),
            },
            tx,
        )
    }

    pub fn take(&self) -> Option<DeltaEventStream> {
        self.receiver.lock().take().map(UnboundedReceiverStream::new)
    }
}
