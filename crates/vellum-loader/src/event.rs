//! Broadcast of pipeline progress.

use tokio::sync::broadcast;
use vellum_types::{FileId, NodeId};

use crate::outcome::{LoadOutcome, LoadPhase};

/// What happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadEventKind {
    /// The pipeline entered a non-terminal phase.
    Phase(LoadPhase),
    /// The pipeline terminated.
    Finished(LoadOutcome),
}

/// One progress notification for one placeholder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadEvent {
    pub file_id: FileId,
    pub placeholder: NodeId,
    pub kind: LoadEventKind,
}

/// A broadcast channel receiver for load events.
pub type EventStream = broadcast::Receiver<LoadEvent>;

/// Fan-out of load events to any number of subscribers.
#[derive(Clone, Debug)]
pub struct EventBus {
    sender: broadcast::Sender<LoadEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> EventStream {
        self.sender.subscribe()
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: LoadEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
