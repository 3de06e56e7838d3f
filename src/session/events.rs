use super::round_trip::RoundTripPhase;
use crate::messages::{Message, Speaker};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::error;

/// Wakes the thread that owns the session so it drains the queue
///
/// Called from whichever thread posted the event.
pub trait Wake: Send + Sync {
    fn wake(&self);
}

/// Updates posted by round-trips for the UI thread to apply
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Append(Message),
    Phase(RoundTripPhase),
    /// The round-trip released the gate
    Finished,
}

/// Sending half of the session event queue
///
/// Clones share one waker slot, so a waker installed later also reaches
/// sinks already handed to workers.
#[derive(Clone)]
pub struct EventSink {
    tx: Sender<SessionEvent>,
    waker: Arc<RwLock<Option<Arc<dyn Wake>>>>,
}

impl fmt::Debug for EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink")
            .field("queued", &self.tx.len())
            .field("waker", &self.waker.read().is_some())
            .finish()
    }
}

pub fn event_queue() -> (EventSink, Receiver<SessionEvent>) {
    let (tx, rx) = unbounded();
    let sink = EventSink {
        tx,
        waker: Arc::new(RwLock::new(None)),
    };
    (sink, rx)
}

impl EventSink {
    pub fn post(&self, event: SessionEvent) {
        if let Err(e) = self.tx.send(event) {
            error!("Session event queue closed, dropping {:?}", e.into_inner());
            return;
        }
        if let Some(waker) = self.waker.read().as_ref() {
            waker.wake();
        }
    }

    pub(crate) fn set_waker(&self, waker: Arc<dyn Wake>) {
        *self.waker.write() = Some(waker);
    }

    pub fn append(&self, speaker: Speaker, text: impl Into<String>) {
        self.post(SessionEvent::Append(Message::new(speaker, text)));
    }

    pub fn status(&self, text: impl Into<String>) {
        self.append(Speaker::System, text);
    }

    pub fn phase(&self, phase: RoundTripPhase) {
        self.post(SessionEvent::Phase(phase));
    }
}
