//! Single-flight gate for round-trips
//!
//! A round-trip is one user action carried through capture, transcription,
//! generation and synthesis. At most one may be in flight; the gate holds it
//! and the [`RoundTripGuard`] hands it back on every exit path.

use super::events::{EventSink, SessionEvent};
use crate::{MurmurError, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Typed,
    Voice,
}

/// Visible progress of the current round-trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundTripPhase {
    #[default]
    Idle,
    Listening,
    Transcribing,
    Generating,
    Synthesizing,
}

impl RoundTripPhase {
    pub fn indicator(&self) -> Option<&'static str> {
        match self {
            RoundTripPhase::Idle => None,
            RoundTripPhase::Listening => Some("Listening..."),
            RoundTripPhase::Transcribing => Some("Recognizing..."),
            RoundTripPhase::Generating => Some("Thinking..."),
            RoundTripPhase::Synthesizing => Some("Speaking..."),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoundTripRequest {
    pub id: Uuid,
    pub source: InputSource,
    pub input_text: Option<String>,
    pub started_at: Instant,
}

/// Begin/end counters, for checking that every begin was paired with an end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoundTripStats {
    pub begun: u64,
    pub ended: u64,
}

impl RoundTripStats {
    pub fn in_flight(&self) -> u64 {
        self.begun - self.ended
    }
}

#[derive(Debug, Default)]
struct GateInner {
    slot: Mutex<Option<RoundTripRequest>>,
    begun: AtomicU64,
    ended: AtomicU64,
}

#[derive(Debug, Clone, Default)]
pub struct RoundTripGate {
    inner: Arc<GateInner>,
}

impl RoundTripGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the gate, or fail with [`MurmurError::Busy`]
    pub fn try_begin(
        &self,
        source: InputSource,
        input_text: Option<String>,
        events: EventSink,
    ) -> Result<RoundTripGuard> {
        let mut slot = self.inner.slot.lock();
        if let Some(current) = slot.as_ref() {
            debug!(
                "Rejecting {:?} action, round-trip {} in flight for {:?}",
                source,
                current.id,
                current.started_at.elapsed()
            );
            return Err(MurmurError::Busy);
        }

        let request = RoundTripRequest {
            id: Uuid::new_v4(),
            source,
            input_text,
            started_at: Instant::now(),
        };
        let id = request.id;
        *slot = Some(request);
        self.inner.begun.fetch_add(1, Ordering::SeqCst);
        debug!("Round-trip {} started ({:?})", id, source);

        Ok(RoundTripGuard {
            gate: self.clone(),
            events,
            id,
            source,
            released: false,
        })
    }

    pub fn is_busy(&self) -> bool {
        self.inner.slot.lock().is_some()
    }

    pub fn current(&self) -> Option<RoundTripRequest> {
        self.inner.slot.lock().clone()
    }

    pub fn stats(&self) -> RoundTripStats {
        RoundTripStats {
            begun: self.inner.begun.load(Ordering::SeqCst),
            ended: self.inner.ended.load(Ordering::SeqCst),
        }
    }

    fn release(&self, id: Uuid) -> Option<Duration> {
        let mut slot = self.inner.slot.lock();
        match slot.as_ref() {
            Some(current) if current.id == id => {
                let elapsed = current.started_at.elapsed();
                *slot = None;
                self.inner.ended.fetch_add(1, Ordering::SeqCst);
                Some(elapsed)
            }
            _ => {
                warn!("Round-trip {} released a gate it did not hold", id);
                None
            }
        }
    }
}

/// Ownership of the gate for one round-trip
///
/// Dropping the guard ends the round-trip, so early returns and panics
/// unwinding through the worker still release it.
#[derive(Debug)]
pub struct RoundTripGuard {
    gate: RoundTripGate,
    events: EventSink,
    id: Uuid,
    source: InputSource,
    released: bool,
}

impl RoundTripGuard {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn source(&self) -> InputSource {
        self.source
    }

    pub fn end(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        // Finished must be queued before the gate opens, otherwise a new
        // round-trip's first phase could be overwritten by this Finished.
        self.events.post(SessionEvent::Finished);
        if let Some(elapsed) = self.gate.release(self.id) {
            debug!("Round-trip {} ended after {:?}", self.id, elapsed);
        }
    }
}

impl Drop for RoundTripGuard {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::events::event_queue;

    #[test]
    fn test_second_begin_is_busy() {
        let (events, _rx) = event_queue();
        let gate = RoundTripGate::new();

        let guard = gate
            .try_begin(InputSource::Typed, Some("hi".into()), events.clone())
            .unwrap();
        let second = gate.try_begin(InputSource::Voice, None, events.clone());
        assert!(matches!(second, Err(MurmurError::Busy)));

        guard.end();
        assert!(!gate.is_busy());
        assert!(gate.try_begin(InputSource::Voice, None, events).is_ok());
    }

    #[test]
    fn test_drop_releases_once() {
        let (events, rx) = event_queue();
        let gate = RoundTripGate::new();
        {
            let _guard = gate.try_begin(InputSource::Voice, None, events).unwrap();
            assert!(gate.is_busy());
        }
        assert!(!gate.is_busy());
        assert_eq!(gate.stats(), RoundTripStats { begun: 1, ended: 1 });

        let finished = rx
            .try_iter()
            .filter(|e| matches!(e, SessionEvent::Finished))
            .count();
        assert_eq!(finished, 1);
    }

    #[test]
    fn test_panicking_holder_releases_gate() {
        let (events, _rx) = event_queue();
        let gate = RoundTripGate::new();
        let guard = gate.try_begin(InputSource::Voice, None, events).unwrap();

        let result = std::thread::spawn(move || {
            let _guard = guard;
            panic!("provider blew up");
        })
        .join();

        assert!(result.is_err());
        assert!(!gate.is_busy());
        assert_eq!(gate.stats().in_flight(), 0);
    }

    #[test]
    fn test_current_exposes_request() {
        let (events, _rx) = event_queue();
        let gate = RoundTripGate::new();
        let guard = gate
            .try_begin(InputSource::Typed, Some("hello".into()), events)
            .unwrap();

        let current = gate.current().unwrap();
        assert_eq!(current.id, guard.id());
        assert_eq!(current.input_text.as_deref(), Some("hello"));
    }
}
