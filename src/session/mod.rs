pub mod events;
pub mod round_trip;
pub mod settings;
pub mod state;
pub mod surface;

pub use events::{EventSink, SessionEvent, Wake};
pub use round_trip::{
    InputSource, RoundTripGate, RoundTripGuard, RoundTripPhase, RoundTripRequest, RoundTripStats,
};
pub use settings::{SharedVoiceSettings, VoiceSettings};
pub use state::{SessionLink, SessionState};
pub use surface::{NullSurface, TranscriptSurface};
