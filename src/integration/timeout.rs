//! Bounded provider calls
//!
//! A provider that hangs must not hold the round-trip gate forever. The call
//! runs on a helper thread and the caller waits at most `limit`; an abandoned
//! helper is left to finish on its own and its result is discarded.

use crate::{MurmurError, Result};
use crossbeam_channel::{bounded, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::warn;

pub fn call_with_timeout<T, F>(provider: &'static str, limit: Option<Duration>, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let Some(limit) = limit else {
        return f();
    };

    let (tx, rx) = bounded(1);
    thread::Builder::new()
        .name(format!("{}-call", provider.replace(' ', "-")))
        .spawn(move || {
            // Receiver is gone if the caller already timed out
            let _ = tx.send(f());
        })
        .map_err(|e| MurmurError::ChannelError(format!("Failed to spawn {} call: {}", provider, e)))?;

    match rx.recv_timeout(limit) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            warn!("{} did not answer within {:?}, abandoning call", provider, limit);
            Err(MurmurError::ProviderTimeout {
                provider,
                timeout_ms: limit.as_millis() as u64,
            })
        }
        Err(RecvTimeoutError::Disconnected) => Err(MurmurError::ChannelError(format!(
            "{} call ended without a result",
            provider
        ))),
    }
}
