//! Playback Boundary
//!
//! The capability the daemon needs from an audio backend: start a stream
//! URL, pause, stop, report state and position, and notify end-of-stream.
//! Backends push [`PlayerEvent`]s over a channel handed out at
//! construction; the daemon's autoplay task consumes them.

use crate::error::CirrusResult;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::warn;

pub mod null;
pub mod rodio;

pub use self::null::NullPlayer;
pub use self::rodio::RodioPlayer;

/// Transport state as the protocol reports it. Paused playback reports
/// `Stopped`, matching the reference daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Playing,
    Stopped,
}

/// Asynchronous notifications from the audio backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    EndOfStream,
}

#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Start playing the given stream URL, replacing whatever was playing.
    async fn play(&self, url: &str) -> CirrusResult<()>;

    /// Pause if playing; no-op otherwise.
    async fn pause(&self);

    /// Stop playback and drop the current stream.
    async fn stop(&self);

    async fn state(&self) -> PlayerState;

    /// Elapsed time within the current stream.
    async fn position(&self) -> Duration;
}

/// Build the audio backend named in the configuration. Falls back to the
/// no-op player when the audio device cannot be opened, so a headless host
/// still serves the protocol.
pub fn get_player(
    backend: &str,
) -> (Arc<dyn AudioPlayer>, UnboundedReceiver<PlayerEvent>) {
    match backend.to_lowercase().as_str() {
        "null" | "none" => {
            let (player, events) = NullPlayer::new();
            (Arc::new(player), events)
        }
        _ => match RodioPlayer::new() {
            Ok((player, events)) => (Arc::new(player), events),
            Err(e) => {
                warn!("audio output unavailable ({}), using null player", e);
                let (player, events) = NullPlayer::new();
                (Arc::new(player), events)
            }
        },
    }
}
