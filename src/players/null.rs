//! Null Player
//!
//! Tracks transport state without producing sound. Used on hosts with no
//! audio device and throughout the test suite.

use super::{AudioPlayer, PlayerEvent, PlayerState};
use crate::error::CirrusResult;
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

struct Inner {
    state: PlayerState,
    started: Option<Instant>,
    /// URLs handed to `play`, kept for assertions in tests.
    played: Vec<String>,
}

pub struct NullPlayer {
    inner: Mutex<Inner>,
    events: UnboundedSender<PlayerEvent>,
}

impl NullPlayer {
    pub fn new() -> (Self, UnboundedReceiver<PlayerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let player = Self {
            inner: Mutex::new(Inner {
                state: PlayerState::Stopped,
                started: None,
                played: Vec::new(),
            }),
            events: tx,
        };
        (player, rx)
    }

    /// Simulate the current stream running out, as a real backend would
    /// report it.
    pub fn finish_stream(&self) {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.state = PlayerState::Stopped;
            inner.started = None;
        }
        let _ = self.events.send(PlayerEvent::EndOfStream);
    }

    /// Every URL that has been handed to `play`, oldest first.
    pub fn played_urls(&self) -> Vec<String> {
        self.inner.lock().unwrap().played.clone()
    }
}

#[async_trait]
impl AudioPlayer for NullPlayer {
    async fn play(&self, url: &str) -> CirrusResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.state = PlayerState::Playing;
        inner.started = Some(Instant::now());
        inner.played.push(url.to_string());
        Ok(())
    }

    async fn pause(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.state == PlayerState::Playing {
            inner.state = PlayerState::Stopped;
            inner.started = None;
        }
    }

    async fn stop(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.state = PlayerState::Stopped;
        inner.started = None;
    }

    async fn state(&self) -> PlayerState {
        self.inner.lock().unwrap().state
    }

    async fn position(&self) -> Duration {
        let inner = self.inner.lock().unwrap();
        inner
            .started
            .map(|s| s.elapsed())
            .unwrap_or(Duration::ZERO)
    }
}
