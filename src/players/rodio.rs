//! Rodio Player
//!
//! Audio backend built on a rodio sink. The output stream handle is not
//! `Send`, so a dedicated thread owns the device and the sink; the async
//! side talks to it over a channel and keeps the transport clock itself.
//! The thread polls the sink to detect end-of-stream and reports it on the
//! event channel.

use super::{AudioPlayer, PlayerEvent, PlayerState};
use crate::error::{CirrusError, CirrusResult};
use async_trait::async_trait;
use rodio::{Decoder, OutputStream, Sink};
use std::io::Cursor;
use std::sync::mpsc::{self as std_mpsc, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

/// How often the audio thread checks the sink for end-of-stream.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

enum AudioCommand {
    Play(Vec<u8>),
    Pause,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transport {
    Playing,
    Paused,
    Stopped,
}

struct Clock {
    transport: Transport,
    started: Option<Instant>,
    accumulated: Duration,
}

pub struct RodioPlayer {
    commands: std_mpsc::Sender<AudioCommand>,
    clock: Arc<Mutex<Clock>>,
    http: reqwest::Client,
}

impl RodioPlayer {
    /// Opens the default audio output. Fails if no device is available.
    pub fn new() -> CirrusResult<(Self, UnboundedReceiver<PlayerEvent>)> {
        let (cmd_tx, cmd_rx) = std_mpsc::channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (init_tx, init_rx) = std_mpsc::channel();

        let clock = Arc::new(Mutex::new(Clock {
            transport: Transport::Stopped,
            started: None,
            accumulated: Duration::ZERO,
        }));
        let thread_clock = clock.clone();

        std::thread::Builder::new()
            .name("cirrus-audio".to_string())
            .spawn(move || audio_thread(cmd_rx, event_tx, init_tx, thread_clock))?;

        init_rx
            .recv()
            .map_err(|_| CirrusError::Player("audio thread died during startup".to_string()))?
            .map_err(CirrusError::Player)?;

        Ok((
            Self {
                commands: cmd_tx,
                clock,
                http: reqwest::Client::new(),
            },
            event_rx,
        ))
    }

    fn send(&self, command: AudioCommand) -> CirrusResult<()> {
        self.commands
            .send(command)
            .map_err(|_| CirrusError::Player("audio thread is gone".to_string()))
    }
}

#[async_trait]
impl AudioPlayer for RodioPlayer {
    async fn play(&self, url: &str) -> CirrusResult<()> {
        // The whole stream is fetched up front; catalogue stream URLs are
        // single files, not endless radio.
        let bytes = self.http.get(url).send().await?.error_for_status()?.bytes().await?;
        debug!("fetched {} bytes for playback", bytes.len());
        self.send(AudioCommand::Play(bytes.to_vec()))?;

        let mut clock = self.clock.lock().unwrap();
        clock.transport = Transport::Playing;
        clock.started = Some(Instant::now());
        clock.accumulated = Duration::ZERO;
        Ok(())
    }

    async fn pause(&self) {
        let mut clock = self.clock.lock().unwrap();
        if clock.transport == Transport::Playing {
            if self.send(AudioCommand::Pause).is_ok() {
                if let Some(started) = clock.started.take() {
                    clock.accumulated += started.elapsed();
                }
                clock.transport = Transport::Paused;
            }
        }
    }

    async fn stop(&self) {
        let _ = self.send(AudioCommand::Stop);
        let mut clock = self.clock.lock().unwrap();
        clock.transport = Transport::Stopped;
        clock.started = None;
        clock.accumulated = Duration::ZERO;
    }

    async fn state(&self) -> PlayerState {
        // Paused reports stopped on the wire.
        match self.clock.lock().unwrap().transport {
            Transport::Playing => PlayerState::Playing,
            Transport::Paused | Transport::Stopped => PlayerState::Stopped,
        }
    }

    async fn position(&self) -> Duration {
        let clock = self.clock.lock().unwrap();
        match clock.transport {
            Transport::Playing => {
                clock.accumulated + clock.started.map(|s| s.elapsed()).unwrap_or(Duration::ZERO)
            }
            Transport::Paused => clock.accumulated,
            Transport::Stopped => Duration::ZERO,
        }
    }
}

fn audio_thread(
    commands: std_mpsc::Receiver<AudioCommand>,
    events: UnboundedSender<PlayerEvent>,
    init: std_mpsc::Sender<Result<(), String>>,
    clock: Arc<Mutex<Clock>>,
) {
    let (stream, handle) = match OutputStream::try_default() {
        Ok(pair) => pair,
        Err(e) => {
            let _ = init.send(Err(format!("no audio output: {}", e)));
            return;
        }
    };
    let sink = match Sink::try_new(&handle) {
        Ok(sink) => sink,
        Err(e) => {
            let _ = init.send(Err(format!("could not create sink: {}", e)));
            return;
        }
    };
    let _ = init.send(Ok(()));
    // `stream` must outlive the sink or playback goes silent.
    let _stream = stream;

    let mut has_source = false;
    loop {
        match commands.recv_timeout(POLL_INTERVAL) {
            Ok(AudioCommand::Play(bytes)) => {
                sink.stop();
                match Decoder::new(Cursor::new(bytes)) {
                    Ok(source) => {
                        sink.append(source);
                        sink.play();
                        has_source = true;
                    }
                    Err(e) => {
                        warn!("could not decode stream: {}", e);
                        has_source = false;
                        let mut clock = clock.lock().unwrap();
                        clock.transport = Transport::Stopped;
                        clock.started = None;
                        clock.accumulated = Duration::ZERO;
                    }
                }
            }
            Ok(AudioCommand::Pause) => sink.pause(),
            Ok(AudioCommand::Stop) => {
                sink.stop();
                has_source = false;
            }
            Err(RecvTimeoutError::Timeout) => {
                if has_source && sink.empty() {
                    has_source = false;
                    {
                        let mut clock = clock.lock().unwrap();
                        clock.transport = Transport::Stopped;
                        clock.started = None;
                        clock.accumulated = Duration::ZERO;
                    }
                    let _ = events.send(PlayerEvent::EndOfStream);
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}
