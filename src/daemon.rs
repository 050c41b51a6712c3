//! Command Dispatcher
//!
//! The daemon's shared session state and the state machine mapping each
//! tokenized command to a playlist mutation, a content lookup, player
//! control, or a protocol error. One `Daemon` is shared by every
//! connection; all of them observe and mutate the same playlist and
//! transport, matching the reference protocol's single-audio-output
//! assumption.

use crate::command_list::CommandList;
use crate::content::ContentProvider;
use crate::error::CirrusError;
use crate::players::{AudioPlayer, PlayerEvent, PlayerState};
use crate::playlist::Playlist;
use crate::protocol::{self, Ack, AckCode, Command, FindQuery, ListQuery};
use crate::tokenizer::Tokenizer;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub struct Daemon {
    content: Arc<ContentProvider>,
    player: Arc<dyn AudioPlayer>,
    /// The single global playlist. This mutex is the serialization
    /// boundary between command handling and end-of-stream autoplay.
    playlist: Mutex<Playlist>,
    command_list: Mutex<CommandList>,
    started_at: Instant,
}

impl Daemon {
    pub fn new(content: Arc<ContentProvider>, player: Arc<dyn AudioPlayer>) -> Self {
        Self {
            content,
            player,
            playlist: Mutex::new(Playlist::new()),
            command_list: Mutex::new(CommandList::new()),
            started_at: Instant::now(),
        }
    }

    /// Feeds one raw input line through the session state machine.
    /// Returns the bytes to write back, or `None` when the line was
    /// swallowed (buffered into an open command list, or a list-begin).
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let line = line.trim();
        let first = Tokenizer::new(line).next_param();

        let mut list = self.command_list.lock().await;
        if list.is_active() {
            if first == protocol::LIST_END {
                let ok_mode = list.ok_mode();
                let commands = list.take();
                drop(list);
                return Some(self.process_list(commands, ok_mode).await);
            }
            list.add(line);
            return None;
        }

        match first.as_str() {
            protocol::LIST_BEGIN => {
                list.begin(false);
                None
            }
            protocol::LIST_OK_BEGIN => {
                list.begin(true);
                None
            }
            _ => {
                drop(list);
                match self.process_command(line).await {
                    Ok(out) => Some(format!("{}OK\n", out)),
                    Err(ack) => Some(ack.to_string()),
                }
            }
        }
    }

    /// Replays a terminated command list. Replay stops at the first failing
    /// sub-command; whatever the earlier ones produced is still returned,
    /// followed by that one ACK. In OK mode every success is annotated with
    /// a `list_OK` marker.
    async fn process_list(&self, commands: Vec<String>, ok_mode: bool) -> String {
        let mut out = String::new();
        for (index, line) in commands.iter().enumerate() {
            match self.process_command(line).await {
                Ok(chunk) => {
                    out.push_str(&chunk);
                    if ok_mode {
                        out.push_str(protocol::LIST_OK_MARKER);
                    }
                }
                Err(ack) => {
                    out.push_str(&ack.at(index).to_string());
                    return out;
                }
            }
        }
        out.push_str("OK\n");
        out
    }

    /// Dispatches one command. On success the returned string holds the
    /// complete response body (possibly empty); on failure nothing is
    /// produced besides the ACK, so callers can cleanly distinguish the
    /// two.
    pub async fn process_command(&self, line: &str) -> Result<String, Ack> {
        let token = Tokenizer::new(line).next_param();
        let command = Command::parse(line);
        debug!("dispatching {:?}", command);

        let mut out = String::new();
        match command {
            Command::Add { id } => {
                self.playlist.lock().await.add_track(&id);
            }

            Command::AddId { id } => {
                let index = self.playlist.lock().await.add_track(&id);
                let _ = writeln!(out, "Id: {}", index);
            }

            Command::Playlist => {
                let playlist = self.playlist.lock().await;
                out.push_str(&playlist.to_string());
            }

            Command::PlaylistFind { id } => {
                let pos = self
                    .playlist
                    .lock()
                    .await
                    .track_position(&id)
                    .ok_or_else(|| Ack::new(AckCode::NoExist, &token))?;
                let track = self
                    .content
                    .find_track(&id)
                    .await
                    .map_err(|_| Ack::new(AckCode::NoExist, &token))?;
                out.push_str(&track.to_string());
                let _ = writeln!(out, "Pos: {}", pos);
                let _ = writeln!(out, "Id: {}", pos);
            }

            Command::PlaylistInfo { pos } => {
                let pos: usize = pos
                    .parse()
                    .map_err(|_| Ack::new(AckCode::NoExist, &token))?;
                let id = {
                    let playlist = self.playlist.lock().await;
                    playlist
                        .track_at_position(pos)
                        .map(str::to_string)
                        .map_err(|_| Ack::new(AckCode::NoExist, &token))?
                };
                let track = self
                    .content
                    .find_track(&id)
                    .await
                    .map_err(|_| Ack::new(AckCode::NoExist, &token))?;
                out.push_str(&track.to_string());
                let _ = writeln!(out, "Pos: {}", pos);
                let _ = writeln!(out, "Id: {}", pos);
            }

            Command::PlayId { pos } => {
                let pos: usize = pos.parse().map_err(|_| Ack::new(AckCode::Arg, &token))?;
                let id = {
                    let playlist = self.playlist.lock().await;
                    playlist
                        .track_at_position(pos)
                        .map(str::to_string)
                        .map_err(|_| Ack::new(AckCode::NoExist, &token))?
                };
                // Streaming URLs are short-lived; always resolve fresh.
                let url = self
                    .content
                    .stream_url(&id)
                    .await
                    .map_err(|_| Ack::new(AckCode::NoExist, &token))?;
                self.player
                    .play(&url)
                    .await
                    .map_err(|_| Ack::new(AckCode::System, &token))?;
                self.playlist.lock().await.set_position(pos);
            }

            Command::Stop => self.player.stop().await,

            Command::Pause => self.player.pause().await,

            Command::CurrentSong => {
                if self.player.state().await == PlayerState::Playing {
                    let id = {
                        let playlist = self.playlist.lock().await;
                        playlist
                            .current_track()
                            .map(str::to_string)
                            .map_err(|_| Ack::new(AckCode::NoExist, &token))?
                    };
                    let track = self
                        .content
                        .find_track(&id)
                        .await
                        .map_err(|_| Ack::new(AckCode::NoExist, &token))?;
                    out.push_str(&track.to_string());
                }
            }

            Command::Status => {
                let (length, position) = {
                    let playlist = self.playlist.lock().await;
                    (playlist.len(), playlist.position())
                };
                out.push_str("playlist: 0\n");
                let _ = writeln!(out, "playlistlength: {}", length);
                match self.player.state().await {
                    PlayerState::Playing => {
                        out.push_str("state: play\n");
                        let song = position.unwrap_or(0);
                        let _ = writeln!(out, "song: {}", song);
                        let _ = writeln!(out, "songid: {}", song);
                        let elapsed = self.player.position().await.as_secs();
                        let _ = writeln!(out, "elapsed: {}.00", elapsed);
                        let _ = writeln!(out, "time: {}:00", elapsed);
                    }
                    PlayerState::Stopped => out.push_str("state: stop\n"),
                }
            }

            Command::Stats => {
                let _ = writeln!(out, "uptime: {}", self.started_at.elapsed().as_secs());
            }

            Command::Outputs => {
                out.push_str("outputid: 0\n");
                out.push_str("outputname: Cirrus Output\n");
                out.push_str("outputenabled: 1\n");
            }

            Command::Commands => out.push_str(&protocol::supported_commands()),

            Command::NotCommands => out.push_str(&protocol::not_supported_commands()),

            Command::Search { query } => {
                let tracks = self
                    .content
                    .find_tracks(&query)
                    .await
                    .map_err(|e| ack_for(&e, &token))?;
                for track in &tracks {
                    out.push_str(&track.to_string());
                }
            }

            Command::Find(FindQuery::Album { name }) => {
                // Album names resolve through ids learned from earlier
                // searches; a name we have never seen is an empty result,
                // not an error.
                if let Some(album_id) = self.content.album_id_for_name(&name) {
                    let album = self
                        .content
                        .find_album(&album_id, true)
                        .await
                        .map_err(|e| ack_for(&e, &token))?;
                    for track in &album.tracks {
                        out.push_str(&track.to_string());
                    }
                }
            }

            Command::Find(FindQuery::Artist { artist, album }) => {
                let tracks = self
                    .content
                    .find_tracks_by_artist(&artist, album.as_deref().unwrap_or(""));
                for track in &tracks {
                    out.push_str(&track.to_string());
                }
            }

            Command::Find(FindQuery::Other) => {}

            Command::List(ListQuery::Artists { query }) => {
                for artist in self.content.list_artists(&query) {
                    let _ = writeln!(out, "Artist: {}", artist.name);
                }
            }

            Command::List(ListQuery::AlbumsByArtist { artist }) => {
                for album in self.content.find_albums_by_artist_name(&artist) {
                    let _ = writeln!(out, "Album: {}", album.name);
                    if !album.year.is_empty() {
                        let _ = writeln!(out, "Date: {}", album.year);
                    }
                }
            }

            Command::List(ListQuery::Albums { query }) => {
                let albums = self
                    .content
                    .find_albums(&query)
                    .await
                    .map_err(|e| ack_for(&e, &token))?;
                for album in &albums {
                    let _ = writeln!(out, "Album: {}", album.name);
                }
            }

            Command::List(ListQuery::Other) => {}

            Command::LsInfo => {
                let tracks = self
                    .content
                    .user_tracks()
                    .await
                    .map_err(|e| ack_for(&e, &token))?;
                for track in &tracks {
                    out.push_str(&track.to_string());
                }
            }

            // The catalogue boundary has no playlist listing; answered
            // empty for client compatibility.
            Command::ListPlaylists => {}

            Command::UrlHandlers | Command::TagTypes => {}

            Command::Unknown { token } => return Err(Ack::unknown(&token)),
        }

        Ok(out)
    }

    /// Drives autoplay from the player's event stream. Spawned once at
    /// startup; runs for the life of the daemon.
    pub async fn autoplay(self: Arc<Self>, mut events: UnboundedReceiver<PlayerEvent>) {
        while let Some(event) = events.recv().await {
            match event {
                PlayerEvent::EndOfStream => self.play_next().await,
            }
        }
    }

    /// Starts the track after the cursor, if there is one. The cursor only
    /// advances once the player has accepted the stream; any resolution
    /// failure leaves cursor and playback untouched. Fail-soft by design:
    /// the wire protocol has no way to report mid-autoplay errors to a
    /// client that is not polling.
    pub async fn play_next(&self) {
        let mut playlist = self.playlist.lock().await;
        let Some(next) = playlist.peek_next().map(str::to_string) else {
            debug!("end of playlist, nothing to autoplay");
            return;
        };
        match self.content.stream_url(&next).await {
            Ok(url) => match self.player.play(&url).await {
                Ok(()) => {
                    playlist.advance();
                    info!("autoplay advanced to {}", next);
                }
                Err(e) => warn!("autoplay: player rejected {}: {}", next, e),
            },
            Err(e) => warn!("autoplay: no stream for {}: {}", next, e),
        }
    }
}

/// Nearest ACK code for an internal error.
fn ack_for(err: &CirrusError, token: &str) -> Ack {
    let code = match err {
        CirrusError::NotFound(_) => AckCode::NoExist,
        _ => AckCode::System,
    };
    Ack::new(code, token)
}
