//! Playlist Model
//!
//! Ordered sequence of track ids plus the current-position cursor.
//! Pure state: no I/O, no knowledge of the player or the catalogue.
//! Autoplay (resolving and starting the next track) lives on the daemon,
//! which serializes access to this state behind one mutex.

use crate::error::{CirrusError, CirrusResult};
use std::fmt;

/// The daemon's single playlist.
#[derive(Debug, Default)]
pub struct Playlist {
    tracks: Vec<String>,
    /// Cursor into `tracks`; `None` until something has played.
    position: Option<usize>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a track and returns the new entry's index.
    pub fn add_track(&mut self, id: &str) -> usize {
        self.tracks.push(id.to_string());
        self.tracks.len() - 1
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Track id at `pos`, or `OutOfRange`.
    pub fn track_at_position(&self, pos: usize) -> CirrusResult<&str> {
        self.tracks
            .get(pos)
            .map(String::as_str)
            .ok_or(CirrusError::OutOfRange(pos))
    }

    /// Index of the first entry matching `id`, if any.
    pub fn track_position(&self, id: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t == id)
    }

    /// Track id under the cursor. A fresh cursor points at the first entry.
    /// Fails with `EmptyPlaylist` when nothing has been added.
    pub fn current_track(&self) -> CirrusResult<&str> {
        if self.tracks.is_empty() {
            return Err(CirrusError::EmptyPlaylist);
        }
        let pos = self.position.unwrap_or(0);
        Ok(&self.tracks[pos])
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn set_position(&mut self, pos: usize) {
        if pos < self.tracks.len() {
            self.position = Some(pos);
        }
    }

    /// The entry the cursor would advance to, if there is one.
    pub fn peek_next(&self) -> Option<&str> {
        let next = match self.position {
            Some(pos) => pos + 1,
            None => 0,
        };
        self.tracks.get(next).map(String::as_str)
    }

    /// Moves the cursor forward. Callers only do this once the next track's
    /// stream has actually started.
    pub fn advance(&mut self) {
        let next = match self.position {
            Some(pos) => pos + 1,
            None => 0,
        };
        if next < self.tracks.len() {
            self.position = Some(next);
        }
    }
}

impl fmt::Display for Playlist {
    /// Wire-format listing: one `<index>:file: <id>` line per entry.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pos, track) in self.tracks.iter().enumerate() {
            writeln!(f, "{}:file: {}", pos, track)?;
        }
        Ok(())
    }
}
