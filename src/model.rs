//! Domain Model
//!
//! Catalogue entities as the protocol engine sees them, independent of the
//! remote service's wire shapes. Conversions from those shapes live in the
//! `catalogue` module.

use std::fmt;

/// A single track from the remote catalogue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    /// Primary catalogue id (may be empty for tracks only known by
    /// their network id)
    pub id: String,
    /// Secondary "network" id used when the primary id is absent
    pub nid: String,
    pub title: String,
    pub album: String,
    pub artist: String,
    pub album_id: String,
    pub duration_ms: u64,
}

impl Track {
    /// The id clients address this track by: the primary id, or the
    /// network id when the primary is absent. At least one is non-empty
    /// for any track handed to a client.
    pub fn file_id(&self) -> &str {
        if self.id.is_empty() {
            &self.nid
        } else {
            &self.id
        }
    }
}

impl fmt::Display for Track {
    /// MPD-response-formatted representation: the fixed 5-line record.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "file: {}", self.file_id())?;
        writeln!(f, "Time: {}", self.duration_ms / 1000)?;
        writeln!(f, "Artist: {}", self.artist)?;
        writeln!(f, "Title: {}", self.title)?;
        writeln!(f, "Album: {}", self.album)
    }
}

/// An album, optionally carrying its ordered track listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub year: String,
    pub tracks: Vec<Track>,
}

/// An artist name, projected from distinct album artists in the store.
/// Never persisted on its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Artist {
    pub name: String,
}
