//! Persistent Catalogue Store
//!
//! SQLite index of previously fetched catalogue entities. This is the
//! system of record behind the in-memory cache: rows are immutable
//! catalogue facts, upserted on first fetch and never expired.
//! Last-writer-wins on primary key conflicts.

use crate::error::CirrusResult;
use crate::model::{Album, Artist, Track};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// Schema version stamped into `PRAGMA user_version` at creation time.
const SCHEMA_VERSION: i64 = 1;

pub struct Store {
    db_path: PathBuf,
}

impl Store {
    /// Opens (and if needed creates) the store at `db_path`.
    pub fn open(db_path: &Path) -> CirrusResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let store = Self {
            db_path: db_path.to_path_buf(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn conn(&self) -> CirrusResult<Connection> {
        Ok(Connection::open(&self.db_path)?)
    }

    fn init_db(&self) -> CirrusResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS tracks (
                id TEXT NOT NULL PRIMARY KEY,
                nid TEXT,
                title TEXT NOT NULL,
                album TEXT NOT NULL,
                artist TEXT NOT NULL,
                album_id TEXT NOT NULL,
                duration INTEGER
            )",
            [],
        )?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS albums (
                id TEXT NOT NULL PRIMARY KEY,
                name TEXT NOT NULL,
                artist TEXT NOT NULL,
                year TEXT
            )",
            [],
        )?;
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version == 0 {
            conn.execute_batch(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))?;
        }
        Ok(())
    }

    pub fn upsert_track(&self, track: &Track) -> CirrusResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO tracks (id, nid, title, album, artist, album_id, duration)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                track.id,
                track.nid,
                track.title,
                track.album,
                track.artist,
                track.album_id,
                track.duration_ms,
            ],
        )?;
        Ok(())
    }

    pub fn upsert_album(&self, album: &Album) -> CirrusResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO albums (id, name, artist, year) VALUES (?1, ?2, ?3, ?4)",
            params![album.id, album.name, album.artist, album.year],
        )?;
        Ok(())
    }

    pub fn track(&self, id: &str) -> CirrusResult<Option<Track>> {
        let conn = self.conn()?;
        let track = conn
            .query_row(
                "SELECT id, nid, title, album, artist, album_id, duration
                 FROM tracks WHERE id = ?1",
                [id],
                |row| {
                    Ok(Track {
                        id: row.get(0)?,
                        nid: row.get(1)?,
                        title: row.get(2)?,
                        album: row.get(3)?,
                        artist: row.get(4)?,
                        album_id: row.get(5)?,
                        duration_ms: row.get(6)?,
                    })
                },
            )
            .optional()?;
        Ok(track)
    }

    /// Distinct non-empty artist names from the album index, matched by
    /// substring (wildcard both ends, SQLite's ASCII-case-blind LIKE).
    pub fn artists(&self, query: &str) -> CirrusResult<Vec<Artist>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT(artist) FROM albums WHERE artist LIKE ?1 AND artist <> ''",
        )?;
        let rows = stmt.query_map([format!("%{}%", query)], |row| {
            Ok(Artist { name: row.get(0)? })
        })?;
        let mut artists = Vec::new();
        for row in rows {
            artists.push(row?);
        }
        Ok(artists)
    }

    /// Albums recorded for an exact artist name.
    pub fn albums_by_artist(&self, artist: &str) -> CirrusResult<Vec<Album>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, name, artist, year FROM albums WHERE artist = ?1")?;
        let rows = stmt.query_map([artist], |row| {
            Ok(Album {
                id: row.get(0)?,
                name: row.get(1)?,
                artist: row.get(2)?,
                year: row.get(3)?,
                tracks: Vec::new(),
            })
        })?;
        let mut albums = Vec::new();
        for row in rows {
            albums.push(row?);
        }
        Ok(albums)
    }

    /// Tracks by an exact artist name, album matched by substring.
    pub fn tracks_by_artist(&self, artist: &str, album: &str) -> CirrusResult<Vec<Track>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, nid, title, album, artist, album_id, duration
             FROM tracks WHERE artist = ?1 AND album LIKE ?2",
        )?;
        let rows = stmt.query_map(params![artist, format!("%{}%", album)], |row| {
            Ok(Track {
                id: row.get(0)?,
                nid: row.get(1)?,
                title: row.get(2)?,
                album: row.get(3)?,
                artist: row.get(4)?,
                album_id: row.get(5)?,
                duration_ms: row.get(6)?,
            })
        })?;
        let mut tracks = Vec::new();
        for row in rows {
            tracks.push(row?);
        }
        Ok(tracks)
    }
}
