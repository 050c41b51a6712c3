//! Wire Protocol
//!
//! The MPD-compatible surface: ACK error codes, the response framing
//! constants, the closed set of supported commands, and the line → command
//! parser built on the tokenizer.

use crate::tokenizer::Tokenizer;
use std::fmt;

/// Protocol version advertised in the greeting.
pub const PROTOCOL_VERSION: &str = "0.17.0";

/// Greeting written to every client on accept, before any command is read.
pub fn greeting() -> String {
    format!("OK MPD {}\n", PROTOCOL_VERSION)
}

pub const LIST_BEGIN: &str = "command_list_begin";
pub const LIST_OK_BEGIN: &str = "command_list_ok_begin";
pub const LIST_END: &str = "command_list_end";

/// Marker emitted after each successful sub-command in OK mode.
pub const LIST_OK_MARKER: &str = "list_OK\n";

/// Commands the daemon answers.
const SUPPORTED_COMMANDS: &[&str] = &[
    "add",
    "addid",
    "commands",
    "currentsong",
    "find",
    "list",
    "listplaylists",
    "lsinfo",
    "notcommands",
    "outputs",
    "pause",
    "playid",
    "playlist",
    "playlistfind",
    "playlistid",
    "playlistinfo",
    "search",
    "stats",
    "status",
    "stop",
    "tagtypes",
    "urlhandlers",
];

/// Commands we knowingly do not answer.
const NOT_SUPPORTED_COMMANDS: &[&str] = &["idle", "noidle"];

/// `command: <name>` listing for the `commands` command.
pub fn supported_commands() -> String {
    command_listing(SUPPORTED_COMMANDS)
}

/// `command: <name>` listing for the `notcommands` command.
pub fn not_supported_commands() -> String {
    command_listing(NOT_SUPPORTED_COMMANDS)
}

fn command_listing(commands: &[&str]) -> String {
    let mut out = String::new();
    for c in commands {
        out.push_str("command: ");
        out.push_str(c);
        out.push('\n');
    }
    out
}

/// The protocol's closed numeric error set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckCode {
    NotList = 1,
    Arg = 2,
    Password = 3,
    Permission = 4,
    UnknownCommand = 5,
    NoExist = 50,
    PlaylistMax = 51,
    System = 52,
    PlaylistLoad = 53,
    UpdateAlready = 54,
    PlayerSync = 55,
    Exist = 56,
}

/// One protocol error: exactly one ACK line on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub code: AckCode,
    /// 0-based index of the failing command within a command list;
    /// 0 for single commands.
    pub index: usize,
    /// The offending command token; empty for unknown commands.
    pub command: String,
    pub message: Option<String>,
}

impl Ack {
    pub fn new(code: AckCode, command: &str) -> Self {
        Self {
            code,
            index: 0,
            command: command.to_string(),
            message: None,
        }
    }

    /// Unknown-command ACK, quoting the offending token.
    pub fn unknown(token: &str) -> Self {
        Self {
            code: AckCode::UnknownCommand,
            index: 0,
            command: String::new(),
            message: Some(format!("unknown command \"{}\"", token)),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn at(mut self, index: usize) -> Self {
        self.index = index;
        self
    }
}

impl fmt::Display for Ack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ACK [{}@{}] {{{}}}",
            self.code as u16, self.index, self.command
        )?;
        if let Some(msg) = &self.message {
            write!(f, " {}", msg)?;
        }
        writeln!(f)
    }
}

/// A `find` command's query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindQuery {
    /// `find album <name>` — resolved through the album-name map, then the
    /// remote catalogue.
    Album { name: String },
    /// `find artist <name> [<album>]` — persistent store only.
    Artist { artist: String, album: Option<String> },
    /// Any other tag type: answered with an empty body.
    Other,
}

/// A `list` command's query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListQuery {
    /// `list artist [<substring>]` — persistent store only.
    Artists { query: String },
    /// `list album artist <name>` — persistent store only.
    AlbumsByArtist { artist: String },
    /// `list album [<group>] <query>` — remote album search.
    Albums { query: String },
    /// Any other tag type: answered with an empty body.
    Other,
}

/// The closed set of dispatchable commands. Position-taking commands carry
/// the raw parameter; the dispatcher decides the error code for a bad
/// integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { id: String },
    AddId { id: String },
    Playlist,
    PlaylistFind { id: String },
    PlaylistInfo { pos: String },
    PlayId { pos: String },
    Stop,
    Pause,
    CurrentSong,
    Status,
    Stats,
    Outputs,
    Commands,
    NotCommands,
    Search { query: String },
    Find(FindQuery),
    List(ListQuery),
    LsInfo,
    ListPlaylists,
    UrlHandlers,
    TagTypes,
    Unknown { token: String },
}

impl Command {
    /// Parses one already-trimmed line. Never fails: anything unrecognized
    /// becomes `Unknown`, carrying the offending token for the ACK payload.
    pub fn parse(line: &str) -> Self {
        let mut tok = Tokenizer::new(line);
        let name = tok.next_param();
        match name.as_str() {
            "add" => Command::Add {
                id: tok.next_param(),
            },
            "addid" => Command::AddId {
                id: tok.next_param(),
            },
            "playlist" => Command::Playlist,
            "playlistfind" => {
                // First parameter is the tag type; this daemon only matches
                // on the file id.
                let _tag = tok.next_param();
                Command::PlaylistFind {
                    id: tok.next_param(),
                }
            }
            "playlistinfo" | "playlistid" => Command::PlaylistInfo {
                pos: tok.next_param(),
            },
            "playid" => Command::PlayId {
                pos: tok.next_param(),
            },
            "stop" => Command::Stop,
            "pause" => Command::Pause,
            "currentsong" => Command::CurrentSong,
            "status" => Command::Status,
            "stats" => Command::Stats,
            "outputs" => Command::Outputs,
            "commands" => Command::Commands,
            "notcommands" => Command::NotCommands,
            "search" => Command::Search {
                query: parse_search_query(&mut tok),
            },
            "find" => Command::Find(parse_find_query(&mut tok)),
            "list" => Command::List(parse_list_query(&mut tok)),
            "lsinfo" => Command::LsInfo,
            "listplaylists" => Command::ListPlaylists,
            "urlhandlers" => Command::UrlHandlers,
            "tagtypes" => Command::TagTypes,
            _ => Command::Unknown { token: name },
        }
    }
}

/// `search <type> <what> [<type> <what> ...]`: the query is the
/// concatenation of the value halves of each pair.
fn parse_search_query(tok: &mut Tokenizer) -> String {
    let _kind = tok.next_param();
    let mut values = Vec::new();
    let mut i = 0usize;
    loop {
        let param = tok.next_param();
        if param.is_empty() {
            break;
        }
        if i % 2 == 0 {
            values.push(param);
        }
        i += 1;
    }
    values.join(" ")
}

fn parse_find_query(tok: &mut Tokenizer) -> FindQuery {
    let kind = tok.next_param();
    match kind.as_str() {
        "album" => FindQuery::Album {
            name: tok.next_param(),
        },
        "artist" => {
            let artist = tok.next_param();
            let album = tok.next_param();
            FindQuery::Artist {
                artist,
                album: if album.is_empty() { None } else { Some(album) },
            }
        }
        _ => FindQuery::Other,
    }
}

fn parse_list_query(tok: &mut Tokenizer) -> ListQuery {
    let tag = tok.next_param();
    match tag.as_str() {
        "artist" => ListQuery::Artists {
            query: tok.next_param(),
        },
        "album" => {
            let first = tok.next_param();
            let second = tok.next_param();
            if first == "artist" && !second.is_empty() {
                ListQuery::AlbumsByArtist { artist: second }
            } else if !second.is_empty() {
                // Grouped form: the group tag is ignored, the value searched.
                ListQuery::Albums { query: second }
            } else if !first.is_empty() {
                ListQuery::Albums { query: first }
            } else {
                ListQuery::Other
            }
        }
        _ => ListQuery::Other,
    }
}
