//! Cirrus Error Types
//!
//! Centralized error handling for the daemon.

use thiserror::Error;

/// Central error type for Cirrus
#[derive(Error, Debug)]
pub enum CirrusError {
    #[error("catalogue error: {0}")]
    Catalogue(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("player error: {0}")]
    Player(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("playlist position {0} does not exist")]
    OutOfRange(usize),

    #[error("playlist is empty")]
    EmptyPlaylist,

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Store(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Cirrus operations
pub type CirrusResult<T> = Result<T, CirrusError>;
