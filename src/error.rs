//! Error types for level loading, the level library, sessions and configuration.

use std::io;
use std::path::PathBuf;

use crate::types::Phase;

#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("Level error: {0}")]
    Level(#[from] LevelError),

    #[error("Library error: {0}")]
    Library(#[from] LibraryError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Level text could not become a playable grid.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LevelError {
    #[error("Malformed level: no rows")]
    Empty,

    #[error("Malformed level: row {row} has {found} columns, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error(
        "Malformed level: header declares {declared_rows}x{declared_cols}, grid is {rows}x{cols}"
    )]
    HeaderMismatch {
        declared_rows: usize,
        declared_cols: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Level has no player start")]
    MissingPlayerStart,

    #[error("Level has {0} player starts, expected exactly one")]
    MultiplePlayerStarts(usize),
}

impl LevelError {
    /// True for the shape errors (empty, ragged, bad header).
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::Empty | Self::Ragged { .. } | Self::HeaderMismatch { .. }
        )
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LibraryError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Level not found: {0}")]
    NotFound(String),

    #[error("Invalid level name: {0:?}")]
    InvalidName(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Cannot {action} while {from}")]
    InvalidTransition { from: Phase, action: &'static str },

    #[error("No level loaded")]
    NoLevel,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Tick speed {0}s is outside 0.1..=1.0")]
    SpeedOutOfRange(f64),

    #[error("Invalid value {value:?} for {key}")]
    InvalidEnv { key: &'static str, value: String },
}

pub type GameResult<T> = Result<T, GameError>;
