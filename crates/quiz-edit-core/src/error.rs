use std::io;
use std::path::{Path, PathBuf};

use quiz_config::ConfigError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    NotFound = 1,
    Rejected = 2,
    InvalidArguments = 3,
    Io = 4,
    InvalidInput = 5,
    Validation = 6,
}

impl ExitCode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Success),
            1 => Some(Self::NotFound),
            2 => Some(Self::Rejected),
            3 => Some(Self::InvalidArguments),
            4 => Some(Self::Io),
            5 => Some(Self::InvalidInput),
            6 => Some(Self::Validation),
            _ => None,
        }
    }
}

/// Why a selection event was refused. The block is never modified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error("no question block is loaded")]
    NoBlock,

    #[error("block {index} has no selectable options: {reason}")]
    NonStandard { index: usize, reason: String },

    #[error("option {letter} is out of range for block {index} ({count} options)")]
    OutOfRange {
        index: usize,
        letter: char,
        count: usize,
    },

    #[error("'{0}' is not an option key (expected 1-4 or a letter)")]
    InvalidKey(String),
}

/// Rejected navigation input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no question blocks are loaded")]
    Empty,

    #[error("'{0}' is not a block number")]
    NotANumber(String),

    #[error("block {index} is out of range (1-{count})")]
    OutOfRange { index: usize, count: usize },
}

#[derive(Debug, Error)]
pub enum EditError {
    #[error("no question blocks found")]
    NotFound,

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("i/o error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Select(#[from] SelectError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EditError {
    /// Adapter for `map_err` that attaches `path` to an I/O failure.
    pub fn io(path: &Path) -> impl FnOnce(io::Error) -> EditError + '_ {
        move |source| EditError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::NotFound => ExitCode::NotFound,
            Self::InvalidArguments(_) | Self::Session(_) => ExitCode::InvalidArguments,
            Self::Io { .. } => ExitCode::Io,
            Self::InvalidInput(_) => ExitCode::InvalidInput,
            Self::Select(_) => ExitCode::Rejected,
            Self::Validation(_) | Self::Config(_) => ExitCode::Validation,
        }
    }
}

pub type EditResult<T> = Result<T, EditError>;
