//! Error types for the word store, the indexer and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while writing or reading the word store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store encoding failed: {0}")]
    Codec(#[from] bincode::Error),

    /// File at the store path is not a word store
    #[error("Not a word store: {path}")]
    BadMagic { path: PathBuf },

    #[error("Unsupported store version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Store alphabet has {found} letters (expected {expected})")]
    AlphabetMismatch { found: u32, expected: u32 },

    /// Record stream ended without its end marker
    #[error("Store is truncated after {records} records")]
    Truncated { records: u64 },

    #[error("Store is corrupt: {reason}")]
    Corrupt { reason: String },

    #[error("Word already present: {word}")]
    DuplicateWord { word: String },

    #[error("Word must not be empty")]
    EmptyWord,

    #[error("Failed to move store into place: {0}")]
    Persist(#[from] tempfile::PersistError),
}

impl StoreError {
    /// True for rejections that concern a single record and leave the store usable.
    pub fn is_record_error(&self) -> bool {
        matches!(self, StoreError::DuplicateWord { .. } | StoreError::EmptyWord)
    }
}

/// Top-level error for indexing and querying runs
#[derive(Debug, Error)]
pub enum AnagramError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to open dictionary '{path}': {source}")]
    DictionaryOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read dictionary at line {line}: {source}")]
    DictionaryRead { line: u64, source: std::io::Error },

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },
}

pub type StoreResult<T> = Result<T, StoreError>;
pub type AnagramResult<T> = Result<T, AnagramError>;
