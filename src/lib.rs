// src/lib.rs

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod persistence;

pub use crate::config::Settings;
pub use crate::core::engine::{build_index, WordFinder};
pub use crate::core::letters::compute;
pub use crate::core::query::DominanceQuery;
pub use crate::core::types::{IndexSummary, LetterVector, WordRecord, ALPHABET_SIZE};
pub use crate::error::{AnagramError, StoreError};
