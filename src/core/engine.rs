// src/core/engine.rs
use crate::config::Settings;
use crate::core::indexer::Indexer;
use crate::core::query::{DominanceQuery, Matches};
use crate::core::types::IndexSummary;
use crate::error::{AnagramResult, StoreResult};
use crate::persistence::{StoreReader, StoreWriter};
use std::path::Path;
use tracing::{debug, info};

/// Rebuilds the store at `store_path` from the word list at `dictionary_path`.
/// Any previous store there is destroyed first.
pub fn build_index(store_path: &Path, dictionary_path: &Path, settings: &Settings) -> AnagramResult<IndexSummary> {
    debug!(store = %store_path.display(), dictionary = %dictionary_path.display(), "Initializing store");
    let mut store = StoreWriter::initialize(store_path)?;

    let summary = Indexer::new(settings).index_file(&mut store, dictionary_path)?;
    store.finish()?;

    info!(
        lines = summary.lines_read,
        inserted = summary.inserted,
        rejected = summary.rejected,
        "Dictionary indexed"
    );
    Ok(summary)
}

/// Query side of the store; opened once per process, read-only.
pub struct WordFinder {
    store: StoreReader,
}

impl WordFinder {
    pub fn open(store_path: &Path) -> StoreResult<Self> {
        Ok(Self {
            store: StoreReader::open(store_path)?,
        })
    }

    /// Words of exactly `length` letters buildable from `letters`.
    pub fn find_words(&mut self, length: i64, letters: &str) -> StoreResult<Matches<'_>> {
        debug!(store = %self.store.path().display(), length, letters, "Searching store");
        self.store.query(DominanceQuery::new(length, letters))
    }
}
