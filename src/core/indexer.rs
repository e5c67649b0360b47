// src/core/indexer.rs
use crate::config::Settings;
use crate::core::types::{IndexSummary, WordRecord};
use crate::error::{AnagramError, AnagramResult};
use crate::persistence::StoreWriter;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{info, warn};

/// Streams a newline-delimited word list into a store, one line at a time.
pub struct Indexer {
    progress_interval: u64,
}

impl Indexer {
    pub fn new(settings: &Settings) -> Self {
        Self {
            progress_interval: settings.progress_interval,
        }
    }

    pub fn index_file(&self, store: &mut StoreWriter, path: &Path) -> AnagramResult<IndexSummary> {
        let file = File::open(path).map_err(|source| AnagramError::DictionaryOpen {
            path: path.to_path_buf(),
            source,
        })?;
        self.index(store, BufReader::new(file))
    }

    /// Inserts every line of `reader`. A rejected word is logged and counted,
    /// never fatal; store I/O failures and read errors are.
    pub fn index<R: BufRead>(&self, store: &mut StoreWriter, mut reader: R) -> AnagramResult<IndexSummary> {
        let mut summary = IndexSummary::default();
        let mut line = Vec::new();

        loop {
            line.clear();
            let read = reader
                .read_until(b'\n', &mut line)
                .map_err(|source| AnagramError::DictionaryRead {
                    line: summary.lines_read + 1,
                    source,
                })?;
            if read == 0 {
                break;
            }
            strip_terminator(&mut line);
            summary.lines_read += 1;

            let record = WordRecord::new(String::from_utf8_lossy(&line));
            if self.reports_progress_at(summary.lines_read) {
                info!(words_read = summary.lines_read, current = %record.word, "Indexing progress");
            }

            match store.insert(&record) {
                Ok(()) => summary.inserted += 1,
                Err(e) if e.is_record_error() => {
                    warn!(word = %record.word, error = %e, "Error adding word");
                    summary.rejected += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(summary)
    }

    /// Whether a progress event is due after `lines_read` lines.
    fn reports_progress_at(&self, lines_read: u64) -> bool {
        self.progress_interval > 0 && lines_read % self.progress_interval == 0
    }
}

fn strip_terminator(line: &mut Vec<u8>) {
    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    }
}
