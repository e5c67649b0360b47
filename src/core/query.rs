// src/core/query.rs
use crate::core::letters::compute;
use crate::core::types::{LetterVector, WordRecord};
use crate::error::StoreResult;
use crate::persistence::Records;

/// Exact length plus per-letter upper bounds.
///
/// A record matches when its length equals `target_length` and none of its
/// letter counts exceeds the count available in the query letters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DominanceQuery {
    target_length: i64,
    available: LetterVector,
    available_mask: u32,
}

impl DominanceQuery {
    /// Only the letters of `letters` matter; its own length is not used.
    pub fn new(target_length: i64, letters: &str) -> Self {
        let (_, available) = compute(letters);
        Self {
            target_length,
            available,
            available_mask: available.mask(),
        }
    }

    pub fn target_length(&self) -> i64 {
        self.target_length
    }

    pub fn available(&self) -> &LetterVector {
        &self.available
    }

    pub fn matches(&self, record: &WordRecord) -> bool {
        if i64::from(record.length) != self.target_length {
            return false;
        }
        // Any letter the query lacks entirely rules the record out.
        if record.mask & !self.available_mask != 0 {
            return false;
        }
        record.counts.is_covered_by(&self.available)
    }
}

/// Words of a store that satisfy a [`DominanceQuery`], produced as the
/// records are read. An error ends the sequence.
pub struct Matches<'a> {
    records: Records<'a>,
    query: DominanceQuery,
}

impl<'a> Matches<'a> {
    pub fn new(records: Records<'a>, query: DominanceQuery) -> Self {
        Self { records, query }
    }
}

impl Iterator for Matches<'_> {
    type Item = StoreResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        for record in self.records.by_ref() {
            match record {
                Ok(record) if self.query.matches(&record) => return Some(Ok(record.word)),
                Ok(_) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}
