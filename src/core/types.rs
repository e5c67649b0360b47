// src/core/types.rs
use serde::{Deserialize, Serialize};

/// Number of letter slots in a vector: the 26 Latin letters.
pub const ALPHABET_SIZE: usize = 26;

/// Per-letter occurrence counts of a string, case-insensitive.
/// Only ASCII letters contribute; everything else is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LetterVector {
    counts: [u32; ALPHABET_SIZE],
}

impl LetterVector {
    pub fn from_counts(counts: [u32; ALPHABET_SIZE]) -> Self {
        Self { counts }
    }

    pub fn counts(&self) -> &[u32; ALPHABET_SIZE] {
        &self.counts
    }

    /// Occurrences of `letter`, or 0 if it is not an ASCII letter.
    pub fn count(&self, letter: char) -> u32 {
        slot(letter).map_or(0, |idx| self.counts[idx])
    }

    /// Sum of all slots, i.e. the number of letters in the source text.
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Bit `k` is set iff slot `k` is non-zero.
    pub fn mask(&self) -> u32 {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c > 0)
            .fold(0, |mask, (idx, _)| mask | (1 << idx))
    }

    /// Component-wise `self <= other`.
    pub fn is_covered_by(&self, other: &LetterVector) -> bool {
        self.counts
            .iter()
            .zip(other.counts.iter())
            .all(|(mine, available)| mine <= available)
    }

    pub(crate) fn add(&mut self, idx: usize) {
        self.counts[idx] = self.counts[idx].saturating_add(1);
    }
}

/// Maps an ASCII letter to its slot, ignoring case.
pub(crate) fn slot(c: char) -> Option<usize> {
    if c.is_ascii_alphabetic() {
        Some((c.to_ascii_lowercase() as u8 - b'a') as usize)
    } else {
        None
    }
}

/// A dictionary entry as held in the store.
/// `length == counts.total()` holds for every record built with [`WordRecord::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRecord {
    pub word: String,
    pub length: u32,
    /// Presence bitset of `counts`, used to reject candidates cheaply.
    pub mask: u32,
    pub counts: LetterVector,
}

impl WordRecord {
    pub fn new(word: impl Into<String>) -> Self {
        let word = word.into();
        let (length, counts) = crate::core::letters::compute(&word);
        Self {
            word,
            length,
            mask: counts.mask(),
            counts,
        }
    }
}

/// Outcome of one indexing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexSummary {
    pub lines_read: u64,
    pub inserted: u64,
    pub rejected: u64,
}
