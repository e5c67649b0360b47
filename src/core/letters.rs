// src/core/letters.rs
use crate::core::types::{slot, LetterVector};

/// Computes the letter count and letter vector of `text`.
/// Non-letters are skipped, so this never fails; `""` yields `(0, zeros)`.
pub fn compute(text: &str) -> (u32, LetterVector) {
    let mut vector = LetterVector::default();
    let mut length: u32 = 0;
    for c in text.chars() {
        if let Some(idx) = slot(c) {
            vector.add(idx);
            length = length.saturating_add(1);
        }
    }
    (length, vector)
}
