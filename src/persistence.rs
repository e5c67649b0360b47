// File: src/persistence.rs
//! On-disk word store.
//!
//! A store is a bincode header followed by one frame per word and a final
//! end frame carrying the record count. Writers build the file in a
//! temporary sibling and rename it into place on [`StoreWriter::finish`].

use crate::core::query::{DominanceQuery, Matches};
use crate::core::types::{WordRecord, ALPHABET_SIZE};
use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

const STORE_MAGIC: [u8; 8] = *b"ANAGRIDX";
const STORE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreHeader {
    magic: [u8; 8],
    version: u32,
    alphabet: u32,
}

impl StoreHeader {
    fn current() -> Self {
        Self {
            magic: STORE_MAGIC,
            version: STORE_VERSION,
            alphabet: ALPHABET_SIZE as u32,
        }
    }

    fn validate(&self, path: &Path) -> StoreResult<()> {
        if self.magic != STORE_MAGIC {
            return Err(StoreError::BadMagic { path: path.to_path_buf() });
        }
        if self.version != STORE_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: self.version,
                expected: STORE_VERSION,
            });
        }
        if self.alphabet != ALPHABET_SIZE as u32 {
            return Err(StoreError::AlphabetMismatch {
                found: self.alphabet,
                expected: ALPHABET_SIZE as u32,
            });
        }
        Ok(())
    }
}

/// Frame as read back from disk.
#[derive(Deserialize)]
enum Frame {
    Record(WordRecord),
    End { records: u64 },
}

/// Borrowing twin of [`Frame`]; encodes identically.
#[derive(Serialize)]
enum FrameRef<'a> {
    Record(&'a WordRecord),
    End { records: u64 },
}

/// Maps a word to the fixed-width key of the duplicate index.
type Fingerprint = fn(&str) -> u64;

fn xxh3_fingerprint(word: &str) -> u64 {
    xxh3_64(word.as_bytes())
}

/// Writes a fresh store. Dropping it before [`finish`](Self::finish)
/// discards everything written so far.
///
/// Duplicate detection keeps only a fingerprint and a file offset per word
/// in memory; fingerprint hits are confirmed by reading the earlier record
/// back from the temp file.
pub struct StoreWriter {
    path: PathBuf,
    out: BufWriter<NamedTempFile>,
    lookup: File,
    fingerprint: Fingerprint,
    offsets: HashMap<u64, u64>,
    /// Offsets of words whose fingerprint was already taken by another word.
    collisions: Vec<(u64, u64)>,
    position: u64,
    records: u64,
}

impl StoreWriter {
    /// Destroys whatever is at `path` and starts a new, empty store for it.
    pub fn initialize(path: &Path) -> StoreResult<Self> {
        Self::initialize_with(path, xxh3_fingerprint)
    }

    fn initialize_with(path: &Path, fingerprint: Fingerprint) -> StoreResult<Self> {
        match fs::remove_file(path) {
            Ok(()) => debug!(path = %path.display(), "Removed previous store"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let parent_dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent_dir)?;

        let temp_file = NamedTempFile::new_in(parent_dir)?;
        let lookup = temp_file.reopen()?;
        let mut out = BufWriter::new(temp_file);
        let header = StoreHeader::current();
        bincode::serialize_into(&mut out, &header)?;

        Ok(Self {
            path: path.to_path_buf(),
            out,
            lookup,
            fingerprint,
            offsets: HashMap::new(),
            collisions: Vec::new(),
            position: bincode::serialized_size(&header)?,
            records: 0,
        })
    }

    /// Appends `record`. Empty and already-present words are rejected and
    /// leave the store unchanged.
    pub fn insert(&mut self, record: &WordRecord) -> StoreResult<()> {
        if record.word.is_empty() {
            return Err(StoreError::EmptyWord);
        }

        let key = (self.fingerprint)(&record.word);
        let first = self.offsets.get(&key).copied();
        let mut candidates: Vec<u64> = first.into_iter().collect();
        candidates.extend(
            self.collisions
                .iter()
                .filter(|&&(hash, _)| hash == key)
                .map(|&(_, offset)| offset),
        );
        for offset in candidates {
            if self.word_at(offset)? == record.word {
                return Err(StoreError::DuplicateWord {
                    word: record.word.clone(),
                });
            }
        }

        let frame = FrameRef::Record(record);
        let offset = self.position;
        bincode::serialize_into(&mut self.out, &frame)?;
        self.position += bincode::serialized_size(&frame)?;

        if first.is_some() {
            self.collisions.push((key, offset));
        } else {
            self.offsets.insert(key, offset);
        }
        self.records += 1;
        Ok(())
    }

    /// Reads back the word of the record frame written at `offset`.
    fn word_at(&mut self, offset: u64) -> StoreResult<String> {
        self.out.flush()?;
        self.lookup.seek(SeekFrom::Start(offset))?;
        match bincode::deserialize_from::<_, Frame>(BufReader::new(&mut self.lookup))? {
            Frame::Record(record) => Ok(record.word),
            Frame::End { .. } => Err(StoreError::Corrupt {
                reason: format!("no record at offset {}", offset),
            }),
        }
    }

    pub fn len(&self) -> u64 {
        self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records == 0
    }

    /// Seals the store and moves it to its final path. Returns the record count.
    pub fn finish(mut self) -> StoreResult<u64> {
        let records = self.records;
        bincode::serialize_into(&mut self.out, &FrameRef::End { records })?;
        self.out.flush()?;
        drop(self.lookup);

        let temp_file = self.out.into_inner().map_err(|e| e.into_error())?;
        temp_file.as_file().sync_all()?;
        temp_file.persist(&self.path)?;

        debug!(path = %self.path.display(), records, "Store written");
        Ok(records)
    }
}

/// Read-only handle on a finished store.
pub struct StoreReader {
    path: PathBuf,
    input: BufReader<File>,
    data_start: u64,
}

impl StoreReader {
    pub fn open(path: &Path) -> StoreResult<Self> {
        let file = File::open(path)?;
        let mut input = BufReader::new(file);

        let header: StoreHeader = bincode::deserialize_from(&mut input)
            .map_err(|_| StoreError::BadMagic { path: path.to_path_buf() })?;
        header.validate(path)?;
        let data_start = input.stream_position()?;

        Ok(Self {
            path: path.to_path_buf(),
            input,
            data_start,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Iterates all records from the start, in insertion order.
    pub fn records(&mut self) -> StoreResult<Records<'_>> {
        self.input.seek(SeekFrom::Start(self.data_start))?;
        Ok(Records {
            input: &mut self.input,
            seen: 0,
            done: false,
        })
    }

    /// Lazily yields the words matching `query`.
    pub fn query(&mut self, query: DominanceQuery) -> StoreResult<Matches<'_>> {
        Ok(Matches::new(self.records()?, query))
    }
}

/// Streaming record cursor. Stops for good after the end frame or the first error.
pub struct Records<'a> {
    input: &'a mut BufReader<File>,
    seen: u64,
    done: bool,
}

impl Iterator for Records<'_> {
    type Item = StoreResult<WordRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match bincode::deserialize_from::<_, Frame>(&mut *self.input) {
            Ok(Frame::Record(record)) => {
                self.seen += 1;
                Some(Ok(record))
            }
            Ok(Frame::End { records }) => {
                self.done = true;
                if records == self.seen {
                    None
                } else {
                    Some(Err(StoreError::Corrupt {
                        reason: format!(
                            "end marker counts {} records, found {}",
                            records, self.seen
                        ),
                    }))
                }
            }
            Err(e) => {
                self.done = true;
                let truncated = matches!(
                    &*e,
                    bincode::ErrorKind::Io(io) if io.kind() == ErrorKind::UnexpectedEof
                );
                if truncated {
                    Some(Err(StoreError::Truncated { records: self.seen }))
                } else {
                    Some(Err(StoreError::Codec(e)))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions;
    use tempfile::tempdir;

    fn write_store(path: &Path, words: &[&str]) {
        let mut writer = StoreWriter::initialize(path).unwrap();
        for word in words {
            writer.insert(&WordRecord::new(*word)).unwrap();
        }
        writer.finish().unwrap();
    }

    fn read_words(path: &Path) -> Vec<String> {
        let mut reader = StoreReader::open(path).unwrap();
        let records = reader.records().unwrap();
        records.map(|r| r.unwrap().word).collect()
    }

    #[test]
    fn records_come_back_in_insertion_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("words.store");
        write_store(&path, &["dog", "Cat", "act"]);

        assert_eq!(read_words(&path), vec!["dog", "Cat", "act"]);

        let mut reader = StoreReader::open(&path).unwrap();
        let first = reader.records().unwrap().next().unwrap().unwrap();
        assert_eq!(first, WordRecord::new("dog"));
    }

    #[test]
    fn duplicate_insert_keeps_first_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("words.store");
        let mut writer = StoreWriter::initialize(&path).unwrap();

        writer.insert(&WordRecord::new("cat")).unwrap();
        let err = writer.insert(&WordRecord::new("cat")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateWord { ref word } if word == "cat"));
        assert!(err.is_record_error());
        assert_eq!(writer.len(), 1);
        writer.finish().unwrap();

        assert_eq!(read_words(&path), vec!["cat"]);
    }

    #[test]
    fn empty_word_is_rejected() {
        let dir = tempdir().unwrap();
        let mut writer = StoreWriter::initialize(&dir.path().join("s")).unwrap();
        let err = writer.insert(&WordRecord::new("")).unwrap_err();
        assert!(matches!(err, StoreError::EmptyWord));
        assert!(writer.is_empty());
    }

    #[test]
    fn initialize_destroys_previous_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("words.store");
        write_store(&path, &["alpha", "beta"]);

        let writer = StoreWriter::initialize(&path).unwrap();
        assert!(!path.exists());
        writer.finish().unwrap();

        assert!(read_words(&path).is_empty());
    }

    #[test]
    fn unfinished_writer_leaves_nothing_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("words.store");
        {
            let mut writer = StoreWriter::initialize(&path).unwrap();
            writer.insert(&WordRecord::new("cat")).unwrap();
        }
        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn truncated_store_reports_error_after_intact_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("words.store");
        write_store(&path, &["cat", "dog"]);

        let len = fs::metadata(&path).unwrap().len();
        let file = OpenOptions::new().write(true).open(&path).unwrap();
        file.set_len(len - 1).unwrap();

        let mut reader = StoreReader::open(&path).unwrap();
        let results: Vec<_> = reader.records().unwrap().collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert!(matches!(results[2], Err(StoreError::Truncated { records: 2 })));
    }

    #[test]
    fn foreign_file_is_not_a_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("words.txt");
        fs::write(&path, "cat\ndog\nthis is plainly not a store\n").unwrap();

        let err = StoreReader::open(&path).err().unwrap();
        assert!(matches!(err, StoreError::BadMagic { .. }));
    }

    #[test]
    fn records_can_be_rescanned() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("words.store");
        write_store(&path, &["one", "two"]);

        let mut reader = StoreReader::open(&path).unwrap();
        assert_eq!(reader.records().unwrap().count(), 2);
        assert_eq!(reader.records().unwrap().count(), 2);
    }

    fn write_raw(path: &Path, header: &StoreHeader, words: &[&str], end_count: u64) {
        let mut out = BufWriter::new(File::create(path).unwrap());
        bincode::serialize_into(&mut out, header).unwrap();
        for word in words {
            bincode::serialize_into(&mut out, &FrameRef::Record(&WordRecord::new(*word))).unwrap();
        }
        bincode::serialize_into(&mut out, &FrameRef::End { records: end_count }).unwrap();
        out.flush().unwrap();
    }

    #[test]
    fn newer_version_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("words.store");
        let header = StoreHeader {
            version: STORE_VERSION + 1,
            ..StoreHeader::current()
        };
        write_raw(&path, &header, &["cat"], 1);

        let err = StoreReader::open(&path).err().unwrap();
        assert!(matches!(
            err,
            StoreError::UnsupportedVersion { found, expected } if found == STORE_VERSION + 1 && expected == STORE_VERSION
        ));
    }

    #[test]
    fn other_alphabet_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("words.store");
        let header = StoreHeader {
            alphabet: 33,
            ..StoreHeader::current()
        };
        write_raw(&path, &header, &["cat"], 1);

        let err = StoreReader::open(&path).err().unwrap();
        assert!(matches!(err, StoreError::AlphabetMismatch { found: 33, expected: 26 }));
    }

    #[test]
    fn end_marker_count_mismatch_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("words.store");
        write_raw(&path, &StoreHeader::current(), &["cat", "dog"], 5);

        let mut reader = StoreReader::open(&path).unwrap();
        let results: Vec<_> = reader.records().unwrap().collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert!(matches!(results[2], Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn fingerprint_collisions_are_confirmed_against_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("words.store");
        // Every word shares one fingerprint, so each check reads records back.
        let mut writer = StoreWriter::initialize_with(&path, |_| 7).unwrap();

        for word in ["cat", "act", "tac", "dog"] {
            writer.insert(&WordRecord::new(word)).unwrap();
        }
        for word in ["act", "dog", "cat"] {
            let err = writer.insert(&WordRecord::new(word)).unwrap_err();
            assert!(matches!(err, StoreError::DuplicateWord { .. }));
        }
        writer.insert(&WordRecord::new("god")).unwrap();
        assert_eq!(writer.offsets.len(), 1);
        assert_eq!(writer.collisions.len(), 4);
        writer.finish().unwrap();

        assert_eq!(read_words(&path), vec!["cat", "act", "tac", "dog", "god"]);
    }

    #[test]
    fn duplicate_index_holds_no_word_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("words.store");
        let mut writer = StoreWriter::initialize(&path).unwrap();

        let words: Vec<String> = (0..5000).map(|n| format!("word{:05}{}", n, "x".repeat(n % 40))).collect();
        for word in &words {
            writer.insert(&WordRecord::new(word.as_str())).unwrap();
        }
        // One fixed-width entry per word, regardless of word length.
        assert_eq!(writer.offsets.len() + writer.collisions.len(), words.len());
        let err = writer.insert(&WordRecord::new(words[4321].as_str())).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateWord { .. }));
        writer.finish().unwrap();

        assert_eq!(read_words(&path).len(), words.len());
    }
}
