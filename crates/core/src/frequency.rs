//! Word frequency analysis.
//!
//! [`FrequencyTable::scan`] consumes a byte stream in `word_size` chunks,
//! counting every complete word and keeping the short tail as [`Leftover`].

use std::collections::HashMap;
use std::io::Read;

use crate::error::{Error, Result};
use crate::persist::read_up_to;
use crate::word::{Leftover, Word, WordCount, WordSize};

/// Occurrence counts for every distinct word in a stream.
///
/// # Invariants
/// - every key is exactly `word_size` bytes
/// - `total_words` is the sum of all counts and never wraps
/// - `leftover.len() < word_size`
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    word_size: WordSize,
    counts: HashMap<Word, WordCount>,
    total_words: WordCount,
    leftover: Leftover,
}

impl FrequencyTable {
    /// Scan `reader` from its current position to end of stream.
    ///
    /// The scan is all-or-nothing: on error no table is produced.
    ///
    /// # Errors
    /// - `Error::StreamRead` if the stream fails before end of stream
    /// - `Error::Overflow` if the word count would exceed `u64::MAX`
    ///
    /// # Panics
    /// If `word_size` is 0.
    pub fn scan<R: Read + ?Sized>(reader: &mut R, word_size: WordSize) -> Result<Self> {
        assert!(word_size > 0, "invalid word size: 0");

        let mut counts: HashMap<Word, WordCount> = HashMap::new();
        let mut total_words: WordCount = 0;
        let mut buf = vec![0u8; usize::from(word_size)];

        let tail_len = loop {
            let filled = read_up_to(reader, &mut buf).map_err(Error::StreamRead)?;
            if filled < buf.len() {
                break filled;
            }
            total_words = total_words
                .checked_add(1)
                .ok_or(Error::Overflow("word count"))?;
            *counts.entry(Word::from(&buf[..])).or_insert(0) += 1;
        };
        buf.truncate(tail_len);

        log::debug!(
            "scanned {} words ({} unique) of size {}, {} leftover bytes",
            total_words,
            counts.len(),
            word_size,
            tail_len
        );

        Ok(Self {
            word_size,
            counts,
            total_words,
            leftover: Leftover::new(buf),
        })
    }

    /// Build a table from explicit counts, with no leftover bytes.
    ///
    /// Zero counts are dropped. Repeated words have their counts summed.
    ///
    /// # Errors
    /// `Error::Overflow` if the total count would exceed `u64::MAX`.
    ///
    /// # Panics
    /// If `word_size` is 0 or a word is not `word_size` bytes long.
    pub fn from_counts<I>(word_size: WordSize, counts: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Word, WordCount)>,
    {
        assert!(word_size > 0, "invalid word size: 0");

        let mut table = HashMap::new();
        let mut total_words: WordCount = 0;
        for (word, count) in counts {
            assert_eq!(word.len(), usize::from(word_size), "word does not match word size");
            if count == 0 {
                continue;
            }
            total_words = total_words
                .checked_add(count)
                .ok_or(Error::Overflow("word count"))?;
            *table.entry(word).or_insert(0) += count;
        }

        Ok(Self {
            word_size,
            counts: table,
            total_words,
            leftover: Leftover::default(),
        })
    }

    pub fn word_size(&self) -> WordSize {
        self.word_size
    }

    /// Sum of all word counts.
    pub fn total_words(&self) -> WordCount {
        self.total_words
    }

    /// Number of distinct words.
    pub fn unique_words(&self) -> usize {
        self.counts.len()
    }

    pub fn leftover(&self) -> &Leftover {
        &self.leftover
    }

    /// Count for `word`, 0 if it never occurred.
    pub fn count(&self, word: &Word) -> WordCount {
        self.counts.get(word).copied().unwrap_or(0)
    }

    /// Iterate `(word, count)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&Word, WordCount)> {
        self.counts.iter().map(|(word, &count)| (word, count))
    }
}
