//! Words and leftover bytes.
//!
//! A [`Word`] is the atomic compression symbol: exactly `word_size` bytes.
//! [`Leftover`] holds the tail of the input that does not fill a whole word;
//! it is stored unencoded in the header.

use std::borrow::Borrow;
use std::fmt;

/// Number of bytes that make up a word (1..=255).
pub type WordSize = u8;

/// Total number of words in a stream.
pub type WordCount = u64;

/// Immutable fixed-size byte sequence. Equality and hashing are by value.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Word(Box<[u8]>);

impl Word {
    /// Wrap `bytes` as a word.
    ///
    /// # Panics
    /// If `bytes` is empty or longer than 255 bytes.
    pub fn new(bytes: impl Into<Box<[u8]>>) -> Self {
        let bytes = bytes.into();
        assert!(
            !bytes.is_empty() && bytes.len() <= usize::from(WordSize::MAX),
            "word length {} outside 1..=255",
            bytes.len()
        );
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for Word {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Borrow<[u8]> for Word {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for Word {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word({:?})", self.0.escape_ascii().to_string())
    }
}

/// Trailing bytes shorter than one word, never encoded.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Leftover(Vec<u8>);

impl Leftover {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Leftover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Leftover({:?})", self.0.escape_ascii().to_string())
    }
}
