//! Compressed stream header.
//!
//! # Header Format
//!
//! ```text
//! +-------------------------+
//! | word_size (1)           |  1..=255; 0 is invalid
//! +-------------------------+
//! | total_words (8)         |  u64 big-endian
//! +-------------------------+
//! | leftover_len (1)        |  < word_size
//! +-------------------------+
//! | leftover bytes          |  leftover_len raw bytes
//! | (variable)              |
//! +-------------------------+
//! | huffman tree            |  tagged preorder, see `huffman`
//! | (variable)              |
//! +-------------------------+
//! ```
//!
//! The coded word stream follows directly after the header.

use std::io::{Read, Write};

use crate::error::{Error, HeaderError, Result};
use crate::huffman::HuffmanTree;
use crate::persist::{PersistRead, PersistWrite};
use crate::word::{Leftover, WordCount, WordSize};

/// Everything needed to decode a compressed stream.
#[derive(Debug, Clone)]
pub struct CompressedHeader {
    pub tree: HuffmanTree,
    pub total_words: WordCount,
    pub leftover: Leftover,
}

impl CompressedHeader {
    pub fn new(tree: HuffmanTree, total_words: WordCount, leftover: Leftover) -> Self {
        Self {
            tree,
            total_words,
            leftover,
        }
    }

    pub fn word_size(&self) -> WordSize {
        self.tree.word_size()
    }

    /// Write the header to `out`.
    ///
    /// # Errors
    /// `Error::StreamWrite` if the stream fails.
    ///
    /// # Panics
    /// If the leftover is not shorter than the word size.
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        let word_size = self.word_size();
        let leftover_len = u8::try_from(self.leftover.len())
            .ok()
            .filter(|&len| len < word_size);
        let Some(leftover_len) = leftover_len else {
            panic!(
                "unencoded byte count not less than word size - bytes: {} - max: {}",
                self.leftover.len(),
                usize::from(word_size).saturating_sub(1)
            );
        };

        out.write_byte(word_size)?;
        out.write_u64_be(self.total_words)?;
        out.write_byte(leftover_len)?;
        out.write_chars(self.leftover.as_bytes())?;
        self.tree.write_to(out)
    }

    /// Read and validate a header from `reader`.
    ///
    /// Leaves `reader` positioned at the first byte of the coded word stream.
    ///
    /// # Errors
    /// `Error::InvalidHeader` if a field cannot be read, the word size is 0,
    /// the leftover is too long, the tree is malformed, or the word count and
    /// tree presence disagree.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        Self::parse(reader).map_err(Error::InvalidHeader)
    }

    fn parse<R: Read + ?Sized>(reader: &mut R) -> std::result::Result<Self, HeaderError> {
        let word_size = reader.read_byte().map_err(stream_failure)?;
        if word_size == 0 {
            return Err(HeaderError::ZeroWordSize);
        }
        let total_words = reader.read_u64_be().map_err(stream_failure)?;

        let leftover_len = reader.read_byte().map_err(stream_failure)?;
        if leftover_len >= word_size {
            return Err(HeaderError::LeftoverTooLarge {
                len: leftover_len,
                word_size,
            });
        }
        let leftover = Leftover::new(
            reader
                .read_chars(usize::from(leftover_len))
                .map_err(stream_failure)?,
        );

        let tree = HuffmanTree::parse(reader, word_size).map_err(|err| match err {
            Error::MalformedTree(tree) => HeaderError::Tree(tree),
            other => stream_failure(other),
        })?;

        match (total_words, tree.is_empty()) {
            (0, false) => return Err(HeaderError::UnexpectedTree),
            (n, true) if n != 0 => return Err(HeaderError::EmptyTree { word_count: n }),
            _ => {}
        }

        log::debug!(
            "read header: word size {}, {} words, {} leftover bytes, {} tree nodes",
            word_size,
            total_words,
            leftover.len(),
            tree.len()
        );
        Ok(Self::new(tree, total_words, leftover))
    }
}

fn stream_failure(err: Error) -> HeaderError {
    match err {
        Error::StreamRead(io) | Error::StreamWrite(io) => HeaderError::Stream(io),
        Error::InvalidHeader(header) => header,
        Error::MalformedTree(tree) => HeaderError::Tree(tree),
        Error::Overflow(what) => HeaderError::Stream(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{what} exceeded maximum"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TreeError;
    use crate::word::Word;
    use std::io::Cursor;

    fn single_leaf(word: &[u8]) -> HuffmanTree {
        HuffmanTree::from_weights(word.len() as u8, vec![(Word::from(word), 1)]).unwrap()
    }

    fn read(bytes: &[u8]) -> Result<CompressedHeader> {
        CompressedHeader::read_from(&mut Cursor::new(bytes))
    }

    #[test]
    fn test_write_layout() {
        let header = CompressedHeader::new(single_leaf(b"ab"), 4, Leftover::new(b"z".to_vec()));
        let mut out = Vec::new();
        header.write_to(&mut out).unwrap();

        let mut expected = vec![2u8];
        expected.extend_from_slice(&4u64.to_be_bytes());
        expected.push(1);
        expected.push(b'z');
        expected.extend_from_slice(b"Dab//");
        assert_eq!(out, expected);
    }

    #[test]
    fn test_empty_header_layout() {
        let header = CompressedHeader::new(HuffmanTree::empty(1), 0, Leftover::default());
        let mut out = Vec::new();
        header.write_to(&mut out).unwrap();
        assert_eq!(out, [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, b'/']);
    }

    #[test]
    fn test_round_trip_leaves_stream_after_header() {
        let header = CompressedHeader::new(single_leaf(b"abc"), 7, Leftover::new(b"xy".to_vec()));
        let mut bytes = Vec::new();
        header.write_to(&mut bytes).unwrap();
        let header_len = bytes.len() as u64;
        bytes.extend_from_slice(b"payload");

        let mut input = Cursor::new(bytes);
        let parsed = CompressedHeader::read_from(&mut input).unwrap();
        assert_eq!(parsed.word_size(), 3);
        assert_eq!(parsed.total_words, 7);
        assert_eq!(parsed.leftover.as_bytes(), b"xy");
        assert_eq!(parsed.tree.to_bytes(), b"Dabc//");
        assert_eq!(input.position(), header_len);
    }

    #[test]
    #[should_panic(expected = "not less than word size")]
    fn test_write_rejects_long_leftover() {
        let header = CompressedHeader::new(single_leaf(b"ab"), 1, Leftover::new(b"zz".to_vec()));
        let _ = header.write_to(&mut Vec::new());
    }

    #[test]
    #[should_panic(expected = "not less than word size")]
    fn test_write_rejects_leftover_beyond_u8() {
        let header = CompressedHeader::new(single_leaf(b"ab"), 1, Leftover::new(vec![b'z'; 300]));
        let _ = header.write_to(&mut Vec::new());
    }

    #[test]
    fn test_zero_word_size() {
        let result = read(&[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, b'/']);
        assert!(matches!(
            result,
            Err(Error::InvalidHeader(HeaderError::ZeroWordSize))
        ));
    }

    #[test]
    fn test_leftover_not_less_than_word_size() {
        let mut bytes = vec![2u8];
        bytes.extend_from_slice(&0u64.to_be_bytes());
        bytes.extend_from_slice(&[2, b'a', b'b', b'/']);
        assert!(matches!(
            read(&bytes),
            Err(Error::InvalidHeader(HeaderError::LeftoverTooLarge { len: 2, word_size: 2 }))
        ));
    }

    #[test]
    fn test_word_count_requires_tree() {
        let mut bytes = vec![1u8];
        bytes.extend_from_slice(&5u64.to_be_bytes());
        bytes.extend_from_slice(&[0, b'/']);
        assert!(matches!(
            read(&bytes),
            Err(Error::InvalidHeader(HeaderError::EmptyTree { word_count: 5 }))
        ));
    }

    #[test]
    fn test_tree_requires_word_count() {
        let mut bytes = vec![1u8];
        bytes.extend_from_slice(&0u64.to_be_bytes());
        bytes.extend_from_slice(&[0, b'D', b'a', b'/', b'/']);
        assert!(matches!(
            read(&bytes),
            Err(Error::InvalidHeader(HeaderError::UnexpectedTree))
        ));
    }

    #[test]
    fn test_malformed_tree_is_wrapped() {
        let mut bytes = vec![1u8];
        bytes.extend_from_slice(&1u64.to_be_bytes());
        bytes.extend_from_slice(&[0, b'?']);
        assert!(matches!(
            read(&bytes),
            Err(Error::InvalidHeader(HeaderError::Tree(TreeError::UnknownTag(b'?'))))
        ));
    }

    #[test]
    fn test_truncated_fields_are_wrapped() {
        assert!(matches!(
            read(&[]),
            Err(Error::InvalidHeader(HeaderError::Stream(_)))
        ));
        assert!(matches!(
            read(&[1, 0, 0, 0]),
            Err(Error::InvalidHeader(HeaderError::Stream(_)))
        ));

        let mut bytes = vec![4u8];
        bytes.extend_from_slice(&0u64.to_be_bytes());
        bytes.extend_from_slice(&[3, b'a']);
        assert!(matches!(
            read(&bytes),
            Err(Error::InvalidHeader(HeaderError::Stream(_)))
        ));
    }
}
