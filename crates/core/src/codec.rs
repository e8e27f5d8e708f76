//! Whole-stream compression and decompression.
//!
//! Compression makes two passes over the input: one to count words, one to
//! emit their codes. Decompression reads the header, then walks the tree one
//! bit per internal node until the recorded number of words is produced.
//!
//! When the input holds fewer than two distinct words no coded bits are
//! written at all: the header's word count and single-leaf tree are enough
//! to rebuild the data.

use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::bitio::{BitCursor, BitWriter};
use crate::error::{Error, Result};
use crate::frequency::FrequencyTable;
use crate::header::CompressedHeader;
use crate::huffman::{HuffmanTree, Node};
use crate::persist::PersistWrite;
use crate::word::WordSize;

/// Compress everything from the current position of `input` into `output`.
///
/// `input` is read to the end, rewound to where it started, and read again.
///
/// # Errors
/// - `Error::StreamRead` if reading, rewinding, or re-reading `input` fails,
///   including when the input changed between the two passes
/// - `Error::StreamWrite` if writing `output` fails
/// - `Error::Overflow` if the word count or a tree weight overflows
///
/// # Panics
/// If `word_size` is 0.
pub fn compress<R, W>(input: &mut R, output: &mut W, word_size: WordSize) -> Result<()>
where
    R: Read + Seek + ?Sized,
    W: Write + ?Sized,
{
    assert!(word_size > 0, "invalid word size");

    let start = input.stream_position().map_err(Error::StreamRead)?;
    let table = FrequencyTable::scan(input, word_size)?;
    let tree = HuffmanTree::build(&table)?;
    let header = CompressedHeader::new(tree, table.total_words(), table.leftover().clone());
    header.write_to(output)?;

    let codes = header.tree.code_table();
    if codes.len() <= 1 {
        log::debug!("{} distinct words, no coded bits written", codes.len());
        return Ok(());
    }

    input.seek(SeekFrom::Start(start)).map_err(Error::StreamRead)?;
    let mut writer = BitWriter::new(&mut *output);
    let mut buf = vec![0u8; usize::from(word_size)];
    for _ in 0..table.total_words() {
        input.read_exact(&mut buf).map_err(Error::StreamRead)?;
        let code = codes.get(&buf[..]).ok_or_else(|| {
            Error::StreamRead(io::Error::new(
                io::ErrorKind::InvalidData,
                "input changed between passes",
            ))
        })?;
        writer.write_bits(code)?;
    }
    writer.flush()?;

    log::debug!(
        "encoded {} words with {} distinct codes",
        table.total_words(),
        codes.len()
    );
    Ok(())
}

/// Decompress a stream produced by [`compress`] from `input` into `output`.
///
/// Bytes after the last coded bit are not read.
///
/// # Errors
/// - `Error::InvalidHeader` if the header is malformed or inconsistent
/// - `Error::StreamRead` if the coded word stream ends early or fails
/// - `Error::StreamWrite` if writing `output` fails
pub fn decompress<R, W>(input: &mut R, output: &mut W) -> Result<()>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let header = CompressedHeader::read_from(input)?;
    let tree = &header.tree;

    if let Some(root) = tree.root() {
        match tree.node(root) {
            // Sole word: no bits were written, repeat it
            Node::Leaf(word) => {
                for _ in 0..header.total_words {
                    output.write_chars(word.as_bytes())?;
                }
            }
            Node::Internal { .. } => {
                let mut cursor = BitCursor::new(&mut *input);
                for _ in 0..header.total_words {
                    let mut id = root;
                    let word = loop {
                        match tree.node(id) {
                            Node::Leaf(word) => break word,
                            Node::Internal { left, right } => {
                                id = if cursor.next_bit()? { *right } else { *left };
                            }
                        }
                    };
                    output.write_chars(word.as_bytes())?;
                }
                log::trace!("consumed {} coded bits", cursor.bits_consumed());
            }
        }
    }

    output.write_chars(header.leftover.as_bytes())
}

/// Compress an in-memory buffer.
pub fn compress_bytes(data: &[u8], word_size: WordSize) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    compress(&mut io::Cursor::new(data), &mut output, word_size)?;
    Ok(output)
}

/// Decompress an in-memory buffer.
pub fn decompress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    decompress(&mut io::Cursor::new(data), &mut output)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HeaderError;
    use std::io::Cursor;

    #[test]
    fn test_single_word_writes_no_bits() {
        let compressed = compress_bytes(b"aaaa", 1).unwrap();

        let mut expected = vec![1u8];
        expected.extend_from_slice(&4u64.to_be_bytes());
        expected.push(0);
        expected.extend_from_slice(b"Da//");
        assert_eq!(compressed, expected);

        assert_eq!(decompress_bytes(&compressed).unwrap(), b"aaaa");
    }

    #[test]
    fn test_empty_input() {
        let compressed = compress_bytes(b"", 3).unwrap();
        assert_eq!(compressed, [3, 0, 0, 0, 0, 0, 0, 0, 0, 0, b'/']);
        assert!(decompress_bytes(&compressed).unwrap().is_empty());
    }

    #[test]
    fn test_two_words_bit_stream() {
        // "ab" weight 1 goes left (0), "cd" weight 2 goes right (1)
        let compressed = compress_bytes(b"cdabcd", 2).unwrap();
        let header_len = 1 + 8 + 1 + b"XDab//Dcd//".len();
        assert_eq!(&compressed[10..header_len], b"XDab//Dcd//");
        assert_eq!(&compressed[header_len..], [0b1010_0000]);

        assert_eq!(decompress_bytes(&compressed).unwrap(), b"cdabcd");
    }

    #[test]
    fn test_leftover_only() {
        let compressed = compress_bytes(b"xy", 4).unwrap();
        assert_eq!(decompress_bytes(&compressed).unwrap(), b"xy");
    }

    #[test]
    fn test_rewinds_to_starting_position() {
        let mut input = Cursor::new(b"IGNOREhello world".to_vec());
        input.set_position(6);
        let mut compressed = Vec::new();
        compress(&mut input, &mut compressed, 2).unwrap();
        assert_eq!(decompress_bytes(&compressed).unwrap(), b"hello world");
    }

    #[test]
    fn test_truncated_bit_stream() {
        let mut compressed = compress_bytes(b"abcabcabcabd", 1).unwrap();
        compressed.truncate(compressed.len() - 1);
        assert!(matches!(
            decompress_bytes(&compressed),
            Err(Error::StreamRead(_))
        ));
    }

    #[test]
    fn test_invalid_header() {
        assert!(matches!(
            decompress_bytes(&[]),
            Err(Error::InvalidHeader(HeaderError::Stream(_)))
        ));
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut compressed = compress_bytes(b"mississippi", 1).unwrap();
        compressed.extend_from_slice(b"junk");
        assert_eq!(decompress_bytes(&compressed).unwrap(), b"mississippi");
    }

    #[test]
    #[should_panic(expected = "invalid word size")]
    fn test_zero_word_size() {
        let _ = compress_bytes(b"abc", 0);
    }
}
