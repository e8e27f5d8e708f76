//! Error types for the hz codec.
//!
//! Every fallible operation returns a structured error. Low-level stream and
//! tree-grammar failures met while parsing a header are re-wrapped into
//! [`HeaderError`] so callers only need to handle codec-level failures.
//! Broken preconditions (such as a zero word size passed to `compress`) are
//! programming errors and panic instead.

use std::io;

use thiserror::Error;

/// Top-level error type for all codec operations.
///
/// Each variant corresponds to a specific failure domain:
/// - Stream: the underlying reader or writer failed, or ended early
/// - Overflow: a 64-bit counter would exceed its range
/// - Tree: serialized Huffman tree data violates the grammar
/// - Header: compressed header fields are inconsistent or unreadable
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying read failed or the stream ended during a required read
    #[error("stream read failure: {0}")]
    StreamRead(#[source] io::Error),

    /// Underlying write failed
    #[error("stream write failure: {0}")]
    StreamWrite(#[source] io::Error),

    /// A counter (word count, cumulative weight) would exceed `u64::MAX`
    #[error("{0} exceeded maximum")]
    Overflow(&'static str),

    /// Serialized tree is malformed
    #[error("malformed huffman tree: {0}")]
    MalformedTree(#[from] TreeError),

    /// Compressed header is invalid
    #[error("invalid compression header: {0}")]
    InvalidHeader(#[from] HeaderError),
}

/// Serialized Huffman tree grammar violations.
#[derive(Debug, Error)]
pub enum TreeError {
    /// Tag byte is not one of `X`, `D` or `/`
    #[error("unknown element found in serialized tree: {0:02X}")]
    UnknownTag(u8),

    /// Stream ended where a node tag was expected
    #[error("not enough data")]
    NotEnoughData,

    /// Stream ended inside a leaf's word payload
    #[error("couldn't read data word")]
    TruncatedWord,

    /// A leaf was followed by a present left child
    #[error("data node shouldn't have left child")]
    LeafHasLeftChild,

    /// A leaf was followed by a present right child
    #[error("data node shouldn't have right child")]
    LeafHasRightChild,

    /// An internal node had an absent child
    #[error("internal node missing child")]
    InternalMissingChild,
}

/// Compressed header failures.
#[derive(Debug, Error)]
pub enum HeaderError {
    /// Word size field is zero
    #[error("invalid word size: 0")]
    ZeroWordSize,

    /// Leftover byte count is not less than the word size
    #[error("unencoded byte count {len} not less than word size {word_size}")]
    LeftoverTooLarge { len: u8, word_size: u8 },

    /// Word count is non-zero but no tree is present
    #[error("empty huffman tree for {word_count} words")]
    EmptyTree { word_count: u64 },

    /// Word count is zero but a tree is present
    #[error("huffman tree present but word count is 0")]
    UnexpectedTree,

    /// The embedded tree failed to parse
    #[error("{0}")]
    Tree(#[from] TreeError),

    /// A fixed-width field could not be read
    #[error("{0}")]
    Stream(#[source] io::Error),
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tag_display() {
        let err = Error::from(TreeError::UnknownTag(0x41));
        assert_eq!(err.to_string(), "malformed huffman tree: unknown element found in serialized tree: 41");
    }

    #[test]
    fn test_leftover_display() {
        let err = HeaderError::LeftoverTooLarge { len: 4, word_size: 4 };
        assert!(err.to_string().contains("4 not less than word size 4"));
    }

    #[test]
    fn test_header_wraps_tree_error() {
        let err = Error::from(HeaderError::from(TreeError::NotEnoughData));
        assert_eq!(err.to_string(), "invalid compression header: not enough data");
    }

    #[test]
    fn test_overflow_display() {
        let err = Error::Overflow("word count");
        assert_eq!(err.to_string(), "word count exceeded maximum");
    }
}
