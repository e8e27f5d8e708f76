//! hz-core: lossless compression with Huffman coding over fixed-size words
//!
//! The input is split into words of `word_size` bytes (1..=255). Each
//! distinct word gets a prefix-free code from a Huffman tree built over word
//! frequencies. The compressed stream is a self-describing header followed by
//! the concatenated codes, packed MSB first.
//!
//! # Architecture
//!
//! - `word`: word and leftover byte types
//! - `persist`: big-endian field and raw byte I/O
//! - `frequency`: first pass word counting
//! - `huffman`: tree construction, code tables, tree serialization
//! - `bitio`: bit-level reader and writer over byte streams
//! - `header`: compressed stream header
//! - `codec`: whole-stream compress and decompress
//!
//! # Design Principles
//!
//! - **Streaming**: nothing but the frequency table and tree is held in memory
//! - **Structured errors**: malformed input is reported, never trusted
//! - **Bounded recursion**: tree walks use explicit stacks, so hostile trees
//!   cannot exhaust the call stack
//!
//! # Example
//!
//! ```
//! let data = b"abracadabra";
//! let packed = hz_core::compress_bytes(data, 1).unwrap();
//! assert_eq!(hz_core::decompress_bytes(&packed).unwrap(), data);
//! ```

pub mod bitio;
pub mod codec;
pub mod error;
pub mod frequency;
pub mod header;
pub mod huffman;
pub mod persist;
pub mod word;

// Re-export commonly used types
pub use codec::{compress, compress_bytes, decompress, decompress_bytes};
pub use error::{Error, HeaderError, Result, TreeError};
pub use word::{WordCount, WordSize};
