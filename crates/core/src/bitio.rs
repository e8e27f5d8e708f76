//! Bit-granular reading and writing over byte streams.
//!
//! [`BitCursor`] pulls single bits from a reader and [`BitWriter`] pushes bit
//! sequences to a writer. Both operate in MSB-first (most significant bit
//! first) order.
//!
//! # Shared position
//!
//! The partial byte and bit offset live in a session owned jointly by every
//! handle opened on the same stream. A handle is created over a stream with
//! `new`; further handles on that stream are obtained with `clone`. Any
//! handle continues exactly where the previous one stopped, bit for bit. The
//! session, and with it the stream, is released when the last handle drops.
//!
//! # Padding Rules
//! - BitWriter: `flush` pads an incomplete byte with trailing zeros
//! - BitCursor: padding bits are indistinguishable from data; the caller
//!   tracks how many symbols to decode
//!
//! # Example
//! ```
//! use bitvec::prelude::*;
//! use hz_core::bitio::{BitCursor, BitWriter};
//!
//! let mut out = Vec::new();
//! let mut writer = BitWriter::new(&mut out);
//! writer.write_bits(bits![u8, Msb0; 1, 0, 1]).unwrap();
//! writer.write_bits(bits![u8, Msb0; 1, 1]).unwrap();
//! writer.flush().unwrap();
//! drop(writer);
//! assert_eq!(out, [0b1011_1000]);
//!
//! let mut cursor = BitCursor::new(&out[..]);
//! assert!(cursor.next_bit().unwrap());
//! assert!(!cursor.next_bit().unwrap());
//! ```

use std::cell::RefCell;
use std::fmt;
use std::io::{Read, Write};
use std::rc::Rc;

use bitvec::prelude::*;

use crate::error::{Error, Result};

/// Bits per byte; a fresh window holds this many unread bits.
const BYTE_BITS: u8 = 8;

/// Read position shared by all cursors on one stream.
///
/// # Invariants
/// - `bits_left` is in `0..=8`; 0 means the next bit needs a new byte
struct ReadSession<R> {
    reader: R,
    /// Byte currently being consumed
    current: u8,
    /// Unread bits remaining in `current`
    bits_left: u8,
    /// Total bits handed out, for diagnostics
    consumed: u64,
}

/// Reads bits MSB-first from a byte stream, one byte at a time.
///
/// Clones share the read position: after one handle reads bit *k*, the next
/// read through any clone yields bit *k + 1*.
pub struct BitCursor<R> {
    session: Rc<RefCell<ReadSession<R>>>,
}

impl<R: Read> BitCursor<R> {
    /// Open a cursor over `reader`, starting at its next unread byte.
    pub fn new(reader: R) -> Self {
        Self {
            session: Rc::new(RefCell::new(ReadSession {
                reader,
                current: 0,
                bits_left: 0,
                consumed: 0,
            })),
        }
    }

    /// Read the next bit (`true` = 1).
    ///
    /// # Errors
    /// `Error::StreamRead` if a new byte is needed and the stream fails or
    /// is exhausted.
    pub fn next_bit(&mut self) -> Result<bool> {
        let mut guard = self.session.borrow_mut();
        let session = &mut *guard;
        if session.bits_left == 0 {
            let mut byte = [0u8; 1];
            session.reader.read_exact(&mut byte).map_err(Error::StreamRead)?;
            session.current = byte[0];
            session.bits_left = BYTE_BITS;
        }
        session.bits_left -= 1;
        session.consumed += 1;
        Ok(session.current & (1 << session.bits_left) != 0)
    }
}

impl<R> BitCursor<R> {
    /// Total bits read through all handles of this session.
    pub fn bits_consumed(&self) -> u64 {
        self.session.borrow().consumed
    }

    /// Number of live handles sharing this session.
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.session)
    }
}

impl<R> Clone for BitCursor<R> {
    fn clone(&self) -> Self {
        Self {
            session: Rc::clone(&self.session),
        }
    }
}

impl<R> fmt::Debug for BitCursor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let session = self.session.borrow();
        f.debug_struct("BitCursor")
            .field("bits_left", &session.bits_left)
            .field("consumed", &session.consumed)
            .field("handles", &Rc::strong_count(&self.session))
            .finish()
    }
}

/// Write position shared by all writers on one stream.
///
/// # Invariants
/// - `bit_count` is always < 8; a full byte is emitted immediately
struct WriteSession<W> {
    writer: W,
    /// Accumulator for the current partial byte (MSB-aligned)
    buffer: u8,
    /// Number of bits in `buffer` (0-7)
    bit_count: u8,
}

impl<W: Write> WriteSession<W> {
    fn commit_byte(&mut self) -> Result<()> {
        let byte = self.buffer;
        self.buffer = 0;
        self.bit_count = 0;
        self.writer.write_all(&[byte]).map_err(Error::StreamWrite)
    }
}

impl<W> Drop for WriteSession<W> {
    fn drop(&mut self) {
        if self.bit_count > 0 {
            log::warn!("bit writer dropped with {} unflushed bits", self.bit_count);
        }
    }
}

/// Writes bits MSB-first to a byte stream.
///
/// Full bytes go to the stream as soon as they are complete. The final
/// partial byte is only written by [`flush`](Self::flush), which must be
/// called before the last handle is dropped or those bits are lost.
pub struct BitWriter<W: Write> {
    session: Rc<RefCell<WriteSession<W>>>,
}

impl<W: Write> BitWriter<W> {
    /// Open a writer over `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            session: Rc::new(RefCell::new(WriteSession {
                writer,
                buffer: 0,
                bit_count: 0,
            })),
        }
    }

    /// Append `bits` in order.
    ///
    /// # Errors
    /// `Error::StreamWrite` if emitting a completed byte fails.
    pub fn write_bits(&mut self, bits: &BitSlice<u8, Msb0>) -> Result<()> {
        let mut guard = self.session.borrow_mut();
        let session = &mut *guard;
        for bit in bits.iter().by_vals() {
            let shift = BYTE_BITS - 1 - session.bit_count;
            session.buffer |= u8::from(bit) << shift;
            session.bit_count += 1;
            if session.bit_count == BYTE_BITS {
                session.commit_byte()?;
            }
        }
        Ok(())
    }

    /// Append a single bit.
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        let mut one = BitVec::<u8, Msb0>::with_capacity(1);
        one.push(bit);
        self.write_bits(&one)
    }

    /// Emit any partially filled byte, zero-padding its low bits.
    ///
    /// Subsequent writes start a fresh byte.
    pub fn flush(&mut self) -> Result<()> {
        let mut session = self.session.borrow_mut();
        if session.bit_count > 0 {
            session.commit_byte()?;
        }
        Ok(())
    }

    /// Bits accumulated but not yet emitted (0-7).
    pub fn pending_bits(&self) -> u8 {
        self.session.borrow().bit_count
    }

    /// Number of live handles sharing this session.
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.session)
    }
}

impl<W: Write> Clone for BitWriter<W> {
    fn clone(&self) -> Self {
        Self {
            session: Rc::clone(&self.session),
        }
    }
}

impl<W: Write> fmt::Debug for BitWriter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let session = self.session.borrow();
        f.debug_struct("BitWriter")
            .field("bit_count", &session.bit_count)
            .field("handles", &Rc::strong_count(&self.session))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_bits<R: Read>(cursor: &mut BitCursor<R>, count: usize) -> Vec<bool> {
        (0..count).map(|_| cursor.next_bit().unwrap()).collect()
    }

    #[test]
    fn test_write_read_single_byte() {
        let mut out = Vec::new();
        let mut writer = BitWriter::new(&mut out);
        writer.write_bits(bits![u8, Msb0; 1, 0, 1, 1, 0, 0, 1, 1]).unwrap();
        assert_eq!(writer.pending_bits(), 0);
        drop(writer);
        assert_eq!(out, vec![0b10110011]);

        let mut cursor = BitCursor::new(&out[..]);
        assert_eq!(
            read_bits(&mut cursor, 8),
            [true, false, true, true, false, false, true, true]
        );
    }

    #[test]
    fn test_padding() {
        let mut out = Vec::new();
        let mut writer = BitWriter::new(&mut out);
        writer.write_bit(true).unwrap();
        assert_eq!(writer.pending_bits(), 1);
        writer.flush().unwrap();
        drop(writer);
        // Should be padded to 10000000
        assert_eq!(out, vec![0b10000000]);
    }

    #[test]
    fn test_flush_on_boundary_writes_nothing() {
        let mut out = Vec::new();
        let mut writer = BitWriter::new(&mut out);
        writer.write_bits(bits![u8, Msb0; 0; 8]).unwrap();
        writer.flush().unwrap();
        writer.flush().unwrap();
        drop(writer);
        assert_eq!(out, vec![0]);
    }

    #[test]
    fn test_write_after_flush_starts_fresh_byte() {
        let mut out = Vec::new();
        let mut writer = BitWriter::new(&mut out);
        writer.write_bits(bits![u8, Msb0; 1, 1]).unwrap();
        writer.flush().unwrap();
        writer.write_bits(bits![u8, Msb0; 1]).unwrap();
        writer.flush().unwrap();
        drop(writer);
        assert_eq!(out, vec![0b11000000, 0b10000000]);
    }

    #[test]
    fn test_multi_byte() {
        let mut out = Vec::new();
        let mut writer = BitWriter::new(&mut out);
        let bits: BitVec<u8, Msb0> = 0b1010101111110000u16.view_bits::<Msb0>().iter().by_vals().collect();
        writer.write_bits(&bits).unwrap();
        drop(writer);
        assert_eq!(out, vec![0b10101011, 0b11110000]);
    }

    #[test]
    fn test_read_past_end() {
        let data = [0b10101010u8];
        let mut cursor = BitCursor::new(&data[..]);
        assert_eq!(read_bits(&mut cursor, 8).len(), 8);
        assert!(matches!(cursor.next_bit(), Err(Error::StreamRead(_))));
    }

    #[test]
    fn test_cursor_reads_lazily() {
        let data = [0xFFu8, 0x00];
        let mut input = &data[..];
        {
            let mut cursor = BitCursor::new(&mut input);
            assert!(cursor.next_bit().unwrap());
        }
        // Only the first byte was pulled from the stream
        assert_eq!(input, &[0x00]);
    }

    #[test]
    fn test_cloned_cursors_continue_each_other() {
        let data = [0b1100_1010u8, 0b0111_0001];
        let mut first = BitCursor::new(&data[..]);
        let a = read_bits(&mut first, 3);

        let mut second = first.clone();
        assert_eq!(second.handle_count(), 2);
        let b = read_bits(&mut second, 7);
        let c = read_bits(&mut first, 6);

        let all: Vec<bool> = a.into_iter().chain(b).chain(c).collect();
        let expected: Vec<bool> = data.view_bits::<Msb0>().iter().by_vals().collect();
        assert_eq!(all, expected);
        assert_eq!(first.bits_consumed(), 16);
    }

    #[test]
    fn test_session_released_with_last_handle() {
        let data = [0u8];
        let first = BitCursor::new(&data[..]);
        let second = first.clone();
        assert_eq!(first.handle_count(), 2);
        drop(second);
        assert_eq!(first.handle_count(), 1);
    }

    #[test]
    fn test_cloned_writers_share_partial_byte() {
        let mut out = Vec::new();
        let mut first = BitWriter::new(&mut out);
        first.write_bits(bits![u8, Msb0; 1, 0, 1]).unwrap();

        let mut second = first.clone();
        second.write_bits(bits![u8, Msb0; 1, 1, 1, 1, 1, 0]).unwrap();
        assert_eq!(first.pending_bits(), 1);
        first.flush().unwrap();
        drop(first);
        drop(second);
        assert_eq!(out, vec![0b1011_1111, 0b0000_0000]);
    }

    #[test]
    fn test_write_error_surfaces() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "broken"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut writer = BitWriter::new(Broken);
        writer.write_bits(bits![u8, Msb0; 1, 1, 1]).unwrap();
        assert!(matches!(writer.flush(), Err(Error::StreamWrite(_))));
    }
}
