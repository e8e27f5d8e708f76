//! Fixed-width, byte-order-safe persistence over byte streams.
//!
//! Multi-byte integers are big-endian. Every read failure, including a stream
//! that ends before the requested width, surfaces as [`Error::StreamRead`];
//! every write failure as [`Error::StreamWrite`].

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};

/// Reads fixed-width values from any byte stream.
pub trait PersistRead: Read {
    /// Read a single byte.
    fn read_byte(&mut self) -> Result<u8> {
        self.read_u8().map_err(Error::StreamRead)
    }

    /// Read a big-endian `u64`.
    fn read_u64_be(&mut self) -> Result<u64> {
        self.read_u64::<BigEndian>().map_err(Error::StreamRead)
    }

    /// Read exactly `count` raw bytes.
    fn read_chars(&mut self, count: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; count];
        self.read_exact(&mut buf).map_err(Error::StreamRead)?;
        Ok(buf)
    }
}

impl<R: Read + ?Sized> PersistRead for R {}

/// Writes fixed-width values to any byte stream.
pub trait PersistWrite: Write {
    /// Write a single byte.
    fn write_byte(&mut self, value: u8) -> Result<()> {
        self.write_u8(value).map_err(Error::StreamWrite)
    }

    /// Write a big-endian `u64`.
    fn write_u64_be(&mut self, value: u64) -> Result<()> {
        self.write_u64::<BigEndian>(value).map_err(Error::StreamWrite)
    }

    /// Write raw bytes verbatim.
    fn write_chars(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_all(bytes).map_err(Error::StreamWrite)
    }
}

impl<W: Write + ?Sized> PersistWrite for W {}

/// Fill `buf` from `reader`, stopping early only at end of stream.
///
/// Returns the number of bytes placed in `buf`; anything short of
/// `buf.len()` means the stream is exhausted.
pub fn read_up_to<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
